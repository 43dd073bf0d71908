// vellum/content/src/fit.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Least-squares cubic fitting of ordered point runs.
//!
//! The classic approach: chord-length parameterization, a least-squares
//! cubic for the run, a bounded number of Newton–Raphson reparameterization
//! rounds, and subdivision at the worst point when the error will not come
//! down. Used by vertex removal (shape-preserving joins) and the pencil tool
//! at commit time.

use crate::segment::Segment;
use vellum_geometry::util::EPSILON;
use vellum_geometry::vector::Vector2F;

const MAX_REPARAMETERIZE_ITERATIONS: usize = 4;
/// Subdivision gives up below this run length and emits a plain cubic.
const MIN_SPLIT_LEN: usize = 3;

/// Fits a sequence of cubics through `points`, within `tolerance`.
pub fn fit_cubic(points: &[Vector2F], tolerance: f32) -> Vec<Segment> {
    let mut segments = vec![];
    if points.len() < 2 {
        return segments;
    }

    let left_tangent = run_tangent(points, false);
    let right_tangent = run_tangent(points, true);
    fit_run(points, left_tangent, right_tangent, tolerance, &mut segments);
    debug!("fit_cubic: {} samples -> {} cubics", points.len(), segments.len());
    segments
}

/// Fits exactly one cubic through `points`, without subdivision. `None` if
/// the run is degenerate.
pub fn fit_single_cubic(points: &[Vector2F]) -> Option<Segment> {
    if points.len() < 2 {
        return None;
    }
    let params = chord_length_parameterize(points);
    let cubic = generate_cubic(points,
                               &params,
                               run_tangent(points, false),
                               run_tangent(points, true));
    if cubic.from.is_finite() && cubic.ctrl0.is_finite() &&
            cubic.ctrl1.is_finite() && cubic.to.is_finite() {
        Some(cubic)
    } else {
        None
    }
}

fn fit_run(points: &[Vector2F],
           left_tangent: Vector2F,
           right_tangent: Vector2F,
           tolerance: f32,
           segments: &mut Vec<Segment>) {
    // Two points: a straight cubic with the heuristic third-length handles.
    if points.len() == 2 {
        let distance = (points[1] - points[0]).length() / 3.0;
        segments.push(Segment::cubic(points[0],
                                     points[0] + left_tangent * distance,
                                     points[1] + right_tangent * distance,
                                     points[1]));
        return;
    }

    let mut params = chord_length_parameterize(points);
    let mut cubic = generate_cubic(points, &params, left_tangent, right_tangent);
    let (mut max_error, mut worst) = max_fit_error(points, &params, &cubic);

    if max_error <= tolerance {
        segments.push(cubic);
        return;
    }

    // The error is not hopeless: try to nudge the parameterization.
    if max_error <= tolerance * tolerance.max(2.0) {
        for _ in 0..MAX_REPARAMETERIZE_ITERATIONS {
            reparameterize(points, &mut params, &cubic);
            cubic = generate_cubic(points, &params, left_tangent, right_tangent);
            let (error, worst_index) = max_fit_error(points, &params, &cubic);
            max_error = error;
            worst = worst_index;
            if max_error <= tolerance {
                segments.push(cubic);
                return;
            }
        }
    }

    if points.len() <= MIN_SPLIT_LEN {
        segments.push(cubic);
        return;
    }

    // Subdivide at the worst point with a smoothed center tangent.
    let worst = worst.max(1).min(points.len() - 2);
    let center_tangent = (points[worst - 1] - points[worst + 1]).normalize();
    fit_run(&points[..=worst], left_tangent, center_tangent, tolerance, segments);
    fit_run(&points[worst..], -center_tangent, right_tangent, tolerance, segments);
}

/// Unit tangent at the start (or, reversed, at the end) of a run.
fn run_tangent(points: &[Vector2F], reversed: bool) -> Vector2F {
    let tangent = if reversed {
        let last = points.len() - 1;
        let mut index = last;
        while index > 0 && (points[index - 1] - points[last]).length() <= EPSILON {
            index -= 1;
        }
        points[index.saturating_sub(1)] - points[last]
    } else {
        let mut index = 0;
        while index + 1 < points.len() && (points[index + 1] - points[0]).length() <= EPSILON {
            index += 1;
        }
        points[(index + 1).min(points.len() - 1)] - points[0]
    };
    tangent.normalize()
}

fn chord_length_parameterize(points: &[Vector2F]) -> Vec<f32> {
    let mut params = Vec::with_capacity(points.len());
    params.push(0.0);
    for index in 1..points.len() {
        let prev = params[index - 1];
        params.push(prev + (points[index] - points[index - 1]).length());
    }
    let total = *params.last().unwrap();
    if total > EPSILON {
        for param in &mut params {
            *param /= total;
        }
    }
    params
}

/// The least-squares cubic for the parameterized run (Schneider's
/// `GenerateBezier`).
fn generate_cubic(points: &[Vector2F],
                  params: &[f32],
                  left_tangent: Vector2F,
                  right_tangent: Vector2F)
                  -> Segment {
    let first = points[0];
    let last = *points.last().unwrap();

    let mut c = [[0.0f32; 2]; 2];
    let mut x = [0.0f32; 2];

    for (point, &u) in points.iter().zip(params.iter()) {
        let b0 = (1.0 - u) * (1.0 - u) * (1.0 - u);
        let b1 = 3.0 * u * (1.0 - u) * (1.0 - u);
        let b2 = 3.0 * u * u * (1.0 - u);
        let b3 = u * u * u;

        let a0 = left_tangent * b1;
        let a1 = right_tangent * b2;

        c[0][0] += a0.dot(a0);
        c[0][1] += a0.dot(a1);
        c[1][0] = c[0][1];
        c[1][1] += a1.dot(a1);

        let tmp = *point - (first * (b0 + b1) + last * (b2 + b3));
        x[0] += a0.dot(tmp);
        x[1] += a1.dot(tmp);
    }

    let det_c0_c1 = c[0][0] * c[1][1] - c[1][0] * c[0][1];
    let det_c0_x = c[0][0] * x[1] - c[1][0] * x[0];
    let det_x_c1 = x[0] * c[1][1] - x[1] * c[0][1];

    let (mut alpha_l, mut alpha_r) = if det_c0_c1.abs() <= EPSILON {
        (0.0, 0.0)
    } else {
        (det_x_c1 / det_c0_c1, det_c0_x / det_c0_c1)
    };

    // Wu/Barsky fallback for degenerate alphas.
    let seg_length = (last - first).length();
    let epsilon = 1.0e-6 * seg_length;
    if alpha_l < epsilon || alpha_r < epsilon {
        alpha_l = seg_length / 3.0;
        alpha_r = alpha_l;
    }

    Segment::cubic(first,
                   first + left_tangent * alpha_l,
                   last + right_tangent * alpha_r,
                   last)
}

fn max_fit_error(points: &[Vector2F], params: &[f32], cubic: &Segment) -> (f32, usize) {
    let mut max_error = 0.0;
    let mut worst = points.len() / 2;
    for (index, (point, &u)) in points.iter().zip(params.iter()).enumerate() {
        let error = (cubic.sample(u) - *point).square_length();
        if error > max_error {
            max_error = error;
            worst = index;
        }
    }
    (max_error.sqrt(), worst)
}

/// One Newton–Raphson step per parameter toward the closest curve point.
fn reparameterize(points: &[Vector2F], params: &mut [f32], cubic: &Segment) {
    for (point, param) in points.iter().zip(params.iter_mut()) {
        let u = *param;
        let q = cubic.sample(u) - *point;
        let d1 = cubic.derivative(u);
        // Second derivative of a cubic.
        let d2 = ((cubic.ctrl1 - cubic.ctrl0 * 2.0 + cubic.from)
                      .lerp(cubic.to - cubic.ctrl1 * 2.0 + cubic.ctrl0, u)) * 6.0;

        let numerator = q.dot(d1);
        let denominator = d1.dot(d1) + q.dot(d2);
        if denominator.abs() > EPSILON {
            *param = (u - numerator / denominator).max(0.0).min(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::vec2f;

    #[test]
    fn test_fit_straight_line() {
        let points: Vec<_> = (0..20).map(|i| vec2f(i as f32 * 5.0, 0.0)).collect();
        let segments = fit_cubic(&points, 1.0);
        assert_eq!(segments.len(), 1);
        for step in 0..=10 {
            let point = segments[0].sample(step as f32 / 10.0);
            assert!(point.y.abs() < 1.0);
        }
    }

    #[test]
    fn test_fit_sine_wave_within_tolerance() {
        let points: Vec<_> = (0..=100)
            .map(|i| {
                let x = i as f32 * 2.0;
                vec2f(x, (x * 0.05).sin() * 40.0)
            })
            .collect();
        let tolerance = 2.0;
        let segments = fit_cubic(&points, tolerance);
        assert!(!segments.is_empty());
        assert!(segments.len() <= 50, "too many cubics: {}", segments.len());

        // Every input sample must be near the fitted curve.
        for point in &points {
            let mut best = f32::MAX;
            for segment in &segments {
                for step in 0..=32 {
                    let sample = segment.sample(step as f32 / 32.0);
                    best = best.min((sample - *point).length());
                }
            }
            assert!(best <= tolerance + 0.1, "sample {:?} off by {}", point, best);
        }
    }

    #[test]
    fn test_fit_single_cubic_arc() {
        let points: Vec<_> = (0..=16)
            .map(|i| {
                let theta = i as f32 / 16.0 * std::f32::consts::FRAC_PI_2;
                vec2f(theta.cos() * 100.0, theta.sin() * 100.0)
            })
            .collect();
        let cubic = fit_single_cubic(&points).unwrap();
        assert!((cubic.from - vec2f(100.0, 0.0)).length() < 1e-3);
        assert!((cubic.to - vec2f(0.0, 100.0)).length() < 1e-3);
        // A quarter arc fits a single cubic to well under a pixel.
        for point in &points {
            let mut best = f32::MAX;
            for step in 0..=64 {
                best = best.min((cubic.sample(step as f32 / 64.0) - *point).length());
            }
            assert!(best < 1.0);
        }
    }
}
