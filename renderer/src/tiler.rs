// vellum/renderer/src/tiler.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Converts monotonic curves into filled and boundary cell spans.
//!
//! A grid is laid over the path's bounding rectangle (padded by one cell).
//! Every monotonic curve marks the cells it passes through and records a
//! signed crossing where it traverses a horizontal grid line. Per row, runs
//! of curve-free cells are classified inside/outside by accumulating the
//! crossing signs to their left; cells containing curves become boundary
//! spans carrying the curve set and the winding at their left edge.

use crate::gpu_data::{BoundarySpanInstance, FilledSpanInstance, PaintMetadata};
use smallvec::SmallVec;
use vellum_content::path::FillRule;
use vellum_content::quadratic::QuadraticPath;
use vellum_content::segment::Segment;
use vellum_geometry::rect::RectF;
use vellum_geometry::util::{self, EPSILON};
use vellum_geometry::vector::{vec2f, vec2i, Vector2F, Vector2I};

/// The base cell size in scene units at LOD 0.
pub const BASE_CELL_SIZE: f32 = 512.0;

/// The on-screen size a cell aims for, in pixels.
const TARGET_CELL_PIXELS: f32 = 13.0;

const MAX_LOD: i32 = 8;

/// The antialiasing tolerance band around cell edges, in pixels.
const EDGE_BAND_PIXELS: f32 = 1.0;

/// The cell edge length for a zoom level, in scene units.
pub fn cell_size_for_zoom(zoom: f32) -> f32 {
    let lod = (BASE_CELL_SIZE * zoom / TARGET_CELL_PIXELS)
        .log2()
        .round()
        .max(0.0)
        .min(24.0) as i32;
    BASE_CELL_SIZE * (0.5f32).powi(lod.min(MAX_LOD))
}

/// One cell's worth of boundary data, before GPU packing.
#[derive(Clone, Debug)]
pub struct BoundaryCell {
    pub coords: Vector2I,
    pub curves: SmallVec<[u32; 8]>,
    /// Winding accumulated at the cell's left edge.
    pub backdrop: i32,
}

/// A horizontal run of entirely covered cells.
#[derive(Clone, Copy, Debug)]
pub struct FilledSpan {
    pub coords: Vector2I,
    pub cell_count: i32,
}

/// Vertical band index for fragment-shader binary search: each band holds
/// the indices of the curves overlapping its y-range.
#[derive(Clone, Debug, Default)]
pub struct Bands {
    pub ranges: Vec<(u32, u32)>,
    pub indices: Vec<u32>,
    pub y_min: f32,
    pub y_max: f32,
}

/// The tiling of one path.
#[derive(Clone, Debug)]
pub struct TiledPath {
    pub cell_size: f32,
    /// Grid origin, in cell coordinates.
    pub grid_min: Vector2I,
    pub grid_size: Vector2I,
    pub curves: Vec<Segment>,
    pub filled_spans: Vec<FilledSpan>,
    pub boundary_cells: Vec<BoundaryCell>,
    pub bands: Bands,
}

impl TiledPath {
    #[inline]
    pub fn cell_origin(&self, coords: Vector2I) -> Vector2F {
        vec2f(coords.x as f32 * self.cell_size, coords.y as f32 * self.cell_size)
    }

    /// Whether `point` falls inside one of the filled spans.
    pub fn point_in_filled_span(&self, point: Vector2F) -> bool {
        for span in &self.filled_spans {
            let origin = self.cell_origin(span.coords);
            let size = vec2f(span.cell_count as f32 * self.cell_size, self.cell_size);
            if RectF::new(origin, size).contains_point(point) {
                return true;
            }
        }
        false
    }

    /// Whether `point` falls inside a boundary cell.
    pub fn point_in_boundary_cell(&self, point: Vector2F) -> bool {
        for cell in &self.boundary_cells {
            let origin = self.cell_origin(cell.coords);
            let size = Vector2F::splat(self.cell_size);
            if RectF::new(origin, size).contains_point(point) {
                return true;
            }
        }
        false
    }
}

struct Crossing {
    x: f32,
    sign: i32,
}

/// Tiles one path at the given zoom.
pub struct Tiler<'a> {
    path: &'a QuadraticPath,
    fill_rule: FillRule,
    zoom: f32,
}

impl<'a> Tiler<'a> {
    pub fn new(path: &'a QuadraticPath, fill_rule: FillRule, zoom: f32) -> Tiler<'a> {
        Tiler { path, fill_rule, zoom }
    }

    pub fn generate(&self) -> TiledPath {
        let cell_size = cell_size_for_zoom(self.zoom);
        let bounds = self.path.approx_bounding_rect();

        // One cell of padding on every side.
        let grid_min = vec2i((bounds.min.x / cell_size).floor() as i32 - 1,
                             (bounds.min.y / cell_size).floor() as i32 - 1);
        let grid_max = vec2i((bounds.max.x / cell_size).ceil() as i32 + 1,
                             (bounds.max.y / cell_size).ceil() as i32 + 1);
        let grid_size = grid_max - grid_min;

        let mut tiled = TiledPath {
            cell_size,
            grid_min,
            grid_size,
            curves: vec![],
            filled_spans: vec![],
            boundary_cells: vec![],
            bands: Bands::default(),
        };

        if self.path.is_empty() || grid_size.x <= 0 || grid_size.y <= 0 {
            return tiled;
        }

        // Split every segment monotonic.
        for segment in self.path.segments() {
            segment.for_each_monotonic(&mut |piece| tiled.curves.push(*piece));
        }

        let cell_count = (grid_size.x * grid_size.y) as usize;
        let mut cell_curves: Vec<SmallVec<[u32; 8]>> = vec![SmallVec::new(); cell_count];
        // Crossings of each horizontal grid line, indexed by row line
        // (0 ..= grid_size.y).
        let mut row_crossings: Vec<Vec<Crossing>> = vec![];
        row_crossings.resize_with(grid_size.y as usize + 1, Vec::new);

        let band = EDGE_BAND_PIXELS / self.zoom.max(EPSILON);
        for (curve_index, curve) in tiled.curves.iter().enumerate() {
            mark_curve_cells(curve,
                             curve_index as u32,
                             cell_size,
                             band,
                             grid_min,
                             grid_size,
                             &mut cell_curves);
            record_crossings(curve, cell_size, grid_min, grid_size, &mut row_crossings);
        }

        for crossings in &mut row_crossings {
            crossings.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
        }

        // Classify rows.
        for row in 0..grid_size.y {
            // Winding along the grid line bounding this row above.
            let crossings = &row_crossings[row as usize];
            let mut crossing_index = 0;
            let mut winding = 0;
            let mut run_start: Option<i32> = None;

            for col in 0..grid_size.x {
                let cell_left = (grid_min.x + col) as f32 * cell_size;
                while crossing_index < crossings.len() &&
                        crossings[crossing_index].x <= cell_left {
                    winding += crossings[crossing_index].sign;
                    crossing_index += 1;
                }

                let cell = &cell_curves[(row * grid_size.x + col) as usize];
                if !cell.is_empty() {
                    if let Some(start) = run_start.take() {
                        tiled.filled_spans.push(FilledSpan {
                            coords: vec2i(grid_min.x + start, grid_min.y + row),
                            cell_count: col - start,
                        });
                    }
                    tiled.boundary_cells.push(BoundaryCell {
                        coords: vec2i(grid_min.x + col, grid_min.y + row),
                        curves: cell.clone(),
                        backdrop: winding,
                    });
                    continue;
                }

                let inside = self.fill_rule.includes(winding);
                match (inside, run_start) {
                    (true, None) => run_start = Some(col),
                    (false, Some(start)) => {
                        tiled.filled_spans.push(FilledSpan {
                            coords: vec2i(grid_min.x + start, grid_min.y + row),
                            cell_count: col - start,
                        });
                        run_start = None;
                    }
                    _ => {}
                }
            }

            if let Some(start) = run_start {
                tiled.filled_spans.push(FilledSpan {
                    coords: vec2i(grid_min.x + start, grid_min.y + row),
                    cell_count: grid_size.x - start,
                });
            }
        }

        tiled.bands = build_bands(&tiled.curves, bounds);
        tiled
    }
}

/// Marks every cell the curve passes through (plus the antialiasing band)
/// by walking a fine flattening of the monotonic curve.
fn mark_curve_cells(curve: &Segment,
                    curve_index: u32,
                    cell_size: f32,
                    band: f32,
                    grid_min: Vector2I,
                    grid_size: Vector2I,
                    cells: &mut [SmallVec<[u32; 8]>]) {
    let extent = curve.approx_bounding_rect().size();
    let steps = ((extent.x.max(extent.y) / (cell_size * 0.25)).ceil() as usize).max(1).min(1024);

    let mut mark = |point: Vector2F| {
        // The point's cell, plus neighbors within the tolerance band.
        for &dx in &[-band, 0.0, band] {
            for &dy in &[-band, 0.0, band] {
                let col = ((point.x + dx) / cell_size).floor() as i32 - grid_min.x;
                let row = ((point.y + dy) / cell_size).floor() as i32 - grid_min.y;
                if col < 0 || row < 0 || col >= grid_size.x || row >= grid_size.y {
                    continue;
                }
                let cell = &mut cells[(row * grid_size.x + col) as usize];
                if cell.last() != Some(&curve_index) && !cell.contains(&curve_index) {
                    cell.push(curve_index);
                }
            }
        }
    };

    let mut prev = curve.sample(0.0);
    mark(prev);
    for step in 1..=steps {
        let next = curve.sample(step as f32 / steps as f32);
        // Subdivide the sub-line so no cell is skipped diagonally.
        let distance = (next - prev).length();
        let sub_steps = ((distance / (cell_size * 0.5)).ceil() as usize).max(1);
        for sub in 1..=sub_steps {
            mark(prev.lerp(next, sub as f32 / sub_steps as f32));
        }
        prev = next;
    }
}

/// Records the signed crossing of each horizontal grid line the monotonic
/// curve traverses. Monotonicity guarantees at most one crossing per line.
fn record_crossings(curve: &Segment,
                    cell_size: f32,
                    grid_min: Vector2I,
                    grid_size: Vector2I,
                    row_crossings: &mut [Vec<Crossing>]) {
    let (y0, y1) = (curve.from.y, curve.to.y);
    let (min_y, max_y) = (y0.min(y1), y0.max(y1));
    let sign = if y1 > y0 {
        1
    } else if y1 < y0 {
        -1
    } else {
        return;
    };

    let first_line = (min_y / cell_size).ceil() as i32;
    let last_line = (max_y / cell_size).ceil() as i32 - 1;

    for line in first_line..=last_line {
        let line_index = line - grid_min.y;
        if line_index < 0 || line_index > grid_size.y {
            continue;
        }
        let y = line as f32 * cell_size;
        // Half-open rule: count lines in [min_y, max_y).
        if y < min_y || y >= max_y {
            continue;
        }
        if let Some(x) = monotonic_x_at_y(curve, y) {
            row_crossings[line_index as usize].push(Crossing { x, sign });
        }
    }
}

/// Solves a y-monotonic curve for its x at height `y`, by bisection.
fn monotonic_x_at_y(curve: &Segment, y: f32) -> Option<f32> {
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let ascending = curve.to.y >= curve.from.y;
    for _ in 0..48 {
        let t = (t0 + t1) * 0.5;
        let sample_y = curve.sample(t).y;
        if (sample_y - y).abs() <= EPSILON {
            return Some(curve.sample(t).x);
        }
        if (sample_y < y) == ascending {
            t0 = t;
        } else {
            t1 = t;
        }
    }
    Some(curve.sample((t0 + t1) * 0.5).x)
}

/// Builds the vertical band index over the path's curves.
fn build_bands(curves: &[Segment], bounds: RectF) -> Bands {
    let mut bands = Bands { ranges: vec![], indices: vec![], y_min: bounds.min.y, y_max: bounds.max.y };
    if curves.is_empty() {
        return bands;
    }

    let band_count = util::next_power_of_two((curves.len() / 4).max(1)).min(32);
    let band_height = (bounds.height() / band_count as f32).max(EPSILON);

    for band_index in 0..band_count {
        let band_min = bounds.min.y + band_index as f32 * band_height;
        let band_max = band_min + band_height;
        let first = bands.indices.len() as u32;
        for (curve_index, curve) in curves.iter().enumerate() {
            let rect = curve.approx_bounding_rect();
            if rect.min.y < band_max && rect.max.y >= band_min {
                bands.indices.push(curve_index as u32);
            }
        }
        bands.ranges.push((first, bands.indices.len() as u32 - first));
    }
    bands
}

/// Packs a tiling into GPU instances.
pub struct PackedTiles {
    pub filled: Vec<FilledSpanInstance>,
    pub boundary: Vec<BoundarySpanInstance>,
    /// Per-curve texel data, appended to the frame's curves texture.
    pub curve_texels: Vec<f32>,
    /// Band index texels (curve indices as float bits).
    pub band_texels: Vec<f32>,
}

pub fn pack_tiles(tiled: &TiledPath,
                  paint: &PaintMetadata,
                  curves_texel_base: u32,
                  bands_texel_base: u32)
                  -> PackedTiles {
    use crate::gpu_data::curve_texels;

    let mut packed = PackedTiles {
        filled: Vec::with_capacity(tiled.filled_spans.len()),
        boundary: Vec::with_capacity(tiled.boundary_cells.len()),
        curve_texels: Vec::with_capacity(tiled.curves.len() * 8),
        band_texels: Vec::with_capacity(tiled.bands.indices.len()),
    };

    for curve in &tiled.curves {
        packed.curve_texels.extend_from_slice(&curve_texels(curve));
    }
    // Band layout: per band a (first, count) pair, then the index pool.
    for &(first, count) in &tiled.bands.ranges {
        packed.band_texels.push(first as f32);
        packed.band_texels.push(count as f32);
    }
    for &index in &tiled.bands.indices {
        packed.band_texels.push(index as f32);
    }

    let color = paint.color.to_bytes();
    let paint_data = FilledSpanInstance::pack_paint_data(paint.kind, paint.gradient_row);

    for span in &tiled.filled_spans {
        let origin = tiled.cell_origin(span.coords);
        packed.filled.push(FilledSpanInstance {
            position: [origin.x, origin.y],
            size: [span.cell_count as f32 * tiled.cell_size, tiled.cell_size],
            color,
            paint_data,
        });
    }

    let band_count = tiled.bands.ranges.len() as u32;
    let curve_count = tiled.curves.len() as u32;
    for cell in &tiled.boundary_cells {
        let origin = tiled.cell_origin(cell.coords);
        packed.boundary.push(BoundarySpanInstance {
            position: [origin.x, origin.y],
            size: [tiled.cell_size, tiled.cell_size],
            color,
            curves_data: BoundarySpanInstance::pack_curves_data(curves_texel_base,
                                                               paint.kind,
                                                               cell.backdrop),
            bands_data: BoundarySpanInstance::pack_bands_data(bands_texel_base,
                                                             band_count,
                                                             curve_count),
        });
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_content::gradient::ColorU;
    use vellum_content::path::Path;

    fn tile_path(path: &QuadraticPath, zoom: f32) -> TiledPath {
        Tiler::new(path, FillRule::NonZero, zoom).generate()
    }

    fn rect_path(min: Vector2F, max: Vector2F) -> QuadraticPath {
        Path::rect(RectF::from_points(min, max)).to_quadratics(0.02)
    }

    #[test]
    fn test_cell_size_for_zoom() {
        // At zoom 1 the cell lands in the 13–26 px on-screen window.
        let size = cell_size_for_zoom(1.0);
        assert!(size >= 13.0 && size <= 26.0, "cell {}", size);
        // The LOD cap pins the minimum cell size.
        assert_eq!(cell_size_for_zoom(1000.0), BASE_CELL_SIZE / 256.0);
    }

    #[test]
    fn test_rect_filled_and_boundary() {
        let path = rect_path(vec2f(0.0, 0.0), vec2f(200.0, 200.0));
        let tiled = tile_path(&path, 1.0);

        assert!(!tiled.filled_spans.is_empty());
        assert!(!tiled.boundary_cells.is_empty());

        // The rect's center is deep inside: covered by a filled span.
        assert!(tiled.point_in_filled_span(vec2f(100.0, 100.0)));
        // Far outside: neither filled nor boundary.
        assert!(!tiled.point_in_filled_span(vec2f(300.0, 300.0)));
        assert!(!tiled.point_in_boundary_cell(vec2f(300.0, 300.0)));
        // The edge lives in boundary cells.
        assert!(tiled.point_in_boundary_cell(vec2f(0.0, 100.0)));
    }

    #[test]
    fn test_winding_parity_against_reference() {
        // A star-ish self-intersecting polygon exercises both rules.
        let mut path = QuadraticPath::new();
        path.move_to(vec2f(100.0, 0.0));
        path.line_to(vec2f(160.0, 180.0));
        path.line_to(vec2f(10.0, 70.0));
        path.line_to(vec2f(190.0, 70.0));
        path.line_to(vec2f(40.0, 180.0));
        path.line_to(vec2f(100.0, 0.0));

        for &rule in &[FillRule::NonZero, FillRule::EvenOdd] {
            let tiled = Tiler::new(&path, rule, 1.0).generate();
            let mut checked = 0;
            for step_x in 0..40 {
                for step_y in 0..40 {
                    let point = vec2f(step_x as f32 * 5.0, step_y as f32 * 4.5);
                    if tiled.point_in_boundary_cell(point) {
                        continue;
                    }
                    let expected = rule.includes(path.winding_at(point));
                    assert_eq!(tiled.point_in_filled_span(point), expected,
                               "rule {:?} point {:?}", rule, point);
                    checked += 1;
                }
            }
            assert!(checked > 100);
        }
    }

    #[test]
    fn test_circle_tile_counts_scale_with_radius() {
        let zoom = 10.0;
        let count_for = |radius: f32| {
            let path = Path::circle(vec2f(0.0, 0.0), radius).to_quadratics(0.002);
            let tiled = tile_path(&path, zoom);
            (tiled.boundary_cells.len() as f32, tiled.filled_spans.len() as f32)
        };

        let cell = cell_size_for_zoom(zoom);
        let (boundary_100, _) = count_for(100.0);
        let (boundary_200, _) = count_for(200.0);

        // Proportional to the circumference: doubling the radius doubles the
        // boundary count, within 10%.
        let ratio = boundary_200 / boundary_100;
        assert!((ratio - 2.0).abs() < 0.2, "ratio {}", ratio);

        // And the absolute count is a small multiple of circumference/cell.
        let expected = 2.0 * std::f32::consts::PI * 100.0 / cell;
        assert!(boundary_100 >= expected * 0.9 && boundary_100 <= expected * 2.0,
                "boundary {} expected ~{}", boundary_100, expected);
    }

    #[test]
    fn test_filled_spans_cover_circle_interior() {
        let path = Path::circle(vec2f(0.0, 0.0), 100.0).to_quadratics(0.002);
        let tiled = tile_path(&path, 10.0);
        let covered_cells: f32 = tiled
            .filled_spans
            .iter()
            .map(|span| span.cell_count as f32)
            .sum();
        let cell = tiled.cell_size;
        let area_cells = std::f32::consts::PI * 100.0 * 100.0 / (cell * cell);
        // Interior area minus the boundary ring.
        assert!(covered_cells > area_cells * 0.8 && covered_cells < area_cells * 1.02,
                "covered {} expected < {}", covered_cells, area_cells);
    }

    #[test]
    fn test_pack_tiles_layout() {
        let path = rect_path(vec2f(0.0, 0.0), vec2f(100.0, 100.0));
        let tiled = tile_path(&path, 1.0);
        let paint = PaintMetadata::solid(ColorU::new(10, 20, 30, 255));
        let packed = pack_tiles(&tiled, &paint, 7, 3);

        assert_eq!(packed.filled.len(), tiled.filled_spans.len());
        assert_eq!(packed.boundary.len(), tiled.boundary_cells.len());
        assert_eq!(packed.curve_texels.len(), tiled.curves.len() * 8);
        for instance in &packed.boundary {
            assert_eq!(instance.curves_data >> 8, 7);
            assert_eq!(instance.bands_data[0], 3);
        }
        assert_eq!(packed.filled[0].color, [10, 20, 30, 255]);
    }
}
