// vellum/content/src/gradient.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Colors and gradients.

use crate::encoding::{DecodeError, Decoder, EncodedData};
use std::cmp::Ordering;
use vellum_geometry::line_segment::LineSegment2F;
use vellum_geometry::util;
use vellum_geometry::vector::Vector2F;

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorU {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorU {
    #[inline]
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> ColorU {
        ColorU { r, g, b, a }
    }

    #[inline]
    pub fn black() -> ColorU {
        ColorU::new(0, 0, 0, 255)
    }

    #[inline]
    pub fn white() -> ColorU {
        ColorU::new(255, 255, 255, 255)
    }

    #[inline]
    pub fn transparent_black() -> ColorU {
        ColorU::default()
    }

    #[inline]
    pub fn is_fully_transparent(self) -> bool {
        self.a == 0
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn lerp(self, other: ColorU, t: f32) -> ColorU {
        let mix = |a: u8, b: u8| util::lerp(a as f32, b as f32, t).round() as u8;
        ColorU::new(mix(self.r, other.r),
                    mix(self.g, other.g),
                    mix(self.b, other.b),
                    mix(self.a, other.a))
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn encode(&self, data: &mut EncodedData) {
        data.uint8(self.r).uint8(self.g).uint8(self.b).uint8(self.a);
    }

    pub fn decode(decoder: &mut Decoder) -> Result<ColorU, DecodeError> {
        Ok(ColorU::new(decoder.uint8()?, decoder.uint8()?, decoder.uint8()?, decoder.uint8()?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientGeometry {
    Linear(LineSegment2F),
    Radial { center: Vector2F, radius: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: ColorU,
}

impl ColorStop {
    #[inline]
    pub fn new(color: ColorU, offset: f32) -> ColorStop {
        ColorStop { color, offset }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    geometry: GradientGeometry,
    stops: Vec<ColorStop>,
}

impl Gradient {
    #[inline]
    pub fn linear(line: LineSegment2F) -> Gradient {
        Gradient { geometry: GradientGeometry::Linear(line), stops: vec![] }
    }

    #[inline]
    pub fn radial(center: Vector2F, radius: f32) -> Gradient {
        Gradient { geometry: GradientGeometry::Radial { center, radius }, stops: vec![] }
    }

    #[inline]
    pub fn geometry(&self) -> &GradientGeometry {
        &self.geometry
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Inserts a stop, keeping the stop list sorted by offset.
    pub fn add_color_stop(&mut self, stop: ColorStop) {
        let index = self
            .stops
            .binary_search_by(|other| {
                other.offset.partial_cmp(&stop.offset).unwrap_or(Ordering::Less)
            })
            .unwrap_or_else(|index| index);
        self.stops.insert(index, stop);
    }

    pub fn sample(&self, t: f32) -> ColorU {
        if self.stops.is_empty() {
            return ColorU::transparent_black();
        }

        let t = util::clamp(t, 0.0, 1.0);
        let last_index = self.stops.len() - 1;
        let upper_index = self
            .stops
            .binary_search_by(|stop| stop.offset.partial_cmp(&t).unwrap_or(Ordering::Less))
            .unwrap_or_else(|index| index)
            .min(last_index);
        let lower_index = upper_index.saturating_sub(1);

        let lower = &self.stops[lower_index];
        let upper = &self.stops[upper_index];

        let denom = upper.offset - lower.offset;
        if denom == 0.0 {
            return lower.color;
        }
        lower.color.lerp(upper.color, (t - lower.offset) / denom)
    }

    pub fn encode(&self, data: &mut EncodedData) {
        match self.geometry {
            GradientGeometry::Linear(line) => {
                data.uint8(0).vec2(line.from).vec2(line.to);
            }
            GradientGeometry::Radial { center, radius } => {
                data.uint8(1).vec2(center).float(radius);
            }
        }
        data.uint32(self.stops.len() as u32);
        for stop in &self.stops {
            data.float(stop.offset);
            stop.color.encode(data);
        }
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Gradient, DecodeError> {
        let geometry = match decoder.uint8()? {
            0 => GradientGeometry::Linear(LineSegment2F::new(decoder.vec2()?, decoder.vec2()?)),
            1 => GradientGeometry::Radial { center: decoder.vec2()?, radius: decoder.float()? },
            _ => return Err(DecodeError::InvalidValue),
        };
        let stop_count = decoder.uint32()? as usize;
        let mut gradient = Gradient { geometry, stops: Vec::with_capacity(stop_count.min(64)) };
        for _ in 0..stop_count {
            let offset = decoder.float()?;
            let color = ColorU::decode(decoder)?;
            gradient.stops.push(ColorStop::new(color, offset));
        }
        Ok(gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::vec2f;

    #[test]
    fn test_sample_endpoints_and_middle() {
        let mut gradient =
            Gradient::linear(LineSegment2F::new(vec2f(0.0, 0.0), vec2f(100.0, 0.0)));
        gradient.add_color_stop(ColorStop::new(ColorU::new(0, 0, 0, 255), 0.0));
        gradient.add_color_stop(ColorStop::new(ColorU::new(200, 0, 0, 255), 1.0));

        assert_eq!(gradient.sample(0.0), ColorU::new(0, 0, 0, 255));
        assert_eq!(gradient.sample(1.0), ColorU::new(200, 0, 0, 255));
        assert_eq!(gradient.sample(0.5).r, 100);
    }

    #[test]
    fn test_stops_stay_sorted() {
        let mut gradient =
            Gradient::linear(LineSegment2F::new(vec2f(0.0, 0.0), vec2f(1.0, 0.0)));
        gradient.add_color_stop(ColorStop::new(ColorU::white(), 0.9));
        gradient.add_color_stop(ColorStop::new(ColorU::black(), 0.1));
        gradient.add_color_stop(ColorStop::new(ColorU::white(), 0.5));
        let offsets: Vec<_> = gradient.stops().iter().map(|stop| stop.offset).collect();
        assert_eq!(offsets, vec![0.1, 0.5, 0.9]);
    }

    #[test]
    fn test_encode_decode() {
        let mut gradient = Gradient::radial(vec2f(5.0, 5.0), 20.0);
        gradient.add_color_stop(ColorStop::new(ColorU::new(1, 2, 3, 4), 0.25));

        let mut data = crate::encoding::EncodedData::new();
        gradient.encode(&mut data);
        let decoded =
            Gradient::decode(&mut crate::encoding::Decoder::new(data.bytes())).unwrap();
        assert_eq!(decoded, gradient);
    }
}
