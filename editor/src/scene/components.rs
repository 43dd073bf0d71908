// vellum/editor/src/scene/components.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Component data and its binary form.
//!
//! Every component encodes as a one-byte component id followed by its
//! fields; an entity encodes as the concatenation of its components. The
//! history replays these payloads verbatim, so decoding must reject
//! anything malformed before touching the store.

use uuid::Uuid;
use vellum_content::encoding::{DecodeError, Decoder, EncodedData};
use vellum_content::gradient::{ColorU, Gradient};
use vellum_content::path::{FillRule, Path};
use vellum_content::stroke::{LineCap, LineJoin, StrokeStyle};
use vellum_geometry::transform2d::{Matrix2x2F, Transform2F};
use vellum_geometry::vector::{vec2f, Vector2F};

pub const ID_COMPONENT: u8 = 1;
pub const TAG_COMPONENT: u8 = 2;
pub const CATEGORY_COMPONENT: u8 = 3;
pub const PATH_COMPONENT: u8 = 4;
pub const TRANSFORM_COMPONENT: u8 = 5;
pub const FILL_COMPONENT: u8 = 6;
pub const STROKE_COMPONENT: u8 = 7;
pub const GROUP_COMPONENT: u8 = 8;
pub const LAYER_COMPONENT: u8 = 9;
pub const ARTBOARD_COMPONENT: u8 = 10;

bitflags! {
    /// What an entity participates in.
    pub struct CategoryFlags: u8 {
        const SELECTABLE = 0x1;
        const LOCKED     = 0x2;
        const HIDDEN     = 0x4;
    }
}

impl Default for CategoryFlags {
    #[inline]
    fn default() -> CategoryFlags {
        CategoryFlags::SELECTABLE
    }
}

/// What an element is filled with. Texture paints are a render-time
/// concern and never persist here.
#[derive(Clone, Debug, PartialEq)]
pub enum FillPaint {
    Color(ColorU),
    Gradient(Gradient),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TagData {
    pub tag: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CategoryData {
    pub flags: CategoryFlags,
}

#[derive(Clone, Debug, Default)]
pub struct PathData {
    pub path: Path,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformData {
    pub matrix: Transform2F,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FillData {
    pub paint: FillPaint,
    pub rule: FillRule,
}

impl Default for FillData {
    fn default() -> FillData {
        FillData { paint: FillPaint::Color(ColorU::black()), rule: FillRule::NonZero }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeData {
    pub color: ColorU,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

impl Default for StrokeData {
    fn default() -> StrokeData {
        StrokeData {
            color: ColorU::black(),
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter(4.0),
            miter_limit: 4.0,
        }
    }
}

impl StrokeData {
    /// The style handed to the stroker; the miter limit rides on the join.
    pub fn style(&self) -> StrokeStyle {
        let join = match self.join {
            LineJoin::Miter(_) => LineJoin::Miter(self.miter_limit),
            other => other,
        };
        StrokeStyle { width: self.width, cap: self.cap, join }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupData {
    pub children: Vec<Uuid>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerData {
    pub blend_mode: BlendMode,
    pub opacity: f32,
    pub children: Vec<Uuid>,
}

impl Default for LayerData {
    fn default() -> LayerData {
        LayerData { blend_mode: BlendMode::Normal, opacity: 1.0, children: vec![] }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArtboardData {
    pub color: ColorU,
    pub size: Vector2F,
}

impl Default for ArtboardData {
    fn default() -> ArtboardData {
        ArtboardData { color: ColorU::white(), size: vec2f(1920.0, 1080.0) }
    }
}

/// A decoded component, ready to be stored.
#[derive(Clone, Debug)]
pub enum ComponentData {
    Id(Uuid),
    Tag(TagData),
    Category(CategoryData),
    Path(PathData),
    Transform(TransformData),
    Fill(FillData),
    Stroke(StrokeData),
    Group(GroupData),
    Layer(LayerData),
    Artboard(ArtboardData),
}

impl ComponentData {
    pub fn component_id(&self) -> u8 {
        match *self {
            ComponentData::Id(_) => ID_COMPONENT,
            ComponentData::Tag(_) => TAG_COMPONENT,
            ComponentData::Category(_) => CATEGORY_COMPONENT,
            ComponentData::Path(_) => PATH_COMPONENT,
            ComponentData::Transform(_) => TRANSFORM_COMPONENT,
            ComponentData::Fill(_) => FILL_COMPONENT,
            ComponentData::Stroke(_) => STROKE_COMPONENT,
            ComponentData::Group(_) => GROUP_COMPONENT,
            ComponentData::Layer(_) => LAYER_COMPONENT,
            ComponentData::Artboard(_) => ARTBOARD_COMPONENT,
        }
    }

    pub fn encode(&self, data: &mut EncodedData) {
        data.component_id(self.component_id());
        match *self {
            ComponentData::Id(id) => {
                data.uint128(id.as_u128());
            }
            ComponentData::Tag(ref tag) => {
                data.string(&tag.tag);
            }
            ComponentData::Category(category) => {
                data.uint8(category.flags.bits());
            }
            ComponentData::Path(ref path) => {
                path.path.encode(data);
            }
            ComponentData::Transform(transform) => {
                let m = &transform.matrix;
                data.float(m.matrix.m11)
                    .float(m.matrix.m12)
                    .float(m.matrix.m21)
                    .float(m.matrix.m22)
                    .vec2(m.vector);
            }
            ComponentData::Fill(ref fill) => {
                match fill.paint {
                    FillPaint::Color(color) => {
                        data.uint8(0);
                        color.encode(data);
                    }
                    FillPaint::Gradient(ref gradient) => {
                        data.uint8(1);
                        gradient.encode(data);
                    }
                }
                data.uint8(match fill.rule {
                    FillRule::NonZero => 0,
                    FillRule::EvenOdd => 1,
                });
            }
            ComponentData::Stroke(stroke) => {
                stroke.color.encode(data);
                data.float(stroke.width);
                data.uint8(match stroke.cap {
                    LineCap::Butt => 0,
                    LineCap::Square => 1,
                    LineCap::Round => 2,
                });
                data.uint8(match stroke.join {
                    LineJoin::Bevel => 0,
                    LineJoin::Round => 1,
                    LineJoin::Miter(_) => 2,
                });
                data.float(stroke.miter_limit);
            }
            ComponentData::Group(ref group) => {
                encode_children(data, &group.children);
            }
            ComponentData::Layer(ref layer) => {
                data.uint8(layer.blend_mode as u8);
                data.float(layer.opacity);
                encode_children(data, &layer.children);
            }
            ComponentData::Artboard(artboard) => {
                artboard.color.encode(data);
                data.vec2(artboard.size);
            }
        }
    }

    /// Decodes one component, starting at its component id byte.
    pub fn decode(decoder: &mut Decoder) -> Result<ComponentData, DecodeError> {
        let component_id = decoder.component_id()?;
        match component_id {
            ID_COMPONENT => Ok(ComponentData::Id(Uuid::from_u128(decoder.uint128()?))),
            TAG_COMPONENT => Ok(ComponentData::Tag(TagData { tag: decoder.string()? })),
            CATEGORY_COMPONENT => {
                let flags = CategoryFlags::from_bits(decoder.uint8()?)
                    .ok_or(DecodeError::InvalidValue)?;
                Ok(ComponentData::Category(CategoryData { flags }))
            }
            PATH_COMPONENT => {
                Ok(ComponentData::Path(PathData { path: Path::decode(decoder)? }))
            }
            TRANSFORM_COMPONENT => {
                let m11 = decoder.float()?;
                let m12 = decoder.float()?;
                let m21 = decoder.float()?;
                let m22 = decoder.float()?;
                let vector = decoder.vec2()?;
                Ok(ComponentData::Transform(TransformData {
                    matrix: Transform2F {
                        matrix: Matrix2x2F { m11, m12, m21, m22 },
                        vector,
                    },
                }))
            }
            FILL_COMPONENT => {
                let paint = match decoder.uint8()? {
                    0 => FillPaint::Color(ColorU::decode(decoder)?),
                    1 => FillPaint::Gradient(Gradient::decode(decoder)?),
                    _ => return Err(DecodeError::InvalidValue),
                };
                let rule = match decoder.uint8()? {
                    0 => FillRule::NonZero,
                    1 => FillRule::EvenOdd,
                    _ => return Err(DecodeError::InvalidValue),
                };
                Ok(ComponentData::Fill(FillData { paint, rule }))
            }
            STROKE_COMPONENT => {
                let color = ColorU::decode(decoder)?;
                let width = decoder.float()?;
                let cap = match decoder.uint8()? {
                    0 => LineCap::Butt,
                    1 => LineCap::Square,
                    2 => LineCap::Round,
                    _ => return Err(DecodeError::InvalidValue),
                };
                let join_kind = decoder.uint8()?;
                let miter_limit = decoder.float()?;
                let join = match join_kind {
                    0 => LineJoin::Bevel,
                    1 => LineJoin::Round,
                    2 => LineJoin::Miter(miter_limit),
                    _ => return Err(DecodeError::InvalidValue),
                };
                Ok(ComponentData::Stroke(StrokeData { color, width, cap, join, miter_limit }))
            }
            GROUP_COMPONENT => {
                Ok(ComponentData::Group(GroupData { children: decode_children(decoder)? }))
            }
            LAYER_COMPONENT => {
                let blend_mode = match decoder.uint8()? {
                    0 => BlendMode::Normal,
                    1 => BlendMode::Multiply,
                    2 => BlendMode::Screen,
                    3 => BlendMode::Overlay,
                    4 => BlendMode::Darken,
                    5 => BlendMode::Lighten,
                    _ => return Err(DecodeError::InvalidValue),
                };
                let opacity = decoder.float()?;
                let children = decode_children(decoder)?;
                Ok(ComponentData::Layer(LayerData { blend_mode, opacity, children }))
            }
            ARTBOARD_COMPONENT => {
                let color = ColorU::decode(decoder)?;
                let size = decoder.vec2()?;
                Ok(ComponentData::Artboard(ArtboardData { color, size }))
            }
            _ => Err(DecodeError::InvalidValue),
        }
    }
}

fn encode_children(data: &mut EncodedData, children: &[Uuid]) {
    data.uint32(children.len() as u32);
    for child in children {
        data.uint128(child.as_u128());
    }
}

fn decode_children(decoder: &mut Decoder) -> Result<Vec<Uuid>, DecodeError> {
    let count = decoder.uint32()? as usize;
    let mut children = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        children.push(Uuid::from_u128(decoder.uint128()?));
    }
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::rect::RectF;

    fn round_trip(component: ComponentData) -> ComponentData {
        let mut data = EncodedData::new();
        component.encode(&mut data);
        ComponentData::decode(&mut Decoder::new(data.bytes())).unwrap()
    }

    #[test]
    fn test_component_round_trips() {
        match round_trip(ComponentData::Tag(TagData { tag: "rect 1".to_string() })) {
            ComponentData::Tag(tag) => assert_eq!(tag.tag, "rect 1"),
            other => panic!("{:?}", other),
        }

        let transform = TransformData {
            matrix: Transform2F::from_scale_rotation_translation(vec2f(2.0, 3.0),
                                                                 0.5,
                                                                 vec2f(7.0, -2.0)),
        };
        match round_trip(ComponentData::Transform(transform)) {
            ComponentData::Transform(decoded) => {
                assert!((decoded.matrix.vector - transform.matrix.vector).length() < 1e-6);
            }
            other => panic!("{:?}", other),
        }

        let path = PathData { path: Path::rect(RectF::from_points(vec2f(0.0, 0.0),
                                                                  vec2f(10.0, 10.0))) };
        match round_trip(ComponentData::Path(path)) {
            ComponentData::Path(decoded) => assert_eq!(decoded.path.points().len(), 5),
            other => panic!("{:?}", other),
        }

        let stroke = StrokeData { width: 4.0, ..StrokeData::default() };
        match round_trip(ComponentData::Stroke(stroke)) {
            ComponentData::Stroke(decoded) => assert_eq!(decoded.width, 4.0),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_unknown_component_id_rejected() {
        let mut data = EncodedData::new();
        data.component_id(200);
        assert!(ComponentData::decode(&mut Decoder::new(data.bytes())).is_err());
    }
}
