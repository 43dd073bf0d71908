// vellum/gpu/src/lib.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The device abstraction the renderer draws through.
//!
//! Restricted to what OpenGL 3.0 / WebGL2 guarantees: instanced draws,
//! vertex array objects, fp32 textures, and framebuffer blits. Backends
//! implement `Device`; the host creates the context and makes it current
//! before anything here is called.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod allocator;

use half::f16;
use vellum_geometry::rect::RectI;
use vellum_geometry::vector::Vector2I;

/// Provides named resources (shader sources) to program creation.
pub trait ResourceLoader {
    /// Reads the resource at `path`, or `None` when absent.
    fn slurp(&self, path: &str) -> Option<Vec<u8>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceError {
    OutOfMemory,
    ShaderNotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    R16F,
    R32F,
    RGBA8,
    RGBA16F,
    RGBA32F,
    Depth24Stencil8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::R16F => 2,
            TextureFormat::R32F | TextureFormat::RGBA8 | TextureFormat::Depth24Stencil8 => 4,
            TextureFormat::RGBA16F => 8,
            TextureFormat::RGBA32F => 16,
        }
    }

    #[inline]
    pub fn channels(self) -> usize {
        match self {
            TextureFormat::R8 | TextureFormat::R16F | TextureFormat::R32F => 1,
            TextureFormat::RGBA8 | TextureFormat::RGBA16F | TextureFormat::RGBA32F => 4,
            TextureFormat::Depth24Stencil8 => 2,
        }
    }
}

/// Size and format: the identity of a texture allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    pub size: Vector2I,
    pub format: TextureFormat,
}

impl TextureDescriptor {
    #[inline]
    pub fn new(size: Vector2I, format: TextureFormat) -> TextureDescriptor {
        TextureDescriptor { size, format }
    }

    #[inline]
    pub fn byte_size(&self) -> usize {
        self.size.area().max(0) as usize * self.format.bytes_per_pixel()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUploadMode {
    Static,
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexAttrClass {
    Float,
    FloatNorm,
    Int,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexAttrType {
    F32,
    I8,
    I16,
    I32,
    U8,
    U16,
    U32,
}

/// How one vertex attribute reads from its buffer.
#[derive(Clone, Copy, Debug)]
pub struct VertexAttrDescriptor {
    pub size: usize,
    pub class: VertexAttrClass,
    pub attr_type: VertexAttrType,
    pub stride: usize,
    pub offset: usize,
    pub divisor: u32,
    pub buffer_index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformData {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DestAlpha,
    OneMinusDestAlpha,
    DestColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendState {
    pub src_rgb_factor: BlendFactor,
    pub dest_rgb_factor: BlendFactor,
    pub src_alpha_factor: BlendFactor,
    pub dest_alpha_factor: BlendFactor,
    pub op: BlendOp,
}

impl Default for BlendState {
    /// Premultiplied source-over.
    #[inline]
    fn default() -> BlendState {
        BlendState {
            src_rgb_factor: BlendFactor::SrcAlpha,
            dest_rgb_factor: BlendFactor::OneMinusSrcAlpha,
            src_alpha_factor: BlendFactor::SrcAlpha,
            dest_alpha_factor: BlendFactor::OneMinusSrcAlpha,
            op: BlendOp::Add,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ClearOps {
    pub color: Option<[f32; 4]>,
    pub depth: Option<f32>,
    pub stencil: Option<u8>,
}

impl ClearOps {
    #[inline]
    pub fn has_ops(&self) -> bool {
        self.color.is_some() || self.depth.is_some() || self.stencil.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    pub blend: Option<BlendState>,
    pub clear_ops: ClearOps,
    pub color_mask: bool,
}

/// Where a draw lands.
pub enum RenderTarget<'a, D> where D: Device {
    /// The host's default framebuffer.
    Default,
    Framebuffer(&'a D::Framebuffer),
}

/// Everything one draw call needs, bound together.
pub struct RenderState<'a, D> where D: Device {
    pub target: &'a RenderTarget<'a, D>,
    pub program: &'a D::Program,
    pub vertex_array: &'a D::VertexArray,
    pub primitive: Primitive,
    pub uniforms: &'a [(&'a D::Uniform, UniformData)],
    pub textures: &'a [(&'a D::TextureParameter, &'a D::Texture)],
    pub viewport: RectI,
    pub options: RenderOptions,
}

/// The capabilities the renderer needs from a GPU backend.
pub trait Device: Sized {
    type Buffer;
    type Framebuffer;
    type Program;
    type Shader;
    type Texture;
    type TextureParameter;
    type Uniform;
    type VertexArray;
    type VertexAttr;

    fn backend_name(&self) -> &'static str;

    // Shaders and programs

    fn create_shader(&self,
                     resources: &dyn ResourceLoader,
                     name: &str,
                     kind: ShaderKind)
                     -> Result<Self::Shader, DeviceError>;
    fn create_program(&self,
                      resources: &dyn ResourceLoader,
                      name: &str)
                      -> Result<Self::Program, DeviceError>;
    fn get_uniform(&self, program: &Self::Program, name: &str) -> Self::Uniform;
    fn get_texture_parameter(&self, program: &Self::Program, name: &str)
                             -> Self::TextureParameter;
    fn get_vertex_attr(&self, program: &Self::Program, name: &str) -> Option<Self::VertexAttr>;

    // Vertex arrays

    fn create_vertex_array(&self) -> Self::VertexArray;
    fn bind_buffer(&self,
                   vertex_array: &Self::VertexArray,
                   buffer: &Self::Buffer,
                   target: BufferTarget);
    fn configure_vertex_attr(&self,
                             vertex_array: &Self::VertexArray,
                             attr: &Self::VertexAttr,
                             descriptor: &VertexAttrDescriptor);

    // Buffers

    fn create_buffer(&self, mode: BufferUploadMode) -> Self::Buffer;
    fn allocate_buffer(&self,
                       buffer: &Self::Buffer,
                       byte_size: usize,
                       target: BufferTarget)
                       -> Result<(), DeviceError>;
    fn upload_to_buffer(&self,
                        buffer: &Self::Buffer,
                        byte_offset: usize,
                        data: &[u8],
                        target: BufferTarget);

    // Textures and framebuffers

    fn create_texture(&self,
                      format: TextureFormat,
                      size: Vector2I)
                      -> Result<Self::Texture, DeviceError>;
    fn upload_to_texture(&self, texture: &Self::Texture, rect: RectI, data: &[u8]);
    fn texture_size(&self, texture: &Self::Texture) -> Vector2I;
    fn texture_format(&self, texture: &Self::Texture) -> TextureFormat;
    fn create_framebuffer(&self, texture: Self::Texture) -> Self::Framebuffer;
    fn framebuffer_texture<'f>(&self, framebuffer: &'f Self::Framebuffer) -> &'f Self::Texture;

    // Frame lifecycle and draws

    fn begin_commands(&self);
    fn end_commands(&self);
    fn set_viewport(&self, viewport: RectI);
    fn clear(&self, ops: &ClearOps);
    fn draw_arrays_instanced(&self,
                             vertex_count: u32,
                             instance_count: u32,
                             render_state: &RenderState<Self>);
    fn draw_elements_instanced(&self,
                               index_count: u32,
                               instance_count: u32,
                               render_state: &RenderState<Self>);
}

/// Packs a slice of f32 texels into the byte layout of `format`.
pub fn pack_texels_f32(texels: &[f32], format: TextureFormat) -> Vec<u8> {
    match format {
        TextureFormat::R32F | TextureFormat::RGBA32F => {
            let mut bytes = Vec::with_capacity(texels.len() * 4);
            for texel in texels {
                bytes.extend_from_slice(&texel.to_bits().to_le_bytes());
            }
            bytes
        }
        TextureFormat::R16F | TextureFormat::RGBA16F => {
            let mut bytes = Vec::with_capacity(texels.len() * 2);
            for texel in texels {
                bytes.extend_from_slice(&f16::from_f32(*texel).to_bits().to_le_bytes());
            }
            bytes
        }
        _ => {
            let mut bytes = Vec::with_capacity(texels.len());
            for texel in texels {
                bytes.push((texel.max(0.0).min(1.0) * 255.0).round() as u8);
            }
            bytes
        }
    }
}

bitflags! {
    /// Sampling behavior requested for a texture binding.
    pub struct TextureSamplingFlags: u8 {
        const NEAREST_MIN = 0x1;
        const NEAREST_MAG = 0x2;
        const REPEAT_U    = 0x4;
        const REPEAT_V    = 0x8;
    }
}

pub mod null {
    //! A backend that records calls and allocates nothing, for tests.

    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    pub struct NullDevice {
        next_id: Cell<u32>,
        pub buffers_created: Cell<u32>,
        pub textures_created: Cell<u32>,
        pub draw_calls: Cell<u32>,
        /// When set, buffer and texture allocation fails.
        pub exhausted: Cell<bool>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NullId(pub u32);

    pub struct NullTexture {
        pub id: NullId,
        pub descriptor: TextureDescriptor,
    }

    impl NullDevice {
        pub fn new() -> NullDevice {
            NullDevice::default()
        }

        fn next_id(&self) -> NullId {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            NullId(id)
        }
    }

    impl Device for NullDevice {
        type Buffer = NullId;
        type Framebuffer = NullTexture;
        type Program = NullId;
        type Shader = NullId;
        type Texture = NullTexture;
        type TextureParameter = NullId;
        type Uniform = NullId;
        type VertexArray = NullId;
        type VertexAttr = NullId;

        fn backend_name(&self) -> &'static str {
            "null"
        }

        fn create_shader(&self,
                         _: &dyn ResourceLoader,
                         _: &str,
                         _: ShaderKind)
                         -> Result<NullId, DeviceError> {
            Ok(self.next_id())
        }

        fn create_program(&self, _: &dyn ResourceLoader, _: &str) -> Result<NullId, DeviceError> {
            Ok(self.next_id())
        }

        fn get_uniform(&self, _: &NullId, _: &str) -> NullId {
            self.next_id()
        }

        fn get_texture_parameter(&self, _: &NullId, _: &str) -> NullId {
            self.next_id()
        }

        fn get_vertex_attr(&self, _: &NullId, _: &str) -> Option<NullId> {
            Some(self.next_id())
        }

        fn create_vertex_array(&self) -> NullId {
            self.next_id()
        }

        fn bind_buffer(&self, _: &NullId, _: &NullId, _: BufferTarget) {}

        fn configure_vertex_attr(&self, _: &NullId, _: &NullId, _: &VertexAttrDescriptor) {}

        fn create_buffer(&self, _: BufferUploadMode) -> NullId {
            self.buffers_created.set(self.buffers_created.get() + 1);
            self.next_id()
        }

        fn allocate_buffer(&self,
                           _: &NullId,
                           _: usize,
                           _: BufferTarget)
                           -> Result<(), DeviceError> {
            if self.exhausted.get() {
                Err(DeviceError::OutOfMemory)
            } else {
                Ok(())
            }
        }

        fn upload_to_buffer(&self, _: &NullId, _: usize, _: &[u8], _: BufferTarget) {}

        fn create_texture(&self,
                          format: TextureFormat,
                          size: Vector2I)
                          -> Result<NullTexture, DeviceError> {
            if self.exhausted.get() {
                return Err(DeviceError::OutOfMemory);
            }
            self.textures_created.set(self.textures_created.get() + 1);
            Ok(NullTexture {
                id: self.next_id(),
                descriptor: TextureDescriptor::new(size, format),
            })
        }

        fn upload_to_texture(&self, _: &NullTexture, _: RectI, _: &[u8]) {}

        fn texture_size(&self, texture: &NullTexture) -> Vector2I {
            texture.descriptor.size
        }

        fn texture_format(&self, texture: &NullTexture) -> TextureFormat {
            texture.descriptor.format
        }

        fn create_framebuffer(&self, texture: NullTexture) -> NullTexture {
            texture
        }

        fn framebuffer_texture<'f>(&self, framebuffer: &'f NullTexture) -> &'f NullTexture {
            framebuffer
        }

        fn begin_commands(&self) {}

        fn end_commands(&self) {}

        fn set_viewport(&self, _: RectI) {}

        fn clear(&self, _: &ClearOps) {}

        fn draw_arrays_instanced(&self, _: u32, _: u32, _: &RenderState<NullDevice>) {
            self.draw_calls.set(self.draw_calls.get() + 1);
        }

        fn draw_elements_instanced(&self, _: u32, _: u32, _: &RenderState<NullDevice>) {
            self.draw_calls.set(self.draw_calls.get() + 1);
        }
    }

    /// A loader with no resources; the null device never reads them.
    pub struct EmptyResourceLoader;

    impl ResourceLoader for EmptyResourceLoader {
        fn slurp(&self, _: &str) -> Option<Vec<u8>> {
            None
        }
    }
}
