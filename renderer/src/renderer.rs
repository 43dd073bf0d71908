// vellum/renderer/src/renderer.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Frame execution: accumulates tiled instances and issues the GPU draws.
//!
//! Per frame: `begin_frame` clears and sets the camera; `draw_path` (and the
//! overlay helpers) append instance data, batched by paint texture;
//! `end_frame` uploads everything through the allocator, draws filled spans
//! then boundary spans then overlays, and purges decayed GPU memory. An
//! allocator failure aborts the frame: the error is logged, nothing further
//! is drawn, and the next frame may retry after the purge.

use crate::gpu_data::{self, BoundarySpanInstance, CircleInstance, FilledSpanInstance};
use crate::gpu_data::{LineInstance, PaintKind, PaintMetadata, PathInstance, RectInstance};
use crate::gpu_data::{GRADIENTS_TEXTURE_SIZE, MAX_SAMPLES, MIN_SAMPLES};
use crate::options::{DrawOptions, FrameViewport, Paint};
use crate::shaders::{BoundarySpanVertexArray, CircleVertexArray, FilledSpanVertexArray};
use crate::shaders::{LineVertexArray, PathVertexArray, Programs, RectVertexArray};
use crate::shaders::{QUAD_VERTEX_COUNT, QUAD_VERTEX_POSITIONS};
use crate::tiler::{self, Tiler};
use instant::Instant;
use std::mem;
use std::slice;
use vellum_content::gradient::{ColorU, GradientGeometry};
use vellum_content::path::{FillRule, Path};
use vellum_content::quadratic::QuadraticPath;
use vellum_content::stroke::StrokeToFill;
use vellum_geometry::rect::{RectF, RectI};
use vellum_geometry::transform2d::Transform2F;
use vellum_geometry::vector::{vec2i, Vector2F, Vector2I};
use vellum_gpu::allocator::{Allocator, AllocatorError};
use vellum_gpu::{pack_texels_f32, BlendState, BufferTarget, ClearOps, Device, DeviceError};
use vellum_gpu::{Primitive, RenderOptions, RenderState, RenderTarget, ResourceLoader};
use vellum_gpu::{TextureFormat, UniformData};

/// Paths with at most this many monotonic curves skip tiling and draw as a
/// single whole-path instance.
const MAX_DIRECT_CURVES: usize = 12;

/// Initial heights of the frame textures; they grow on demand.
const INITIAL_CURVES_TEXTURE_HEIGHT: i32 = 64;
const INITIAL_BANDS_TEXTURE_HEIGHT: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererError {
    Device(DeviceError),
    Allocator(AllocatorError),
}

impl From<DeviceError> for RendererError {
    fn from(error: DeviceError) -> RendererError {
        RendererError::Device(error)
    }
}

impl From<AllocatorError> for RendererError {
    fn from(error: AllocatorError) -> RendererError {
        RendererError::Allocator(error)
    }
}

/// One contiguous slice of the frame's instance vectors, drawn together.
/// Batches split only when the bound texture set would change.
#[derive(Clone, Debug, Default)]
struct Batch {
    path_start: usize,
    filled_start: usize,
    boundary_start: usize,
    path_end: usize,
    filled_end: usize,
    boundary_end: usize,
}

#[derive(Default)]
struct Frame {
    viewport: Option<FrameViewport>,
    view_projection: [f32; 16],

    path_instances: Vec<PathInstance>,
    filled_instances: Vec<FilledSpanInstance>,
    boundary_instances: Vec<BoundarySpanInstance>,
    line_instances: Vec<LineInstance>,
    rect_instances: Vec<RectInstance>,
    circle_instances: Vec<CircleInstance>,

    batches: Vec<Batch>,

    curve_texels: Vec<f32>,
    band_texels: Vec<f32>,
    gradient_rows: Vec<[u8; 64 * 4]>,

    aborted: bool,
}

impl Frame {
    fn open_batch(&mut self) -> &mut Batch {
        if self.batches.is_empty() {
            let batch = Batch {
                path_start: self.path_instances.len(),
                filled_start: self.filled_instances.len(),
                boundary_start: self.boundary_instances.len(),
                ..Batch::default()
            };
            self.batches.push(batch);
        }
        self.batches.last_mut().unwrap()
    }

    fn seal_batches(&mut self) {
        if let Some(batch) = self.batches.last_mut() {
            batch.path_end = self.path_instances.len();
            batch.filled_end = self.filled_instances.len();
            batch.boundary_end = self.boundary_instances.len();
        }
    }
}

pub struct Renderer<D> where D: Device {
    device: D,
    allocator: Allocator<D>,
    programs: Programs<D>,

    quad_vertex_buffer: D::Buffer,
    curves_texture: D::Texture,
    bands_texture: D::Texture,
    gradients_texture: D::Texture,

    frame: Frame,
}

impl<D> Renderer<D> where D: Device {
    pub fn new(device: D, resources: &dyn ResourceLoader) -> Result<Renderer<D>, RendererError> {
        let start = Instant::now();
        let programs = Programs::new(&device, resources)?;

        let quad_vertex_buffer = device.create_buffer(vellum_gpu::BufferUploadMode::Static);
        device
            .allocate_buffer(&quad_vertex_buffer, QUAD_VERTEX_POSITIONS.len(),
                             BufferTarget::Vertex)
            .map_err(RendererError::Device)?;
        device.upload_to_buffer(&quad_vertex_buffer, 0, &QUAD_VERTEX_POSITIONS,
                                BufferTarget::Vertex);

        let curves_texture = device
            .create_texture(TextureFormat::RGBA32F,
                            vec2i(gpu_data::CURVES_TEXTURE_WIDTH,
                                  INITIAL_CURVES_TEXTURE_HEIGHT))
            .map_err(RendererError::Device)?;
        let bands_texture = device
            .create_texture(TextureFormat::RGBA32F,
                            vec2i(gpu_data::BANDS_TEXTURE_WIDTH, INITIAL_BANDS_TEXTURE_HEIGHT))
            .map_err(RendererError::Device)?;
        let gradients_texture = device
            .create_texture(TextureFormat::RGBA8, GRADIENTS_TEXTURE_SIZE)
            .map_err(RendererError::Device)?;

        debug!("renderer ready on {} in {:?}", device.backend_name(), start.elapsed());

        Ok(Renderer {
            device,
            allocator: Allocator::new(),
            programs,
            quad_vertex_buffer,
            curves_texture,
            bands_texture,
            gradients_texture,
            frame: Frame::default(),
        })
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn allocator(&self) -> &Allocator<D> {
        &self.allocator
    }

    // Frame lifecycle

    pub fn begin_frame(&mut self, viewport: FrameViewport, background: ColorU) {
        self.frame = Frame::default();
        self.frame.view_projection = viewport.view_projection();
        self.frame.viewport = Some(viewport);

        self.device.begin_commands();
        self.device
            .set_viewport(RectI::new(Vector2I::zero(), viewport.size));
        self.device.clear(&ClearOps {
            color: Some([
                background.r as f32 / 255.0,
                background.g as f32 / 255.0,
                background.b as f32 / 255.0,
                background.a as f32 / 255.0,
            ]),
            depth: Some(1.0),
            stencil: None,
        });
    }

    /// Tiles and queues one path. Call in z order, back to front.
    pub fn draw_path(&mut self, path: &QuadraticPath, options: &DrawOptions) {
        if self.frame.aborted || path.is_empty() {
            return;
        }
        let zoom = match self.frame.viewport {
            None => {
                debug_assert!(false, "draw_path outside begin_frame/end_frame");
                return;
            }
            Some(viewport) => viewport.zoom,
        };

        let mut transformed;
        let path = if options.transform.is_identity() {
            path
        } else {
            transformed = path.clone();
            transformed.transform(&options.transform);
            &transformed
        };

        if let Some(ref fill) = options.fill {
            if !fill.paint.is_fully_transparent() {
                let metadata = self.resolve_paint(&fill.paint);
                self.queue_fill(path, fill.rule, zoom, &metadata);
            }
        }

        if let Some(ref stroke) = options.stroke {
            if !stroke.color.is_fully_transparent() {
                let stroked = StrokeToFill::new(path, stroke.style).into_path();
                let metadata = PaintMetadata::solid(stroke.color);
                self.queue_fill(&stroked, FillRule::NonZero, zoom, &metadata);
            }
        }
    }

    fn queue_fill(&mut self,
                  path: &QuadraticPath,
                  rule: FillRule,
                  zoom: f32,
                  paint: &PaintMetadata) {
        let tiled = Tiler::new(path, rule, zoom).generate();
        if tiled.curves.is_empty() {
            return;
        }

        let curves_base = (self.frame.curve_texels.len() / 4) as u32;
        let bands_base = (self.frame.band_texels.len() / 4) as u32;

        if tiled.curves.len() <= MAX_DIRECT_CURVES {
            for curve in &tiled.curves {
                self.frame.curve_texels.extend_from_slice(&gpu_data::curve_texels(curve));
            }
            let bounds = path.approx_bounding_rect().dilate(1.0 / zoom);
            let instance = PathInstance {
                bounds: [bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y],
                paint_params: [0.0, 0.0],
                position: [bounds.min.x, bounds.min.y],
                size: [bounds.width(), bounds.height()],
                color: paint.color.to_bytes(),
                curves_data: BoundarySpanInstance::pack_curves_data(curves_base, paint.kind, 0),
                bands_data: (tiled.curves.len() as u32) << 24 | bands_base,
            };
            self.frame.open_batch();
            self.frame.path_instances.push(instance);
            self.frame.seal_batches();
            return;
        }

        let packed = tiler::pack_tiles(&tiled, paint, curves_base, bands_base);
        self.frame.curve_texels.extend_from_slice(&packed.curve_texels);
        self.frame.band_texels.extend_from_slice(&packed.band_texels);

        self.frame.open_batch();
        self.frame.filled_instances.extend_from_slice(&packed.filled);
        self.frame.boundary_instances.extend_from_slice(&packed.boundary);
        self.frame.seal_batches();
    }

    fn resolve_paint(&mut self, paint: &Paint) -> PaintMetadata {
        match *paint {
            Paint::SolidColor(color) => PaintMetadata::solid(color),
            Paint::Gradient(ref gradient) => {
                let row = self.frame.gradient_rows.len() as u32;
                if row >= GRADIENTS_TEXTURE_SIZE.y as u32 {
                    warn!("gradient ramp atlas full; falling back to the first stop");
                    let color = gradient
                        .stops()
                        .first()
                        .map_or(ColorU::transparent_black(), |stop| stop.color);
                    return PaintMetadata::solid(color);
                }

                let mut ramp = [0; 64 * 4];
                for texel in 0..64 {
                    let color = gradient.sample(texel as f32 / 63.0);
                    ramp[texel * 4..texel * 4 + 4].copy_from_slice(&color.to_bytes());
                }
                self.frame.gradient_rows.push(ramp);

                let kind = match gradient.geometry() {
                    GradientGeometry::Linear(_) => PaintKind::LinearGradient,
                    GradientGeometry::Radial { .. } => PaintKind::RadialGradient,
                };
                PaintMetadata {
                    kind,
                    color: gradient.sample(0.5),
                    gradient_row: row,
                }
            }
            Paint::Texture(ref texture) => PaintMetadata {
                kind: PaintKind::Texture,
                color: ColorU::new(255, 255, 255, (texture.opacity * 255.0) as u8),
                gradient_row: 0,
            },
        }
    }

    // UI overlays

    pub fn draw_line(&mut self, from: Vector2F, to: Vector2F, width: f32, color: ColorU) {
        self.frame.line_instances.push(LineInstance {
            from: [from.x, from.y],
            to: [to.x, to.y],
            width,
            color: color.to_bytes(),
        });
    }

    pub fn draw_rect(&mut self, rect: RectF, color: ColorU) {
        self.frame.rect_instances.push(RectInstance {
            position: [rect.min.x, rect.min.y],
            size: [rect.width(), rect.height()],
            color: color.to_bytes(),
        });
    }

    pub fn draw_circle(&mut self, center: Vector2F, radius: f32, color: ColorU) {
        self.frame.circle_instances.push(CircleInstance {
            center: [center.x, center.y],
            radius,
            color: color.to_bytes(),
        });
    }

    /// Draws a path's outline with vertex and handle markers, for the
    /// direct-selection and pen tools.
    pub fn draw_outline(&mut self,
                        path: &Path,
                        transform: &Transform2F,
                        zoom: f32,
                        color: ColorU,
                        draw_points: bool) {
        let width = 1.0 / zoom;
        let quadratics = path.to_quadratics(vellum_content::path::flatten_tolerance(zoom));
        for segment in quadratics.segments() {
            // Flatten coarsely; the outline is a UI affordance.
            const STEPS: usize = 8;
            let mut prev = segment.from;
            for step in 1..=STEPS {
                let next = segment.sample(step as f32 / STEPS as f32);
                self.draw_line(*transform * prev, *transform * next, width, color);
                prev = next;
            }
        }

        if !draw_points {
            return;
        }
        let vertex_radius = 3.0 / zoom;
        let handle_radius = 2.0 / zoom;
        for (index, &point) in path.points().iter().enumerate() {
            let position = *transform * point;
            if path.point_flags(index).is_empty() {
                self.draw_circle(position, vertex_radius, color);
            } else {
                self.draw_circle(position, handle_radius, color);
            }
        }
        for handle in [path.in_handle(), path.out_handle()].iter().flatten() {
            self.draw_circle(*transform * *handle, handle_radius, color);
        }
    }

    /// Flushes the frame: uploads textures and instance buffers, issues the
    /// batched draws, recycles the buffers, and purges decayed memory.
    pub fn end_frame(&mut self) -> Result<(), RendererError> {
        let result = if self.frame.aborted {
            Ok(())
        } else {
            self.flush_frame()
        };

        if let Err(error) = result {
            error!("frame aborted: {:?}", error);
            self.frame.aborted = true;
        }

        self.allocator.purge_if_needed();
        self.device.end_commands();
        result
    }

    fn flush_frame(&mut self) -> Result<(), RendererError> {
        self.upload_frame_textures()?;

        let viewport = match self.frame.viewport {
            None => return Ok(()),
            Some(viewport) => viewport,
        };
        let viewport_rect = RectI::new(Vector2I::zero(), viewport.size);
        let vp = UniformData::Mat4(self.frame.view_projection);
        let viewport_size =
            UniformData::Vec2([viewport.size.x as f32, viewport.size.y as f32]);

        // Upload all instance streams up front.
        let path_buffer = self.upload_instances(&self.frame.path_instances.clone(),
                                                "path_instances")?;
        let filled_buffer = self.upload_instances(&self.frame.filled_instances.clone(),
                                                  "filled_span_instances")?;
        let boundary_buffer = self.upload_instances(&self.frame.boundary_instances.clone(),
                                                    "boundary_span_instances")?;
        let line_buffer = self.upload_instances(&self.frame.line_instances.clone(),
                                                "line_instances")?;
        let rect_buffer = self.upload_instances(&self.frame.rect_instances.clone(),
                                                "rect_instances")?;
        let circle_buffer = self.upload_instances(&self.frame.circle_instances.clone(),
                                                  "circle_instances")?;

        let batches = self.frame.batches.clone();
        for batch in &batches {
            // Filled spans first: whole-cell interiors, no per-pixel work.
            if batch.filled_end > batch.filled_start {
                let buffer = self.allocator.get_general_buffer(filled_buffer.unwrap()).unwrap();
                let vertex_array = FilledSpanVertexArray::new(&self.device,
                                                              &self.programs.filled_span,
                                                              buffer,
                                                              &self.quad_vertex_buffer);
                self.device.draw_arrays_instanced(
                    QUAD_VERTEX_COUNT,
                    (batch.filled_end - batch.filled_start) as u32,
                    &RenderState {
                        target: &RenderTarget::Default,
                        program: &self.programs.filled_span.program,
                        vertex_array: &vertex_array.vertex_array,
                        primitive: Primitive::Triangles,
                        uniforms: &[
                            (&self.programs.filled_span.view_projection_uniform, vp),
                        ],
                        textures: &[
                            (&self.programs.filled_span.gradients_texture,
                             &self.gradients_texture),
                        ],
                        viewport: viewport_rect,
                        options: RenderOptions {
                            blend: Some(BlendState::default()),
                            clear_ops: ClearOps::default(),
                            color_mask: true,
                        },
                    });
            }

            // Then boundary spans with per-pixel coverage.
            if batch.boundary_end > batch.boundary_start {
                let buffer = self.allocator.get_general_buffer(boundary_buffer.unwrap()).unwrap();
                let vertex_array = BoundarySpanVertexArray::new(&self.device,
                                                                &self.programs.boundary_span,
                                                                buffer,
                                                                &self.quad_vertex_buffer);
                self.device.draw_arrays_instanced(
                    QUAD_VERTEX_COUNT,
                    (batch.boundary_end - batch.boundary_start) as u32,
                    &RenderState {
                        target: &RenderTarget::Default,
                        program: &self.programs.boundary_span.program,
                        vertex_array: &vertex_array.vertex_array,
                        primitive: Primitive::Triangles,
                        uniforms: &[
                            (&self.programs.boundary_span.view_projection_uniform, vp),
                            (&self.programs.boundary_span.viewport_size_uniform, viewport_size),
                            (&self.programs.boundary_span.min_samples_uniform,
                             UniformData::Int(MIN_SAMPLES)),
                            (&self.programs.boundary_span.max_samples_uniform,
                             UniformData::Int(MAX_SAMPLES)),
                        ],
                        textures: &[
                            (&self.programs.boundary_span.curves_texture, &self.curves_texture),
                            (&self.programs.boundary_span.bands_texture, &self.bands_texture),
                            (&self.programs.boundary_span.gradients_texture,
                             &self.gradients_texture),
                        ],
                        viewport: viewport_rect,
                        options: RenderOptions {
                            blend: Some(BlendState::default()),
                            clear_ops: ClearOps::default(),
                            color_mask: true,
                        },
                    });
            }

            // Whole-path instances.
            if batch.path_end > batch.path_start {
                let buffer = self.allocator.get_general_buffer(path_buffer.unwrap()).unwrap();
                let vertex_array = PathVertexArray::new(&self.device,
                                                        &self.programs.path,
                                                        buffer,
                                                        &self.quad_vertex_buffer);
                self.device.draw_arrays_instanced(
                    QUAD_VERTEX_COUNT,
                    (batch.path_end - batch.path_start) as u32,
                    &RenderState {
                        target: &RenderTarget::Default,
                        program: &self.programs.path.program,
                        vertex_array: &vertex_array.vertex_array,
                        primitive: Primitive::Triangles,
                        uniforms: &[
                            (&self.programs.path.view_projection_uniform, vp),
                            (&self.programs.path.viewport_size_uniform, viewport_size),
                            (&self.programs.path.min_samples_uniform,
                             UniformData::Int(MIN_SAMPLES)),
                            (&self.programs.path.max_samples_uniform,
                             UniformData::Int(MAX_SAMPLES)),
                        ],
                        textures: &[
                            (&self.programs.path.curves_texture, &self.curves_texture),
                            (&self.programs.path.bands_texture, &self.bands_texture),
                            (&self.programs.path.gradients_texture, &self.gradients_texture),
                        ],
                        viewport: viewport_rect,
                        options: RenderOptions {
                            blend: Some(BlendState::default()),
                            clear_ops: ClearOps::default(),
                            color_mask: true,
                        },
                    });
            }
        }

        // Overlays draw above every batch.
        if let Some(id) = line_buffer {
            let buffer = self.allocator.get_general_buffer(id).unwrap();
            let vertex_array = LineVertexArray::new(&self.device,
                                                    &self.programs.line,
                                                    buffer,
                                                    &self.quad_vertex_buffer);
            self.device.draw_arrays_instanced(
                QUAD_VERTEX_COUNT,
                self.frame.line_instances.len() as u32,
                &RenderState {
                    target: &RenderTarget::Default,
                    program: &self.programs.line.program,
                    vertex_array: &vertex_array.vertex_array,
                    primitive: Primitive::Triangles,
                    uniforms: &[
                        (&self.programs.line.view_projection_uniform, vp),
                        (&self.programs.line.zoom_uniform, UniformData::Float(viewport.zoom)),
                    ],
                    textures: &[],
                    viewport: viewport_rect,
                    options: RenderOptions {
                        blend: Some(BlendState::default()),
                        clear_ops: ClearOps::default(),
                        color_mask: true,
                    },
                });
        }

        if let Some(id) = rect_buffer {
            let buffer = self.allocator.get_general_buffer(id).unwrap();
            let vertex_array = RectVertexArray::new(&self.device,
                                                    &self.programs.rect,
                                                    buffer,
                                                    &self.quad_vertex_buffer);
            self.device.draw_arrays_instanced(
                QUAD_VERTEX_COUNT,
                self.frame.rect_instances.len() as u32,
                &RenderState {
                    target: &RenderTarget::Default,
                    program: &self.programs.rect.program,
                    vertex_array: &vertex_array.vertex_array,
                    primitive: Primitive::Triangles,
                    uniforms: &[(&self.programs.rect.view_projection_uniform, vp)],
                    textures: &[],
                    viewport: viewport_rect,
                    options: RenderOptions {
                        blend: Some(BlendState::default()),
                        clear_ops: ClearOps::default(),
                        color_mask: true,
                    },
                });
        }

        if let Some(id) = circle_buffer {
            let buffer = self.allocator.get_general_buffer(id).unwrap();
            let vertex_array = CircleVertexArray::new(&self.device,
                                                      &self.programs.circle,
                                                      buffer,
                                                      &self.quad_vertex_buffer);
            self.device.draw_arrays_instanced(
                QUAD_VERTEX_COUNT,
                self.frame.circle_instances.len() as u32,
                &RenderState {
                    target: &RenderTarget::Default,
                    program: &self.programs.circle.program,
                    vertex_array: &vertex_array.vertex_array,
                    primitive: Primitive::Triangles,
                    uniforms: &[
                        (&self.programs.circle.view_projection_uniform, vp),
                        (&self.programs.circle.zoom_uniform, UniformData::Float(viewport.zoom)),
                    ],
                    textures: &[],
                    viewport: viewport_rect,
                    options: RenderOptions {
                        blend: Some(BlendState::default()),
                        clear_ops: ClearOps::default(),
                        color_mask: true,
                    },
                });
        }

        // Instance buffers are per frame; release them for reuse next frame.
        for id in [path_buffer, filled_buffer, boundary_buffer, line_buffer, rect_buffer,
                   circle_buffer]
            .iter()
            .flatten()
        {
            self.allocator.free_general_buffer(*id);
        }

        Ok(())
    }

    fn upload_instances<T>(&mut self,
                           instances: &[T],
                           tag: &'static str)
                           -> Result<Option<vellum_gpu::allocator::AllocationId>, RendererError>
    where
        T: Copy,
    {
        if instances.is_empty() {
            return Ok(None);
        }
        let bytes = instance_bytes(instances);
        let id = self.allocator.allocate_general_buffer(&self.device, bytes.len(), tag)?;
        let buffer = self.allocator.get_general_buffer(id).unwrap();
        self.device.upload_to_buffer(buffer, 0, bytes, BufferTarget::Vertex);
        Ok(Some(id))
    }

    fn upload_frame_textures(&mut self) -> Result<(), RendererError> {
        if !self.frame.curve_texels.is_empty() {
            let texel_count = (self.frame.curve_texels.len() / 4) as i32;
            let rows_needed =
                (texel_count + gpu_data::CURVES_TEXTURE_WIDTH - 1) / gpu_data::CURVES_TEXTURE_WIDTH;
            self.grow_texture_if_needed(TextureKind::Curves, rows_needed)?;

            let mut texels = self.frame.curve_texels.clone();
            texels.resize((rows_needed * gpu_data::CURVES_TEXTURE_WIDTH * 4) as usize, 0.0);
            let data = pack_texels_f32(&texels, TextureFormat::RGBA32F);
            self.device.upload_to_texture(
                &self.curves_texture,
                RectI::new(Vector2I::zero(), vec2i(gpu_data::CURVES_TEXTURE_WIDTH, rows_needed)),
                &data);
        }

        if !self.frame.band_texels.is_empty() {
            let texel_count = (self.frame.band_texels.len() as i32 + 3) / 4;
            let rows_needed =
                (texel_count + gpu_data::BANDS_TEXTURE_WIDTH - 1) / gpu_data::BANDS_TEXTURE_WIDTH;
            self.grow_texture_if_needed(TextureKind::Bands, rows_needed)?;

            let mut texels = self.frame.band_texels.clone();
            texels.resize((rows_needed * gpu_data::BANDS_TEXTURE_WIDTH * 4) as usize, 0.0);
            let data = pack_texels_f32(&texels, TextureFormat::RGBA32F);
            self.device.upload_to_texture(
                &self.bands_texture,
                RectI::new(Vector2I::zero(), vec2i(gpu_data::BANDS_TEXTURE_WIDTH, rows_needed)),
                &data);
        }

        for (row, ramp) in self.frame.gradient_rows.iter().enumerate() {
            self.device.upload_to_texture(
                &self.gradients_texture,
                RectI::new(vec2i(0, row as i32), vec2i(GRADIENTS_TEXTURE_SIZE.x, 1)),
                ramp);
        }

        Ok(())
    }

    fn grow_texture_if_needed(&mut self,
                              kind: TextureKind,
                              rows_needed: i32)
                              -> Result<(), RendererError> {
        let (texture, width) = match kind {
            TextureKind::Curves => (&self.curves_texture, gpu_data::CURVES_TEXTURE_WIDTH),
            TextureKind::Bands => (&self.bands_texture, gpu_data::BANDS_TEXTURE_WIDTH),
        };
        let current = self.device.texture_size(texture).y;
        if rows_needed <= current {
            return Ok(());
        }

        let mut height = current.max(1);
        while height < rows_needed {
            height *= 2;
        }
        debug!("growing {:?} texture to {} rows", kind, height);
        let new_texture = self
            .device
            .create_texture(TextureFormat::RGBA32F, vec2i(width, height))
            .map_err(RendererError::Device)?;
        match kind {
            TextureKind::Curves => self.curves_texture = new_texture,
            TextureKind::Bands => self.bands_texture = new_texture,
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
enum TextureKind {
    Curves,
    Bands,
}

/// Reinterprets a slice of plain instance structs as bytes for upload.
fn instance_bytes<T>(instances: &[T]) -> &[u8] where T: Copy {
    unsafe {
        slice::from_raw_parts(instances.as_ptr() as *const u8,
                              instances.len() * mem::size_of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::vec2f;
    use vellum_gpu::null::{EmptyResourceLoader, NullDevice};

    fn test_renderer() -> Renderer<NullDevice> {
        Renderer::new(NullDevice::new(), &EmptyResourceLoader).unwrap()
    }

    fn viewport() -> FrameViewport {
        FrameViewport { size: vec2i(800, 600), position: Vector2F::zero(), zoom: 1.0 }
    }

    #[test]
    fn test_draw_issues_batched_draw_calls() {
        let mut renderer = test_renderer();
        renderer.begin_frame(viewport(), ColorU::white());

        // A large circle flattens to well over the direct-path curve limit.
        let path = Path::circle(vec2f(300.0, 300.0), 150.0).to_quadratics(0.02);
        renderer.draw_path(&path, &DrawOptions::filled(ColorU::black()));
        renderer.draw_line(vec2f(0.0, 0.0), vec2f(10.0, 10.0), 1.0, ColorU::black());

        assert!(!renderer.frame.filled_instances.is_empty());
        assert!(!renderer.frame.boundary_instances.is_empty());

        renderer.end_frame().unwrap();
        let draws = renderer.device().draw_calls.get();
        // Filled + boundary + line, at minimum.
        assert!(draws >= 3, "draw calls: {}", draws);
    }

    #[test]
    fn test_small_path_uses_direct_instance() {
        let mut renderer = test_renderer();
        renderer.begin_frame(viewport(), ColorU::white());

        // A triangle: three monotonic curves, well under the direct limit.
        let mut path = QuadraticPath::new();
        path.move_to(vec2f(0.0, 0.0));
        path.line_to(vec2f(20.0, 0.0));
        path.line_to(vec2f(10.0, 15.0));
        renderer.draw_path(&path, &DrawOptions::filled(ColorU::black()));

        assert_eq!(renderer.frame.path_instances.len(), 1);
        assert!(renderer.frame.filled_instances.is_empty());
        renderer.end_frame().unwrap();
    }

    #[test]
    fn test_out_of_memory_aborts_frame() {
        let mut renderer = test_renderer();
        renderer.begin_frame(viewport(), ColorU::white());

        let path = Path::rect(RectF::from_points(vec2f(0.0, 0.0), vec2f(400.0, 300.0)))
            .to_quadratics(0.02);
        renderer.draw_path(&path, &DrawOptions::filled(ColorU::black()));

        renderer.device.exhausted.set(true);
        assert!(renderer.end_frame().is_err());

        // The next frame starts clean.
        renderer.device.exhausted.set(false);
        renderer.begin_frame(viewport(), ColorU::white());
        renderer.draw_path(&path, &DrawOptions::filled(ColorU::black()));
        renderer.end_frame().unwrap();
    }
}
