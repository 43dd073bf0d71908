// vellum/renderer/src/shaders.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shader programs and their vertex arrays.
//!
//! One struct per program holding its uniform and texture handles, one per
//! vertex array configuring the instanced attribute layout over a shared
//! unit-quad vertex buffer. Attribute strides must match the instance
//! structs in `gpu_data`.

use crate::gpu_data::{BOUNDARY_SPAN_INSTANCE_SIZE, CIRCLE_INSTANCE_SIZE};
use crate::gpu_data::{FILLED_SPAN_INSTANCE_SIZE, LINE_INSTANCE_SIZE, PATH_INSTANCE_SIZE};
use crate::gpu_data::RECT_INSTANCE_SIZE;
use vellum_gpu::{BufferTarget, Device, DeviceError, ResourceLoader, VertexAttrClass};
use vellum_gpu::{VertexAttrDescriptor, VertexAttrType};

/// The unit quad every instance expands, as u8 pairs.
pub const QUAD_VERTEX_POSITIONS: [u8; 12] = [0, 0, 1, 0, 1, 1, 1, 0, 1, 1, 0, 1];
pub const QUAD_VERTEX_COUNT: u32 = 6;

pub struct PathProgram<D> where D: Device {
    pub program: D::Program,
    pub view_projection_uniform: D::Uniform,
    pub viewport_size_uniform: D::Uniform,
    pub min_samples_uniform: D::Uniform,
    pub max_samples_uniform: D::Uniform,
    pub curves_texture: D::TextureParameter,
    pub bands_texture: D::TextureParameter,
    pub gradients_texture: D::TextureParameter,
}

impl<D> PathProgram<D> where D: Device {
    pub fn new(device: &D, resources: &dyn ResourceLoader)
               -> Result<PathProgram<D>, DeviceError> {
        let program = device.create_program(resources, "path")?;
        let view_projection_uniform = device.get_uniform(&program, "ViewProjection");
        let viewport_size_uniform = device.get_uniform(&program, "ViewportSize");
        let min_samples_uniform = device.get_uniform(&program, "MinSamples");
        let max_samples_uniform = device.get_uniform(&program, "MaxSamples");
        let curves_texture = device.get_texture_parameter(&program, "CurvesTexture");
        let bands_texture = device.get_texture_parameter(&program, "BandsTexture");
        let gradients_texture = device.get_texture_parameter(&program, "GradientsTexture");
        Ok(PathProgram {
            program,
            view_projection_uniform,
            viewport_size_uniform,
            min_samples_uniform,
            max_samples_uniform,
            curves_texture,
            bands_texture,
            gradients_texture,
        })
    }
}

pub struct PathVertexArray<D> where D: Device {
    pub vertex_array: D::VertexArray,
}

impl<D> PathVertexArray<D> where D: Device {
    pub fn new(device: &D,
               program: &PathProgram<D>,
               instance_buffer: &D::Buffer,
               quad_vertex_buffer: &D::Buffer)
               -> PathVertexArray<D> {
        let vertex_array = device.create_vertex_array();

        let position_attr = device.get_vertex_attr(&program.program, "Position").unwrap();
        let instance_bounds_attr =
            device.get_vertex_attr(&program.program, "InstanceBounds").unwrap();
        let instance_paint_params_attr =
            device.get_vertex_attr(&program.program, "InstancePaintParams").unwrap();
        let instance_position_attr =
            device.get_vertex_attr(&program.program, "InstancePosition").unwrap();
        let instance_size_attr = device.get_vertex_attr(&program.program, "InstanceSize").unwrap();
        let instance_color_attr =
            device.get_vertex_attr(&program.program, "InstanceColor").unwrap();
        let instance_curves_attr =
            device.get_vertex_attr(&program.program, "InstanceCurvesData").unwrap();
        let instance_bands_attr =
            device.get_vertex_attr(&program.program, "InstanceBandsData").unwrap();

        device.bind_buffer(&vertex_array, quad_vertex_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &position_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U8,
            stride: 2,
            offset: 0,
            divisor: 0,
            buffer_index: 0,
        });

        device.bind_buffer(&vertex_array, instance_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &instance_bounds_attr,
                                     &VertexAttrDescriptor {
            size: 4,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: PATH_INSTANCE_SIZE,
            offset: 0,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_paint_params_attr,
                                     &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: PATH_INSTANCE_SIZE,
            offset: 16,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_position_attr,
                                     &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: PATH_INSTANCE_SIZE,
            offset: 24,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_size_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: PATH_INSTANCE_SIZE,
            offset: 32,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_color_attr, &VertexAttrDescriptor {
            size: 4,
            class: VertexAttrClass::FloatNorm,
            attr_type: VertexAttrType::U8,
            stride: PATH_INSTANCE_SIZE,
            offset: 40,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_curves_attr, &VertexAttrDescriptor {
            size: 1,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U32,
            stride: PATH_INSTANCE_SIZE,
            offset: 44,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_bands_attr, &VertexAttrDescriptor {
            size: 1,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U32,
            stride: PATH_INSTANCE_SIZE,
            offset: 48,
            divisor: 1,
            buffer_index: 1,
        });

        PathVertexArray { vertex_array }
    }
}

pub struct BoundarySpanProgram<D> where D: Device {
    pub program: D::Program,
    pub view_projection_uniform: D::Uniform,
    pub viewport_size_uniform: D::Uniform,
    pub min_samples_uniform: D::Uniform,
    pub max_samples_uniform: D::Uniform,
    pub curves_texture: D::TextureParameter,
    pub bands_texture: D::TextureParameter,
    pub gradients_texture: D::TextureParameter,
}

impl<D> BoundarySpanProgram<D> where D: Device {
    pub fn new(device: &D, resources: &dyn ResourceLoader)
               -> Result<BoundarySpanProgram<D>, DeviceError> {
        let program = device.create_program(resources, "boundary_span")?;
        let view_projection_uniform = device.get_uniform(&program, "ViewProjection");
        let viewport_size_uniform = device.get_uniform(&program, "ViewportSize");
        let min_samples_uniform = device.get_uniform(&program, "MinSamples");
        let max_samples_uniform = device.get_uniform(&program, "MaxSamples");
        let curves_texture = device.get_texture_parameter(&program, "CurvesTexture");
        let bands_texture = device.get_texture_parameter(&program, "BandsTexture");
        let gradients_texture = device.get_texture_parameter(&program, "GradientsTexture");
        Ok(BoundarySpanProgram {
            program,
            view_projection_uniform,
            viewport_size_uniform,
            min_samples_uniform,
            max_samples_uniform,
            curves_texture,
            bands_texture,
            gradients_texture,
        })
    }
}

pub struct BoundarySpanVertexArray<D> where D: Device {
    pub vertex_array: D::VertexArray,
}

impl<D> BoundarySpanVertexArray<D> where D: Device {
    pub fn new(device: &D,
               program: &BoundarySpanProgram<D>,
               instance_buffer: &D::Buffer,
               quad_vertex_buffer: &D::Buffer)
               -> BoundarySpanVertexArray<D> {
        let vertex_array = device.create_vertex_array();

        let position_attr = device.get_vertex_attr(&program.program, "Position").unwrap();
        let instance_position_attr =
            device.get_vertex_attr(&program.program, "InstancePosition").unwrap();
        let instance_size_attr = device.get_vertex_attr(&program.program, "InstanceSize").unwrap();
        let instance_color_attr =
            device.get_vertex_attr(&program.program, "InstanceColor").unwrap();
        let instance_curves_attr =
            device.get_vertex_attr(&program.program, "InstanceCurvesData").unwrap();
        let instance_bands_attr =
            device.get_vertex_attr(&program.program, "InstanceBandsData").unwrap();

        device.bind_buffer(&vertex_array, quad_vertex_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &position_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U8,
            stride: 2,
            offset: 0,
            divisor: 0,
            buffer_index: 0,
        });

        device.bind_buffer(&vertex_array, instance_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &instance_position_attr,
                                     &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: BOUNDARY_SPAN_INSTANCE_SIZE,
            offset: 0,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_size_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: BOUNDARY_SPAN_INSTANCE_SIZE,
            offset: 8,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_color_attr, &VertexAttrDescriptor {
            size: 4,
            class: VertexAttrClass::FloatNorm,
            attr_type: VertexAttrType::U8,
            stride: BOUNDARY_SPAN_INSTANCE_SIZE,
            offset: 16,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_curves_attr, &VertexAttrDescriptor {
            size: 1,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U32,
            stride: BOUNDARY_SPAN_INSTANCE_SIZE,
            offset: 20,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_bands_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U32,
            stride: BOUNDARY_SPAN_INSTANCE_SIZE,
            offset: 24,
            divisor: 1,
            buffer_index: 1,
        });

        BoundarySpanVertexArray { vertex_array }
    }
}

pub struct FilledSpanProgram<D> where D: Device {
    pub program: D::Program,
    pub view_projection_uniform: D::Uniform,
    pub gradients_texture: D::TextureParameter,
}

impl<D> FilledSpanProgram<D> where D: Device {
    pub fn new(device: &D, resources: &dyn ResourceLoader)
               -> Result<FilledSpanProgram<D>, DeviceError> {
        let program = device.create_program(resources, "filled_span")?;
        let view_projection_uniform = device.get_uniform(&program, "ViewProjection");
        let gradients_texture = device.get_texture_parameter(&program, "GradientsTexture");
        Ok(FilledSpanProgram { program, view_projection_uniform, gradients_texture })
    }
}

pub struct FilledSpanVertexArray<D> where D: Device {
    pub vertex_array: D::VertexArray,
}

impl<D> FilledSpanVertexArray<D> where D: Device {
    pub fn new(device: &D,
               program: &FilledSpanProgram<D>,
               instance_buffer: &D::Buffer,
               quad_vertex_buffer: &D::Buffer)
               -> FilledSpanVertexArray<D> {
        let vertex_array = device.create_vertex_array();

        let position_attr = device.get_vertex_attr(&program.program, "Position").unwrap();
        let instance_position_attr =
            device.get_vertex_attr(&program.program, "InstancePosition").unwrap();
        let instance_size_attr = device.get_vertex_attr(&program.program, "InstanceSize").unwrap();
        let instance_color_attr =
            device.get_vertex_attr(&program.program, "InstanceColor").unwrap();
        let instance_paint_attr =
            device.get_vertex_attr(&program.program, "InstancePaintData").unwrap();

        device.bind_buffer(&vertex_array, quad_vertex_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &position_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U8,
            stride: 2,
            offset: 0,
            divisor: 0,
            buffer_index: 0,
        });

        device.bind_buffer(&vertex_array, instance_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &instance_position_attr,
                                     &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: FILLED_SPAN_INSTANCE_SIZE,
            offset: 0,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_size_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: FILLED_SPAN_INSTANCE_SIZE,
            offset: 8,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_color_attr, &VertexAttrDescriptor {
            size: 4,
            class: VertexAttrClass::FloatNorm,
            attr_type: VertexAttrType::U8,
            stride: FILLED_SPAN_INSTANCE_SIZE,
            offset: 16,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_paint_attr, &VertexAttrDescriptor {
            size: 1,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U32,
            stride: FILLED_SPAN_INSTANCE_SIZE,
            offset: 20,
            divisor: 1,
            buffer_index: 1,
        });

        FilledSpanVertexArray { vertex_array }
    }
}

pub struct LineProgram<D> where D: Device {
    pub program: D::Program,
    pub view_projection_uniform: D::Uniform,
    pub zoom_uniform: D::Uniform,
}

impl<D> LineProgram<D> where D: Device {
    pub fn new(device: &D, resources: &dyn ResourceLoader)
               -> Result<LineProgram<D>, DeviceError> {
        let program = device.create_program(resources, "line")?;
        let view_projection_uniform = device.get_uniform(&program, "ViewProjection");
        let zoom_uniform = device.get_uniform(&program, "Zoom");
        Ok(LineProgram { program, view_projection_uniform, zoom_uniform })
    }
}

pub struct LineVertexArray<D> where D: Device {
    pub vertex_array: D::VertexArray,
}

impl<D> LineVertexArray<D> where D: Device {
    pub fn new(device: &D,
               program: &LineProgram<D>,
               instance_buffer: &D::Buffer,
               quad_vertex_buffer: &D::Buffer)
               -> LineVertexArray<D> {
        let vertex_array = device.create_vertex_array();

        let position_attr = device.get_vertex_attr(&program.program, "Position").unwrap();
        let instance_from_attr = device.get_vertex_attr(&program.program, "InstanceFrom").unwrap();
        let instance_to_attr = device.get_vertex_attr(&program.program, "InstanceTo").unwrap();
        let instance_width_attr =
            device.get_vertex_attr(&program.program, "InstanceWidth").unwrap();
        let instance_color_attr =
            device.get_vertex_attr(&program.program, "InstanceColor").unwrap();

        device.bind_buffer(&vertex_array, quad_vertex_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &position_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U8,
            stride: 2,
            offset: 0,
            divisor: 0,
            buffer_index: 0,
        });

        device.bind_buffer(&vertex_array, instance_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &instance_from_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: LINE_INSTANCE_SIZE,
            offset: 0,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_to_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: LINE_INSTANCE_SIZE,
            offset: 8,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_width_attr, &VertexAttrDescriptor {
            size: 1,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: LINE_INSTANCE_SIZE,
            offset: 16,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_color_attr, &VertexAttrDescriptor {
            size: 4,
            class: VertexAttrClass::FloatNorm,
            attr_type: VertexAttrType::U8,
            stride: LINE_INSTANCE_SIZE,
            offset: 20,
            divisor: 1,
            buffer_index: 1,
        });

        LineVertexArray { vertex_array }
    }
}

pub struct RectProgram<D> where D: Device {
    pub program: D::Program,
    pub view_projection_uniform: D::Uniform,
}

impl<D> RectProgram<D> where D: Device {
    pub fn new(device: &D, resources: &dyn ResourceLoader)
               -> Result<RectProgram<D>, DeviceError> {
        let program = device.create_program(resources, "rect")?;
        let view_projection_uniform = device.get_uniform(&program, "ViewProjection");
        Ok(RectProgram { program, view_projection_uniform })
    }
}

pub struct RectVertexArray<D> where D: Device {
    pub vertex_array: D::VertexArray,
}

impl<D> RectVertexArray<D> where D: Device {
    pub fn new(device: &D,
               program: &RectProgram<D>,
               instance_buffer: &D::Buffer,
               quad_vertex_buffer: &D::Buffer)
               -> RectVertexArray<D> {
        let vertex_array = device.create_vertex_array();

        let position_attr = device.get_vertex_attr(&program.program, "Position").unwrap();
        let instance_position_attr =
            device.get_vertex_attr(&program.program, "InstancePosition").unwrap();
        let instance_size_attr = device.get_vertex_attr(&program.program, "InstanceSize").unwrap();
        let instance_color_attr =
            device.get_vertex_attr(&program.program, "InstanceColor").unwrap();

        device.bind_buffer(&vertex_array, quad_vertex_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &position_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U8,
            stride: 2,
            offset: 0,
            divisor: 0,
            buffer_index: 0,
        });

        device.bind_buffer(&vertex_array, instance_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &instance_position_attr,
                                     &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: RECT_INSTANCE_SIZE,
            offset: 0,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_size_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: RECT_INSTANCE_SIZE,
            offset: 8,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_color_attr, &VertexAttrDescriptor {
            size: 4,
            class: VertexAttrClass::FloatNorm,
            attr_type: VertexAttrType::U8,
            stride: RECT_INSTANCE_SIZE,
            offset: 16,
            divisor: 1,
            buffer_index: 1,
        });

        RectVertexArray { vertex_array }
    }
}

pub struct CircleProgram<D> where D: Device {
    pub program: D::Program,
    pub view_projection_uniform: D::Uniform,
    pub zoom_uniform: D::Uniform,
}

impl<D> CircleProgram<D> where D: Device {
    pub fn new(device: &D, resources: &dyn ResourceLoader)
               -> Result<CircleProgram<D>, DeviceError> {
        let program = device.create_program(resources, "circle")?;
        let view_projection_uniform = device.get_uniform(&program, "ViewProjection");
        let zoom_uniform = device.get_uniform(&program, "Zoom");
        Ok(CircleProgram { program, view_projection_uniform, zoom_uniform })
    }
}

pub struct CircleVertexArray<D> where D: Device {
    pub vertex_array: D::VertexArray,
}

impl<D> CircleVertexArray<D> where D: Device {
    pub fn new(device: &D,
               program: &CircleProgram<D>,
               instance_buffer: &D::Buffer,
               quad_vertex_buffer: &D::Buffer)
               -> CircleVertexArray<D> {
        let vertex_array = device.create_vertex_array();

        let position_attr = device.get_vertex_attr(&program.program, "Position").unwrap();
        let instance_center_attr =
            device.get_vertex_attr(&program.program, "InstanceCenter").unwrap();
        let instance_radius_attr =
            device.get_vertex_attr(&program.program, "InstanceRadius").unwrap();
        let instance_color_attr =
            device.get_vertex_attr(&program.program, "InstanceColor").unwrap();

        device.bind_buffer(&vertex_array, quad_vertex_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &position_attr, &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Int,
            attr_type: VertexAttrType::U8,
            stride: 2,
            offset: 0,
            divisor: 0,
            buffer_index: 0,
        });

        device.bind_buffer(&vertex_array, instance_buffer, BufferTarget::Vertex);
        device.configure_vertex_attr(&vertex_array, &instance_center_attr,
                                     &VertexAttrDescriptor {
            size: 2,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: CIRCLE_INSTANCE_SIZE,
            offset: 0,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_radius_attr,
                                     &VertexAttrDescriptor {
            size: 1,
            class: VertexAttrClass::Float,
            attr_type: VertexAttrType::F32,
            stride: CIRCLE_INSTANCE_SIZE,
            offset: 8,
            divisor: 1,
            buffer_index: 1,
        });
        device.configure_vertex_attr(&vertex_array, &instance_color_attr, &VertexAttrDescriptor {
            size: 4,
            class: VertexAttrClass::FloatNorm,
            attr_type: VertexAttrType::U8,
            stride: CIRCLE_INSTANCE_SIZE,
            offset: 12,
            divisor: 1,
            buffer_index: 1,
        });

        CircleVertexArray { vertex_array }
    }
}

/// Every program the renderer uses, built once at startup.
pub struct Programs<D> where D: Device {
    pub path: PathProgram<D>,
    pub boundary_span: BoundarySpanProgram<D>,
    pub filled_span: FilledSpanProgram<D>,
    pub line: LineProgram<D>,
    pub rect: RectProgram<D>,
    pub circle: CircleProgram<D>,
}

impl<D> Programs<D> where D: Device {
    pub fn new(device: &D, resources: &dyn ResourceLoader) -> Result<Programs<D>, DeviceError> {
        Ok(Programs {
            path: PathProgram::new(device, resources)?,
            boundary_span: BoundarySpanProgram::new(device, resources)?,
            filled_span: FilledSpanProgram::new(device, resources)?,
            line: LineProgram::new(device, resources)?,
            rect: RectProgram::new(device, resources)?,
            circle: CircleProgram::new(device, resources)?,
        })
    }
}
