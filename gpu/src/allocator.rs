// vellum/gpu/src/allocator.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! GPU memory management.
//!
//! Buffers are allocated in power-of-two size classes up to 16 MiB (larger
//! requests are exact). Freed objects sit on a deque stamped with their
//! release time: an object may satisfy a matching request once it has been
//! free for `REUSE_TIME` (avoiding upload stalls on still-in-flight
//! buffers), and is destroyed for good when `purge_if_needed` finds it older
//! than `DECAY_TIME`. Textures and framebuffers match by exact descriptor.

use crate::{BufferTarget, BufferUploadMode, Device, TextureDescriptor, TextureFormat};
use instant::Instant;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use uuid::Uuid;
use vellum_geometry::util::next_power_of_two;
use vellum_geometry::vector::Vector2I;

/// Everything above this is allocated exactly.
pub const MAX_BUFFER_SIZE_CLASS: usize = 16 * 1024 * 1024;

/// How long an unused object survives before `purge_if_needed` destroys it.
pub const DECAY_TIME: Duration = Duration::from_millis(250);

/// How long an object must have been free before it can be reused.
pub const REUSE_TIME: Duration = Duration::from_millis(15);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllocationId(Uuid);

impl AllocationId {
    #[inline]
    fn new() -> AllocationId {
        AllocationId(Uuid::new_v4())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocatorError {
    OutOfMemory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BufferKind {
    General,
    Index,
}

struct BufferAllocation<D> where D: Device {
    buffer: D::Buffer,
    byte_size: usize,
    tag: &'static str,
}

struct TextureAllocation<D> where D: Device {
    texture: D::Texture,
    descriptor: TextureDescriptor,
    tag: &'static str,
}

struct FramebufferAllocation<D> where D: Device {
    framebuffer: D::Framebuffer,
    descriptor: TextureDescriptor,
    tag: &'static str,
}

enum FreeObjectKind<D> where D: Device {
    Buffer { kind: BufferKind, id: AllocationId, allocation: BufferAllocation<D> },
    Texture { id: AllocationId, allocation: TextureAllocation<D> },
    Framebuffer { id: AllocationId, allocation: FramebufferAllocation<D> },
}

struct FreeObject<D> where D: Device {
    timestamp: Instant,
    kind: FreeObjectKind<D>,
}

impl<D> FreeObject<D> where D: Device {
    fn byte_size(&self) -> usize {
        match self.kind {
            FreeObjectKind::Buffer { ref allocation, .. } => allocation.byte_size,
            FreeObjectKind::Texture { ref allocation, .. } => allocation.descriptor.byte_size(),
            FreeObjectKind::Framebuffer { ref allocation, .. } => {
                allocation.descriptor.byte_size()
            }
        }
    }
}

/// Tracks every GPU object the renderer owns.
pub struct Allocator<D> where D: Device {
    general_buffers_in_use: HashMap<AllocationId, BufferAllocation<D>>,
    index_buffers_in_use: HashMap<AllocationId, BufferAllocation<D>>,
    textures_in_use: HashMap<AllocationId, TextureAllocation<D>>,
    framebuffers_in_use: HashMap<AllocationId, FramebufferAllocation<D>>,

    free_objects: VecDeque<FreeObject<D>>,

    bytes_allocated: usize,
    bytes_committed: usize,
}

impl<D> Allocator<D> where D: Device {
    pub fn new() -> Allocator<D> {
        Allocator {
            general_buffers_in_use: HashMap::new(),
            index_buffers_in_use: HashMap::new(),
            textures_in_use: HashMap::new(),
            framebuffers_in_use: HashMap::new(),
            free_objects: VecDeque::new(),
            bytes_allocated: 0,
            bytes_committed: 0,
        }
    }

    /// Bytes resident on the GPU, including the free list.
    #[inline]
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    /// Bytes currently in use.
    #[inline]
    pub fn bytes_committed(&self) -> usize {
        self.bytes_committed
    }

    // Buffers

    pub fn allocate_general_buffer(&mut self,
                                   device: &D,
                                   byte_size: usize,
                                   tag: &'static str)
                                   -> Result<AllocationId, AllocatorError> {
        self.allocate_buffer_at(device, byte_size, tag, BufferKind::General, Instant::now())
    }

    pub fn allocate_index_buffer(&mut self,
                                 device: &D,
                                 byte_size: usize,
                                 tag: &'static str)
                                 -> Result<AllocationId, AllocatorError> {
        self.allocate_buffer_at(device, byte_size, tag, BufferKind::Index, Instant::now())
    }

    pub(crate) fn allocate_buffer_at(&mut self,
                                     device: &D,
                                     byte_size: usize,
                                     tag: &'static str,
                                     kind: BufferKind,
                                     now: Instant)
                                     -> Result<AllocationId, AllocatorError> {
        let byte_size = round_to_size_class(byte_size);

        // Try the free list first.
        for index in 0..self.free_objects.len() {
            let matches = match self.free_objects[index] {
                FreeObject {
                    timestamp,
                    kind: FreeObjectKind::Buffer { kind: free_kind, ref allocation, .. },
                } => {
                    free_kind == kind && allocation.byte_size == byte_size &&
                        now.duration_since(timestamp) >= REUSE_TIME
                }
                _ => false,
            };
            if !matches {
                continue;
            }

            let free_object = self.free_objects.remove(index).unwrap();
            if let FreeObjectKind::Buffer { id, mut allocation, .. } = free_object.kind {
                allocation.tag = tag;
                self.bytes_committed += allocation.byte_size;
                self.in_use_buffers_mut(kind).insert(id, allocation);
                return Ok(id);
            }
            unreachable!();
        }

        // Fresh allocation.
        let target = match kind {
            BufferKind::General => BufferTarget::Vertex,
            BufferKind::Index => BufferTarget::Index,
        };
        let buffer = device.create_buffer(BufferUploadMode::Dynamic);
        device
            .allocate_buffer(&buffer, byte_size, target)
            .map_err(|_| AllocatorError::OutOfMemory)?;

        let id = AllocationId::new();
        self.in_use_buffers_mut(kind).insert(id, BufferAllocation { buffer, byte_size, tag });
        self.bytes_allocated += byte_size;
        self.bytes_committed += byte_size;
        Ok(id)
    }

    pub fn get_general_buffer(&self, id: AllocationId) -> Option<&D::Buffer> {
        self.general_buffers_in_use.get(&id).map(|allocation| &allocation.buffer)
    }

    pub fn get_index_buffer(&self, id: AllocationId) -> Option<&D::Buffer> {
        self.index_buffers_in_use.get(&id).map(|allocation| &allocation.buffer)
    }

    pub fn free_general_buffer(&mut self, id: AllocationId) {
        self.free_buffer_at(id, BufferKind::General, Instant::now())
    }

    pub fn free_index_buffer(&mut self, id: AllocationId) {
        self.free_buffer_at(id, BufferKind::Index, Instant::now())
    }

    pub(crate) fn free_buffer_at(&mut self, id: AllocationId, kind: BufferKind, now: Instant) {
        let allocation = match self.in_use_buffers_mut(kind).remove(&id) {
            None => {
                debug_assert!(false, "freeing an unknown buffer id");
                return;
            }
            Some(allocation) => allocation,
        };
        self.bytes_committed -= allocation.byte_size;
        self.free_objects.push_back(FreeObject {
            timestamp: now,
            kind: FreeObjectKind::Buffer { kind, id, allocation },
        });
    }

    fn in_use_buffers_mut(&mut self, kind: BufferKind)
                          -> &mut HashMap<AllocationId, BufferAllocation<D>> {
        match kind {
            BufferKind::General => &mut self.general_buffers_in_use,
            BufferKind::Index => &mut self.index_buffers_in_use,
        }
    }

    // Textures

    pub fn allocate_texture(&mut self,
                            device: &D,
                            size: Vector2I,
                            format: TextureFormat,
                            tag: &'static str)
                            -> Result<AllocationId, AllocatorError> {
        let descriptor = TextureDescriptor::new(size, format);

        for index in 0..self.free_objects.len() {
            let matches = match self.free_objects[index].kind {
                FreeObjectKind::Texture { ref allocation, .. } => {
                    allocation.descriptor == descriptor
                }
                _ => false,
            };
            if !matches {
                continue;
            }

            let free_object = self.free_objects.remove(index).unwrap();
            if let FreeObjectKind::Texture { id, mut allocation } = free_object.kind {
                allocation.tag = tag;
                self.bytes_committed += descriptor.byte_size();
                self.textures_in_use.insert(id, allocation);
                return Ok(id);
            }
            unreachable!();
        }

        let texture = device
            .create_texture(format, size)
            .map_err(|_| AllocatorError::OutOfMemory)?;
        let id = AllocationId::new();
        self.textures_in_use.insert(id, TextureAllocation { texture, descriptor, tag });
        self.bytes_allocated += descriptor.byte_size();
        self.bytes_committed += descriptor.byte_size();
        Ok(id)
    }

    pub fn get_texture(&self, id: AllocationId) -> Option<&D::Texture> {
        self.textures_in_use.get(&id).map(|allocation| &allocation.texture)
    }

    pub fn free_texture(&mut self, id: AllocationId) {
        let allocation = match self.textures_in_use.remove(&id) {
            None => {
                debug_assert!(false, "freeing an unknown texture id");
                return;
            }
            Some(allocation) => allocation,
        };
        self.bytes_committed -= allocation.descriptor.byte_size();
        self.free_objects.push_back(FreeObject {
            timestamp: Instant::now(),
            kind: FreeObjectKind::Texture { id, allocation },
        });
    }

    // Framebuffers

    pub fn allocate_framebuffer(&mut self,
                                device: &D,
                                size: Vector2I,
                                format: TextureFormat,
                                tag: &'static str)
                                -> Result<AllocationId, AllocatorError> {
        let descriptor = TextureDescriptor::new(size, format);

        for index in 0..self.free_objects.len() {
            let matches = match self.free_objects[index].kind {
                FreeObjectKind::Framebuffer { ref allocation, .. } => {
                    allocation.descriptor == descriptor
                }
                _ => false,
            };
            if !matches {
                continue;
            }

            let free_object = self.free_objects.remove(index).unwrap();
            if let FreeObjectKind::Framebuffer { id, mut allocation } = free_object.kind {
                allocation.tag = tag;
                self.bytes_committed += descriptor.byte_size();
                self.framebuffers_in_use.insert(id, allocation);
                return Ok(id);
            }
            unreachable!();
        }

        let texture = device
            .create_texture(format, size)
            .map_err(|_| AllocatorError::OutOfMemory)?;
        let framebuffer = device.create_framebuffer(texture);
        let id = AllocationId::new();
        self.framebuffers_in_use
            .insert(id, FramebufferAllocation { framebuffer, descriptor, tag });
        self.bytes_allocated += descriptor.byte_size();
        self.bytes_committed += descriptor.byte_size();
        Ok(id)
    }

    pub fn get_framebuffer(&self, id: AllocationId) -> Option<&D::Framebuffer> {
        self.framebuffers_in_use.get(&id).map(|allocation| &allocation.framebuffer)
    }

    pub fn free_framebuffer(&mut self, id: AllocationId) {
        let allocation = match self.framebuffers_in_use.remove(&id) {
            None => {
                debug_assert!(false, "freeing an unknown framebuffer id");
                return;
            }
            Some(allocation) => allocation,
        };
        self.bytes_committed -= allocation.descriptor.byte_size();
        self.free_objects.push_back(FreeObject {
            timestamp: Instant::now(),
            kind: FreeObjectKind::Framebuffer { id, allocation },
        });
    }

    // Purging

    /// Destroys free objects older than `DECAY_TIME`, oldest first. Called
    /// once per frame after `end_commands`.
    pub fn purge_if_needed(&mut self) {
        self.purge_at(Instant::now())
    }

    pub(crate) fn purge_at(&mut self, now: Instant) {
        while let Some(front) = self.free_objects.front() {
            if now.duration_since(front.timestamp) < DECAY_TIME {
                break;
            }
            let object = self.free_objects.pop_front().unwrap();
            self.bytes_allocated -= object.byte_size();
            // Dropping the handle releases the backend object.
        }
    }

    /// Logs every live allocation, for leak hunting.
    pub fn dump(&self) {
        for (id, allocation) in &self.general_buffers_in_use {
            debug!("buffer {:?} [{}]: {} B", id, allocation.tag, allocation.byte_size);
        }
        for (id, allocation) in &self.index_buffers_in_use {
            debug!("index buffer {:?} [{}]: {} B", id, allocation.tag, allocation.byte_size);
        }
        for (id, allocation) in &self.textures_in_use {
            debug!("texture {:?} [{}]: {} B",
                   id,
                   allocation.tag,
                   allocation.descriptor.byte_size());
        }
        for (id, allocation) in &self.framebuffers_in_use {
            debug!("framebuffer {:?} [{}]: {} B",
                   id,
                   allocation.tag,
                   allocation.descriptor.byte_size());
        }
        debug!("allocated: {} B, committed: {} B", self.bytes_allocated, self.bytes_committed);
    }
}

#[inline]
fn round_to_size_class(byte_size: usize) -> usize {
    if byte_size < MAX_BUFFER_SIZE_CLASS {
        next_power_of_two(byte_size)
    } else {
        byte_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null::NullDevice;

    #[test]
    fn test_size_class_rounding() {
        assert_eq!(round_to_size_class(3), 4);
        assert_eq!(round_to_size_class(4096), 4096);
        assert_eq!(round_to_size_class(4097), 8192);
        let huge = MAX_BUFFER_SIZE_CLASS + 12345;
        assert_eq!(round_to_size_class(huge), huge);
    }

    #[test]
    fn test_reuse_after_reuse_time() {
        let device = NullDevice::new();
        let mut allocator = Allocator::new();
        let t0 = Instant::now();

        let id = allocator
            .allocate_buffer_at(&device, 1000, "a", BufferKind::General, t0)
            .unwrap();
        assert_eq!(allocator.bytes_committed(), 1024);
        allocator.free_buffer_at(id, BufferKind::General, t0);
        assert_eq!(allocator.bytes_committed(), 0);
        assert_eq!(allocator.bytes_allocated(), 1024);

        // Too soon: a fresh buffer is created instead.
        let early = allocator
            .allocate_buffer_at(&device, 1024, "b", BufferKind::General, t0 + REUSE_TIME / 2)
            .unwrap();
        assert_ne!(early, id);
        assert_eq!(device.buffers_created.get(), 2);

        // Same size class, after the reuse window: the freed buffer returns.
        let reused = allocator
            .allocate_buffer_at(&device, 900, "c", BufferKind::General, t0 + REUSE_TIME)
            .unwrap();
        assert_eq!(reused, id);
        assert_eq!(device.buffers_created.get(), 2);
    }

    #[test]
    fn test_kind_and_size_must_match() {
        let device = NullDevice::new();
        let mut allocator = Allocator::new();
        let t0 = Instant::now();

        let id = allocator
            .allocate_buffer_at(&device, 1024, "a", BufferKind::General, t0)
            .unwrap();
        allocator.free_buffer_at(id, BufferKind::General, t0);

        // Index buffers never reuse general buffers.
        let index_id = allocator
            .allocate_buffer_at(&device, 1024, "b", BufferKind::Index, t0 + REUSE_TIME)
            .unwrap();
        assert_ne!(index_id, id);

        // A different size class allocates fresh.
        let big_id = allocator
            .allocate_buffer_at(&device, 4096, "c", BufferKind::General, t0 + REUSE_TIME)
            .unwrap();
        assert_ne!(big_id, id);
    }

    #[test]
    fn test_purge_destroys_after_decay() {
        let device = NullDevice::new();
        let mut allocator = Allocator::new();
        let t0 = Instant::now();

        let id = allocator
            .allocate_buffer_at(&device, 2048, "a", BufferKind::General, t0)
            .unwrap();
        allocator.free_buffer_at(id, BufferKind::General, t0);
        assert_eq!(allocator.bytes_allocated(), 2048);

        // Before decay: still resident.
        allocator.purge_at(t0 + DECAY_TIME / 2);
        assert_eq!(allocator.bytes_allocated(), 2048);

        allocator.purge_at(t0 + DECAY_TIME);
        assert_eq!(allocator.bytes_allocated(), 0);

        // Decayed buffers can no longer be reused.
        let fresh = allocator
            .allocate_buffer_at(&device, 2048, "b", BufferKind::General, t0 + DECAY_TIME)
            .unwrap();
        assert_ne!(fresh, id);
        assert_eq!(device.buffers_created.get(), 2);
    }

    #[test]
    fn test_texture_descriptor_must_match_exactly() {
        let device = NullDevice::new();
        let mut allocator = Allocator::new();

        let id = allocator
            .allocate_texture(&device, Vector2I::new(64, 64), TextureFormat::RGBA8, "ramp")
            .unwrap();
        allocator.free_texture(id);

        let other = allocator
            .allocate_texture(&device, Vector2I::new(64, 64), TextureFormat::RGBA32F, "curves")
            .unwrap();
        assert_ne!(other, id);

        let reused = allocator
            .allocate_texture(&device, Vector2I::new(64, 64), TextureFormat::RGBA8, "ramp2")
            .unwrap();
        assert_eq!(reused, id);
        assert_eq!(device.textures_created.get(), 2);
    }

    #[test]
    fn test_out_of_memory_is_reported() {
        let device = NullDevice::new();
        device.exhausted.set(true);
        let mut allocator: Allocator<NullDevice> = Allocator::new();
        assert_eq!(allocator.allocate_general_buffer(&device, 64, "a"),
                   Err(AllocatorError::OutOfMemory));
        assert_eq!(allocator.bytes_allocated(), 0);
    }
}
