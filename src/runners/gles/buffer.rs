//! Typed shader storage buffers and host readback

use std::{marker::PhantomData, rc::Rc};

use bytemuck::Pod;
use glow::HasContext;

use crate::error::{ComputeError, CrateResult};

/// A typed GL buffer object bound to an indexed target. Deleted on drop.
pub struct StorageBuffer<T: Pod> {
    gl: Rc<glow::Context>,
    buffer: glow::Buffer,
    target: u32,
    pub len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> StorageBuffer<T> {
    /// Upload `data` and bind the buffer to `index` of `target`.
    ///
    /// `glGetError` is checked after each step. On failure the buffer is deleted.
    pub fn from_slice(
        gl: &Rc<glow::Context>,
        target: u32,
        usage: u32,
        index: u32,
        data: &[T],
    ) -> CrateResult<Self> {
        unsafe {
            // Drain errors left over from earlier calls so they are not blamed on this buffer
            for _ in 0..16 {
                let pending = gl.get_error();
                if pending == glow::NO_ERROR {
                    break;
                }
                log::warn!("Discarding pending GL error {pending:#06x}");
            }

            let buffer = gl.create_buffer().map_err(|e| {
                log::debug!("glGenBuffers failed: {e}");
                ComputeError::BufferCreation {
                    step: "glGenBuffers",
                    gl_error: glow::NO_ERROR,
                }
            })?;
            let buffer = Self {
                gl: gl.clone(),
                buffer,
                target,
                len: data.len(),
                _marker: PhantomData,
            };

            gl.bind_buffer(target, Some(buffer.buffer));
            buffer.check("glBindBuffer")?;

            gl.buffer_data_u8_slice(target, bytemuck::cast_slice(data), usage);
            buffer.check("glBufferData")?;

            gl.bind_buffer_base(target, index, Some(buffer.buffer));
            buffer.check("glBindBufferBase")?;

            gl.bind_buffer(target, None);
            Ok(buffer)
        }
    }

    fn check(&self, step: &'static str) -> CrateResult<()> {
        let gl_error = unsafe { self.gl.get_error() };
        if gl_error == glow::NO_ERROR {
            return Ok(());
        }
        log::debug!("{step} raised GL error {gl_error:#06x}");
        unsafe { self.gl.bind_buffer(self.target, None) };
        Err(ComputeError::BufferCreation { step, gl_error })
    }

    /// Map the whole buffer for reading and copy its contents out.
    pub fn read_to_vec(&self) -> CrateResult<Vec<T>> {
        unsafe {
            self.gl.bind_buffer(self.target, Some(self.buffer));
            let size = self.gl.get_buffer_parameter_i32(self.target, glow::BUFFER_SIZE);
            let ptr = if size > 0 {
                self.gl
                    .map_buffer_range(self.target, 0, size, glow::MAP_READ_BIT)
            } else {
                std::ptr::null_mut()
            };

            if ptr.is_null() {
                self.gl.bind_buffer(self.target, None);
                return Err(ComputeError::Readback);
            }

            // The mapping is only guaranteed byte-aligned, hence the copying cast
            let bytes = std::slice::from_raw_parts(ptr as *const u8, size as usize);
            let values: Vec<T> = bytemuck::allocation::pod_collect_to_vec(bytes);

            self.gl.unmap_buffer(self.target);
            self.gl.bind_buffer(self.target, None);

            if values.is_empty() {
                return Err(ComputeError::Readback);
            }
            Ok(values)
        }
    }
}

impl<T: Pod> Drop for StorageBuffer<T> {
    fn drop(&mut self) {
        unsafe { self.gl.delete_buffer(self.buffer) }
    }
}
