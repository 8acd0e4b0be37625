//! OpenGL ES runner implementation - compute shaders on a surfaceless EGL context
//!
//! Mirrors the behaviour of [`CpuRunner`](super::cpu::CpuRunner) on the GPU. The
//! EGL display, context, program and buffers are owned by RAII wrappers, so every
//! exit path releases them in reverse order of creation.

pub mod buffer;
pub mod context;
pub mod device;
pub mod dispatch;
pub mod program;

pub use buffer::StorageBuffer;
pub use context::HeadlessContext;
pub use device::EglDisplay;
pub use program::ComputeProgram;

use shared::{ComputeParams, DATA_BINDING, ELEMENTS_UNIFORM};

use crate::{
    config::ContextVersion,
    error::{ComputeError, Result},
    BackendInfo, ComputeRunner,
};

/// GPU runner that executes a GLSL compute shader through OpenGL ES
pub struct GlesRunner {
    // Dropped before the context
    program: ComputeProgram,
    context: HeadlessContext,
}

impl GlesRunner {
    /// Open the first usable device and build `shader_source` on a fresh context
    pub fn new(version: ContextVersion, shader_source: &str) -> Result<Self> {
        let display = EglDisplay::open()?;
        let context = HeadlessContext::new(display, version)?;
        Self::from_context(context, shader_source)
    }

    pub fn from_context(context: HeadlessContext, shader_source: &str) -> Result<Self> {
        let program = ComputeProgram::new(context.gl(), shader_source)?;
        program.use_program();
        Ok(Self { program, context })
    }

    pub fn context(&self) -> &HeadlessContext {
        &self.context
    }

}

impl ComputeRunner for GlesRunner {
    fn backend_info(&self) -> BackendInfo {
        let display = self.context.display();
        BackendInfo {
            name: "gles",
            api: Some("OpenGL ES"),
            device: Some(self.context.renderer()),
            driver_version: Some(format!("{} (EGL {})", display.vendor(), display.version())),
        }
    }

    fn execute_kernel_pass(&self, data: &mut [u32], params: ComputeParams) -> Result<()> {
        if params.num_elements == 0 || data.is_empty() {
            return Err(ComputeError::EmptyInput);
        }
        if params.num_elements as usize > data.len() {
            return Err(ComputeError::Other(format!(
                "params cover {} elements but the slice holds only {}",
                params.num_elements,
                data.len()
            )));
        }

        let gl = self.context.gl();
        self.program.use_program();

        let buffer = StorageBuffer::from_slice(
            gl,
            glow::SHADER_STORAGE_BUFFER,
            glow::DYNAMIC_COPY,
            DATA_BINDING,
            data,
        )?;
        self.program
            .set_uniform_u32(ELEMENTS_UNIFORM, params.num_elements);

        dispatch::dispatch_and_wait(gl, params)?;

        let output = buffer.read_to_vec()?;
        if output.len() != data.len() {
            return Err(ComputeError::Readback);
        }
        data.copy_from_slice(&output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use shared::ComputeParams;

    use super::GlesRunner;
    use crate::{config::ContextVersion, error::ComputeError, ComputeRunner, DOUBLE_SHADER_GLSL};

    fn runner() -> GlesRunner {
        GlesRunner::new(ContextVersion::COMPUTE, DOUBLE_SHADER_GLSL).unwrap()
    }

    #[test]
    #[ignore = "requires an EGL device with OpenGL ES 3.1"]
    fn test_double_sequence() {
        let runner = runner();
        let mut data: Vec<u32> = (0..20).collect();

        runner.double(&mut data).unwrap();
        assert_eq!(data, (0..20).map(|x| x * 2).collect::<Vec<u32>>());
    }

    #[test]
    #[ignore = "requires an EGL device with OpenGL ES 3.1"]
    fn test_double_spans_workgroups() {
        let runner = runner();
        let mut data: Vec<u32> = (0..1000).collect();

        runner.double(&mut data).unwrap();
        assert_eq!(data[999], 1998);
        assert_eq!(data[64], 128);
    }

    #[test]
    #[ignore = "requires an EGL device with OpenGL ES 3.1"]
    fn test_double_wraps() {
        let runner = runner();
        let mut data = vec![u32::MAX, 0x8000_0000, 7];

        runner.double(&mut data).unwrap();
        assert_eq!(data, vec![u32::MAX - 1, 0, 14]);
    }

    #[test]
    #[ignore = "requires an EGL device with OpenGL ES 3.1"]
    fn test_runner_reusable() {
        let runner = runner();
        let mut data = vec![1u32, 2, 3];

        runner.double(&mut data).unwrap();
        runner.double(&mut data).unwrap();
        assert_eq!(data, vec![4, 8, 12]);
    }

    #[test]
    #[ignore = "requires an EGL device with OpenGL ES 3.1"]
    fn test_broken_shader_reports_log() {
        let source = "#version 310 es\nlayout(local_size_x = 64) in;\nvoid main() { oops }\n";
        match GlesRunner::new(ContextVersion::COMPUTE, source) {
            Err(err @ (ComputeError::ShaderCompile(_) | ComputeError::ShaderLink(_))) => {
                assert!(!err.to_string().is_empty());
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("broken shader compiled"),
        }
    }

    #[test]
    #[ignore = "requires an EGL device with OpenGL ES 3.1"]
    fn test_empty_input_rejected() {
        let runner = runner();
        let mut data: Vec<u32> = Vec::new();
        assert!(matches!(
            runner.double(&mut data),
            Err(ComputeError::EmptyInput)
        ));
        assert!(matches!(
            runner.execute_kernel_pass(&mut data, ComputeParams { num_elements: 0 }),
            Err(ComputeError::EmptyInput)
        ));
    }
}
