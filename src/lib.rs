//! Headless GPU compute through EGL and OpenGL ES 3.1
//!
//! This library runs the same doubling kernel on:
//! - CPU (native Rust, the reference)
//! - GPU (a GLSL compute shader on a surfaceless EGL context)

pub mod config;
pub mod error;
pub mod report;
pub mod runners;
pub use runners::{CpuRunner, GlesRunner};

use error::{ComputeError, Result};
use shared::ComputeParams;

/// GLSL source of the built-in compute shader
pub const DOUBLE_SHADER_GLSL: &str = include_str!("../shaders/double.comp");

/// Identifies the backend a runner executes on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendInfo {
    pub name: &'static str,
    pub api: Option<&'static str>,
    pub device: Option<String>,
    pub driver_version: Option<String>,
}

/// A backend able to run the doubling kernel over a slice in place
pub trait ComputeRunner {
    fn backend_info(&self) -> BackendInfo;

    /// Run one kernel pass. `params.num_elements` never exceeds `data.len()`.
    fn execute_kernel_pass(&self, data: &mut [u32], params: ComputeParams) -> Result<()>;

    /// Double every element of `data`
    fn double(&self, data: &mut [u32]) -> Result<()> {
        let params = ComputeParams::for_len(data.len()).ok_or(ComputeError::EmptyInput)?;
        self.execute_kernel_pass(data, params)
    }
}

/// Compare a backend's output against the CPU reference for the same input
pub fn verify_against_reference(input: &[u32], output: &[u32]) -> Result<()> {
    let mut expected = input.to_vec();
    CpuRunner.double(&mut expected)?;

    if output.len() != expected.len() {
        return Err(ComputeError::Other(format!(
            "output holds {} elements, expected {}",
            output.len(),
            expected.len()
        )));
    }
    match expected.iter().zip(output).position(|(e, a)| e != a) {
        None => Ok(()),
        Some(index) => Err(ComputeError::OutputMismatch {
            index,
            expected: expected[index],
            actual: output[index],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_doubled() {
        let input: Vec<u32> = (0..20).collect();
        let output: Vec<u32> = input.iter().map(|x| x * 2).collect();
        assert!(verify_against_reference(&input, &output).is_ok());
    }

    #[test]
    fn test_verify_reports_first_mismatch() {
        let input = vec![1u32, 2, 3];
        let output = vec![2u32, 5, 7];
        match verify_against_reference(&input, &output) {
            Err(ComputeError::OutputMismatch {
                index,
                expected,
                actual,
            }) => assert_eq!((index, expected, actual), (1, 4, 5)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_verify_rejects_short_output() {
        assert!(verify_against_reference(&[1, 2], &[2]).is_err());
    }

    #[test]
    fn test_builtin_shader_workgroup_size() {
        let expected = format!("local_size_x = {}", shared::WORKGROUP_SIZE);
        assert!(DOUBLE_SHADER_GLSL.contains(&expected));
        assert!(DOUBLE_SHADER_GLSL.contains(&format!("binding = {}", shared::DATA_BINDING)));
        assert!(DOUBLE_SHADER_GLSL.contains(shared::ELEMENTS_UNIFORM));
    }
}
