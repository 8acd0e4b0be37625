//! CPU execution for compute kernels

use crate::{error::Result, BackendInfo, ComputeRunner};
use rayon::prelude::*;
use shared::{double_step, ComputeParams, ThreadId};

/// CPU-based runner for the doubling kernel using native Rust code
pub struct CpuRunner;

impl ComputeRunner for CpuRunner {
    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            name: "cpu",
            api: Some("Native"),
            device: None,
            driver_version: None,
        }
    }

    fn execute_kernel_pass(&self, data: &mut [u32], params: ComputeParams) -> Result<()> {
        // Process all invocations (on CPU, rayon stands in for the workgroups)
        data.par_iter_mut().enumerate().for_each(|(idx, value)| {
            double_step(ThreadId::new(idx as u32), value, &params);
        });
        Ok(())
    }
}
