use glow::HasContext;
use shared::{ComputeParams, MIN_MAX_WORKGROUP_COUNT};

use crate::error::{ComputeError, CrateResult};

/// Largest x workgroup count the current context accepts
pub fn max_workgroup_count_x(gl: &glow::Context) -> u32 {
    let limit = unsafe { gl.get_parameter_indexed_i32(glow::MAX_COMPUTE_WORK_GROUP_COUNT, 0) };
    u32::try_from(limit).unwrap_or(0).max(MIN_MAX_WORKGROUP_COUNT)
}

/// Workgroup counts for `params`, rejecting empty passes and counts above `limit`.
pub fn check_workgroups(params: ComputeParams, limit: u32) -> CrateResult<[u32; 3]> {
    if params.num_elements == 0 {
        return Err(ComputeError::EmptyInput);
    }
    let workgroups = params.num_workgroups();
    if workgroups[0] > limit {
        return Err(ComputeError::DispatchTooLarge {
            requested: workgroups[0],
            limit,
        });
    }
    Ok(workgroups)
}

/// Maps a `glGetError` code to a dispatch failure.
pub fn check_dispatch_error(gl_error: u32) -> CrateResult<()> {
    if gl_error == glow::NO_ERROR {
        Ok(())
    } else {
        Err(ComputeError::Dispatch { gl_error })
    }
}

/// Dispatch the bound program over `params.num_elements` invocations
/// and make its storage writes visible to the following readback.
pub fn dispatch_and_wait(gl: &glow::Context, params: ComputeParams) -> CrateResult<()> {
    let [x, y, z] = check_workgroups(params, max_workgroup_count_x(gl))?;

    log::debug!("Dispatching {x}x{y}x{z} workgroups for {} elements", params.num_elements);
    let gl_error = unsafe {
        gl.dispatch_compute(x, y, z);
        gl.memory_barrier(glow::SHADER_STORAGE_BARRIER_BIT);
        gl.get_error()
    };
    check_dispatch_error(gl_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(num_elements: u32) -> ComputeParams {
        ComputeParams { num_elements }
    }

    #[test]
    fn test_empty_pass_rejected() {
        assert!(matches!(
            check_workgroups(params(0), MIN_MAX_WORKGROUP_COUNT),
            Err(ComputeError::EmptyInput)
        ));
    }

    #[test]
    fn test_workgroups_round_up() {
        assert_eq!(check_workgroups(params(20), 1).unwrap(), [1, 1, 1]);
        assert_eq!(check_workgroups(params(65), 2).unwrap(), [2, 1, 1]);
    }

    #[test]
    fn test_workgroups_at_limit_accepted() {
        let [x, _, _] = check_workgroups(params(shared::MAX_NUM_ELEMENTS), MIN_MAX_WORKGROUP_COUNT)
            .unwrap();
        assert_eq!(x, MIN_MAX_WORKGROUP_COUNT);
    }

    #[test]
    fn test_workgroups_over_limit_rejected() {
        match check_workgroups(params(129), 2) {
            Err(ComputeError::DispatchTooLarge { requested, limit }) => {
                assert_eq!((requested, limit), (3, 2));
            }
            other => panic!("expected DispatchTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_error_codes() {
        assert!(check_dispatch_error(glow::NO_ERROR).is_ok());
        assert!(matches!(
            check_dispatch_error(glow::INVALID_OPERATION),
            Err(ComputeError::Dispatch {
                gl_error: glow::INVALID_OPERATION
            })
        ));
    }
}
