//! Shared types for the compute demos
#![no_std]

use bytemuck::{Pod, Zeroable};

/// Number of elements uploaded when no override is configured
pub const DEFAULT_NUM_ELEMENTS: u32 = 20;

/// Workgroup size for compute shaders
/// IMPORTANT: This must be kept in sync with `local_size_x` in shaders/double.comp
pub const WORKGROUP_SIZE: u32 = 64;

/// Workgroup count every OpenGL ES 3.1 device accepts along x
pub const MIN_MAX_WORKGROUP_COUNT: u32 = 65_535;

/// Largest element count a single 1D dispatch is guaranteed to cover
pub const MAX_NUM_ELEMENTS: u32 = MIN_MAX_WORKGROUP_COUNT * WORKGROUP_SIZE;

/// Storage buffer binding the compute shader reads and writes
pub const DATA_BINDING: u32 = 0;

/// Name of the uniform holding the element count
pub const ELEMENTS_UNIFORM: &str = "elements";

#[inline]
pub const fn div_ceil_u32(n: u32, d: u32) -> u32 {
    // Precondition: d > 0
    n / d + ((n % d) != 0) as u32
}

pub fn num_workgroups_1d(num_elements: u32) -> [u32; 3] {
    [div_ceil_u32(num_elements, WORKGROUP_SIZE), 1, 1]
}

/// Parameters of a single kernel pass, shared between CPU and GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ComputeParams {
    pub num_elements: u32,
}

impl ComputeParams {
    /// Returns `None` for an empty or oversized slice.
    pub fn for_len(len: usize) -> Option<Self> {
        match u32::try_from(len) {
            Ok(0) | Err(_) => None,
            Ok(num_elements) => Some(Self { num_elements }),
        }
    }

    pub fn num_workgroups(&self) -> [u32; 3] {
        num_workgroups_1d(self.num_elements)
    }
}

/// Newtype wrapper for invocation IDs to ensure type safety
#[derive(Copy, Clone, Debug)]
pub struct ThreadId(u32);

impl ThreadId {
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_in_bounds(&self, params: &ComputeParams) -> bool {
        self.0 < params.num_elements
    }
}

/// CPU twin of the built-in shader. GLSL `uint` arithmetic wraps, so this does too.
#[inline]
pub fn double_element(value: u32) -> u32 {
    value.wrapping_mul(2)
}

/// One invocation of the doubling kernel, `value` being the element at `thread_id`
#[inline]
pub fn double_step(thread_id: ThreadId, value: &mut u32, params: &ComputeParams) {
    if thread_id.is_in_bounds(params) {
        *value = double_element(*value);
    }
}
