//! Error types for the library

use thiserror::Error;

/// Error types for the headless compute demo
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Environment variable error: {0}")]
    VarError(#[from] std::env::VarError),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidConfig {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Could not load the EGL library: {0}")]
    EglLoad(String),

    #[error("No EGL devices found")]
    NoDevices,

    #[error("No valid EGL display found")]
    NoDisplay,

    #[error("The EGL display does not support headless rendering")]
    HeadlessUnsupported { missing: Vec<String> },

    #[error("No matching EGL configuration found")]
    NoConfig,

    #[error("Could not create an OpenGL context")]
    ContextCreation,

    #[error("Could not create GPU program")]
    ProgramCreation(String),

    #[error("{0}")]
    ShaderCompile(String),

    #[error("{0}")]
    ShaderLink(String),

    #[error("Could not create shader buffer")]
    BufferCreation { step: &'static str, gl_error: u32 },

    #[error("Could not retrieve output data")]
    Readback,

    #[error("Input buffer must not be empty")]
    EmptyInput,

    #[error("Dispatch of {requested} workgroups exceeds the device limit of {limit}")]
    DispatchTooLarge { requested: u32, limit: u32 },

    #[error("Compute dispatch failed with GL error {gl_error:#06x}")]
    Dispatch { gl_error: u32 },

    #[error("Output does not match the CPU reference at index {index}: expected {expected}, got {actual}")]
    OutputMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },

    #[error("EGL error: {0}")]
    Egl(#[from] khronos_egl::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ComputeError {
    /// Shader diagnostics are reported with their own prefix.
    pub fn is_shader_error(&self) -> bool {
        matches!(self, Self::ShaderCompile(_) | Self::ShaderLink(_))
    }
}

/// Convenience type alias for Results with [`ComputeError`]
pub type CrateResult<T> = std::result::Result<T, ComputeError>;
pub type Result<T> = CrateResult<T>;
