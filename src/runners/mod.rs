//! Runner implementations for different compute backends
pub mod cpu;
pub mod gles;
// Re-export runners at module level for convenience
pub use self::cpu::CpuRunner;
pub use self::gles::GlesRunner;
