//! Human-readable diagnostic and result lines

use std::io::{self, Write};

use crate::error::ComputeError;

pub fn egl_vendor_line(vendor: &str) -> String {
    format!("EGL Vendor     : {vendor}")
}

pub fn egl_version_line(version: &str) -> String {
    format!("EGL Version    : {version}")
}

pub fn gl_version_line(version: &glow::Version) -> String {
    format!(
        "OpenGL Version : {}.{}{}",
        version.major,
        version.minor,
        if version.is_embedded { " ES" } else { "" }
    )
}

/// Shader diagnostics get their own prefix and carry the raw info log.
pub fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ComputeError>() {
        Some(e) if e.is_shader_error() => format!("SHADER ERROR : {e}"),
        Some(e) => format!("ERROR : {e}"),
        None => format!("ERROR : {err:#}"),
    }
}

/// A diagnostic line on stderr
pub fn diagnostic(line: &str) {
    eprintln!("{line}");
}

/// Write `label` on one line and the values, each preceded by a space, on the next
pub fn write_values<W: Write>(out: &mut W, label: &str, values: &[u32]) -> io::Result<()> {
    writeln!(out, "{label}")?;
    for value in values {
        write!(out, " {value}")?;
    }
    writeln!(out)
}

/// The `Input  :` / `Output :` block printed by the compute binary
pub fn write_input_output<W: Write>(out: &mut W, input: &[u32], output: &[u32]) -> io::Result<()> {
    write_values(out, "Input  :", input)?;
    write_values(out, "Output :", output)
}
