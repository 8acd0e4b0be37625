//! Demo running a compute shader on a headless OpenGL ES 3.1 context
//!
//! Diagnostics go to stderr, the input and output arrays to stdout.
//! Exits with status 1 on the first failure.

use std::process::ExitCode;

use anyhow::{Context, Result};
use gles_headless_compute::{
    config::{ComputeConfig, ShaderSource},
    report,
    runners::gles::{EglDisplay, GlesRunner, HeadlessContext},
    verify_against_reference, ComputeRunner,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report::diagnostic(&report::error_line(&err));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = ComputeConfig::from_env().context("reading configuration")?;
    config.require_compute()?;
    log::debug!("{config:?}");

    let display = EglDisplay::open()?;
    report::diagnostic(&report::egl_vendor_line(&display.vendor()));
    report::diagnostic(&report::egl_version_line(&display.version()));

    let context = HeadlessContext::new(display, config.context_version)?;
    report::diagnostic(&report::gl_version_line(context.gl_version()));
    log::info!("GL renderer: {}", context.renderer());

    let source = config.shader_source().context("loading compute shader")?;
    let runner = GlesRunner::from_context(context, &source)?;

    let input = config.input_values();
    let mut output = input.clone();
    runner.double(&mut output)?;

    let stdout = std::io::stdout();
    report::write_input_output(&mut stdout.lock(), &input, &output)?;

    if config.shader == ShaderSource::Builtin {
        verify_against_reference(&input, &output)?;
    }
    Ok(())
}
