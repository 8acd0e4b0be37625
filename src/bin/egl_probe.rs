//! Creates a surfaceless OpenGL ES context and reports what the driver provides

use std::process::ExitCode;

use anyhow::{Context, Result};
use gles_headless_compute::{
    config::ComputeConfig,
    report,
    runners::gles::{EglDisplay, HeadlessContext},
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

    let display = EglDisplay::open()?;
    log::info!("Using EGL device {}", display.device_index());
    report::diagnostic(&report::egl_vendor_line(&display.vendor()));
    report::diagnostic(&report::egl_version_line(&display.version()));

    let context = HeadlessContext::new(display, config.context_version)?;
    report::diagnostic(&report::gl_version_line(context.gl_version()));
    log::info!("GL renderer: {}", context.renderer());

    Ok(())
}
