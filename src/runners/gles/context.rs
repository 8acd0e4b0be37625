//! Framebuffer-less config selection and surfaceless OpenGL ES context creation

use std::rc::Rc;

use glow::HasContext;
use khronos_egl as egl;

use super::device::EglDisplay;
use crate::{
    config::ContextVersion,
    error::{ComputeError, CrateResult},
};

/// Pbuffer-capable, ES3-renderable configs
pub fn config_attributes() -> [egl::Int; 5] {
    [
        egl::SURFACE_TYPE,
        egl::PBUFFER_BIT,
        egl::RENDERABLE_TYPE,
        egl::OPENGL_ES3_BIT,
        egl::NONE,
    ]
}

pub fn context_attributes(version: ContextVersion) -> [egl::Int; 5] {
    [
        egl::CONTEXT_MAJOR_VERSION,
        version.major,
        egl::CONTEXT_MINOR_VERSION,
        version.minor,
        egl::NONE,
    ]
}

/// All configs matching `attribs`. Empty when the query fails.
pub fn choose_configs(display: &EglDisplay, attribs: &[egl::Int]) -> Vec<egl::Config> {
    let instance = display.egl();
    let count = match instance.matching_config_count(display.handle(), attribs) {
        Ok(count) => count,
        Err(e) => {
            log::debug!("eglChooseConfig count query failed: {e}");
            return Vec::new();
        }
    };

    let mut configs = Vec::with_capacity(count);
    if let Err(e) = instance.choose_config(display.handle(), attribs, &mut configs) {
        log::debug!("eglChooseConfig failed: {e}");
        configs.clear();
    }
    configs
}

/// A surfaceless OpenGL ES context, current on the creating thread.
///
/// Owns its [`EglDisplay`], so dropping the context also terminates the display.
pub struct HeadlessContext {
    gl: Rc<glow::Context>,
    context: egl::Context,
    display: EglDisplay,
}

impl HeadlessContext {
    pub fn new(display: EglDisplay, version: ContextVersion) -> CrateResult<Self> {
        display.require_headless()?;

        let configs = choose_configs(&display, &config_attributes());
        log::debug!("{} matching EGL config(s)", configs.len());
        let config = *configs.first().ok_or(ComputeError::NoConfig)?;

        let instance = display.egl();
        instance.bind_api(egl::OPENGL_ES_API)?;

        let context = instance
            .create_context(display.handle(), config, None, &context_attributes(version))
            .map_err(|e| {
                log::debug!("eglCreateContext failed for ES {version}: {e}");
                ComputeError::ContextCreation
            })?;

        if let Err(e) = instance.make_current(display.handle(), None, None, Some(context)) {
            log::debug!("eglMakeCurrent failed: {e}");
            if let Err(e) = instance.destroy_context(display.handle(), context) {
                log::warn!("eglDestroyContext failed: {e}");
            }
            return Err(ComputeError::ContextCreation);
        }

        // Safety: the context is current on this thread and stays current for the life of `gl`.
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                instance
                    .get_proc_address(name)
                    .map_or(std::ptr::null(), |f| f as *const std::ffi::c_void)
            })
        };

        Ok(Self {
            gl: Rc::new(gl),
            context,
            display,
        })
    }

    pub fn display(&self) -> &EglDisplay {
        &self.display
    }

    pub fn gl(&self) -> &Rc<glow::Context> {
        &self.gl
    }

    pub fn gl_version(&self) -> &glow::Version {
        self.gl.version()
    }

    /// `GL_RENDERER` of the current context
    pub fn renderer(&self) -> String {
        // Safety: the context is current.
        unsafe { self.gl.get_parameter_string(glow::RENDERER) }
    }
}

impl Drop for HeadlessContext {
    fn drop(&mut self) {
        let instance = self.display.egl();
        let handle = self.display.handle();
        if let Err(e) = instance.make_current(handle, None, None, None) {
            log::warn!("Releasing the current context failed: {e}");
        }
        if let Err(e) = instance.destroy_context(handle, self.context) {
            log::warn!("eglDestroyContext failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_attributes() {
        let attribs = config_attributes();
        assert_eq!(attribs[0], egl::SURFACE_TYPE);
        assert_eq!(attribs[1] & egl::PBUFFER_BIT, egl::PBUFFER_BIT);
        assert_eq!(attribs[2], egl::RENDERABLE_TYPE);
        assert_eq!(attribs[3], egl::OPENGL_ES3_BIT);
        assert_eq!(*attribs.last().unwrap(), egl::NONE);
    }

    #[test]
    fn test_context_attributes() {
        let attribs = context_attributes(ContextVersion { major: 3, minor: 2 });
        assert_eq!(
            attribs,
            [
                egl::CONTEXT_MAJOR_VERSION,
                3,
                egl::CONTEXT_MINOR_VERSION,
                2,
                egl::NONE
            ]
        );
    }
}
