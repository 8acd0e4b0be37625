//! EGL library loading, device enumeration and display selection

use std::ffi::c_void;

use khronos_egl as egl;

use crate::error::{ComputeError, CrateResult};

/// Dynamically loaded `libEGL`
pub type EglInstance = egl::DynamicInstance<egl::EGL1_4>;

/// Opaque `EGLDeviceEXT` handle
pub type EglDevice = *mut c_void;

/// From `EGL_EXT_platform_device`
pub const PLATFORM_DEVICE_EXT: egl::Enum = 0x313F;

/// Extensions a display needs for a context without any surface
pub const HEADLESS_EXTENSIONS: [&str; 2] =
    ["EGL_KHR_create_context", "EGL_KHR_surfaceless_context"];

type QueryDevicesExt =
    unsafe extern "system" fn(egl::Int, *mut EglDevice, *mut egl::Int) -> egl::Boolean;
type GetPlatformDisplayExt =
    unsafe extern "system" fn(egl::Enum, *mut c_void, *const egl::Int) -> *mut c_void;

pub fn load_egl() -> CrateResult<EglInstance> {
    // Safety: libEGL is only accessed through the returned instance.
    let instance = unsafe { EglInstance::load_required() }
        .map_err(|e| ComputeError::EglLoad(e.to_string()))?;

    match instance.query_string(None, egl::EXTENSIONS) {
        Ok(client) => log::debug!("EGL client extensions: {}", client.to_string_lossy()),
        Err(e) => log::debug!("EGL client extensions unavailable: {e}"),
    }
    Ok(instance)
}

/// All devices reported by `eglQueryDevicesEXT`, or none if the query is unavailable or fails.
pub fn query_devices(instance: &EglInstance) -> Vec<EglDevice> {
    let Some(proc_addr) = instance.get_proc_address("eglQueryDevicesEXT") else {
        log::debug!("eglQueryDevicesEXT is not exported by this EGL implementation");
        return Vec::new();
    };
    // Safety: the symbol was resolved by name and has this prototype in EGL_EXT_device_enumeration.
    let query_devices: QueryDevicesExt = unsafe { std::mem::transmute(proc_addr) };

    let mut count: egl::Int = 0;
    // Safety: a null list with max 0 only writes the device count.
    unsafe { query_devices(0, std::ptr::null_mut(), &mut count) };
    let Ok(capacity) = usize::try_from(count) else {
        return Vec::new();
    };

    let mut devices = vec![std::ptr::null_mut(); capacity];
    // Safety: `devices` holds exactly `count` slots.
    let ok = unsafe { query_devices(count, devices.as_mut_ptr(), &mut count) };
    if ok != egl::TRUE {
        return Vec::new();
    }
    devices.truncate(usize::try_from(count).unwrap_or(0));
    log::debug!("Found {} EGL device(s)", devices.len());
    devices
}

/// An initialized EGL display. Terminated on drop.
pub struct EglDisplay {
    egl: EglInstance,
    display: egl::Display,
    device_index: usize,
}

impl EglDisplay {
    /// Enumerates devices and initializes the first one that accepts a platform display.
    pub fn open() -> CrateResult<Self> {
        let instance = load_egl()?;
        let devices = query_devices(&instance);
        Self::from_devices(instance, &devices)
    }

    pub fn from_devices(instance: EglInstance, devices: &[EglDevice]) -> CrateResult<Self> {
        if devices.is_empty() {
            return Err(ComputeError::NoDevices);
        }

        let proc_addr = instance
            .get_proc_address("eglGetPlatformDisplayEXT")
            .ok_or(ComputeError::NoDisplay)?;
        // Safety: prototype from EGL_EXT_platform_base.
        let get_platform_display: GetPlatformDisplayExt =
            unsafe { std::mem::transmute(proc_addr) };

        for (device_index, &device) in devices.iter().enumerate() {
            // Safety: `device` came from eglQueryDevicesEXT and the attribute list may be null.
            let raw = unsafe { get_platform_display(PLATFORM_DEVICE_EXT, device, std::ptr::null()) };
            if raw.is_null() {
                log::debug!("Device {device_index}: no platform display");
                continue;
            }
            // Safety: `raw` is a display handle returned by EGL.
            let display = unsafe { egl::Display::from_ptr(raw) };
            match instance.initialize(display) {
                Ok((major, minor)) => {
                    log::info!("Device {device_index}: initialized EGL {major}.{minor}");
                    return Ok(Self {
                        egl: instance,
                        display,
                        device_index,
                    });
                }
                Err(e) => log::debug!("Device {device_index}: eglInitialize failed: {e}"),
            }
        }

        Err(ComputeError::NoDisplay)
    }

    pub fn egl(&self) -> &EglInstance {
        &self.egl
    }

    pub fn handle(&self) -> egl::Display {
        self.display
    }

    /// Position of the chosen device in the enumeration order
    pub fn device_index(&self) -> usize {
        self.device_index
    }

    fn query(&self, name: egl::Int) -> String {
        self.egl
            .query_string(Some(self.display), name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn vendor(&self) -> String {
        self.query(egl::VENDOR)
    }

    pub fn version(&self) -> String {
        self.query(egl::VERSION)
    }

    pub fn extensions(&self) -> String {
        self.query(egl::EXTENSIONS)
    }

    /// Fails with the list of missing names unless both headless extensions are present.
    pub fn require_headless(&self) -> CrateResult<()> {
        let extensions = self.extensions();
        if has_extensions(&extensions, &HEADLESS_EXTENSIONS) {
            return Ok(());
        }
        let missing = missing_extensions(&extensions, &HEADLESS_EXTENSIONS);
        log::debug!("Missing EGL extensions: {}", missing.join(", "));
        Err(ComputeError::HeadlessUnsupported { missing })
    }
}

impl Drop for EglDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.egl.terminate(self.display) {
            log::warn!("eglTerminate failed: {e}");
        }
    }
}

/// True iff `extensions` is non-empty and names every entry of `required`.
pub fn has_extensions(extensions: &str, required: &[&str]) -> bool {
    if extensions.trim().is_empty() {
        return false;
    }
    missing_extensions(extensions, required).is_empty()
}

pub fn missing_extensions(extensions: &str, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !extensions.split_whitespace().any(|ext| ext == **name))
        .map(|name| name.to_string())
        .collect()
}
