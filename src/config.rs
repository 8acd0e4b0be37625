//! Runtime configuration read from the environment

use std::{borrow::Cow, path::PathBuf};

use crate::{
    error::{ComputeError, CrateResult},
    DOUBLE_SHADER_GLSL,
};

pub const ELEMENTS_VAR: &str = "GLES_COMPUTE_ELEMENTS";
pub const SHADER_VAR: &str = "GLES_COMPUTE_SHADER";
pub const CONTEXT_VERSION_VAR: &str = "GLES_COMPUTE_CONTEXT_VERSION";

/// Requested OpenGL ES context version
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContextVersion {
    pub major: i32,
    pub minor: i32,
}

impl ContextVersion {
    /// Compute shaders need at least this version.
    pub const COMPUTE: Self = Self { major: 3, minor: 1 };

    fn parse(value: &str) -> Option<Self> {
        let (major, minor) = value.trim().split_once('.')?;
        let major = major.parse().ok()?;
        let minor = minor.parse().ok()?;
        (major >= 1 && minor >= 0).then_some(Self { major, minor })
    }
}

impl Default for ContextVersion {
    fn default() -> Self {
        Self::COMPUTE
    }
}

impl std::fmt::Display for ContextVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Where the compute shader source comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShaderSource {
    Builtin,
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputeConfig {
    pub elements: u32,
    pub shader: ShaderSource,
    pub context_version: ContextVersion,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            elements: shared::DEFAULT_NUM_ELEMENTS,
            shader: ShaderSource::Builtin,
            context_version: ContextVersion::default(),
        }
    }
}

impl ComputeConfig {
    pub fn from_env() -> CrateResult<Self> {
        Self::from_lookup(|var| match std::env::var(var) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(e.into()),
        })
    }

    /// Builds a config from an arbitrary variable source. Unset or blank variables keep their defaults.
    pub fn from_lookup<F>(mut lookup: F) -> CrateResult<Self>
    where
        F: FnMut(&str) -> CrateResult<Option<String>>,
    {
        let mut config = Self::default();
        let mut get = |var: &str| -> CrateResult<Option<String>> {
            Ok(lookup(var)?.filter(|value| !value.trim().is_empty()))
        };

        if let Some(value) = get(ELEMENTS_VAR)? {
            config.elements = match value.trim().parse::<u32>() {
                Ok(0) => return Err(invalid(ELEMENTS_VAR, value, "must be at least 1")),
                Ok(n) if n > shared::MAX_NUM_ELEMENTS => {
                    return Err(invalid(
                        ELEMENTS_VAR,
                        value,
                        format!("must be at most {}", shared::MAX_NUM_ELEMENTS),
                    ))
                }
                Ok(n) => n,
                Err(e) => return Err(invalid(ELEMENTS_VAR, value, e)),
            };
        }

        if let Some(value) = get(SHADER_VAR)? {
            config.shader = ShaderSource::File(PathBuf::from(value));
        }

        if let Some(value) = get(CONTEXT_VERSION_VAR)? {
            config.context_version = ContextVersion::parse(&value).ok_or_else(|| {
                invalid(CONTEXT_VERSION_VAR, value, "expected <major>.<minor>")
            })?;
        }

        Ok(config)
    }

    /// Fails unless the requested context can run compute shaders.
    pub fn require_compute(&self) -> CrateResult<()> {
        if self.context_version < ContextVersion::COMPUTE {
            return Err(invalid(
                CONTEXT_VERSION_VAR,
                self.context_version.to_string(),
                format!("compute shaders need OpenGL ES {}", ContextVersion::COMPUTE),
            ));
        }
        Ok(())
    }

    pub fn shader_source(&self) -> CrateResult<Cow<'static, str>> {
        match &self.shader {
            ShaderSource::Builtin => Ok(Cow::Borrowed(DOUBLE_SHADER_GLSL)),
            ShaderSource::File(path) => {
                log::debug!("Loading compute shader from {}", path.display());
                Ok(Cow::Owned(std::fs::read_to_string(path)?))
            }
        }
    }

    /// Input values `0..elements`
    pub fn input_values(&self) -> Vec<u32> {
        (0..self.elements).collect()
    }
}

fn invalid(var: &'static str, value: String, reason: impl ToString) -> ComputeError {
    ComputeError::InvalidConfig {
        var,
        value,
        reason: reason.to_string(),
    }
}
