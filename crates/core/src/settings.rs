//! Environment-driven settings
//!
//! Every knob the stock targets read from the process environment is resolved
//! once at startup into [`DevSettings`] and handed to target actions through
//! their execution context. [`EnvironmentSetting`] is the single-variable
//! building block behind it.

use std::env;
use std::sync::OnceLock;

use crate::types::{DevError, DevResult};

pub const BUILD_CONFIGURATION: &str = "BUILD_CONFIGURATION";
pub const CONTAINER_RUNTIME: &str = "CONTAINER_RUNTIME";
pub const LOCAL_BUILD: &str = "LOCAL_BUILD";
pub const LOCAL_LINT: &str = "LOCAL_LINT";

const DEFAULT_BUILD_CONFIGURATION: &str = "Release";
const DEFAULT_CONTAINER_RUNTIME: &str = "podman";

const TRUTHY_VALUES: [&str; 4] = ["1", "on", "true", "yes"];

/// A named environment variable with an optional fallback.
///
/// The variable is read on first access and cached for the lifetime of the
/// setting. Unset and empty values both fall back to the default.
#[derive(Debug)]
pub struct EnvironmentSetting {
    name: String,
    default_value: Option<String>,
    value: OnceLock<String>,
}

impl EnvironmentSetting {
    pub fn new(name: impl Into<String>) -> DevResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DevError::InvalidArgument(
                "environment setting name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            name,
            default_value: None,
            value: OnceLock::new(),
        })
    }

    pub fn with_default(name: impl Into<String>, default_value: impl Into<String>) -> DevResult<Self> {
        let mut setting = Self::new(name)?;
        let default_value = default_value.into();
        if default_value.is_empty() {
            return Err(DevError::InvalidArgument(format!(
                "default value for '{}' must not be empty",
                setting.name
            )));
        }

        setting.default_value = Some(default_value);
        Ok(setting)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Resolved value, read from the process environment
    pub fn value(&self) -> &str {
        self.value_with(|name| env::var(name).ok())
    }

    /// Resolved value, read through `lookup` if this setting has not been
    /// resolved yet
    pub fn value_with<F>(&self, lookup: F) -> &str
    where
        F: FnOnce(&str) -> Option<String>,
    {
        self.value.get_or_init(|| {
            lookup(&self.name)
                .filter(|value| !value.is_empty())
                .or_else(|| self.default_value.clone())
                .unwrap_or_default()
        })
    }

    pub fn is_truthy(&self) -> bool {
        is_truthy(self.value())
    }
}

/// Whether `value` is one of the accepted "on" spellings, ignoring case
pub fn is_truthy(value: &str) -> bool {
    TRUTHY_VALUES
        .iter()
        .any(|truthy| truthy.eq_ignore_ascii_case(value))
}

/// Process-wide settings consumed by the stock targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevSettings {
    /// Passed as `--configuration` to every toolchain invocation
    pub build_configuration: String,
    /// Program used to run the containerized linter
    pub container_runtime: String,
    /// Suppresses warnings-as-errors on build
    pub local_build: bool,
    /// Asks the linter to apply fixes in place
    pub local_lint: bool,
}

impl DevSettings {
    pub fn from_env() -> DevResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DevResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let build_configuration =
            EnvironmentSetting::with_default(BUILD_CONFIGURATION, DEFAULT_BUILD_CONFIGURATION)?;
        let container_runtime =
            EnvironmentSetting::with_default(CONTAINER_RUNTIME, DEFAULT_CONTAINER_RUNTIME)?;
        let local_build = EnvironmentSetting::new(LOCAL_BUILD)?;
        let local_lint = EnvironmentSetting::new(LOCAL_LINT)?;

        Ok(Self {
            build_configuration: build_configuration.value_with(&lookup).to_string(),
            container_runtime: container_runtime.value_with(&lookup).to_string(),
            local_build: is_truthy(local_build.value_with(&lookup)),
            local_lint: is_truthy(local_lint.value_with(&lookup)),
        })
    }
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            build_configuration: DEFAULT_BUILD_CONFIGURATION.to_string(),
            container_runtime: DEFAULT_CONTAINER_RUNTIME.to_string(),
            local_build: false,
            local_lint: false,
        }
    }
}
