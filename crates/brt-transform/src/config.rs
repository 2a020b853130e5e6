//! Rewrite configuration.
//!
//! Configuration is read once before a pass starts and is immutable while it
//! runs. Two sources are supported:
//!
//! - a YAML file ([`TransformConfig::load`], [`TransformConfig::from_yaml`])
//! - the flat parameter map used by the CLAW driver
//!   ([`TransformConfig::from_parameters`]), where lists are colon separated
//!
//! ```yaml
//! shadow:
//!   prefix: br_
//!   functions: [exp, log, sin, cos]
//!   modules: [mo_br_transcendentals]
//! power:
//!   functionName: br_pow
//!   moduleName: mo_br_exponentiation
//! ```
//!
//! Each section belongs to one pass and may be left out when that pass is not
//! run; at least one must be present. In the flat form a section is present
//! as soon as one of its keys is, and then all of its keys are required.
//!
//! Target function names are matched case-insensitively and are stored
//! lowercased. Module names keep their configured order, which is the order
//! their `USE` statements are inserted in. The prefix may be empty, in which
//! case calls keep their name and only the modules are imported.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Prefix prepended to shadowed function names.
pub const PARAM_FUNCTION_PREFIX: &str = "br_function_prefix";
/// Colon-separated names of the functions to shadow.
pub const PARAM_FUNCTION_NAMES: &str = "br_function_names";
/// Colon-separated modules providing the shadowed functions.
pub const PARAM_FUNCTION_MODULES: &str = "br_function_modules";
/// Name of the function replacing `**`.
pub const PARAM_POWER_FUNCTION: &str = "br_power_function_name";
/// Module providing the power function.
pub const PARAM_POWER_MODULE: &str = "br_power_module_name";

const SHADOW_PARAMS: [&str; 3] = [
    PARAM_FUNCTION_PREFIX,
    PARAM_FUNCTION_NAMES,
    PARAM_FUNCTION_MODULES,
];
const POWER_PARAMS: [&str; 2] = [PARAM_POWER_FUNCTION, PARAM_POWER_MODULE];

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing configuration parameter: {0}")]
    MissingParameter(String),

    #[error("configuration value '{0}' must not be empty")]
    EmptyValue(String),

    #[error("missing configuration section: {0}")]
    MissingSection(&'static str),

    #[error("configuration has neither a shadow nor a power section")]
    NoSections,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings of the call shadowing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowConfig {
    /// Prepended verbatim to the callee name
    pub prefix: String,
    /// Lowercased names of the functions to shadow
    pub functions: IndexSet<String>,
    /// Modules to `USE` in every scope containing a shadowed call
    pub modules: IndexSet<String>,
}

impl ShadowConfig {
    pub fn new<F, M>(prefix: impl Into<String>, functions: F, modules: M) -> Self
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            functions: functions
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .collect(),
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a callee name is a shadowing target, ignoring case.
    pub fn is_target(&self, name: &str) -> bool {
        self.functions.contains(&name.to_lowercase())
    }

    fn normalize(&mut self) {
        self.functions = self.functions.iter().map(|f| f.to_lowercase()).collect();
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.functions.is_empty() {
            return Err(ConfigError::EmptyValue("shadow.functions".to_string()));
        }
        if self.modules.is_empty() {
            return Err(ConfigError::EmptyValue("shadow.modules".to_string()));
        }
        Ok(())
    }
}

/// Settings of the power operator lowering pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerConfig {
    /// Callee of the generated calls
    pub function_name: String,
    /// Module providing `function_name`
    pub module_name: String,
}

impl PowerConfig {
    pub fn new(function_name: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            module_name: module_name.into(),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.function_name.is_empty() {
            return Err(ConfigError::EmptyValue("power.functionName".to_string()));
        }
        if self.module_name.is_empty() {
            return Err(ConfigError::EmptyValue("power.moduleName".to_string()));
        }
        Ok(())
    }
}

/// Full configuration of the rewriting passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerConfig>,
}

impl TransformConfig {
    pub fn new(shadow: ShadowConfig, power: PowerConfig) -> Self {
        Self {
            shadow: Some(shadow),
            power: Some(power),
        }
    }

    /// Configuration for call shadowing only.
    pub fn shadow_only(shadow: ShadowConfig) -> Self {
        Self {
            shadow: Some(shadow),
            power: None,
        }
    }

    /// Configuration for power lowering only.
    pub fn power_only(power: PowerConfig) -> Self {
        Self {
            shadow: None,
            power: Some(power),
        }
    }

    /// The call shadowing section, required by the shadowing pass.
    pub fn shadow_config(&self) -> ConfigResult<&ShadowConfig> {
        self.shadow
            .as_ref()
            .ok_or(ConfigError::MissingSection("shadow"))
    }

    /// The power lowering section, required by the lowering pass.
    pub fn power_config(&self) -> ConfigResult<&PowerConfig> {
        self.power.as_ref().ok_or(ConfigError::MissingSection("power"))
    }

    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let mut config: TransformConfig = serde_yaml::from_str(yaml)?;
        if let Some(shadow) = &mut config.shadow {
            shadow.normalize();
        }
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from the flat `br_*` parameter map.
    pub fn from_parameters(params: &IndexMap<String, String>) -> ConfigResult<Self> {
        let get = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| ConfigError::MissingParameter(key.to_string()))
        };

        let present = |keys: &[&str]| keys.iter().any(|key| params.contains_key(*key));

        let shadow = if present(&SHADOW_PARAMS) {
            Some(ShadowConfig::new(
                get(PARAM_FUNCTION_PREFIX)?,
                split_list(&get(PARAM_FUNCTION_NAMES)?),
                split_list(&get(PARAM_FUNCTION_MODULES)?),
            ))
        } else {
            None
        };
        let power = if present(&POWER_PARAMS) {
            Some(PowerConfig::new(
                get(PARAM_POWER_FUNCTION)?,
                get(PARAM_POWER_MODULE)?,
            ))
        } else {
            None
        };

        let config = Self { shadow, power };
        config.validate()?;
        Ok(config)
    }

    /// Flat `br_*` parameter form of this configuration.
    pub fn to_parameters(&self) -> IndexMap<String, String> {
        let join = |set: &IndexSet<String>| set.iter().cloned().collect::<Vec<_>>().join(":");
        let mut params = IndexMap::new();
        if let Some(shadow) = &self.shadow {
            params.insert(PARAM_FUNCTION_PREFIX.to_string(), shadow.prefix.clone());
            params.insert(PARAM_FUNCTION_NAMES.to_string(), join(&shadow.functions));
            params.insert(PARAM_FUNCTION_MODULES.to_string(), join(&shadow.modules));
        }
        if let Some(power) = &self.power {
            params.insert(PARAM_POWER_FUNCTION.to_string(), power.function_name.clone());
            params.insert(PARAM_POWER_MODULE.to_string(), power.module_name.clone());
        }
        params
    }

    /// Check that at least one section is present and every present section
    /// is complete.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.shadow.is_none() && self.power.is_none() {
            return Err(ConfigError::NoSections);
        }
        if let Some(shadow) = &self.shadow {
            shadow.validate()?;
        }
        if let Some(power) = &self.power {
            power.validate()?;
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
