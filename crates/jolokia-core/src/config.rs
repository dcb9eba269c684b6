//! Agent configuration and per-request processing parameters
//!
//! `AgentConfig` is loaded once (TOML file, then `JOLOKIA_*` environment
//! overrides). A request may override individual keys through its
//! `ProcessingParameters`; `resolve` yields the effective config for that
//! request.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{JolokiaError, Result};

pub const ENV_PREFIX: &str = "JOLOKIA_";

/// How `long` values are rendered in JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongFormat {
    #[default]
    Number,
    String,
}

/// How dates are rendered in JSON
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DateFormat {
    /// RFC 3339 with offset
    #[default]
    Iso8601,
    EpochMillis,
    EpochSeconds,
    EpochNanos,
    /// chrono `strftime` pattern
    Pattern(String),
}

impl From<String> for DateFormat {
    fn from(value: String) -> Self {
        match value.as_str() {
            "iso8601" | "ISO8601" => DateFormat::Iso8601,
            "millis" | "unix" => DateFormat::EpochMillis,
            "seconds" => DateFormat::EpochSeconds,
            "nanos" => DateFormat::EpochNanos,
            _ => DateFormat::Pattern(value),
        }
    }
}

impl From<DateFormat> for String {
    fn from(value: DateFormat) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Iso8601 => write!(f, "iso8601"),
            DateFormat::EpochMillis => write!(f, "millis"),
            DateFormat::EpochSeconds => write!(f, "seconds"),
            DateFormat::EpochNanos => write!(f, "nanos"),
            DateFormat::Pattern(p) => write!(f, "{}", p),
        }
    }
}

/// Keys a request may override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    MaxDepth,
    MaxCollectionSize,
    MaxObjects,
    CanonicalNaming,
    ListKeys,
    ListCache,
    ListInterfaces,
    IgnoreErrors,
    SerializeLong,
    DateFormat,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 10] = [
        ConfigKey::MaxDepth,
        ConfigKey::MaxCollectionSize,
        ConfigKey::MaxObjects,
        ConfigKey::CanonicalNaming,
        ConfigKey::ListKeys,
        ConfigKey::ListCache,
        ConfigKey::ListInterfaces,
        ConfigKey::IgnoreErrors,
        ConfigKey::SerializeLong,
        ConfigKey::DateFormat,
    ];

    /// Name used in request parameters and config files
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::MaxDepth => "maxDepth",
            ConfigKey::MaxCollectionSize => "maxCollectionSize",
            ConfigKey::MaxObjects => "maxObjects",
            ConfigKey::CanonicalNaming => "canonicalNaming",
            ConfigKey::ListKeys => "listKeys",
            ConfigKey::ListCache => "listCache",
            ConfigKey::ListInterfaces => "listInterfaces",
            ConfigKey::IgnoreErrors => "ignoreErrors",
            ConfigKey::SerializeLong => "serializeLong",
            ConfigKey::DateFormat => "dateFormat",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// `maxCollectionSize` -> `JOLOKIA_MAX_COLLECTION_SIZE`
    pub fn env_var(&self) -> String {
        let mut var = String::from(ENV_PREFIX);
        for c in self.name().chars() {
            if c.is_ascii_uppercase() {
                var.push('_');
            }
            var.push(c.to_ascii_uppercase());
        }
        var
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AgentConfig {
    /// Maximum traversal depth, `0` for unlimited
    pub max_depth: usize,
    pub max_collection_size: usize,
    pub max_objects: usize,
    pub canonical_naming: bool,
    pub list_keys: bool,
    pub list_cache: bool,
    pub list_interfaces: bool,
    pub ignore_errors: bool,
    pub serialize_long: LongFormat,
    pub date_format: DateFormat,
    /// Namespace prefix prepended to every domain as `<provider>@<domain>`
    pub provider: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_collection_size: 0,
            max_objects: 0,
            canonical_naming: true,
            list_keys: false,
            list_cache: false,
            list_interfaces: false,
            ignore_errors: false,
            serialize_long: LongFormat::Number,
            date_format: DateFormat::Iso8601,
            provider: None,
        }
    }
}

impl AgentConfig {
    /// # Errors
    ///
    /// Returns `Config` if the TOML is malformed or names an unknown key.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| JolokiaError::Config {
            message: e.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| JolokiaError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply `JOLOKIA_<KEY>` variables from the process environment
    ///
    /// # Errors
    ///
    /// Returns `Config` if a variable holds an invalid value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides looked up by environment variable name
    ///
    /// # Errors
    ///
    /// Returns `Config` if a looked-up value is invalid.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut params = ProcessingParameters::default();
        for key in ConfigKey::ALL {
            let var = key.env_var();
            if let Some(raw) = lookup(&var) {
                params.set(key, &raw).map_err(|reason| JolokiaError::Config {
                    message: format!("{}: {}", var, reason),
                })?;
            }
        }
        if let Some(provider) = lookup(&format!("{}PROVIDER", ENV_PREFIX)) {
            self.provider = Some(provider).filter(|p| !p.is_empty());
        }
        *self = params.resolve(self);
        Ok(())
    }

    /// Depth limit for traversals, `None` when unrestricted
    pub fn effective_max_depth(&self) -> Option<usize> {
        Some(self.max_depth).filter(|d| *d > 0)
    }
}

/// Per-request overrides of [`AgentConfig`] keys
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessingParameters {
    pub max_depth: Option<usize>,
    pub max_collection_size: Option<usize>,
    pub max_objects: Option<usize>,
    pub canonical_naming: Option<bool>,
    pub list_keys: Option<bool>,
    pub list_cache: Option<bool>,
    pub list_interfaces: Option<bool>,
    pub ignore_errors: Option<bool>,
    pub serialize_long: Option<LongFormat>,
    pub date_format: Option<DateFormat>,
}

fn parse_usize(raw: &str) -> std::result::Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a non-negative integer", raw))
}

fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!("'{}' is not a boolean", raw)),
    }
}

impl ProcessingParameters {
    /// Parse the `config` object of a request
    ///
    /// Values may be JSON strings, numbers or booleans. Unknown keys are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a value of the wrong shape.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let mut params = Self::default();
        let map = match value {
            serde_json::Value::Null => return Ok(params),
            serde_json::Value::Object(map) => map,
            other => {
                return Err(JolokiaError::invalid_request(format!(
                    "config must be an object, got {}",
                    other
                )))
            }
        };
        for (name, raw) in map {
            let Some(key) = ConfigKey::from_name(name) else {
                continue;
            };
            let raw = match raw {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(JolokiaError::invalid_request(format!(
                        "invalid value {} for {}",
                        other, name
                    )))
                }
            };
            params
                .set(key, &raw)
                .map_err(|reason| JolokiaError::invalid_request(format!("{}: {}", name, reason)))?;
        }
        Ok(params)
    }

    /// Set one key from its string form
    ///
    /// # Errors
    ///
    /// Returns the reason when `raw` is not a valid value for `key`.
    pub fn set(&mut self, key: ConfigKey, raw: &str) -> std::result::Result<(), String> {
        match key {
            ConfigKey::MaxDepth => self.max_depth = Some(parse_usize(raw)?),
            ConfigKey::MaxCollectionSize => self.max_collection_size = Some(parse_usize(raw)?),
            ConfigKey::MaxObjects => self.max_objects = Some(parse_usize(raw)?),
            ConfigKey::CanonicalNaming => self.canonical_naming = Some(parse_bool(raw)?),
            ConfigKey::ListKeys => self.list_keys = Some(parse_bool(raw)?),
            ConfigKey::ListCache => self.list_cache = Some(parse_bool(raw)?),
            ConfigKey::ListInterfaces => self.list_interfaces = Some(parse_bool(raw)?),
            ConfigKey::IgnoreErrors => self.ignore_errors = Some(parse_bool(raw)?),
            ConfigKey::SerializeLong => {
                self.serialize_long = Some(match raw.trim() {
                    "number" => LongFormat::Number,
                    "string" => LongFormat::String,
                    other => return Err(format!("'{}' is neither number nor string", other)),
                })
            }
            ConfigKey::DateFormat => {
                if raw.trim().is_empty() {
                    return Err("date format must not be empty".to_string());
                }
                self.date_format = Some(DateFormat::from(raw.trim().to_string()))
            }
        }
        Ok(())
    }

    /// Effective configuration for one request
    pub fn resolve(&self, base: &AgentConfig) -> AgentConfig {
        AgentConfig {
            max_depth: self.max_depth.unwrap_or(base.max_depth),
            max_collection_size: self.max_collection_size.unwrap_or(base.max_collection_size),
            max_objects: self.max_objects.unwrap_or(base.max_objects),
            canonical_naming: self.canonical_naming.unwrap_or(base.canonical_naming),
            list_keys: self.list_keys.unwrap_or(base.list_keys),
            list_cache: self.list_cache.unwrap_or(base.list_cache),
            list_interfaces: self.list_interfaces.unwrap_or(base.list_interfaces),
            ignore_errors: self.ignore_errors.unwrap_or(base.ignore_errors),
            serialize_long: self.serialize_long.unwrap_or(base.serialize_long),
            date_format: self
                .date_format
                .clone()
                .unwrap_or_else(|| base.date_format.clone()),
            provider: base.provider.clone(),
        }
    }
}
