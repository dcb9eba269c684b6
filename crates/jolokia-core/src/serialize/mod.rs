//! Conversion of runtime values to and from JSON
//!
//! [`Serializer`] turns [`JmxValue`](crate::model::JmxValue) graphs into JSON
//! within depth, collection-size and object-count limits. The functions in
//! [`deserializer`] convert request JSON back into typed values for writes
//! and operation arguments.

pub mod deserializer;
pub mod inner_path;
pub mod serializer;

pub use deserializer::{from_json, from_string};
pub use inner_path::extract_path;
pub use serializer::Serializer;

use crate::config::{AgentConfig, DateFormat, LongFormat};
use crate::errors::{JolokiaError, Result};

/// Marker appended to truncated collections
pub const TRUNCATION_MARKER: &str = "...";

/// What to do with a value that cannot be serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultHandler {
    #[default]
    Throwing,
    /// Leave the value out
    Ignoring,
}

impl FaultHandler {
    pub fn from_ignore_errors(ignore_errors: bool) -> Self {
        if ignore_errors {
            FaultHandler::Ignoring
        } else {
            FaultHandler::Throwing
        }
    }

    /// # Errors
    ///
    /// Returns `err` unchanged when throwing.
    pub fn handle<T>(&self, err: JolokiaError) -> Result<Option<T>> {
        match self {
            FaultHandler::Throwing => Err(err),
            FaultHandler::Ignoring => {
                tracing::debug!(error = %err, "ignoring value fault");
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    pub max_depth: Option<usize>,
    pub max_collection_size: Option<usize>,
    pub max_objects: Option<usize>,
    pub fault_handler: FaultHandler,
    pub long_format: LongFormat,
    pub date_format: DateFormat,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_collection_size: None,
            max_objects: None,
            fault_handler: FaultHandler::Throwing,
            long_format: LongFormat::Number,
            date_format: DateFormat::Iso8601,
        }
    }
}

impl SerializeOptions {
    /// Limits of `0` in the config mean unlimited
    pub fn from_config(config: &AgentConfig) -> Self {
        let limit = |v: usize| Some(v).filter(|v| *v > 0);
        Self {
            max_depth: limit(config.max_depth),
            max_collection_size: limit(config.max_collection_size),
            max_objects: limit(config.max_objects),
            fault_handler: FaultHandler::from_ignore_errors(config.ignore_errors),
            long_format: config.serialize_long,
            date_format: config.date_format.clone(),
        }
    }
}
