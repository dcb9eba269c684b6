//! Subcommands
//!
//! Each subcommand turns its arguments into a [`JolokiaRequest`]; the request
//! is then executed by the dispatcher against the fixture server.

pub mod exec;
pub mod list;
pub mod read;
pub mod search;
pub mod write;

use jolokia_core::errors::Result;
use jolokia_core::handler::RequestValue;
use jolokia_core::model::ObjectName;
use jolokia_core::path::parse_path;

pub(crate) fn object_name(name: &str) -> Result<ObjectName> {
    ObjectName::parse(name)
}

/// Inner path in GET notation, `!/` escaping a slash
pub(crate) fn inner_path(path: Option<&str>) -> Vec<String> {
    path.map(parse_path).unwrap_or_default()
}

/// Command line values use the GET string conventions
pub(crate) fn text_value(value: &str) -> RequestValue {
    RequestValue::Text(value.to_string())
}
