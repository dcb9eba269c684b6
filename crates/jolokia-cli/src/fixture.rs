//! MBean fixtures
//!
//! A fixture file describes the MBeans of an in-memory server:
//!
//! ```json
//! {"mbeans": [{
//!     "name": "java.lang:type=Memory",
//!     "info": {"className": "sun.management.MemoryImpl",
//!              "attributes": [{"name": "Verbose", "type": "boolean", "writable": true}]},
//!     "attributes": {"Verbose": false},
//!     "interfaces": ["java.lang.management.MemoryMXBean"]
//! }]}
//! ```
//!
//! Attribute values are converted with the declared attribute type.

use std::path::Path;
use std::sync::Arc;

use jolokia_core::errors::{JolokiaError, Result};
use jolokia_core::model::{MBeanInfo, ObjectName};
use jolokia_core::serialize::from_json;
use jolokia_core::server::{InMemoryMBeanServer, SimpleMBean};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    mbeans: Vec<FixtureMBean>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureMBean {
    name: ObjectName,
    info: MBeanInfo,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    interfaces: Vec<String>,
}

impl FixtureMBean {
    fn into_mbean(self) -> Result<(ObjectName, SimpleMBean)> {
        let mut values = Vec::with_capacity(self.attributes.len());
        for (attribute, json) in &self.attributes {
            let info = self
                .info
                .attribute(attribute)
                .ok_or_else(|| JolokiaError::AttributeNotFound {
                    mbean: self.name.to_string(),
                    attribute: attribute.clone(),
                })?;
            values.push((
                attribute.clone(),
                from_json(&info.type_name, json, info.open_type.as_ref())?,
            ));
        }
        let mbean = values
            .into_iter()
            .fold(SimpleMBean::new(self.info), |mbean, (name, value)| {
                mbean.with_value(name, value)
            })
            .with_interfaces(self.interfaces);
        Ok((self.name, mbean))
    }
}

/// Build a server from fixture JSON
///
/// # Errors
///
/// Returns `Serialization` for malformed JSON, `AttributeNotFound` for a
/// value of an undeclared attribute, `ValueConversion` for a value that does
/// not fit its type and `InvalidRequest` for duplicate names.
pub fn from_str(contents: &str) -> Result<InMemoryMBeanServer> {
    let fixture: Fixture = serde_json::from_str(contents)?;
    let server = InMemoryMBeanServer::new();
    for entry in fixture.mbeans {
        let (name, mbean) = entry.into_mbean()?;
        server.register(name, Arc::new(mbean))?;
    }
    Ok(server)
}

/// # Errors
///
/// Returns `Config` if the file cannot be read, otherwise see [`from_str`].
pub fn load(path: &Path) -> Result<InMemoryMBeanServer> {
    let contents = std::fs::read_to_string(path).map_err(|e| JolokiaError::Config {
        message: format!("cannot read fixture {}: {}", path.display(), e),
    })?;
    from_str(&contents)
}
