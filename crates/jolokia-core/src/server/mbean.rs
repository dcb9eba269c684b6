//! MBean implementations hosted by the in-memory server

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::errors::{JolokiaError, Result};
use crate::model::{JmxValue, MBeanInfo, ObjectName};

/// An MBean whose management interface is discovered at runtime
pub trait DynamicMBean: Send + Sync {
    /// # Errors
    ///
    /// Returns `Introspection` when the metadata cannot be built.
    fn mbean_info(&self, name: &ObjectName) -> Result<MBeanInfo>;

    /// # Errors
    ///
    /// Returns `AttributeNotFound`, `AttributeNotReadable` or a getter error.
    fn get_attribute(&self, name: &ObjectName, attribute: &str) -> Result<JmxValue>;

    /// # Errors
    ///
    /// Returns `AttributeNotFound`, `AttributeNotWritable` or a setter error.
    fn set_attribute(&self, name: &ObjectName, attribute: &str, value: JmxValue) -> Result<()>;

    /// # Errors
    ///
    /// Returns `OperationNotFound` or the operation's own error.
    fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: Vec<JmxValue>,
        signature: &[String],
    ) -> Result<JmxValue>;

    /// Interfaces of the implementation class
    fn interfaces(&self) -> Vec<String> {
        Vec::new()
    }
}

pub type OperationFn = Arc<dyn Fn(&[JmxValue]) -> Result<JmxValue> + Send + Sync>;

/// Table driven MBean
///
/// Attribute values live in a table keyed by attribute name; operations are
/// closures keyed by their `name(type,...)` signature. Operations declared in
/// the metadata without a handler return `null`.
pub struct SimpleMBean {
    info: MBeanInfo,
    values: RwLock<HashMap<String, JmxValue>>,
    operations: HashMap<String, OperationFn>,
    interfaces: Vec<String>,
    info_failure: Option<JolokiaError>,
}

impl fmt::Debug for SimpleMBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleMBean")
            .field("class_name", &self.info.class_name)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SimpleMBean {
    pub fn new(info: MBeanInfo) -> Self {
        Self {
            info,
            values: RwLock::new(HashMap::new()),
            operations: HashMap::new(),
            interfaces: Vec::new(),
            info_failure: None,
        }
    }

    pub fn with_value(self, attribute: impl Into<String>, value: impl Into<JmxValue>) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert(attribute.into(), value.into());
        }
        self
    }

    /// Handler for the overload with signature `name(type,...)`
    pub fn with_operation<F>(mut self, signature: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[JmxValue]) -> Result<JmxValue> + Send + Sync + 'static,
    {
        self.operations.insert(signature.into(), Arc::new(handler));
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<String>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Make every metadata request fail with `error`
    pub fn with_info_failure(mut self, error: JolokiaError) -> Self {
        self.info_failure = Some(error);
        self
    }

    pub fn class_name(&self) -> &str {
        &self.info.class_name
    }
}

impl DynamicMBean for SimpleMBean {
    fn mbean_info(&self, _name: &ObjectName) -> Result<MBeanInfo> {
        match &self.info_failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.info.clone()),
        }
    }

    fn get_attribute(&self, name: &ObjectName, attribute: &str) -> Result<JmxValue> {
        let info = self
            .info
            .attribute(attribute)
            .ok_or_else(|| JolokiaError::AttributeNotFound {
                mbean: name.to_string(),
                attribute: attribute.to_string(),
            })?;
        if !info.readable {
            return Err(JolokiaError::AttributeNotReadable {
                mbean: name.to_string(),
                attribute: attribute.to_string(),
            });
        }
        let values = self
            .values
            .read()
            .map_err(|_| JolokiaError::illegal_state("attribute table poisoned"))?;
        Ok(values.get(attribute).cloned().unwrap_or(JmxValue::Null))
    }

    fn set_attribute(&self, name: &ObjectName, attribute: &str, value: JmxValue) -> Result<()> {
        let info = self
            .info
            .attribute(attribute)
            .ok_or_else(|| JolokiaError::AttributeNotFound {
                mbean: name.to_string(),
                attribute: attribute.to_string(),
            })?;
        if !info.writable {
            return Err(JolokiaError::AttributeNotWritable {
                mbean: name.to_string(),
                attribute: attribute.to_string(),
            });
        }
        let mut values = self
            .values
            .write()
            .map_err(|_| JolokiaError::illegal_state("attribute table poisoned"))?;
        values.insert(attribute.to_string(), value);
        Ok(())
    }

    fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: Vec<JmxValue>,
        signature: &[String],
    ) -> Result<JmxValue> {
        let declared = self
            .info
            .operations_named(operation)
            .into_iter()
            .find(|op| op.signature_types() == signature)
            .ok_or_else(|| JolokiaError::OperationNotFound {
                mbean: name.to_string(),
                operation: format!("{}({})", operation, signature.join(",")),
            })?;
        match self.operations.get(&declared.signature_string()) {
            Some(handler) => handler(&params),
            None => Ok(JmxValue::Null),
        }
    }

    fn interfaces(&self) -> Vec<String> {
        self.interfaces.clone()
    }
}
