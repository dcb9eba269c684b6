use crate::errors::{JolokiaError, Result};
use crate::model::{JmxValue, MBeanInfo, ObjectInstance, ObjectName};

/// Access to one MBean server, local or remote
///
/// Every call may block. Implementations report connection failures as `Io`
/// and unknown MBeans as `InstanceNotFound`.
pub trait MBeanServerConnection: Send + Sync {
    /// Names of registered MBeans matching `pattern` (all MBeans for `None`)
    ///
    /// # Errors
    ///
    /// Returns `Io` if the server cannot be reached.
    fn query_names(&self, pattern: Option<&ObjectName>) -> Result<Vec<ObjectName>>;

    /// # Errors
    ///
    /// Returns `Io` if the server cannot be reached.
    fn is_registered(&self, name: &ObjectName) -> Result<bool>;

    /// # Errors
    ///
    /// Returns `InstanceNotFound` for an unknown MBean.
    fn get_object_instance(&self, name: &ObjectName) -> Result<ObjectInstance>;

    /// # Errors
    ///
    /// Returns `InstanceNotFound`, `Introspection`, `Reflection` or `Io`.
    fn get_mbean_info(&self, name: &ObjectName) -> Result<MBeanInfo>;

    /// # Errors
    ///
    /// Returns `InstanceNotFound`, `AttributeNotFound` or the MBean's own error.
    fn get_attribute(&self, name: &ObjectName, attribute: &str) -> Result<JmxValue>;

    /// # Errors
    ///
    /// Returns `InstanceNotFound`, `AttributeNotFound`, `AttributeNotWritable`
    /// or the MBean's own error.
    fn set_attribute(&self, name: &ObjectName, attribute: &str, value: JmxValue) -> Result<()>;

    /// Invoke the operation overload identified by `signature`
    ///
    /// # Errors
    ///
    /// Returns `InstanceNotFound`, `OperationNotFound` or the MBean's own error.
    fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: Vec<JmxValue>,
        signature: &[String],
    ) -> Result<JmxValue>;

    /// Interfaces implemented by the class `class_name`, best effort
    ///
    /// # Errors
    ///
    /// Returns `Reflection` when the class cannot be resolved.
    fn interfaces_of(&self, class_name: &str) -> Result<Vec<String>> {
        Err(JolokiaError::Reflection {
            mbean: class_name.to_string(),
            message: "class resolution not supported by this connection".to_string(),
        })
    }
}
