use std::sync::{Arc, RwLock};

use super::connection::MBeanServerConnection;
use super::mbean::DynamicMBean;
use crate::errors::{JolokiaError, Result};
use crate::model::{JmxValue, MBeanInfo, ObjectInstance, ObjectName};

type Registration = (ObjectName, Arc<dyn DynamicMBean>);

/// MBean server holding its MBeans in memory
///
/// Queries return names in registration order.
#[derive(Default)]
pub struct InMemoryMBeanServer {
    mbeans: RwLock<Vec<Registration>>,
}

impl std::fmt::Debug for InMemoryMBeanServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMBeanServer").finish_non_exhaustive()
    }
}

impl InMemoryMBeanServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `PatternNotAllowed` for a pattern name and `InvalidRequest` if
    /// the name is already registered.
    pub fn register(&self, name: ObjectName, mbean: Arc<dyn DynamicMBean>) -> Result<()> {
        if name.is_pattern() {
            return Err(JolokiaError::PatternNotAllowed {
                name: name.to_string(),
            });
        }
        let mut mbeans = self.write()?;
        if mbeans.iter().any(|(n, _)| *n == name) {
            return Err(JolokiaError::invalid_request(format!(
                "{} is already registered",
                name
            )));
        }
        tracing::debug!(mbean = %name, "registered mbean");
        mbeans.push((name, mbean));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InstanceNotFound` if nothing is registered under `name`.
    pub fn unregister(&self, name: &ObjectName) -> Result<()> {
        let mut mbeans = self.write()?;
        let before = mbeans.len();
        mbeans.retain(|(n, _)| n != name);
        if mbeans.len() == before {
            return Err(JolokiaError::InstanceNotFound {
                mbean: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.mbeans.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Registration>>> {
        self.mbeans
            .write()
            .map_err(|_| JolokiaError::illegal_state("mbean registry poisoned"))
    }

    fn lookup(&self, name: &ObjectName) -> Result<Arc<dyn DynamicMBean>> {
        let mbeans = self
            .mbeans
            .read()
            .map_err(|_| JolokiaError::illegal_state("mbean registry poisoned"))?;
        mbeans
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, mbean)| Arc::clone(mbean))
            .ok_or_else(|| JolokiaError::InstanceNotFound {
                mbean: name.to_string(),
            })
    }
}

impl MBeanServerConnection for InMemoryMBeanServer {
    fn query_names(&self, pattern: Option<&ObjectName>) -> Result<Vec<ObjectName>> {
        let mbeans = self
            .mbeans
            .read()
            .map_err(|_| JolokiaError::illegal_state("mbean registry poisoned"))?;
        Ok(mbeans
            .iter()
            .filter(|(name, _)| pattern.map_or(true, |p| p.apply(name)))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn is_registered(&self, name: &ObjectName) -> Result<bool> {
        match self.lookup(name) {
            Ok(_) => Ok(true),
            Err(JolokiaError::InstanceNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn get_object_instance(&self, name: &ObjectName) -> Result<ObjectInstance> {
        let mbean = self.lookup(name)?;
        let info = mbean.mbean_info(name)?;
        Ok(ObjectInstance::new(name.clone(), info.class_name))
    }

    fn get_mbean_info(&self, name: &ObjectName) -> Result<MBeanInfo> {
        self.lookup(name)?.mbean_info(name)
    }

    fn get_attribute(&self, name: &ObjectName, attribute: &str) -> Result<JmxValue> {
        self.lookup(name)?.get_attribute(name, attribute)
    }

    fn set_attribute(&self, name: &ObjectName, attribute: &str, value: JmxValue) -> Result<()> {
        self.lookup(name)?.set_attribute(name, attribute, value)
    }

    fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: Vec<JmxValue>,
        signature: &[String],
    ) -> Result<JmxValue> {
        self.lookup(name)?.invoke(name, operation, params, signature)
    }

    fn interfaces_of(&self, class_name: &str) -> Result<Vec<String>> {
        let mbeans = self
            .mbeans
            .read()
            .map_err(|_| JolokiaError::illegal_state("mbean registry poisoned"))?;
        mbeans
            .iter()
            .find(|(name, mbean)| {
                mbean
                    .mbean_info(name)
                    .is_ok_and(|info| info.class_name == class_name)
            })
            .map(|(_, mbean)| mbean.interfaces())
            .ok_or_else(|| JolokiaError::Reflection {
                mbean: class_name.to_string(),
                message: format!("class {} not found", class_name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MBeanInfo;
    use crate::server::SimpleMBean;

    fn on(name: &str) -> ObjectName {
        ObjectName::parse(name).unwrap()
    }

    fn server() -> InMemoryMBeanServer {
        let server = InMemoryMBeanServer::new();
        for name in ["b:type=One", "a:type=Two", "a:type=Three,name=x"] {
            server
                .register(
                    on(name),
                    Arc::new(SimpleMBean::new(MBeanInfo::new("test.Bean", ""))),
                )
                .unwrap();
        }
        server
    }

    #[test]
    fn test_query_keeps_registration_order() {
        let names = server().query_names(None).unwrap();
        let rendered: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        assert_eq!(rendered, vec!["b:type=One", "a:type=Two", "a:type=Three,name=x"]);
    }

    #[test]
    fn test_query_with_pattern() {
        let names = server().query_names(Some(&on("a:*"))).unwrap();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_register_rejects_duplicates_and_patterns() {
        let server = server();
        let bean = Arc::new(SimpleMBean::new(MBeanInfo::new("x", "")));
        assert!(server.register(on("b:type=One"), bean.clone()).is_err());
        assert!(matches!(
            server.register(on("b:*"), bean),
            Err(JolokiaError::PatternNotAllowed { .. })
        ));
    }

    #[test]
    fn test_unknown_mbean() {
        let server = server();
        assert!(!server.is_registered(&on("c:type=None")).unwrap());
        assert!(matches!(
            server.get_mbean_info(&on("c:type=None")),
            Err(JolokiaError::InstanceNotFound { .. })
        ));
        server.unregister(&on("b:type=One")).unwrap();
        assert_eq!(server.len(), 2);
    }
}
