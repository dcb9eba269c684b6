use std::collections::HashSet;
use std::sync::Arc;

use super::connection::MBeanServerConnection;
use crate::errors::{JolokiaError, Result};
use crate::model::ObjectName;

/// Connection together with one MBean it hosts
pub type Located = (Arc<dyn MBeanServerConnection>, ObjectName);

/// Merged view over every MBean server the agent can see
///
/// Names registered on more than one server are reported once, for the first
/// server in registration order.
#[derive(Clone, Default)]
pub struct MBeanServerAccess {
    servers: Vec<Arc<dyn MBeanServerConnection>>,
}

impl MBeanServerAccess {
    pub fn new(servers: Vec<Arc<dyn MBeanServerConnection>>) -> Self {
        Self { servers }
    }

    pub fn single(server: Arc<dyn MBeanServerConnection>) -> Self {
        Self::new(vec![server])
    }

    pub fn servers(&self) -> &[Arc<dyn MBeanServerConnection>] {
        &self.servers
    }

    /// Names matching `pattern` across all servers, de-duplicated
    ///
    /// # Errors
    ///
    /// Returns the first server error encountered.
    pub fn query_names(&self, pattern: Option<&ObjectName>) -> Result<Vec<Located>> {
        let mut seen = HashSet::new();
        let mut located = Vec::new();
        for server in &self.servers {
            for name in server.query_names(pattern)? {
                if seen.insert(name.clone()) {
                    located.push((Arc::clone(server), name));
                }
            }
        }
        tracing::debug!(
            pattern = pattern.map(ObjectName::to_string).unwrap_or_default(),
            mbean_count = located.len(),
            "queried mbean servers"
        );
        Ok(located)
    }

    /// First server hosting `name`
    ///
    /// # Errors
    ///
    /// Returns `InstanceNotFound` if no server hosts it.
    pub fn find_connection(&self, name: &ObjectName) -> Result<Arc<dyn MBeanServerConnection>> {
        for server in &self.servers {
            if server.is_registered(name)? {
                return Ok(Arc::clone(server));
            }
        }
        Err(JolokiaError::InstanceNotFound {
            mbean: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MBeanInfo;
    use crate::server::{InMemoryMBeanServer, SimpleMBean};

    fn on(name: &str) -> ObjectName {
        ObjectName::parse(name).unwrap()
    }

    fn server_with(names: &[&str], class_name: &str) -> Arc<dyn MBeanServerConnection> {
        let server = Arc::new(InMemoryMBeanServer::new());
        for name in names {
            server
                .register(
                    on(name),
                    Arc::new(SimpleMBean::new(MBeanInfo::new(class_name, ""))),
                )
                .unwrap();
        }
        server
    }

    #[test]
    fn test_merged_query_deduplicates_first_server_wins() {
        let first = server_with(&["d:b=2,a=1", "d:x=1"], "First");
        let second = server_with(&["d:a=1,b=2", "d:y=1"], "Second");
        let access = MBeanServerAccess::new(vec![first, second]);

        let located = access.query_names(None).unwrap();
        let names: Vec<String> = located.iter().map(|(_, n)| n.to_string()).collect();
        assert_eq!(names, vec!["d:b=2,a=1", "d:x=1", "d:y=1"]);

        let info = located[0].0.get_mbean_info(&located[0].1).unwrap();
        assert_eq!(info.class_name, "First");
    }

    #[test]
    fn test_find_connection() {
        let first = server_with(&["d:x=1"], "First");
        let second = server_with(&["d:y=1"], "Second");
        let access = MBeanServerAccess::new(vec![first, second]);

        let conn = access.find_connection(&on("d:y=1")).unwrap();
        assert_eq!(conn.get_mbean_info(&on("d:y=1")).unwrap().class_name, "Second");
        assert!(matches!(
            access.find_connection(&on("d:z=1")),
            Err(JolokiaError::InstanceNotFound { .. })
        ));
    }
}
