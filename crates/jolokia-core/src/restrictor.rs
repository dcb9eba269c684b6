//! Access restrictor trait and implementations
//!
//! The restrictor decides which request types may run and which MBeans,
//! attributes and operations a client may see. Denied members are left out of
//! `list` output silently; direct access to them fails with `AccessDenied`.

use std::path::Path;

use serde::Deserialize;

use crate::errors::{JolokiaError, Result};
use crate::handler::RequestType;
use crate::model::object_name::wildcard_match;
use crate::model::ObjectName;

/// Access policy consulted by every request handler
pub trait Restrictor: Send + Sync {
    fn is_type_allowed(&self, request_type: RequestType) -> bool;

    /// Hidden MBeans do not show up in list or search results at all
    fn is_object_name_hidden(&self, name: &ObjectName) -> bool;

    fn is_attribute_read_allowed(&self, name: &ObjectName, attribute: &str) -> bool;

    fn is_attribute_write_allowed(&self, name: &ObjectName, attribute: &str) -> bool;

    fn is_operation_allowed(&self, name: &ObjectName, operation: &str) -> bool;

    /// Whether member decisions for `name` may differ from those for other
    /// MBeans
    ///
    /// The list cache shares one entry between MBeans, so it is bypassed for
    /// MBeans with name specific decisions.
    fn has_name_specific_rules(&self, _name: &ObjectName) -> bool {
        true
    }
}

/// Restrictor that allows everything
///
/// # Example
/// ```
/// use jolokia_core::restrictor::{AllowAllRestrictor, Restrictor};
/// use jolokia_core::model::ObjectName;
///
/// let name = ObjectName::parse("java.lang:type=Memory").unwrap();
/// assert!(AllowAllRestrictor.is_attribute_read_allowed(&name, "HeapMemoryUsage"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllRestrictor;

impl Restrictor for AllowAllRestrictor {
    fn is_type_allowed(&self, _request_type: RequestType) -> bool {
        true
    }

    fn is_object_name_hidden(&self, _name: &ObjectName) -> bool {
        false
    }

    fn is_attribute_read_allowed(&self, _name: &ObjectName, _attribute: &str) -> bool {
        true
    }

    fn is_attribute_write_allowed(&self, _name: &ObjectName, _attribute: &str) -> bool {
        true
    }

    fn is_operation_allowed(&self, _name: &ObjectName, _operation: &str) -> bool {
        true
    }

    fn has_name_specific_rules(&self, _name: &ObjectName) -> bool {
        false
    }
}

/// Restrictor that denies every request
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllRestrictor;

impl Restrictor for DenyAllRestrictor {
    fn is_type_allowed(&self, _request_type: RequestType) -> bool {
        false
    }

    fn is_object_name_hidden(&self, _name: &ObjectName) -> bool {
        true
    }

    fn is_attribute_read_allowed(&self, _name: &ObjectName, _attribute: &str) -> bool {
        false
    }

    fn is_attribute_write_allowed(&self, _name: &ObjectName, _attribute: &str) -> bool {
        false
    }

    fn is_operation_allowed(&self, _name: &ObjectName, _operation: &str) -> bool {
        false
    }

    fn has_name_specific_rules(&self, _name: &ObjectName) -> bool {
        false
    }
}

/// Deny rule for the members of all MBeans matching `mbean`
///
/// Member names may use `*` and `?` wildcards.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccessRule {
    pub mbean: ObjectName,
    #[serde(default)]
    pub deny_read: Vec<String>,
    #[serde(default)]
    pub deny_write: Vec<String>,
    #[serde(default)]
    pub deny_operations: Vec<String>,
}

impl AccessRule {
    fn covers(&self, name: &ObjectName) -> bool {
        if self.mbean.is_pattern() {
            self.mbean.apply(name)
        } else {
            self.mbean == *name
        }
    }
}

fn any_matches(patterns: &[String], member: &str) -> bool {
    patterns.iter().any(|p| wildcard_match(p, member))
}

/// Rule based restrictor
///
/// # Example
/// ```
/// use jolokia_core::restrictor::{Restrictor, RuleRestrictor};
/// use jolokia_core::model::ObjectName;
///
/// let restrictor = RuleRestrictor::from_toml_str(r#"
///     hidden = ["secret:*"]
///
///     [[rules]]
///     mbean = "java.lang:type=Memory"
///     denyWrite = ["*"]
/// "#).unwrap();
///
/// let memory = ObjectName::parse("java.lang:type=Memory").unwrap();
/// assert!(!restrictor.is_attribute_write_allowed(&memory, "Verbose"));
/// assert!(restrictor.is_object_name_hidden(&ObjectName::parse("secret:x=1").unwrap()));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleRestrictor {
    /// Allowed request types, all types when absent
    #[serde(default)]
    allowed_types: Option<Vec<RequestType>>,
    #[serde(default)]
    hidden: Vec<ObjectName>,
    #[serde(default)]
    rules: Vec<AccessRule>,
}

impl RuleRestrictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `Config` if the TOML is malformed.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| JolokiaError::Config {
            message: format!("restrictor policy: {}", e),
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

    pub fn allow_types(mut self, types: Vec<RequestType>) -> Self {
        self.allowed_types = Some(types);
        self
    }

    pub fn hide(mut self, pattern: ObjectName) -> Self {
        self.hidden.push(pattern);
        self
    }

    pub fn with_rule(mut self, rule: AccessRule) -> Self {
        self.rules.push(rule);
        self
    }

    fn denied<F>(&self, name: &ObjectName, member: &str, select: F) -> bool
    where
        F: Fn(&AccessRule) -> &[String],
    {
        self.rules
            .iter()
            .any(|rule| rule.covers(name) && any_matches(select(rule), member))
    }
}

impl Restrictor for RuleRestrictor {
    fn is_type_allowed(&self, request_type: RequestType) -> bool {
        self.allowed_types
            .as_ref()
            .map_or(true, |types| types.contains(&request_type))
    }

    fn is_object_name_hidden(&self, name: &ObjectName) -> bool {
        self.hidden.iter().any(|pattern| {
            if pattern.is_pattern() {
                pattern.apply(name)
            } else {
                pattern == name
            }
        })
    }

    fn is_attribute_read_allowed(&self, name: &ObjectName, attribute: &str) -> bool {
        !self.denied(name, attribute, |r| &r.deny_read)
    }

    fn is_attribute_write_allowed(&self, name: &ObjectName, attribute: &str) -> bool {
        !self.denied(name, attribute, |r| &r.deny_write)
    }

    fn is_operation_allowed(&self, name: &ObjectName, operation: &str) -> bool {
        !self.denied(name, operation, |r| &r.deny_operations)
    }

    fn has_name_specific_rules(&self, name: &ObjectName) -> bool {
        self.rules.iter().any(|rule| rule.covers(name))
    }
}
