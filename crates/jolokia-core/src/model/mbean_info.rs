//! MBean metadata as reported by an MBean server
//!
//! These are plain data carriers. They are serde (de)serializable so that a
//! server snapshot can be loaded from JSON (see the CLI fixture format); the
//! list engine never serializes them directly but renders its own JSON shape.

use serde::{Deserialize, Serialize};

use super::object_name::ObjectName;
use super::open_type::OpenType;

/// Complete metadata of one MBean
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MBeanInfo {
    pub class_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<MBeanAttributeInfo>,
    #[serde(default)]
    pub constructors: Vec<MBeanConstructorInfo>,
    #[serde(default)]
    pub operations: Vec<MBeanOperationInfo>,
    #[serde(default)]
    pub notifications: Vec<MBeanNotificationInfo>,
}

impl MBeanInfo {
    pub fn new(class_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attribute: MBeanAttributeInfo) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_operation(mut self, operation: MBeanOperationInfo) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_constructor(mut self, constructor: MBeanConstructorInfo) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_notification(mut self, notification: MBeanNotificationInfo) -> Self {
        self.notifications.push(notification);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&MBeanAttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// All overloads of one operation, in declaration order
    pub fn operations_named(&self, name: &str) -> Vec<&MBeanOperationInfo> {
        self.operations.iter().filter(|op| op.name == name).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MBeanAttributeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
    /// Boolean attribute exposed through an `isXxx` getter
    #[serde(default)]
    pub is: bool,
    /// Declared open type, used to deserialize complex written values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_type: Option<OpenType>,
}

fn default_true() -> bool {
    true
}

impl MBeanAttributeInfo {
    /// Read-only attribute
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            description: Some(description.into()),
            readable: true,
            writable: false,
            is: false,
            open_type: None,
        }
    }

    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self.writable = true;
        self
    }

    pub fn is_getter(mut self) -> Self {
        self.is = true;
        self
    }

    pub fn with_open_type(mut self, open_type: OpenType) -> Self {
        self.open_type = Some(open_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MBeanParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl MBeanParameterInfo {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            description: Some(description.into()),
        }
    }
}

/// Operation impact as declared by the MBean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Impact {
    Info,
    Action,
    ActionInfo,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MBeanOperationInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub signature: Vec<MBeanParameterInfo>,
    pub return_type: String,
    #[serde(default)]
    pub impact: Impact,
}

impl MBeanOperationInfo {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            signature: Vec::new(),
            return_type: return_type.into(),
            impact: Impact::Unknown,
        }
    }

    pub fn with_param(mut self, param: MBeanParameterInfo) -> Self {
        self.signature.push(param);
        self
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    /// Parameter types in declaration order
    pub fn signature_types(&self) -> Vec<String> {
        self.signature.iter().map(|p| p.type_name.clone()).collect()
    }

    /// `name(type1,type2)`, the form exec requests use to pick an overload
    pub fn signature_string(&self) -> String {
        format!("{}({})", self.name, self.signature_types().join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MBeanConstructorInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub signature: Vec<MBeanParameterInfo>,
}

impl MBeanConstructorInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            signature: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: MBeanParameterInfo) -> Self {
        self.signature.push(param);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MBeanNotificationInfo {
    /// Class name of the emitted notification
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notif_types: Vec<String>,
}

impl MBeanNotificationInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        notif_types: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            notif_types,
        }
    }
}

/// Name and implementation class of a registered MBean
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInstance {
    pub object_name: ObjectName,
    pub class_name: String,
}

impl ObjectInstance {
    pub fn new(object_name: ObjectName, class_name: impl Into<String>) -> Self {
        Self {
            object_name,
            class_name: class_name.into(),
        }
    }
}
