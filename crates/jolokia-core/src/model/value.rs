//! Runtime values held by MBean attributes and passed to operations
//!
//! `JmxValue` is the dynamically typed value graph the serializer walks. Beans
//! are shared through `Arc` so that a graph may contain back references.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use super::object_name::ObjectName;
use super::open_type::{CompositeType, TabularType, COMPOSITE_DATA_CLASS, TABULAR_DATA_CLASS};
use crate::errors::{JolokiaError, Result};

/// An object exposing named properties through getters
pub trait JavaBean: Send + Sync + fmt::Debug {
    fn class_name(&self) -> &str;

    /// Readable property names in declaration order
    fn property_names(&self) -> Vec<String>;

    /// # Errors
    ///
    /// Returns an error when the getter fails or the property does not exist.
    fn property(&self, name: &str) -> Result<JmxValue>;
}

/// Identity of a shared bean, stable for as long as the bean is alive
pub fn bean_identity(bean: &Arc<dyn JavaBean>) -> usize {
    Arc::as_ptr(bean) as *const () as usize
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeData {
    pub composite_type: CompositeType,
    pub items: Vec<(String, JmxValue)>,
}

impl CompositeData {
    pub fn new(composite_type: CompositeType, items: Vec<(String, JmxValue)>) -> Self {
        Self {
            composite_type,
            items,
        }
    }

    pub fn get(&self, key: &str) -> Option<&JmxValue> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularData {
    pub tabular_type: TabularType,
    pub rows: Vec<CompositeData>,
}

impl TabularData {
    pub fn new(tabular_type: TabularType, rows: Vec<CompositeData>) -> Self {
        Self { tabular_type, rows }
    }

    /// Index values of one row, in index-name order
    pub fn index_of(&self, row: &CompositeData) -> Vec<JmxValue> {
        self.tabular_type
            .index_names
            .iter()
            .map(|name| row.get(name).cloned().unwrap_or(JmxValue::Null))
            .collect()
    }

    /// Row whose index values render as `keys`
    pub fn row_by_index(&self, keys: &[&str]) -> Option<&CompositeData> {
        self.rows.iter().find(|row| {
            let index = self.index_of(row);
            index.len() == keys.len()
                && index
                    .iter()
                    .zip(keys.iter())
                    .all(|(value, key)| value.to_string() == *key)
        })
    }
}

#[derive(Debug, Clone)]
pub enum JmxValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Date(DateTime<Utc>),
    ObjectName(ObjectName),
    Enum {
        class_name: String,
        constant: String,
    },
    Array {
        component_type: String,
        elements: Vec<JmxValue>,
    },
    List(Vec<JmxValue>),
    Set(Vec<JmxValue>),
    Map(Vec<(JmxValue, JmxValue)>),
    Composite(CompositeData),
    Tabular(TabularData),
    Bean(Arc<dyn JavaBean>),
}

impl JmxValue {
    pub fn is_null(&self) -> bool {
        matches!(self, JmxValue::Null)
    }

    /// Java class name of the value
    pub fn class_name(&self) -> String {
        match self {
            JmxValue::Null => "null".to_string(),
            JmxValue::Boolean(_) => "java.lang.Boolean".to_string(),
            JmxValue::Byte(_) => "java.lang.Byte".to_string(),
            JmxValue::Short(_) => "java.lang.Short".to_string(),
            JmxValue::Integer(_) => "java.lang.Integer".to_string(),
            JmxValue::Long(_) => "java.lang.Long".to_string(),
            JmxValue::Float(_) => "java.lang.Float".to_string(),
            JmxValue::Double(_) => "java.lang.Double".to_string(),
            JmxValue::Char(_) => "java.lang.Character".to_string(),
            JmxValue::String(_) => "java.lang.String".to_string(),
            JmxValue::Date(_) => "java.util.Date".to_string(),
            JmxValue::ObjectName(_) => "javax.management.ObjectName".to_string(),
            JmxValue::Enum { class_name, .. } => class_name.clone(),
            JmxValue::Array { component_type, .. } => format!("[L{};", component_type),
            JmxValue::List(_) => "java.util.List".to_string(),
            JmxValue::Set(_) => "java.util.Set".to_string(),
            JmxValue::Map(_) => "java.util.Map".to_string(),
            JmxValue::Composite(_) => COMPOSITE_DATA_CLASS.to_string(),
            JmxValue::Tabular(_) => TABULAR_DATA_CLASS.to_string(),
            JmxValue::Bean(bean) => bean.class_name().to_string(),
        }
    }

    /// Whether the value renders as a JSON scalar
    pub fn is_simple(&self) -> bool {
        !matches!(
            self,
            JmxValue::Array { .. }
                | JmxValue::List(_)
                | JmxValue::Set(_)
                | JmxValue::Map(_)
                | JmxValue::Composite(_)
                | JmxValue::Tabular(_)
                | JmxValue::Bean(_)
        )
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JmxValue::Byte(v) => Some(i64::from(*v)),
            JmxValue::Short(v) => Some(i64::from(*v)),
            JmxValue::Integer(v) => Some(i64::from(*v)),
            JmxValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JmxValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for JmxValue {
    fn eq(&self, other: &Self) -> bool {
        use JmxValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (ObjectName(a), ObjectName(b)) => a == b,
            (
                Enum {
                    class_name: c1,
                    constant: k1,
                },
                Enum {
                    class_name: c2,
                    constant: k2,
                },
            ) => c1 == c2 && k1 == k2,
            (
                Array {
                    component_type: t1,
                    elements: e1,
                },
                Array {
                    component_type: t2,
                    elements: e2,
                },
            ) => t1 == t2 && e1 == e2,
            (List(a), List(b)) | (Set(a), Set(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Composite(a), Composite(b)) => a == b,
            (Tabular(a), Tabular(b)) => a == b,
            (Bean(a), Bean(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: Iterator<Item = &'a JmxValue>,
{
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// `toString()` rendering, used when the depth limit is reached
impl fmt::Display for JmxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JmxValue::Null => write!(f, "null"),
            JmxValue::Boolean(v) => write!(f, "{}", v),
            JmxValue::Byte(v) => write!(f, "{}", v),
            JmxValue::Short(v) => write!(f, "{}", v),
            JmxValue::Integer(v) => write!(f, "{}", v),
            JmxValue::Long(v) => write!(f, "{}", v),
            JmxValue::Float(v) => write!(f, "{}", v),
            JmxValue::Double(v) => write!(f, "{}", v),
            JmxValue::Char(v) => write!(f, "{}", v),
            JmxValue::String(v) => write!(f, "{}", v),
            JmxValue::Date(v) => write!(f, "{}", v.to_rfc3339()),
            JmxValue::ObjectName(v) => write!(f, "{}", v),
            JmxValue::Enum { constant, .. } => write!(f, "{}", constant),
            JmxValue::Array { elements, .. } | JmxValue::List(elements) | JmxValue::Set(elements) => {
                write!(f, "[")?;
                write_joined(f, elements.iter())?;
                write!(f, "]")
            }
            JmxValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
            JmxValue::Composite(data) => {
                write!(f, "CompositeData({})[", data.composite_type.type_name)?;
                for (i, (k, v)) in data.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "]")
            }
            JmxValue::Tabular(data) => write!(
                f,
                "TabularData({})[{} rows]",
                data.tabular_type.type_name,
                data.rows.len()
            ),
            JmxValue::Bean(bean) => write!(f, "{}@{:x}", bean.class_name(), bean_identity(bean)),
        }
    }
}

impl From<bool> for JmxValue {
    fn from(v: bool) -> Self {
        JmxValue::Boolean(v)
    }
}

impl From<i32> for JmxValue {
    fn from(v: i32) -> Self {
        JmxValue::Integer(v)
    }
}

impl From<i64> for JmxValue {
    fn from(v: i64) -> Self {
        JmxValue::Long(v)
    }
}

impl From<f64> for JmxValue {
    fn from(v: f64) -> Self {
        JmxValue::Double(v)
    }
}

impl From<&str> for JmxValue {
    fn from(v: &str) -> Self {
        JmxValue::String(v.to_string())
    }
}

impl From<String> for JmxValue {
    fn from(v: String) -> Self {
        JmxValue::String(v)
    }
}

impl From<ObjectName> for JmxValue {
    fn from(v: ObjectName) -> Self {
        JmxValue::ObjectName(v)
    }
}

type PropertySlot = (String, std::result::Result<JmxValue, String>);

/// A bean backed by a mutable property table
///
/// Properties can be set after the bean is shared, which is how cyclic
/// graphs are assembled.
#[derive(Debug)]
pub struct PropertyBean {
    class_name: String,
    properties: RwLock<Vec<PropertySlot>>,
}

impl PropertyBean {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: RwLock::new(Vec::new()),
        }
    }

    pub fn with(self, name: impl Into<String>, value: impl Into<JmxValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Property whose getter fails with `reason`
    pub fn with_failing(self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.put(name.into(), Err(reason.into()));
        self
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<JmxValue>) {
        self.put(name.into(), Ok(value.into()));
    }

    pub fn into_value(self) -> JmxValue {
        JmxValue::Bean(Arc::new(self))
    }

    fn put(&self, name: String, value: std::result::Result<JmxValue, String>) {
        if let Ok(mut props) = self.properties.write() {
            match props.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => props.push((name, value)),
            }
        }
    }
}

impl JavaBean for PropertyBean {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn property_names(&self) -> Vec<String> {
        self.properties
            .read()
            .map(|props| props.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    fn property(&self, name: &str) -> Result<JmxValue> {
        let props = self
            .properties
            .read()
            .map_err(|_| JolokiaError::illegal_state("bean property table poisoned"))?;
        match props.iter().find(|(n, _)| n == name) {
            Some((_, Ok(value))) => Ok(value.clone()),
            Some((_, Err(reason))) => Err(JolokiaError::PropertyUnreadable {
                class_name: self.class_name.clone(),
                property: name.to_string(),
                reason: reason.clone(),
            }),
            None => Err(JolokiaError::PropertyUnreadable {
                class_name: self.class_name.clone(),
                property: name.to_string(),
                reason: "no such property".to_string(),
            }),
        }
    }
}
