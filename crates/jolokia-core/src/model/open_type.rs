//! Open type descriptors
//!
//! Open types describe composite and tabular values without the original
//! implementation class. Attributes may carry one so that written JSON can be
//! converted back into the right structure.

use serde::{Deserialize, Serialize};

pub const COMPOSITE_DATA_CLASS: &str = "javax.management.openmbean.CompositeData";
pub const TABULAR_DATA_CLASS: &str = "javax.management.openmbean.TabularData";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimpleType {
    #[serde(rename = "java.lang.Void")]
    Void,
    #[serde(rename = "java.lang.Boolean")]
    Boolean,
    #[serde(rename = "java.lang.Character")]
    Character,
    #[serde(rename = "java.lang.Byte")]
    Byte,
    #[serde(rename = "java.lang.Short")]
    Short,
    #[serde(rename = "java.lang.Integer")]
    Integer,
    #[serde(rename = "java.lang.Long")]
    Long,
    #[serde(rename = "java.lang.Float")]
    Float,
    #[serde(rename = "java.lang.Double")]
    Double,
    #[serde(rename = "java.lang.String")]
    String,
    #[serde(rename = "java.math.BigDecimal")]
    BigDecimal,
    #[serde(rename = "java.math.BigInteger")]
    BigInteger,
    #[serde(rename = "java.util.Date")]
    Date,
    #[serde(rename = "javax.management.ObjectName")]
    ObjectName,
}

impl SimpleType {
    pub fn class_name(&self) -> &'static str {
        match self {
            SimpleType::Void => "java.lang.Void",
            SimpleType::Boolean => "java.lang.Boolean",
            SimpleType::Character => "java.lang.Character",
            SimpleType::Byte => "java.lang.Byte",
            SimpleType::Short => "java.lang.Short",
            SimpleType::Integer => "java.lang.Integer",
            SimpleType::Long => "java.lang.Long",
            SimpleType::Float => "java.lang.Float",
            SimpleType::Double => "java.lang.Double",
            SimpleType::String => "java.lang.String",
            SimpleType::BigDecimal => "java.math.BigDecimal",
            SimpleType::BigInteger => "java.math.BigInteger",
            SimpleType::Date => "java.util.Date",
            SimpleType::ObjectName => "javax.management.ObjectName",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub open_type: OpenType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeType {
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub items: Vec<CompositeItem>,
}

impl CompositeType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            description: None,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, name: impl Into<String>, open_type: OpenType) -> Self {
        self.items.push(CompositeItem {
            name: name.into(),
            description: None,
            open_type,
        });
        self
    }

    pub fn item(&self, name: &str) -> Option<&CompositeItem> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularType {
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub row_type: CompositeType,
    pub index_names: Vec<String>,
}

impl TabularType {
    /// The `{key, value}` row shape MXBeans use to expose a `Map`
    pub fn is_mxbean_map(&self) -> bool {
        self.index_names == ["key"]
            && self.row_type.items.len() == 2
            && self.row_type.item("key").is_some()
            && self.row_type.item("value").is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OpenType {
    Simple {
        #[serde(rename = "type")]
        simple: SimpleType,
    },
    Array {
        dimension: usize,
        element: Box<OpenType>,
    },
    Composite(CompositeType),
    Tabular(TabularType),
}

impl OpenType {
    pub fn simple(simple: SimpleType) -> Self {
        OpenType::Simple { simple }
    }

    pub fn array_of(element: OpenType) -> Self {
        OpenType::Array {
            dimension: 1,
            element: Box::new(element),
        }
    }

    /// Java class name of values of this type
    pub fn class_name(&self) -> String {
        match self {
            OpenType::Simple { simple } => simple.class_name().to_string(),
            OpenType::Composite(_) => COMPOSITE_DATA_CLASS.to_string(),
            OpenType::Tabular(_) => TABULAR_DATA_CLASS.to_string(),
            OpenType::Array { dimension, element } => {
                format!("{}L{};", "[".repeat(*dimension), element.class_name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_class_name() {
        let t = OpenType::array_of(OpenType::simple(SimpleType::String));
        assert_eq!(t.class_name(), "[Ljava.lang.String;");
    }

    #[test]
    fn test_mxbean_map_detection() {
        let row = CompositeType::new("entry")
            .with_item("key", OpenType::simple(SimpleType::String))
            .with_item("value", OpenType::simple(SimpleType::Long));
        let tabular = TabularType {
            type_name: "map".into(),
            description: None,
            row_type: row.clone(),
            index_names: vec!["key".into()],
        };
        assert!(tabular.is_mxbean_map());

        let indexed_by_other = TabularType {
            index_names: vec!["value".into()],
            ..tabular
        };
        assert!(!indexed_by_other.is_mxbean_map());
    }

    #[test]
    fn test_open_type_json_shape() {
        let t: OpenType = serde_json::from_value(serde_json::json!({
            "kind": "composite",
            "typeName": "MemoryUsage",
            "items": [
                {"name": "used", "openType": {"kind": "simple", "type": "java.lang.Long"}}
            ]
        }))
        .unwrap();
        match t {
            OpenType::Composite(c) => {
                assert_eq!(c.item_names().collect::<Vec<_>>(), vec!["used"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
