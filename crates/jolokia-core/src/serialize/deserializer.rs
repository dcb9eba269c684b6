//! Conversion of request JSON and strings into typed values
//!
//! Write requests and operation arguments arrive as JSON (POST) or as plain
//! strings (GET paths). Both are converted against the declared Java type
//! name, or against an open type when the attribute carries one.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::errors::{JolokiaError, Result};
use crate::model::open_type::{
    CompositeType, OpenType, SimpleType, TabularType, COMPOSITE_DATA_CLASS, TABULAR_DATA_CLASS,
};
use crate::model::{CompositeData, JmxValue, ObjectName, TabularData};
use crate::path::split_csv;

/// String form of `null` in GET requests
pub const NULL_MARKER: &str = "[null]";
/// String form of the empty string in GET requests
pub const EMPTY_STRING_MARKER: &str = "\"\"";

fn conversion_error(value: impl ToString, target: &str, reason: impl Into<String>) -> JolokiaError {
    JolokiaError::ValueConversion {
        value: value.to_string(),
        target_type: target.to_string(),
        reason: reason.into(),
    }
}

fn is_primitive(type_name: &str) -> bool {
    matches!(
        type_name,
        "int" | "long" | "short" | "byte" | "boolean" | "char" | "float" | "double"
    )
}

/// Element type of an array type name, in either `[I` or `int[]` form
fn array_component(type_name: &str) -> Option<String> {
    if let Some(element) = type_name.strip_suffix("[]") {
        return Some(element.to_string());
    }
    let rest = type_name.strip_prefix('[')?;
    let component = match rest {
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        "Z" => "boolean".to_string(),
        "B" => "byte".to_string(),
        "S" => "short".to_string(),
        "F" => "float".to_string(),
        "D" => "double".to_string(),
        "C" => "char".to_string(),
        nested if nested.starts_with('[') => nested.to_string(),
        object => object.strip_prefix('L')?.strip_suffix(';')?.to_string(),
    };
    Some(component)
}

/// Convert JSON into a value of `type_name`
///
/// When `open_type` is given it takes precedence over the type name, which
/// is how composite and tabular attributes are written.
///
/// # Errors
///
/// Returns `ValueConversion` if the JSON does not fit the type.
pub fn from_json(type_name: &str, json: &Value, open_type: Option<&OpenType>) -> Result<JmxValue> {
    if let Some(open_type) = open_type {
        return from_open_type(open_type, json);
    }
    if json.is_null() {
        if is_primitive(type_name) {
            return Err(conversion_error("null", type_name, "primitive types cannot be null"));
        }
        return Ok(JmxValue::Null);
    }
    if let Some(component) = array_component(type_name) {
        let elements = match json {
            Value::Array(items) => items
                .iter()
                .map(|item| from_json(&component, item, None))
                .collect::<Result<Vec<_>>>()?,
            Value::String(s) => split_csv(s)
                .iter()
                .map(|item| from_string(&component, item))
                .collect::<Result<Vec<_>>>()?,
            other => return Err(conversion_error(other, type_name, "expected an array")),
        };
        return Ok(JmxValue::Array {
            component_type: component,
            elements,
        });
    }
    match type_name {
        "java.util.List" | "java.util.Set" | "java.util.Collection" => {
            let items = match json {
                Value::Array(items) => items.iter().map(generic).collect::<Result<Vec<_>>>()?,
                other => return Err(conversion_error(other, type_name, "expected a JSON array")),
            };
            Ok(if type_name == "java.util.Set" {
                JmxValue::Set(items)
            } else {
                JmxValue::List(items)
            })
        }
        "java.util.Map" => match json {
            Value::Object(map) => Ok(JmxValue::Map(
                map.iter()
                    .map(|(k, v)| Ok((JmxValue::String(k.clone()), generic(v)?)))
                    .collect::<Result<Vec<_>>>()?,
            )),
            other => Err(conversion_error(other, type_name, "expected a JSON object")),
        },
        _ => match json {
            Value::String(s) => from_string(type_name, s),
            Value::Bool(_) | Value::Number(_) => from_scalar(type_name, json),
            Value::Object(map) if type_name == "javax.management.ObjectName" => {
                match map.get("objectName").and_then(Value::as_str) {
                    Some(name) => Ok(JmxValue::ObjectName(ObjectName::parse(name)?)),
                    None => Err(conversion_error(json, type_name, "missing objectName")),
                }
            }
            _ if is_generic_target(type_name) => generic(json),
            other => Err(conversion_error(other, type_name, "unsupported JSON shape")),
        },
    }
}

fn is_generic_target(type_name: &str) -> bool {
    matches!(type_name, "java.lang.Object" | "")
        || type_name == COMPOSITE_DATA_CLASS
        || type_name == TABULAR_DATA_CLASS
}

/// JSON numbers and booleans against a scalar type
fn from_scalar(type_name: &str, json: &Value) -> Result<JmxValue> {
    match json {
        Value::Bool(b) => match type_name {
            "boolean" | "java.lang.Boolean" | "java.lang.Object" => Ok(JmxValue::Boolean(*b)),
            "java.lang.String" => Ok(JmxValue::String(b.to_string())),
            _ => Err(conversion_error(b, type_name, "unexpected boolean")),
        },
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                integral(type_name, i, json)
            } else if let Some(f) = n.as_f64() {
                match type_name {
                    "float" | "java.lang.Float" => Ok(JmxValue::Float(f as f32)),
                    "double" | "java.lang.Double" | "java.lang.Object" | "java.math.BigDecimal" => {
                        Ok(JmxValue::Double(f))
                    }
                    "java.lang.String" => Ok(JmxValue::String(n.to_string())),
                    _ => Err(conversion_error(n, type_name, "unexpected decimal")),
                }
            } else {
                from_string(type_name, &n.to_string())
            }
        }
        other => Err(conversion_error(other, type_name, "not a scalar")),
    }
}

fn integral(type_name: &str, i: i64, json: &Value) -> Result<JmxValue> {
    let out_of_range = || conversion_error(i, type_name, "out of range");
    Ok(match type_name {
        "int" | "java.lang.Integer" => {
            JmxValue::Integer(i32::try_from(i).map_err(|_| out_of_range())?)
        }
        "java.lang.Object" => i32::try_from(i).map_or(JmxValue::Long(i), JmxValue::Integer),
        "long" | "java.lang.Long" | "java.math.BigInteger" => JmxValue::Long(i),
        "short" | "java.lang.Short" => JmxValue::Short(i16::try_from(i).map_err(|_| out_of_range())?),
        "byte" | "java.lang.Byte" => JmxValue::Byte(i8::try_from(i).map_err(|_| out_of_range())?),
        "float" | "java.lang.Float" => JmxValue::Float(i as f32),
        "double" | "java.lang.Double" | "java.math.BigDecimal" => JmxValue::Double(i as f64),
        "java.lang.String" => JmxValue::String(i.to_string()),
        "java.util.Date" => Utc
            .timestamp_millis_opt(i)
            .single()
            .map(JmxValue::Date)
            .ok_or_else(out_of_range)?,
        _ => return Err(conversion_error(json, type_name, "unexpected number")),
    })
}

/// Convert the string form used in GET requests
///
/// `[null]` is null and `""` the empty string. Arrays are comma separated
/// with `\` escaping.
///
/// # Errors
///
/// Returns `ValueConversion` if the text does not parse as the type.
pub fn from_string(type_name: &str, text: &str) -> Result<JmxValue> {
    if text == NULL_MARKER {
        if is_primitive(type_name) {
            return Err(conversion_error(text, type_name, "primitive types cannot be null"));
        }
        return Ok(JmxValue::Null);
    }
    if text == EMPTY_STRING_MARKER {
        return Ok(JmxValue::String(String::new()));
    }
    if let Some(component) = array_component(type_name) {
        let elements = if text.is_empty() {
            Vec::new()
        } else {
            split_csv(text)
                .iter()
                .map(|item| from_string(&component, item))
                .collect::<Result<Vec<_>>>()?
        };
        return Ok(JmxValue::Array {
            component_type: component,
            elements,
        });
    }
    let parse_err = |reason: String| conversion_error(text, type_name, reason);
    Ok(match type_name {
        "java.lang.String" | "java.lang.Object" | "" => JmxValue::String(text.to_string()),
        "int" | "java.lang.Integer" => {
            JmxValue::Integer(text.trim().parse::<i32>().map_err(|e| parse_err(format!("{}", e)))?)
        }
        "long" | "java.lang.Long" | "java.math.BigInteger" => {
            JmxValue::Long(text.trim().parse::<i64>().map_err(|e| parse_err(format!("{}", e)))?)
        }
        "short" | "java.lang.Short" => {
            JmxValue::Short(text.trim().parse::<i16>().map_err(|e| parse_err(format!("{}", e)))?)
        }
        "byte" | "java.lang.Byte" => {
            JmxValue::Byte(text.trim().parse::<i8>().map_err(|e| parse_err(format!("{}", e)))?)
        }
        "float" | "java.lang.Float" => {
            JmxValue::Float(text.trim().parse::<f32>().map_err(|e| parse_err(format!("{}", e)))?)
        }
        "double" | "java.lang.Double" | "java.math.BigDecimal" => {
            JmxValue::Double(text.trim().parse::<f64>().map_err(|e| parse_err(format!("{}", e)))?)
        }
        "boolean" | "java.lang.Boolean" => match text.trim().to_ascii_lowercase().as_str() {
            "true" => JmxValue::Boolean(true),
            "false" => JmxValue::Boolean(false),
            _ => return Err(parse_err("expected true or false".to_string())),
        },
        "char" | "java.lang.Character" => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => JmxValue::Char(c),
                _ => return Err(parse_err("expected a single character".to_string())),
            }
        }
        "java.util.Date" => JmxValue::Date(parse_date(text).ok_or_else(|| {
            parse_err("expected RFC 3339 or epoch milliseconds".to_string())
        })?),
        "javax.management.ObjectName" => JmxValue::ObjectName(ObjectName::parse(text)?),
        _ => {
            let json: Value = serde_json::from_str(text)
                .map_err(|e| parse_err(format!("no string conversion for this type: {}", e)))?;
            return from_json(type_name, &json, None);
        }
    })
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    text.trim()
        .parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

/// Type-less conversion: objects become maps, arrays lists
fn generic(json: &Value) -> Result<JmxValue> {
    Ok(match json {
        Value::Null => JmxValue::Null,
        Value::Bool(b) => JmxValue::Boolean(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => match i32::try_from(i) {
                Ok(small) => JmxValue::Integer(small),
                Err(_) => JmxValue::Long(i),
            },
            (None, Some(f)) => JmxValue::Double(f),
            _ => JmxValue::String(n.to_string()),
        },
        Value::String(s) => JmxValue::String(s.clone()),
        Value::Array(items) => JmxValue::List(items.iter().map(generic).collect::<Result<_>>()?),
        Value::Object(map) => JmxValue::Map(
            map.iter()
                .map(|(k, v)| Ok((JmxValue::String(k.clone()), generic(v)?)))
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

fn from_open_type(open_type: &OpenType, json: &Value) -> Result<JmxValue> {
    match open_type {
        OpenType::Simple { simple } => from_simple_type(*simple, json),
        OpenType::Array { dimension, element } => {
            let inner = if *dimension > 1 {
                OpenType::Array {
                    dimension: dimension - 1,
                    element: element.clone(),
                }
            } else {
                element.as_ref().clone()
            };
            match json {
                Value::Null => Ok(JmxValue::Null),
                Value::Array(items) => Ok(JmxValue::Array {
                    component_type: inner.class_name(),
                    elements: items
                        .iter()
                        .map(|item| from_open_type(&inner, item))
                        .collect::<Result<_>>()?,
                }),
                other => Err(conversion_error(other, &open_type.class_name(), "expected an array")),
            }
        }
        OpenType::Composite(composite_type) => from_composite(composite_type, json),
        OpenType::Tabular(tabular_type) => from_tabular(tabular_type, json),
    }
}

fn from_simple_type(simple: SimpleType, json: &Value) -> Result<JmxValue> {
    if simple == SimpleType::Void {
        return Ok(JmxValue::Null);
    }
    from_json(simple.class_name(), json, None)
}

fn from_composite(composite_type: &CompositeType, json: &Value) -> Result<JmxValue> {
    let map = match json {
        Value::Null => return Ok(JmxValue::Null),
        Value::Object(map) => map,
        other => return Err(conversion_error(other, COMPOSITE_DATA_CLASS, "expected a JSON object")),
    };
    if let Some(unknown) = map.keys().find(|k| composite_type.item(k).is_none()) {
        return Err(conversion_error(
            json,
            COMPOSITE_DATA_CLASS,
            format!("no item '{}' in type {}", unknown, composite_type.type_name),
        ));
    }
    let items = composite_type
        .items
        .iter()
        .map(|item| {
            let value = match map.get(&item.name) {
                Some(v) => from_open_type(&item.open_type, v)?,
                None => JmxValue::Null,
            };
            Ok((item.name.clone(), value))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(JmxValue::Composite(CompositeData::new(composite_type.clone(), items)))
}

/// Tabular data accepts an array of rows, a `{key: value}` object for
/// MXBean maps, or an object keyed by the single index column
fn from_tabular(tabular_type: &TabularType, json: &Value) -> Result<JmxValue> {
    let row_json: Vec<Value> = match json {
        Value::Null => return Ok(JmxValue::Null),
        Value::Array(rows) => rows.clone(),
        Value::Object(map) if tabular_type.is_mxbean_map() => map
            .iter()
            .map(|(k, v)| serde_json::json!({"key": k, "value": v}))
            .collect(),
        Value::Object(map) if tabular_type.index_names.len() == 1 => {
            let index = &tabular_type.index_names[0];
            map.iter()
                .map(|(k, v)| {
                    let mut row = v.as_object().cloned().ok_or_else(|| {
                        conversion_error(v, TABULAR_DATA_CLASS, "rows must be JSON objects")
                    })?;
                    row.entry(index.clone()).or_insert_with(|| Value::String(k.clone()));
                    Ok(Value::Object(row))
                })
                .collect::<Result<_>>()?
        }
        other => {
            return Err(conversion_error(
                other,
                TABULAR_DATA_CLASS,
                "expected an array of rows or an object",
            ))
        }
    };
    let rows = row_json
        .iter()
        .map(|row| match from_composite(&tabular_type.row_type, row)? {
            JmxValue::Composite(data) => Ok(data),
            _ => Err(conversion_error(row, TABULAR_DATA_CLASS, "null row")),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(JmxValue::Tabular(TabularData::new(tabular_type.clone(), rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives_and_boxes() {
        assert_eq!(from_json("int", &json!(5), None).unwrap(), JmxValue::Integer(5));
        assert_eq!(from_json("java.lang.Long", &json!("7"), None).unwrap(), JmxValue::Long(7));
        assert_eq!(from_json("boolean", &json!(true), None).unwrap(), JmxValue::Boolean(true));
        assert!(from_json("byte", &json!(300), None).is_err());
        assert!(from_json("int", &Value::Null, None).is_err());
        assert_eq!(from_json("java.lang.Integer", &Value::Null, None).unwrap(), JmxValue::Null);
    }

    #[test]
    fn test_string_markers() {
        assert_eq!(from_string("java.lang.String", "[null]").unwrap(), JmxValue::Null);
        assert_eq!(from_string("java.lang.String", "\"\"").unwrap(), JmxValue::from(""));
        assert!(from_string("int", "[null]").is_err());
        assert!(from_string("int", "seven").is_err());
    }

    #[test]
    fn test_arrays() {
        let expected = JmxValue::Array {
            component_type: "int".into(),
            elements: vec![1.into(), 2.into()],
        };
        assert_eq!(from_string("[I", "1,2").unwrap(), expected);
        assert_eq!(from_json("int[]", &json!([1, 2]), None).unwrap(), expected);
        let strings = from_string("[Ljava.lang.String;", "a\\,b,c").unwrap();
        assert_eq!(
            strings,
            JmxValue::Array {
                component_type: "java.lang.String".into(),
                elements: vec!["a,b".into(), "c".into()],
            }
        );
    }

    #[test]
    fn test_dates_and_names() {
        let date = from_string("java.util.Date", "2024-01-02T03:04:05Z").unwrap();
        let millis = from_json("java.util.Date", &json!(1_704_164_645_000_i64), None).unwrap();
        assert_eq!(date, millis);
        let name = from_json(
            "javax.management.ObjectName",
            &json!({"objectName": "java.lang:type=Memory"}),
            None,
        )
        .unwrap();
        assert!(matches!(name, JmxValue::ObjectName(_)));
    }

    #[test]
    fn test_collections() {
        let list = from_json("java.util.List", &json!([1, "a"]), None).unwrap();
        assert_eq!(list, JmxValue::List(vec![1.into(), "a".into()]));
        let map = from_json("java.util.Map", &json!({"k": [true]}), None).unwrap();
        assert_eq!(
            map,
            JmxValue::Map(vec![("k".into(), JmxValue::List(vec![true.into()]))])
        );
    }

    fn usage_type() -> CompositeType {
        CompositeType::new("MemoryUsage")
            .with_item("used", OpenType::simple(SimpleType::Long))
            .with_item("max", OpenType::simple(SimpleType::Long))
    }

    #[test]
    fn test_composite() {
        let open = OpenType::Composite(usage_type());
        let value = from_json(COMPOSITE_DATA_CLASS, &json!({"used": 3}), Some(&open)).unwrap();
        match value {
            JmxValue::Composite(data) => {
                assert_eq!(data.get("used"), Some(&JmxValue::Long(3)));
                assert_eq!(data.get("max"), Some(&JmxValue::Null));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(from_json(COMPOSITE_DATA_CLASS, &json!({"free": 1}), Some(&open)).is_err());
    }

    #[test]
    fn test_tabular_forms() {
        let map_type = TabularType {
            type_name: "map".into(),
            description: None,
            row_type: CompositeType::new("entry")
                .with_item("key", OpenType::simple(SimpleType::String))
                .with_item("value", OpenType::simple(SimpleType::Integer)),
            index_names: vec!["key".into()],
        };
        let open = OpenType::Tabular(map_type);
        let from_object = from_json(TABULAR_DATA_CLASS, &json!({"a": 1}), Some(&open)).unwrap();
        let from_rows =
            from_json(TABULAR_DATA_CLASS, &json!([{"key": "a", "value": 1}]), Some(&open)).unwrap();
        assert_eq!(from_object, from_rows);
    }
}
