use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};

use super::inner_path::extract_path;
use super::{SerializeOptions, TRUNCATION_MARKER};
use crate::config::{DateFormat, LongFormat};
use crate::errors::{JolokiaError, Result};
use crate::model::value::bean_identity;
use crate::model::{CompositeData, JavaBean, JmxValue, TabularData};

/// Value to JSON converter
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    options: SerializeOptions,
}

impl Serializer {
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    /// Serialize the part of `value` addressed by `path`
    ///
    /// An unresolvable path yields `null` under the ignoring fault handler.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for an unresolvable path,
    /// `ObjectLimitExceeded` when the object budget runs out and
    /// `PropertyUnreadable` for failing bean getters, unless the fault handler
    /// ignores them.
    pub fn serialize(&self, value: &JmxValue, path: &[String]) -> Result<Value> {
        let target = match extract_path(value, path) {
            Ok(target) => target,
            Err(err) => {
                return self
                    .options
                    .fault_handler
                    .handle(err)
                    .map(|v: Option<Value>| v.unwrap_or(Value::Null))
            }
        };
        let mut context = SerializationContext {
            options: &self.options,
            objects: 0,
            stack: Vec::new(),
        };
        Ok(context.convert(&target, 1)?.unwrap_or(Value::Null))
    }
}

struct SerializationContext<'a> {
    options: &'a SerializeOptions,
    objects: usize,
    /// Beans currently being expanded, innermost last
    stack: Vec<(usize, String)>,
}

impl SerializationContext<'_> {
    /// `None` when the value is dropped by the fault handler
    fn convert(&mut self, value: &JmxValue, level: usize) -> Result<Option<Value>> {
        if let Some(limit) = self.options.max_objects {
            if self.objects >= limit {
                return self
                    .options
                    .fault_handler
                    .handle(JolokiaError::ObjectLimitExceeded { limit });
            }
        }
        self.objects += 1;

        if !value.is_simple() && self.options.max_depth.is_some_and(|max| level > max) {
            return Ok(Some(Value::String(value.to_string())));
        }

        let json = match value {
            JmxValue::Null => Value::Null,
            JmxValue::Boolean(v) => Value::Bool(*v),
            JmxValue::Byte(v) => Value::from(*v),
            JmxValue::Short(v) => Value::from(*v),
            JmxValue::Integer(v) => Value::from(*v),
            JmxValue::Long(v) => match self.options.long_format {
                LongFormat::Number => Value::from(*v),
                LongFormat::String => Value::String(v.to_string()),
            },
            JmxValue::Float(v) => float(f64::from(*v)),
            JmxValue::Double(v) => float(*v),
            JmxValue::Char(v) => Value::String(v.to_string()),
            JmxValue::String(v) => Value::String(v.clone()),
            JmxValue::Date(v) => format_date(v, &self.options.date_format)?,
            JmxValue::ObjectName(v) => {
                let mut map = Map::new();
                map.insert("objectName".to_string(), Value::String(v.canonical_name().to_string()));
                Value::Object(map)
            }
            JmxValue::Enum { constant, .. } => Value::String(constant.clone()),
            JmxValue::Array { elements, .. } | JmxValue::List(elements) | JmxValue::Set(elements) => {
                self.convert_sequence(elements, level)?
            }
            JmxValue::Map(entries) => self.convert_map(entries, level)?,
            JmxValue::Composite(data) => self.convert_composite(data, level)?,
            JmxValue::Tabular(data) => self.convert_tabular(data, level)?,
            JmxValue::Bean(bean) => self.convert_bean(bean, level)?,
        };
        Ok(Some(json))
    }

    fn collection_limit(&self, len: usize) -> usize {
        self.options
            .max_collection_size
            .map_or(len, |max| max.min(len))
    }

    fn convert_sequence(&mut self, elements: &[JmxValue], level: usize) -> Result<Value> {
        let limit = self.collection_limit(elements.len());
        let mut out = Vec::with_capacity(limit + 1);
        for element in &elements[..limit] {
            if let Some(json) = self.convert(element, level + 1)? {
                out.push(json);
            }
        }
        if limit < elements.len() {
            out.push(Value::String(TRUNCATION_MARKER.to_string()));
        }
        Ok(Value::Array(out))
    }

    fn convert_map(&mut self, entries: &[(JmxValue, JmxValue)], level: usize) -> Result<Value> {
        let limit = self.collection_limit(entries.len());
        let mut out = Map::new();
        for (key, value) in &entries[..limit] {
            if let Some(json) = self.convert(value, level + 1)? {
                out.insert(key.to_string(), json);
            }
        }
        if limit < entries.len() {
            out.insert(
                TRUNCATION_MARKER.to_string(),
                Value::from(entries.len() - limit),
            );
        }
        Ok(Value::Object(out))
    }

    fn convert_composite(&mut self, data: &CompositeData, level: usize) -> Result<Value> {
        let mut out = Map::new();
        for (key, value) in &data.items {
            if let Some(json) = self.convert(value, level + 1)? {
                out.insert(key.clone(), json);
            }
        }
        Ok(Value::Object(out))
    }

    /// MXBean maps become `{key: value}`; other tables are nested by their
    /// index values with whole rows at the leaves
    fn convert_tabular(&mut self, data: &TabularData, level: usize) -> Result<Value> {
        let limit = self.collection_limit(data.rows.len());
        let mut out = Map::new();
        if data.tabular_type.is_mxbean_map() {
            for row in &data.rows[..limit] {
                let key = row.get("key").map(JmxValue::to_string).unwrap_or_default();
                let value = row.get("value").cloned().unwrap_or(JmxValue::Null);
                if let Some(json) = self.convert(&value, level + 1)? {
                    out.insert(key, json);
                }
            }
        } else {
            for row in &data.rows[..limit] {
                let index: Vec<String> = data.index_of(row).iter().map(JmxValue::to_string).collect();
                let Some(json) = self.convert_composite_at(row, level + index.len())? else {
                    continue;
                };
                insert_nested(&mut out, &index, json);
            }
        }
        if limit < data.rows.len() {
            out.insert(
                TRUNCATION_MARKER.to_string(),
                Value::from(data.rows.len() - limit),
            );
        }
        Ok(Value::Object(out))
    }

    fn convert_composite_at(&mut self, row: &CompositeData, level: usize) -> Result<Option<Value>> {
        self.convert(&JmxValue::Composite(row.clone()), level)
    }

    fn convert_bean(&mut self, bean: &Arc<dyn JavaBean>, level: usize) -> Result<Value> {
        let identity = bean_identity(bean);
        if let Some(pos) = self.stack.iter().position(|(id, _)| *id == identity) {
            let marker = if pos + 1 == self.stack.len() {
                "[this]".to_string()
            } else {
                format!("[Reference {}@{:x}]", bean.class_name(), identity)
            };
            return Ok(Value::String(marker));
        }

        self.stack.push((identity, bean.class_name().to_string()));
        let result = self.convert_bean_properties(bean, level);
        self.stack.pop();
        result
    }

    fn convert_bean_properties(&mut self, bean: &Arc<dyn JavaBean>, level: usize) -> Result<Value> {
        let mut out = Map::new();
        for name in bean.property_names() {
            let value = match bean.property(&name) {
                Ok(value) => value,
                Err(err) => match self.options.fault_handler.handle::<JmxValue>(err)? {
                    Some(value) => value,
                    None => continue,
                },
            };
            if let Some(json) = self.convert(&value, level + 1)? {
                out.insert(name, json);
            }
        }
        Ok(Value::Object(out))
    }
}

fn insert_nested(out: &mut Map<String, Value>, index: &[String], row: Value) {
    match index {
        [] => {}
        [last] => {
            out.insert(last.clone(), row);
        }
        [first, rest @ ..] => {
            let slot = out
                .entry(first.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = slot {
                insert_nested(inner, rest, row);
            }
        }
    }
}

fn float(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None if v.is_nan() => Value::String("NaN".to_string()),
        None if v > 0.0 => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}

fn format_date(date: &DateTime<Utc>, format: &DateFormat) -> Result<Value> {
    Ok(match format {
        DateFormat::Iso8601 => Value::String(date.to_rfc3339()),
        DateFormat::EpochMillis => Value::from(date.timestamp_millis()),
        DateFormat::EpochSeconds => Value::from(date.timestamp()),
        DateFormat::EpochNanos => date
            .timestamp_nanos_opt()
            .map(Value::from)
            .unwrap_or_else(|| Value::from(date.timestamp_millis().saturating_mul(1_000_000))),
        DateFormat::Pattern(pattern) => {
            let mut rendered = String::new();
            write!(rendered, "{}", date.format(pattern)).map_err(|_| {
                JolokiaError::Serialization {
                    message: format!("invalid date format '{}'", pattern),
                }
            })?;
            Value::String(rendered)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::open_type::{CompositeType, OpenType, SimpleType, TabularType};
    use crate::model::PropertyBean;
    use crate::serialize::FaultHandler;
    use chrono::TimeZone;
    use serde_json::json;

    fn serialize_with(options: SerializeOptions, value: &JmxValue) -> Result<Value> {
        Serializer::new(options).serialize(value, &[])
    }

    fn plain(value: &JmxValue) -> Value {
        serialize_with(SerializeOptions::default(), value).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(plain(&JmxValue::Integer(3)), json!(3));
        assert_eq!(plain(&JmxValue::Char('x')), json!("x"));
        assert_eq!(plain(&JmxValue::Double(f64::NAN)), json!("NaN"));
        assert_eq!(plain(&JmxValue::Double(f64::INFINITY)), json!("Infinity"));
        assert_eq!(plain(&JmxValue::Float(f32::NEG_INFINITY)), json!("-Infinity"));
        assert_eq!(
            plain(&JmxValue::Enum {
                class_name: "java.lang.Thread$State".into(),
                constant: "RUNNABLE".into()
            }),
            json!("RUNNABLE")
        );
    }

    #[test]
    fn test_long_as_string() {
        let options = SerializeOptions {
            long_format: LongFormat::String,
            ..SerializeOptions::default()
        };
        let value = JmxValue::Long(9_007_199_254_740_993);
        assert_eq!(
            serialize_with(options, &value).unwrap(),
            json!("9007199254740993")
        );
    }

    #[test]
    fn test_date_formats() {
        let date = JmxValue::Date(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(plain(&date), json!("2024-01-02T03:04:05+00:00"));
        let millis = SerializeOptions {
            date_format: DateFormat::EpochMillis,
            ..SerializeOptions::default()
        };
        assert_eq!(serialize_with(millis, &date).unwrap(), json!(1_704_164_645_000_i64));
        let pattern = SerializeOptions {
            date_format: DateFormat::Pattern("%Y/%m/%d".into()),
            ..SerializeOptions::default()
        };
        assert_eq!(serialize_with(pattern, &date).unwrap(), json!("2024/01/02"));
    }

    #[test]
    fn test_collection_truncation() {
        let options = SerializeOptions {
            max_collection_size: Some(2),
            ..SerializeOptions::default()
        };
        let list = JmxValue::List(vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(
            serialize_with(options.clone(), &list).unwrap(),
            json!([1, 2, "..."])
        );
        let map = JmxValue::Map(vec![
            ("a".into(), 1.into()),
            ("b".into(), 2.into()),
            ("c".into(), 3.into()),
            ("d".into(), 4.into()),
        ]);
        assert_eq!(
            serialize_with(options, &map).unwrap(),
            json!({"a": 1, "b": 2, "...": 2})
        );
    }

    #[test]
    fn test_depth_limit_renders_strings() {
        let options = SerializeOptions {
            max_depth: Some(1),
            ..SerializeOptions::default()
        };
        let nested = JmxValue::List(vec![1.into(), JmxValue::List(vec![2.into()])]);
        assert_eq!(serialize_with(options, &nested).unwrap(), json!([1, "[2]"]));
    }

    #[test]
    fn test_object_limit() {
        let list = JmxValue::List(vec![1.into(), 2.into(), 3.into()]);
        let throwing = SerializeOptions {
            max_objects: Some(2),
            ..SerializeOptions::default()
        };
        assert!(matches!(
            serialize_with(throwing.clone(), &list),
            Err(JolokiaError::ObjectLimitExceeded { limit: 2 })
        ));
        let ignoring = SerializeOptions {
            fault_handler: FaultHandler::Ignoring,
            ..throwing
        };
        assert_eq!(serialize_with(ignoring, &list).unwrap(), json!([1]));
    }

    #[test]
    fn test_bean_cycles() {
        let parent = Arc::new(PropertyBean::new("test.Node").with("name", "root"));
        let child = Arc::new(PropertyBean::new("test.Node").with("name", "leaf"));
        parent.set("self", JmxValue::Bean(parent.clone()));
        parent.set("child", JmxValue::Bean(child.clone()));
        child.set("up", JmxValue::Bean(parent.clone()));

        let json = plain(&JmxValue::Bean(parent.clone()));
        assert_eq!(json["name"], "root");
        assert_eq!(json["self"], "[this]");
        let up = json["child"]["up"].as_str().unwrap();
        assert!(up.starts_with("[Reference test.Node@"), "{}", up);
    }

    #[test]
    fn test_failing_property() {
        let bean = PropertyBean::new("test.Bean")
            .with("ok", 1)
            .with_failing("broken", "getter threw")
            .into_value();
        assert!(matches!(
            serialize_with(SerializeOptions::default(), &bean),
            Err(JolokiaError::PropertyUnreadable { .. })
        ));
        let ignoring = SerializeOptions {
            fault_handler: FaultHandler::Ignoring,
            ..SerializeOptions::default()
        };
        assert_eq!(serialize_with(ignoring, &bean).unwrap(), json!({"ok": 1}));
    }

    fn row_type() -> CompositeType {
        CompositeType::new("row")
            .with_item("key", OpenType::simple(SimpleType::String))
            .with_item("value", OpenType::simple(SimpleType::Long))
    }

    #[test]
    fn test_tabular_mxbean_map() {
        let tabular_type = TabularType {
            type_name: "map".into(),
            description: None,
            row_type: row_type(),
            index_names: vec!["key".into()],
        };
        let row = |k: &str, v: i64| {
            CompositeData::new(row_type(), vec![("key".into(), k.into()), ("value".into(), v.into())])
        };
        let table = JmxValue::Tabular(TabularData::new(tabular_type, vec![row("a", 1), row("b", 2)]));
        assert_eq!(plain(&table), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_tabular_nested_by_index() {
        let row_type = CompositeType::new("thread")
            .with_item("group", OpenType::simple(SimpleType::String))
            .with_item("id", OpenType::simple(SimpleType::Integer))
            .with_item("state", OpenType::simple(SimpleType::String));
        let tabular_type = TabularType {
            type_name: "threads".into(),
            description: None,
            row_type: row_type.clone(),
            index_names: vec!["group".into(), "id".into()],
        };
        let row = CompositeData::new(
            row_type,
            vec![
                ("group".into(), "main".into()),
                ("id".into(), 1.into()),
                ("state".into(), "RUNNABLE".into()),
            ],
        );
        let table = JmxValue::Tabular(TabularData::new(tabular_type, vec![row]));
        assert_eq!(
            plain(&table),
            json!({"main": {"1": {"group": "main", "id": 1, "state": "RUNNABLE"}}})
        );
    }

    #[test]
    fn test_unresolvable_path() {
        let list = JmxValue::List(vec![1.into()]);
        let serializer = Serializer::default();
        assert!(serializer.serialize(&list, &["5".to_string()]).is_err());
        let ignoring = Serializer::new(SerializeOptions {
            fault_handler: FaultHandler::Ignoring,
            ..SerializeOptions::default()
        });
        assert_eq!(ignoring.serialize(&list, &["5".to_string()]).unwrap(), Value::Null);
        assert_eq!(ignoring.serialize(&list, &["0".to_string()]).unwrap(), json!(1));
    }
}
