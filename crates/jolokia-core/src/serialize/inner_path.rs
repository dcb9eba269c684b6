//! Navigation into a value along an inner path

use crate::errors::{JolokiaError, Result};
use crate::model::JmxValue;
use crate::path::is_wildcard;

/// Value reached by following `path` from `value`
///
/// Lists and arrays take a numeric index, maps and composites a key, beans a
/// property name. A tabular value consumes one segment per index column.
///
/// # Errors
///
/// Returns `InvalidPath` when a segment does not resolve, and the bean's
/// error when a property getter fails.
pub fn extract_path(value: &JmxValue, path: &[String]) -> Result<JmxValue> {
    let mut current = value.clone();
    let mut rest = path;
    while let Some((segment, tail)) = rest.split_first() {
        if is_wildcard(segment) {
            return Err(JolokiaError::invalid_path(format!(
                "wildcard '{}' not supported in an inner path",
                segment
            )));
        }
        rest = tail;
        current = match &current {
            JmxValue::Array { elements, .. } | JmxValue::List(elements) | JmxValue::Set(elements) => {
                let idx: usize = segment.parse().map_err(|_| {
                    JolokiaError::invalid_path(format!("'{}' is not a collection index", segment))
                })?;
                elements.get(idx).cloned().ok_or_else(|| {
                    JolokiaError::invalid_path(format!(
                        "index {} out of bounds for {} elements",
                        idx,
                        elements.len()
                    ))
                })?
            }
            JmxValue::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.to_string() == *segment)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| missing(segment))?,
            JmxValue::Composite(data) => data.get(segment).cloned().ok_or_else(|| missing(segment))?,
            JmxValue::Tabular(data) => {
                if data.tabular_type.is_mxbean_map() {
                    let row = data.row_by_index(&[segment.as_str()]).ok_or_else(|| missing(segment))?;
                    row.get("value").cloned().unwrap_or(JmxValue::Null)
                } else {
                    let width = data.tabular_type.index_names.len();
                    let mut keys: Vec<&str> = vec![segment.as_str()];
                    let take = width.saturating_sub(1).min(rest.len());
                    keys.extend(rest[..take].iter().map(String::as_str));
                    rest = &rest[take..];
                    let row = data.row_by_index(&keys).ok_or_else(|| {
                        JolokiaError::invalid_path(format!("no row indexed by {:?}", keys))
                    })?;
                    JmxValue::Composite(row.clone())
                }
            }
            JmxValue::Bean(bean) => bean.property(segment)?,
            other => {
                return Err(JolokiaError::invalid_path(format!(
                    "cannot navigate into {} with '{}'",
                    other.class_name(),
                    segment
                )))
            }
        };
    }
    Ok(current)
}

fn missing(segment: &str) -> JolokiaError {
    JolokiaError::invalid_path(format!("no entry '{}'", segment))
}
