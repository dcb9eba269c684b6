use serde_json::Value;

use super::ListOptions;
use crate::errors::Result;
use crate::model::{MBeanInfo, ObjectName};
use crate::restrictor::Restrictor;
use crate::server::MBeanServerConnection;

/// Everything an updater may consult for one MBean
pub struct UpdateContext<'a> {
    pub name: &'a ObjectName,
    pub info: &'a MBeanInfo,
    pub restrictor: &'a dyn Restrictor,
    pub connection: &'a dyn MBeanServerConnection,
    pub options: &'a ListOptions,
}

/// Produces one facet of an MBean's list entry
///
/// Each updater owns a single key of the entry (`attr`, `op`, ...). It returns
/// the fragment stored under that key, or `None` when there is nothing to
/// report; empty fragments are never stored.
pub trait DataUpdater: Send + Sync {
    /// Entry key owned by this updater, also its path selector
    fn key(&self) -> &'static str;

    /// Build the fragment, restricted to the item named `filter` if given
    ///
    /// # Errors
    ///
    /// Implementations fail only on internal errors; missing items yield `None`.
    fn extract(&self, ctx: &UpdateContext<'_>, filter: Option<&str>) -> Result<Option<Value>>;

    /// Whether a path may carry an item filter after this updater's selector
    fn accepts_filter(&self) -> bool {
        true
    }

    /// Whether the updater runs when no selector is given
    fn enabled_by_default(&self, _options: &ListOptions) -> bool {
        true
    }

    /// Fragments that differ between MBeans sharing a cache key
    fn is_instance_specific(&self) -> bool {
        false
    }
}

/// Collect `(name, fragment)` pairs into a map, grouping repeated names
///
/// One fragment per name is stored as is; several become an array in
/// declaration order.
pub(crate) fn group_by_name<I>(items: I) -> serde_json::Map<String, Value>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
    for (name, fragment) in items {
        match grouped.iter_mut().find(|(n, _)| *n == name) {
            Some((_, fragments)) => fragments.push(fragment),
            None => grouped.push((name, vec![fragment])),
        }
    }
    grouped
        .into_iter()
        .map(|(name, mut fragments)| {
            let value = if fragments.len() == 1 {
                fragments.remove(0)
            } else {
                Value::Array(fragments)
            };
            (name, value)
        })
        .collect()
}

/// `Some(Object)` unless the map is empty
pub(crate) fn non_empty(map: serde_json::Map<String, Value>) -> Option<Value> {
    (!map.is_empty()).then_some(Value::Object(map))
}

pub(crate) fn description(text: &Option<String>) -> Value {
    text.as_ref()
        .map(|d| Value::String(d.clone()))
        .unwrap_or(Value::Null)
}
