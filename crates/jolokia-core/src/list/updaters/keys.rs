use serde_json::{Map, Value};

use crate::errors::Result;
use crate::list::updater::{non_empty, DataUpdater, UpdateContext};
use crate::list::ListOptions;

pub const KEY_KEYS: &str = "keys";

/// Key properties of the ObjectName as a map
///
/// Independent of the metadata. Ordered canonically when canonical naming is
/// on, in registration order otherwise.
#[derive(Debug, Default)]
pub struct ListKeysDataUpdater;

impl DataUpdater for ListKeysDataUpdater {
    fn key(&self) -> &'static str {
        KEY_KEYS
    }

    fn extract(&self, ctx: &UpdateContext<'_>, filter: Option<&str>) -> Result<Option<Value>> {
        let mut props: Vec<&(String, String)> = ctx.name.key_properties().iter().collect();
        if ctx.options.use_canonical_name {
            props.sort_by(|a, b| a.0.cmp(&b.0));
        }
        let keys: Map<String, Value> = props
            .into_iter()
            .filter(|(k, _)| filter.map_or(true, |f| f == k.as_str()))
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Ok(non_empty(keys))
    }

    fn enabled_by_default(&self, options: &ListOptions) -> bool {
        options.list_keys
    }

    fn is_instance_specific(&self) -> bool {
        true
    }
}
