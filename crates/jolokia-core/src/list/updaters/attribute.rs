use serde_json::{json, Map, Value};

use crate::errors::Result;
use crate::list::updater::{description, non_empty, DataUpdater, UpdateContext};

pub const KEY_ATTRIBUTES: &str = "attr";

/// Attribute descriptors keyed by attribute name
///
/// Attributes the restrictor allows neither to read nor to write are left
/// out; `read` and `write` report the combined metadata/restrictor verdict.
#[derive(Debug, Default)]
pub struct AttributeDataUpdater;

impl DataUpdater for AttributeDataUpdater {
    fn key(&self) -> &'static str {
        KEY_ATTRIBUTES
    }

    fn extract(&self, ctx: &UpdateContext<'_>, filter: Option<&str>) -> Result<Option<Value>> {
        let mut attrs = Map::new();
        for attr in &ctx.info.attributes {
            if filter.is_some_and(|f| f != attr.name) {
                continue;
            }
            let read =
                attr.readable && ctx.restrictor.is_attribute_read_allowed(ctx.name, &attr.name);
            let write =
                attr.writable && ctx.restrictor.is_attribute_write_allowed(ctx.name, &attr.name);
            if !read && !write {
                continue;
            }
            attrs.insert(
                attr.name.clone(),
                json!({
                    "type": attr.type_name,
                    "desc": description(&attr.description),
                    "read": read,
                    "write": write,
                    "readWrite": read && write,
                    "is": attr.is,
                }),
            );
        }
        Ok(non_empty(attrs))
    }
}
