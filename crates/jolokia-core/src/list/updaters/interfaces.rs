use serde_json::Value;

use crate::errors::Result;
use crate::list::updater::{DataUpdater, UpdateContext};
use crate::list::ListOptions;

pub const KEY_INTERFACES: &str = "interfaces";

/// Interfaces implemented by the MBean class
///
/// Needs the server to resolve the class. Resolution failures are logged and
/// leave the facet out.
#[derive(Debug, Default)]
pub struct ListInterfacesDataUpdater;

impl DataUpdater for ListInterfacesDataUpdater {
    fn key(&self) -> &'static str {
        KEY_INTERFACES
    }

    fn extract(&self, ctx: &UpdateContext<'_>, _filter: Option<&str>) -> Result<Option<Value>> {
        match ctx.connection.interfaces_of(&ctx.info.class_name) {
            Ok(interfaces) if interfaces.is_empty() => Ok(None),
            Ok(interfaces) => Ok(Some(Value::Array(
                interfaces.into_iter().map(Value::String).collect(),
            ))),
            Err(err) => {
                tracing::debug!(
                    mbean = %ctx.name,
                    class_name = %ctx.info.class_name,
                    error = %err,
                    "cannot resolve interfaces"
                );
                Ok(None)
            }
        }
    }

    fn accepts_filter(&self) -> bool {
        false
    }

    fn enabled_by_default(&self, options: &ListOptions) -> bool {
        options.list_interfaces
    }
}
