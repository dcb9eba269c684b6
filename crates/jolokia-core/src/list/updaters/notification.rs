use serde_json::{json, Map, Value};

use crate::errors::Result;
use crate::list::updater::{description, non_empty, DataUpdater, UpdateContext};

pub const KEY_NOTIFICATIONS: &str = "notif";

/// Notifications keyed by notification class name
#[derive(Debug, Default)]
pub struct NotificationDataUpdater;

impl DataUpdater for NotificationDataUpdater {
    fn key(&self) -> &'static str {
        KEY_NOTIFICATIONS
    }

    fn extract(&self, ctx: &UpdateContext<'_>, filter: Option<&str>) -> Result<Option<Value>> {
        let mut notifs = Map::new();
        for notif in &ctx.info.notifications {
            if filter.is_some_and(|f| f != notif.name) {
                continue;
            }
            notifs.insert(
                notif.name.clone(),
                json!({
                    "name": notif.name,
                    "desc": description(&notif.description),
                    "types": notif.notif_types,
                }),
            );
        }
        Ok(non_empty(notifs))
    }
}
