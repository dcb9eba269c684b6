use serde_json::Value;

use crate::errors::Result;
use crate::list::updater::{DataUpdater, UpdateContext};

pub const KEY_CLASS: &str = "class";
pub const KEY_DESCRIPTION: &str = "desc";

#[derive(Debug, Default)]
pub struct ClassNameDataUpdater;

impl DataUpdater for ClassNameDataUpdater {
    fn key(&self) -> &'static str {
        KEY_CLASS
    }

    fn extract(&self, ctx: &UpdateContext<'_>, _filter: Option<&str>) -> Result<Option<Value>> {
        Ok(Some(Value::String(ctx.info.class_name.clone())))
    }

    fn accepts_filter(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct DescriptionDataUpdater;

impl DataUpdater for DescriptionDataUpdater {
    fn key(&self) -> &'static str {
        KEY_DESCRIPTION
    }

    fn extract(&self, ctx: &UpdateContext<'_>, _filter: Option<&str>) -> Result<Option<Value>> {
        Ok(ctx.info.description.clone().map(Value::String))
    }

    fn accepts_filter(&self) -> bool {
        false
    }
}
