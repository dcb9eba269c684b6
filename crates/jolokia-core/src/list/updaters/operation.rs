use serde_json::{json, Value};

use crate::errors::Result;
use crate::list::updater::{description, group_by_name, non_empty, DataUpdater, UpdateContext};
use crate::model::MBeanParameterInfo;

pub const KEY_OPERATIONS: &str = "op";
pub const KEY_CONSTRUCTORS: &str = "ctor";

fn args(signature: &[MBeanParameterInfo]) -> Value {
    Value::Array(
        signature
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "type": p.type_name,
                    "desc": description(&p.description),
                })
            })
            .collect(),
    )
}

/// Operations keyed by name; overloads become an array
#[derive(Debug, Default)]
pub struct OperationDataUpdater;

impl DataUpdater for OperationDataUpdater {
    fn key(&self) -> &'static str {
        KEY_OPERATIONS
    }

    fn extract(&self, ctx: &UpdateContext<'_>, filter: Option<&str>) -> Result<Option<Value>> {
        let ops = ctx
            .info
            .operations
            .iter()
            .filter(|op| filter.map_or(true, |f| f == op.name))
            .filter(|op| ctx.restrictor.is_operation_allowed(ctx.name, &op.name))
            .map(|op| {
                (
                    op.name.clone(),
                    json!({
                        "args": args(&op.signature),
                        "ret": op.return_type,
                        "desc": description(&op.description),
                    }),
                )
            });
        Ok(non_empty(group_by_name(ops)))
    }
}

/// Constructors keyed by name; overloads become an array
#[derive(Debug, Default)]
pub struct ConstructorDataUpdater;

impl DataUpdater for ConstructorDataUpdater {
    fn key(&self) -> &'static str {
        KEY_CONSTRUCTORS
    }

    fn extract(&self, ctx: &UpdateContext<'_>, filter: Option<&str>) -> Result<Option<Value>> {
        let ctors = ctx
            .info
            .constructors
            .iter()
            .filter(|c| filter.map_or(true, |f| f == c.name))
            .map(|c| {
                (
                    c.name.clone(),
                    json!({
                        "args": args(&c.signature),
                        "desc": description(&c.description),
                    }),
                )
            });
        Ok(non_empty(group_by_name(ctors)))
    }
}
