use serde_json::Value;

use super::{required_mbean, JolokiaContext, JolokiaRequest, RequestHandler, RequestType};
use crate::errors::Result;

/// Names of the visible MBeans matching a pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchHandler;

impl RequestHandler for SearchHandler {
    fn request_type(&self) -> RequestType {
        RequestType::Search
    }

    fn handle_request(
        &self,
        ctx: &JolokiaContext,
        request: &JolokiaRequest,
        _previous: Option<Value>,
    ) -> Result<Value> {
        let pattern = required_mbean(request)?;
        let canonical = ctx.effective_config(request).canonical_naming;
        let names = ctx
            .access
            .query_names(Some(pattern))?
            .into_iter()
            .filter(|(_, name)| !ctx.restrictor.is_object_name_hidden(name))
            .map(|(_, name)| {
                Value::String(if canonical {
                    name.canonical_name().to_string()
                } else {
                    name.to_string()
                })
            })
            .collect();
        Ok(Value::Array(names))
    }
}
