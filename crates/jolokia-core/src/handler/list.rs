use serde_json::Value;

use super::{JolokiaContext, JolokiaRequest, RequestHandler, RequestType};
use crate::errors::Result;
use crate::list::{ListOptions, ListPath, MBeanInfoData};

/// Answers list requests with the MBean metadata tree
#[derive(Debug, Clone, Copy, Default)]
pub struct ListHandler;

impl RequestHandler for ListHandler {
    fn request_type(&self) -> RequestType {
        RequestType::List
    }

    fn handle_request(
        &self,
        ctx: &JolokiaContext,
        request: &JolokiaRequest,
        previous: Option<Value>,
    ) -> Result<Value> {
        let options = ListOptions::from_config(&ctx.effective_config(request));
        let path = ListPath::parse(&request.path, options.provider.as_deref(), &ctx.registry)?;
        let mut data = MBeanInfoData::new(
            options,
            path,
            &ctx.registry,
            &ctx.cache_key_providers,
            ctx.restrictor.as_ref(),
        );
        data.populate(&ctx.access)?;

        let stats = data.stats();
        tracing::debug!(
            mbean_count = stats.mbeans,
            cache_hits = stats.cache_hits,
            errors = stats.errors,
            "list tree assembled"
        );
        let value = data.apply_path()?;
        Ok(match previous {
            Some(previous) => merge(previous, value),
            None => value,
        })
    }
}

/// Deep merge of two list results, `next` winning on scalar conflicts
fn merge(previous: Value, next: Value) -> Value {
    match (previous, next) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => *existing = merge(existing.take(), value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (_, next) => next,
    }
}
