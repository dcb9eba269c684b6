//! Request dispatch and response envelopes
//!
//! Success: `{"request": <echo>, "value": <result>, "status": 200, "timestamp": <epoch secs>}`.
//! Failure: the [`ExError`] envelope carrying the request id.

use std::time::Instant;

use serde_json::{Map, Value};

use super::{
    ExecHandler, JolokiaContext, JolokiaRequest, ListHandler, ReadHandler, RequestHandler,
    SearchHandler, WriteHandler,
};
use crate::core_types::RequestContext;
use crate::errors::{ExError, JolokiaError, Result};
use crate::{log_op_end, log_op_error, log_op_start};

pub struct RequestDispatcher {
    handlers: Vec<Box<dyn RequestHandler>>,
}

impl Default for RequestDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDispatcher {
    /// Dispatcher with one handler per request type
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Box::new(ListHandler),
                Box::new(ReadHandler),
                Box::new(WriteHandler),
                Box::new(ExecHandler),
                Box::new(SearchHandler),
            ],
        }
    }

    /// Dispatcher without handlers
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler; every handler accepting a request runs, in order
    pub fn with_handler(mut self, handler: Box<dyn RequestHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Run all handlers accepting `request`, chaining their results
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` if the request type is not allowed,
    /// `InvalidRequest` if no handler accepts it, or the first handler error.
    pub fn dispatch(&self, ctx: &JolokiaContext, request: &JolokiaRequest) -> Result<Value> {
        if !ctx.restrictor.is_type_allowed(request.request_type) {
            return Err(JolokiaError::AccessDenied {
                reason: format!("{} requests are not allowed", request.request_type),
            });
        }
        let mut result = None;
        for handler in self.handlers.iter().filter(|h| h.can_handle(request)) {
            result = Some(handler.handle_request(ctx, request, result.take())?);
        }
        result.ok_or_else(|| {
            JolokiaError::invalid_request(format!(
                "no handler for {} requests",
                request.request_type
            ))
        })
    }

    /// Dispatch and wrap the outcome into a response envelope
    pub fn execute(&self, ctx: &JolokiaContext, request: &JolokiaRequest) -> Value {
        let request_ctx = RequestContext::new();
        let op = request.request_type.as_str();
        let start = Instant::now();
        log_op_start!(op, request_ctx.request_id);

        match self.dispatch(ctx, request) {
            Ok(value) => {
                log_op_end!(
                    op,
                    request_ctx.request_id,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                let mut envelope = Map::new();
                envelope.insert("request".into(), request.to_json());
                envelope.insert("value".into(), value);
                envelope.insert("status".into(), Value::from(200));
                envelope.insert("timestamp".into(), Value::from(chrono::Utc::now().timestamp()));
                Value::Object(envelope)
            }
            Err(err) => {
                log_op_error!(
                    op,
                    request_ctx.request_id,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                error_envelope(err, Some(op), request_ctx)
            }
        }
    }

    /// Parse a JSON request and execute it
    pub fn execute_json(&self, ctx: &JolokiaContext, json: &Value) -> Value {
        match JolokiaRequest::from_json(json) {
            Ok(request) => self.execute(ctx, &request),
            Err(err) => error_envelope(err, None, RequestContext::new()),
        }
    }

    /// Parse a GET-style path and execute it
    pub fn execute_path(&self, ctx: &JolokiaContext, path: &str) -> Value {
        match JolokiaRequest::from_get_path(path) {
            Ok(request) => self.execute(ctx, &request),
            Err(err) => error_envelope(err, None, RequestContext::new()),
        }
    }
}

fn error_envelope(err: JolokiaError, op: Option<&str>, request_ctx: RequestContext) -> Value {
    let mut ex_err = ExError::from(err).with_request_id(request_ctx.request_id);
    if let Some(op) = op {
        ex_err = ex_err.with_op(op);
    }
    ex_err.to_envelope()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::RequestType;
    use crate::restrictor::RuleRestrictor;
    use crate::server::{InMemoryMBeanServer, MBeanServerAccess};
    use std::sync::Arc;

    fn context() -> JolokiaContext {
        JolokiaContext::new(MBeanServerAccess::single(Arc::new(InMemoryMBeanServer::new())))
    }

    #[test]
    fn test_success_envelope() {
        let response = RequestDispatcher::new().execute(&context(), &JolokiaRequest::list(vec![]));
        assert_eq!(response["status"], 200);
        assert_eq!(response["value"], serde_json::json!({}));
        assert_eq!(response["request"]["type"], "list");
        assert!(response["timestamp"].is_i64());
    }

    #[test]
    fn test_type_not_allowed() {
        let restrictor = RuleRestrictor::new().allow_types(vec![RequestType::Read]);
        let ctx = context().with_restrictor(Arc::new(restrictor));
        let response = RequestDispatcher::new().execute(&ctx, &JolokiaRequest::list(vec![]));
        assert_eq!(response["status"], 403);
        assert_eq!(response["error_type"], "ERR_FORBIDDEN");
        assert!(response["request_id"].is_string());
    }

    #[test]
    fn test_no_handler() {
        let err = RequestDispatcher::empty()
            .dispatch(&context(), &JolokiaRequest::list(vec![]))
            .unwrap_err();
        assert!(matches!(err, JolokiaError::InvalidRequest { .. }));
    }

    #[test]
    fn test_malformed_json_request() {
        let response =
            RequestDispatcher::new().execute_json(&context(), &serde_json::json!({"type": 1}));
        assert_eq!(response["status"], 400);
    }
}
