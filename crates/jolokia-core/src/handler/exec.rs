use serde_json::Value;

use super::{concrete_mbean, JolokiaContext, JolokiaRequest, RequestHandler, RequestType};
use crate::errors::{JolokiaError, Result};
use crate::model::{MBeanInfo, MBeanOperationInfo, ObjectName};

/// Invokes an operation
///
/// Overloads are chosen by an explicit signature (`op(int,long)`) or, when
/// none is given, by the number of arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecHandler;

/// Split `name(type1,type2)` into name and signature
fn parse_operation(operation: &str) -> (&str, Option<Vec<String>>) {
    match operation.split_once('(') {
        Some((name, rest)) => {
            let types = rest.trim_end_matches(')').trim();
            let signature = if types.is_empty() {
                Vec::new()
            } else {
                types.split(',').map(|t| t.trim().to_string()).collect()
            };
            (name, Some(signature))
        }
        None => (operation, None),
    }
}

fn resolve_overload<'a>(
    info: &'a MBeanInfo,
    mbean: &ObjectName,
    operation: &str,
    signature: Option<&[String]>,
    argument_count: usize,
) -> Result<&'a MBeanOperationInfo> {
    let overloads = info.operations_named(operation);
    let not_found = |detail: String| JolokiaError::OperationNotFound {
        mbean: mbean.to_string(),
        operation: detail,
    };
    if overloads.is_empty() {
        return Err(not_found(operation.to_string()));
    }
    if let Some(signature) = signature {
        return overloads
            .into_iter()
            .find(|op| op.signature_types() == signature)
            .ok_or_else(|| not_found(format!("{}({})", operation, signature.join(","))));
    }
    let matching: Vec<&MBeanOperationInfo> = overloads
        .iter()
        .copied()
        .filter(|op| op.signature.len() == argument_count)
        .collect();
    match matching.as_slice() {
        [single] => Ok(*single),
        [] => Err(not_found(format!(
            "{} with {} argument(s)",
            operation, argument_count
        ))),
        _ => Err(JolokiaError::AmbiguousOperation {
            mbean: mbean.to_string(),
            operation: operation.to_string(),
            candidates: matching.iter().map(|op| op.signature_string()).collect(),
        }),
    }
}

impl RequestHandler for ExecHandler {
    fn request_type(&self) -> RequestType {
        RequestType::Exec
    }

    fn handle_request(
        &self,
        ctx: &JolokiaContext,
        request: &JolokiaRequest,
        _previous: Option<Value>,
    ) -> Result<Value> {
        let name = concrete_mbean(request)?;
        let operation = request
            .operation
            .as_deref()
            .ok_or_else(|| JolokiaError::invalid_request("exec request requires an operation"))?;
        let (operation_name, signature) = parse_operation(operation);
        if ctx.restrictor.is_object_name_hidden(name) {
            return Err(JolokiaError::InstanceNotFound {
                mbean: name.to_string(),
            });
        }
        if !ctx.restrictor.is_operation_allowed(name, operation_name) {
            return Err(JolokiaError::AccessDenied {
                reason: format!("invoking {} on {} is not allowed", operation_name, name),
            });
        }

        let connection = ctx.access.find_connection(name)?;
        let info = connection.get_mbean_info(name)?;
        let overload = resolve_overload(
            &info,
            name,
            operation_name,
            signature.as_deref(),
            request.arguments.len(),
        )?;
        if overload.signature.len() != request.arguments.len() {
            return Err(JolokiaError::invalid_request(format!(
                "{} expects {} argument(s), got {}",
                overload.signature_string(),
                overload.signature.len(),
                request.arguments.len()
            )));
        }
        let params = overload
            .signature
            .iter()
            .zip(&request.arguments)
            .map(|(param, argument)| argument.convert(&param.type_name, None))
            .collect::<Result<Vec<_>>>()?;

        let result = connection.invoke(name, operation_name, params, &overload.signature_types())?;
        ctx.serializer(request).serialize(&result, &request.path)
    }
}
