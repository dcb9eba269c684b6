use serde_json::{Map, Value};

use super::{required_mbean, JolokiaContext, JolokiaRequest, RequestHandler, RequestType};
use crate::errors::{JolokiaError, Result};
use crate::model::ObjectName;
use crate::path::combine_to_path;
use crate::serialize::Serializer;
use crate::server::MBeanServerConnection;

/// Reads one attribute, several attributes, or attributes across a pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadHandler;

impl RequestHandler for ReadHandler {
    fn request_type(&self) -> RequestType {
        RequestType::Read
    }

    fn handle_request(
        &self,
        ctx: &JolokiaContext,
        request: &JolokiaRequest,
        _previous: Option<Value>,
    ) -> Result<Value> {
        let name = required_mbean(request)?;
        let serializer = ctx.serializer(request);
        if name.is_pattern() {
            return read_pattern(ctx, request, name, &serializer);
        }
        if ctx.restrictor.is_object_name_hidden(name) {
            return Err(JolokiaError::InstanceNotFound {
                mbean: name.to_string(),
            });
        }
        let connection = ctx.access.find_connection(name)?;
        match request.attributes.as_slice() {
            [attribute] => read_one(ctx, request, connection.as_ref(), name, attribute, &serializer),
            attributes => {
                let names = if attributes.is_empty() {
                    readable_attributes(ctx, connection.as_ref(), name)?
                } else {
                    attributes.to_vec()
                };
                read_many(ctx, request, connection.as_ref(), name, &names, &serializer)
            }
        }
    }
}

fn read_one(
    ctx: &JolokiaContext,
    request: &JolokiaRequest,
    connection: &dyn MBeanServerConnection,
    name: &ObjectName,
    attribute: &str,
    serializer: &Serializer,
) -> Result<Value> {
    if !ctx.restrictor.is_attribute_read_allowed(name, attribute) {
        return Err(JolokiaError::AccessDenied {
            reason: format!("reading {} of {} is not allowed", attribute, name),
        });
    }
    let value = connection.get_attribute(name, attribute)?;
    serializer
        .serialize(&value, &request.path)
        .map_err(|err| match err {
            JolokiaError::InvalidPath { .. } => {
                let mut full = vec![attribute.to_string()];
                full.extend(request.path.iter().cloned());
                JolokiaError::AttributeNotFound {
                    mbean: name.to_string(),
                    attribute: combine_to_path(&full),
                }
            }
            other => other,
        })
}

/// Readable attributes the restrictor lets through, in declaration order
fn readable_attributes(
    ctx: &JolokiaContext,
    connection: &dyn MBeanServerConnection,
    name: &ObjectName,
) -> Result<Vec<String>> {
    Ok(connection
        .get_mbean_info(name)?
        .attributes
        .into_iter()
        .filter(|a| a.readable && ctx.restrictor.is_attribute_read_allowed(name, &a.name))
        .map(|a| a.name)
        .collect())
}

/// `{attribute: value}`; failing attributes go through the fault handler
fn read_many(
    ctx: &JolokiaContext,
    request: &JolokiaRequest,
    connection: &dyn MBeanServerConnection,
    name: &ObjectName,
    attributes: &[String],
    serializer: &Serializer,
) -> Result<Value> {
    let mut out = Map::new();
    for attribute in attributes {
        match read_one(ctx, request, connection, name, attribute, serializer) {
            Ok(value) => {
                out.insert(attribute.clone(), value);
            }
            Err(err) => {
                if let Some(value) = serializer.options().fault_handler.handle::<Value>(err)? {
                    out.insert(attribute.clone(), value);
                }
            }
        }
    }
    Ok(Value::Object(out))
}

/// `{mbean: {attribute: value}}` over all visible matches
///
/// MBeans lacking a requested attribute are skipped.
fn read_pattern(
    ctx: &JolokiaContext,
    request: &JolokiaRequest,
    pattern: &ObjectName,
    serializer: &Serializer,
) -> Result<Value> {
    let mut out = Map::new();
    for (connection, name) in ctx.access.query_names(Some(pattern))? {
        if ctx.restrictor.is_object_name_hidden(&name) {
            continue;
        }
        let available = readable_attributes(ctx, connection.as_ref(), &name)?;
        let attributes: Vec<String> = if request.attributes.is_empty() {
            available
        } else {
            request
                .attributes
                .iter()
                .filter(|a| available.contains(a))
                .cloned()
                .collect()
        };
        if attributes.is_empty() {
            continue;
        }
        let values = read_many(ctx, request, connection.as_ref(), &name, &attributes, serializer)?;
        out.insert(name.to_string(), values);
    }
    if out.is_empty() && !request.attributes.is_empty() {
        return Err(JolokiaError::AttributeNotFound {
            mbean: pattern.to_string(),
            attribute: request.attributes.join(","),
        });
    }
    Ok(Value::Object(out))
}
