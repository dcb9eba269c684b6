use serde_json::Value;

use super::{concrete_mbean, JolokiaContext, JolokiaRequest, RequestHandler, RequestType};
use crate::errors::{JolokiaError, Result};
use crate::model::JmxValue;

/// Sets an attribute and answers with its previous value
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteHandler;

impl RequestHandler for WriteHandler {
    fn request_type(&self) -> RequestType {
        RequestType::Write
    }

    fn handle_request(
        &self,
        ctx: &JolokiaContext,
        request: &JolokiaRequest,
        _previous: Option<Value>,
    ) -> Result<Value> {
        let name = concrete_mbean(request)?;
        let (Some(attribute), Some(value)) = (request.attributes.first(), request.value.as_ref())
        else {
            return Err(JolokiaError::invalid_request(
                "write request requires an attribute and a value",
            ));
        };
        if !request.path.is_empty() {
            return Err(JolokiaError::invalid_request(
                "writing into an inner path is not supported",
            ));
        }
        if ctx.restrictor.is_object_name_hidden(name) {
            return Err(JolokiaError::InstanceNotFound {
                mbean: name.to_string(),
            });
        }
        if !ctx.restrictor.is_attribute_write_allowed(name, attribute) {
            return Err(JolokiaError::AccessDenied {
                reason: format!("writing {} of {} is not allowed", attribute, name),
            });
        }

        let connection = ctx.access.find_connection(name)?;
        let info = connection.get_mbean_info(name)?;
        let attribute_info =
            info.attribute(attribute)
                .ok_or_else(|| JolokiaError::AttributeNotFound {
                    mbean: name.to_string(),
                    attribute: attribute.clone(),
                })?;
        if !attribute_info.writable {
            return Err(JolokiaError::AttributeNotWritable {
                mbean: name.to_string(),
                attribute: attribute.clone(),
            });
        }

        let new_value = value.convert(&attribute_info.type_name, attribute_info.open_type.as_ref())?;
        let old_value = if attribute_info.readable {
            connection.get_attribute(name, attribute)?
        } else {
            JmxValue::Null
        };
        connection.set_attribute(name, attribute, new_value)?;
        tracing::debug!(mbean = %name, attribute = %attribute, "attribute written");
        ctx.serializer(request).serialize(&old_value, &[])
    }
}
