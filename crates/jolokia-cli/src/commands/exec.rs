//! Exec command
//!
//! Usage: jolokia <FIXTURE> exec <MBEAN> <OPERATION> [ARGS]...
//!
//! Overloaded operations are selected with a signature, e.g. `add(int,int)`.

use clap::Args;
use jolokia_core::errors::Result;
use jolokia_core::handler::{JolokiaRequest, RequestType};

use super::{object_name, text_value};

#[derive(Debug, Args)]
pub struct ExecArgs {
    pub mbean: String,
    pub operation: String,
    /// Operation arguments, converted to the parameter types
    pub args: Vec<String>,
}

pub fn request(args: ExecArgs) -> Result<JolokiaRequest> {
    let mut request = JolokiaRequest::new(RequestType::Exec).with_mbean(object_name(&args.mbean)?);
    request.operation = Some(args.operation);
    request.arguments = args.args.iter().map(|a| text_value(a)).collect();
    Ok(request)
}
