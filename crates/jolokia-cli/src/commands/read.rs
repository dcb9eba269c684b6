//! Read command
//!
//! Usage: jolokia <FIXTURE> read <MBEAN> [ATTRIBUTE] [--path <PATH>]

use clap::Args;
use jolokia_core::errors::Result;
use jolokia_core::handler::{JolokiaRequest, RequestType};

use super::{inner_path, object_name};

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// MBean name or pattern
    pub mbean: String,

    /// Attribute to read; all readable attributes when omitted
    pub attribute: Option<String>,

    /// Path into the attribute value
    #[arg(short, long)]
    pub path: Option<String>,
}

pub fn request(args: ReadArgs) -> Result<JolokiaRequest> {
    let mut request = JolokiaRequest::new(RequestType::Read)
        .with_mbean(object_name(&args.mbean)?)
        .with_path(inner_path(args.path.as_deref()));
    if let Some(attribute) = args.attribute {
        request = request.with_attribute(attribute);
    }
    Ok(request)
}
