//! Write command
//!
//! Usage: jolokia <FIXTURE> write <MBEAN> <ATTRIBUTE> <VALUE>
//!
//! `[null]` writes null and `""` the empty string.

use clap::Args;
use jolokia_core::errors::Result;
use jolokia_core::handler::{JolokiaRequest, RequestType};

use super::{object_name, text_value};

#[derive(Debug, Args)]
pub struct WriteArgs {
    pub mbean: String,
    pub attribute: String,
    pub value: String,
}

pub fn request(args: WriteArgs) -> Result<JolokiaRequest> {
    let mut request = JolokiaRequest::new(RequestType::Write)
        .with_mbean(object_name(&args.mbean)?)
        .with_attribute(args.attribute);
    request.value = Some(text_value(&args.value));
    Ok(request)
}
