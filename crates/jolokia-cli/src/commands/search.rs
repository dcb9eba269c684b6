//! Search command
//!
//! Usage: jolokia <FIXTURE> search <PATTERN>

use clap::Args;
use jolokia_core::errors::Result;
use jolokia_core::handler::{JolokiaRequest, RequestType};

use super::object_name;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// ObjectName pattern, e.g. `java.lang:type=MemoryPool,*`
    pub pattern: String,
}

pub fn request(args: SearchArgs) -> Result<JolokiaRequest> {
    Ok(JolokiaRequest::new(RequestType::Search).with_mbean(object_name(&args.pattern)?))
}
