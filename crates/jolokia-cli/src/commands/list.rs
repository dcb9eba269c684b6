//! List command
//!
//! Usage: jolokia <FIXTURE> list [--path <PATH>] [--max-depth <N>] [--cache] [--keys] [--interfaces]

use clap::Args;
use jolokia_core::config::ProcessingParameters;
use jolokia_core::errors::Result;
use jolokia_core::handler::JolokiaRequest;

use super::inner_path;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Path into the tree, e.g. `java.lang/type=Memory/attr`
    #[arg(short, long)]
    pub path: Option<String>,

    /// Levels to return, 0 for all
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Share metadata of MBeans with identical descriptions
    #[arg(long)]
    pub cache: bool,

    /// Include the key properties of each MBean
    #[arg(long)]
    pub keys: bool,

    /// Include the interfaces of each MBean class
    #[arg(long)]
    pub interfaces: bool,
}

pub fn request(args: ListArgs) -> Result<JolokiaRequest> {
    let params = ProcessingParameters {
        max_depth: args.max_depth,
        list_cache: args.cache.then_some(true),
        list_keys: args.keys.then_some(true),
        list_interfaces: args.interfaces.then_some(true),
        ..ProcessingParameters::default()
    };
    Ok(JolokiaRequest::list(inner_path(args.path.as_deref())).with_params(params))
}
