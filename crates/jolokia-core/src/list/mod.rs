//! MBean list engine
//!
//! Builds the `domain -> key list -> metadata` tree answered by list
//! requests. [`MBeanInfoData`] drives the per-request state; the metadata of
//! each MBean is produced by the [`DataUpdater`]s of an [`UpdaterRegistry`],
//! and MBeans with identical metadata can share one cache entry chosen by a
//! [`CacheKeyProvider`].

pub mod cache_key;
pub mod mbean_info_data;
pub mod registry;
pub mod request_path;
pub mod updater;
pub mod updaters;

pub use cache_key::{determine_cache_key, CacheKeyProvider, JdkManagementCacheKeyProvider};
pub use mbean_info_data::{ListStats, MBeanInfoData};
pub use registry::UpdaterRegistry;
pub use request_path::ListPath;
pub use updater::{DataUpdater, UpdateContext};

use crate::config::AgentConfig;

/// Settings of one list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Levels to materialize, `None` for all
    pub max_depth: Option<usize>,
    /// Canonical (sorted) key lists instead of registration order
    pub use_canonical_name: bool,
    pub list_keys: bool,
    pub list_cache: bool,
    pub list_interfaces: bool,
    pub provider: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            use_canonical_name: true,
            list_keys: false,
            list_cache: false,
            list_interfaces: false,
            provider: None,
        }
    }
}

impl ListOptions {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            max_depth: config.effective_max_depth(),
            use_canonical_name: config.canonical_naming,
            list_keys: config.list_keys,
            list_cache: config.list_cache,
            list_interfaces: config.list_interfaces,
            provider: config.provider.clone(),
        }
    }
}
