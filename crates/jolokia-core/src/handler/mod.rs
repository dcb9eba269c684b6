//! Request handlers and dispatch
//!
//! One [`RequestHandler`] per request type. The [`RequestDispatcher`] checks
//! the restrictor, picks the handler and wraps the outcome into the response
//! envelope.

pub mod dispatcher;
pub mod exec;
pub mod list;
pub mod read;
pub mod request;
pub mod search;
pub mod write;

pub use dispatcher::RequestDispatcher;
pub use exec::ExecHandler;
pub use list::ListHandler;
pub use read::ReadHandler;
pub use request::{JolokiaRequest, RequestType, RequestValue};
pub use search::SearchHandler;
pub use write::WriteHandler;

use std::sync::Arc;

use serde_json::Value;

use crate::config::AgentConfig;
use crate::errors::{JolokiaError, Result};
use crate::list::{CacheKeyProvider, JdkManagementCacheKeyProvider, UpdaterRegistry};
use crate::model::ObjectName;
use crate::restrictor::{AllowAllRestrictor, Restrictor};
use crate::serialize::{SerializeOptions, Serializer};
use crate::server::MBeanServerAccess;

/// Everything a handler needs besides the request itself
pub struct JolokiaContext {
    pub config: AgentConfig,
    pub access: MBeanServerAccess,
    pub restrictor: Arc<dyn Restrictor>,
    pub registry: UpdaterRegistry,
    pub cache_key_providers: Vec<Box<dyn CacheKeyProvider>>,
}

impl JolokiaContext {
    /// Default config, no restrictions, standard updaters and the platform
    /// MXBean cache key provider
    pub fn new(access: MBeanServerAccess) -> Self {
        Self {
            config: AgentConfig::default(),
            access,
            restrictor: Arc::new(AllowAllRestrictor),
            registry: UpdaterRegistry::standard(),
            cache_key_providers: vec![Box::new(JdkManagementCacheKeyProvider)],
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_restrictor(mut self, restrictor: Arc<dyn Restrictor>) -> Self {
        self.restrictor = restrictor;
        self
    }

    pub fn with_registry(mut self, registry: UpdaterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_cache_key_provider(mut self, provider: Box<dyn CacheKeyProvider>) -> Self {
        self.cache_key_providers.push(provider);
        self
    }

    /// Config with the request's overrides applied
    pub fn effective_config(&self, request: &JolokiaRequest) -> AgentConfig {
        request.params.resolve(&self.config)
    }

    pub fn serializer(&self, request: &JolokiaRequest) -> Serializer {
        Serializer::new(SerializeOptions::from_config(&self.effective_config(request)))
    }
}

pub trait RequestHandler: Send + Sync {
    fn request_type(&self) -> RequestType;

    fn can_handle(&self, request: &JolokiaRequest) -> bool {
        request.request_type == self.request_type()
    }

    /// Handle `request`, combining with the result of an earlier handler
    /// for the same request when there is one
    ///
    /// # Errors
    ///
    /// Returns the handler's error; it ends up in the error envelope.
    fn handle_request(
        &self,
        ctx: &JolokiaContext,
        request: &JolokiaRequest,
        previous: Option<Value>,
    ) -> Result<Value>;
}

/// MBean of a request that requires one
pub(crate) fn required_mbean(request: &JolokiaRequest) -> Result<&ObjectName> {
    request.mbean.as_ref().ok_or_else(|| {
        JolokiaError::invalid_request(format!("{} request requires an mbean", request.request_type))
    })
}

/// Same as [`required_mbean`] but rejects patterns
pub(crate) fn concrete_mbean(request: &JolokiaRequest) -> Result<&ObjectName> {
    let name = required_mbean(request)?;
    if name.is_pattern() {
        return Err(JolokiaError::PatternNotAllowed {
            name: name.to_string(),
        });
    }
    Ok(name)
}
