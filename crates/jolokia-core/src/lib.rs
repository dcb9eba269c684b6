//! Jolokia core - MBean introspection and value conversion
//!
//! This crate provides the request-independent machinery of the agent:
//! - ObjectName parsing, patterns and canonical key ordering
//! - The MBean metadata model and the MBean server seam
//! - The list engine: `MBeanInfoData`, data updaters and cache key providers
//! - Path escaping shared by GET requests and list paths
//! - The value serializer and deserializer
//! - Request handlers for list, read, write, exec and search
//! - Configuration, restrictor, errors and the logging facility

pub mod config;
pub mod errors;
pub mod handler;
pub mod list;
pub mod logging_facility;
pub mod model;
pub mod path;
pub mod restrictor;
pub mod serialize;
pub mod server;

pub use jolokia_core_types as core_types;

// Re-export commonly used types
pub use config::{AgentConfig, ProcessingParameters};
pub use errors::{ExError, ExErrorKind, JolokiaError, Result};
pub use handler::{JolokiaContext, JolokiaRequest, RequestDispatcher, RequestHandler, RequestType};
pub use list::{ListOptions, ListPath, MBeanInfoData, UpdaterRegistry};
pub use model::{JmxValue, MBeanInfo, ObjectName};
pub use restrictor::{AllowAllRestrictor, Restrictor};
pub use serialize::{SerializeOptions, Serializer};
pub use server::{InMemoryMBeanServer, MBeanServerAccess, MBeanServerConnection};
