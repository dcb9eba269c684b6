//! MBean server seam
//!
//! The engine only talks to MBean servers through [`MBeanServerConnection`].
//! [`InMemoryMBeanServer`] hosts [`DynamicMBean`]s for the CLI and tests;
//! [`MBeanServerAccess`] merges several servers into one view.

pub mod access;
pub mod connection;
pub mod in_memory;
pub mod mbean;

pub use access::{Located, MBeanServerAccess};
pub use connection::MBeanServerConnection;
pub use in_memory::InMemoryMBeanServer;
pub use mbean::{DynamicMBean, OperationFn, SimpleMBean};
