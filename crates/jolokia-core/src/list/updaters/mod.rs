//! The built-in data updaters, one per MBean facet

mod attribute;
mod interfaces;
mod keys;
mod notification;
mod operation;
mod scalar;

pub use attribute::{AttributeDataUpdater, KEY_ATTRIBUTES};
pub use interfaces::{ListInterfacesDataUpdater, KEY_INTERFACES};
pub use keys::{ListKeysDataUpdater, KEY_KEYS};
pub use notification::{NotificationDataUpdater, KEY_NOTIFICATIONS};
pub use operation::{ConstructorDataUpdater, OperationDataUpdater, KEY_CONSTRUCTORS, KEY_OPERATIONS};
pub use scalar::{ClassNameDataUpdater, DescriptionDataUpdater, KEY_CLASS, KEY_DESCRIPTION};
