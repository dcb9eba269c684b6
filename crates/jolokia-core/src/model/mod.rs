pub mod mbean_info;
pub mod object_name;
pub mod open_type;
pub mod value;

pub use mbean_info::{
    Impact, MBeanAttributeInfo, MBeanConstructorInfo, MBeanInfo, MBeanNotificationInfo,
    MBeanOperationInfo, MBeanParameterInfo, ObjectInstance,
};
pub use object_name::ObjectName;
pub use open_type::{CompositeItem, CompositeType, OpenType, SimpleType, TabularType};
pub use value::{CompositeData, JavaBean, JmxValue, PropertyBean, TabularData};
