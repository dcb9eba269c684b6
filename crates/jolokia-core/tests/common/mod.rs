use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jolokia_core::config::ProcessingParameters;
use jolokia_core::errors::{JolokiaError, Result};
use jolokia_core::handler::{JolokiaContext, JolokiaRequest, ListHandler, RequestHandler};
use jolokia_core::model::{
    CompositeType, JmxValue, MBeanAttributeInfo, MBeanInfo, MBeanOperationInfo,
    MBeanParameterInfo, ObjectInstance, ObjectName, OpenType, SimpleType,
};
use jolokia_core::server::{
    InMemoryMBeanServer, MBeanServerAccess, MBeanServerConnection, SimpleMBean,
};
use serde_json::Value;

#[allow(dead_code)]
pub fn on(name: &str) -> ObjectName {
    ObjectName::parse(name).unwrap()
}

#[allow(dead_code)]
pub fn segments(path: &[&str]) -> Vec<String> {
    path.iter().map(|s| s.to_string()).collect()
}

#[allow(dead_code)]
pub fn memory_usage_type() -> CompositeType {
    CompositeType::new("java.lang.management.MemoryUsage")
        .with_item("init", OpenType::simple(SimpleType::Long))
        .with_item("used", OpenType::simple(SimpleType::Long))
        .with_item("committed", OpenType::simple(SimpleType::Long))
        .with_item("max", OpenType::simple(SimpleType::Long))
}

#[allow(dead_code)]
pub fn memory_usage(used: i64) -> JmxValue {
    JmxValue::Composite(jolokia_core::model::CompositeData::new(
        memory_usage_type(),
        vec![
            ("init".into(), JmxValue::Long(0)),
            ("used".into(), JmxValue::Long(used)),
            ("committed".into(), JmxValue::Long(used * 2)),
            ("max".into(), JmxValue::Long(-1)),
        ],
    ))
}

#[allow(dead_code)]
pub fn memory_mbean() -> SimpleMBean {
    let info = MBeanInfo::new("sun.management.MemoryImpl", "Memory system")
        .with_attribute(
            MBeanAttributeInfo::new(
                "HeapMemoryUsage",
                "javax.management.openmbean.CompositeData",
                "heap usage",
            )
            .with_open_type(OpenType::Composite(memory_usage_type())),
        )
        .with_attribute(MBeanAttributeInfo::new("Verbose", "boolean", "verbose gc").writable())
        .with_operation(MBeanOperationInfo::new("gc", "void", "run gc"));
    SimpleMBean::new(info)
        .with_value("HeapMemoryUsage", memory_usage(1024))
        .with_value("Verbose", false)
        .with_operation("gc()", |_| Ok(JmxValue::Null))
}

#[allow(dead_code)]
pub fn memory_pool_mbean(name: &str) -> SimpleMBean {
    let info = MBeanInfo::new("sun.management.MemoryPoolImpl", "Memory pool")
        .with_attribute(MBeanAttributeInfo::new("Name", "java.lang.String", "pool name"))
        .with_attribute(
            MBeanAttributeInfo::new("UsageThreshold", "long", "threshold").writable(),
        )
        .with_operation(MBeanOperationInfo::new("resetPeakUsage", "void", "reset peak"));
    SimpleMBean::new(info)
        .with_value("Name", name)
        .with_value("UsageThreshold", 0_i64)
}

/// Operations `add(int,int)`, `add(long,long)` and `reset()`
#[allow(dead_code)]
pub fn calculator_mbean() -> SimpleMBean {
    let info = MBeanInfo::new("test.Calculator", "Calculator")
        .with_operation(
            MBeanOperationInfo::new("add", "int", "add ints")
                .with_param(MBeanParameterInfo::new("a", "int", ""))
                .with_param(MBeanParameterInfo::new("b", "int", "")),
        )
        .with_operation(
            MBeanOperationInfo::new("add", "long", "add longs")
                .with_param(MBeanParameterInfo::new("a", "long", ""))
                .with_param(MBeanParameterInfo::new("b", "long", "")),
        )
        .with_operation(MBeanOperationInfo::new("reset", "void", "reset"));
    SimpleMBean::new(info)
        .with_operation("add(int,int)", |args| {
            let sum: i64 = args.iter().filter_map(JmxValue::as_i64).sum();
            Ok(JmxValue::Integer(sum as i32))
        })
        .with_operation("add(long,long)", |args| {
            Ok(JmxValue::Long(args.iter().filter_map(JmxValue::as_i64).sum()))
        })
        .with_operation("reset()", |_| Ok(JmxValue::Null))
}

/// A small platform-like server
///
/// `java.lang:type=Memory`, two memory pools sharing metadata,
/// `test:type=Calculator` and the attribute-less `test:type=Empty`.
#[allow(dead_code)]
pub fn platform_server() -> Arc<InMemoryMBeanServer> {
    let server = InMemoryMBeanServer::new();
    server
        .register(on("java.lang:type=Memory"), Arc::new(memory_mbean()))
        .unwrap();
    server
        .register(
            on("java.lang:type=MemoryPool,name=Eden Space"),
            Arc::new(memory_pool_mbean("Eden Space")),
        )
        .unwrap();
    server
        .register(
            on("java.lang:type=MemoryPool,name=Survivor Space"),
            Arc::new(memory_pool_mbean("Survivor Space")),
        )
        .unwrap();
    server
        .register(on("test:type=Calculator"), Arc::new(calculator_mbean()))
        .unwrap();
    server
        .register(
            on("test:type=Empty"),
            Arc::new(SimpleMBean::new(MBeanInfo::new("test.Empty", "nothing here"))),
        )
        .unwrap();
    Arc::new(server)
}

/// Connection wrapper counting metadata calls
#[allow(dead_code)]
pub struct CountingConnection {
    inner: Arc<dyn MBeanServerConnection>,
    info_calls: AtomicUsize,
    instance_calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingConnection {
    pub fn new(inner: Arc<dyn MBeanServerConnection>) -> Self {
        Self {
            inner,
            info_calls: AtomicUsize::new(0),
            instance_calls: AtomicUsize::new(0),
        }
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn instance_calls(&self) -> usize {
        self.instance_calls.load(Ordering::SeqCst)
    }
}

impl MBeanServerConnection for CountingConnection {
    fn query_names(&self, pattern: Option<&ObjectName>) -> Result<Vec<ObjectName>> {
        self.inner.query_names(pattern)
    }

    fn is_registered(&self, name: &ObjectName) -> Result<bool> {
        self.inner.is_registered(name)
    }

    fn get_object_instance(&self, name: &ObjectName) -> Result<ObjectInstance> {
        self.instance_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_object_instance(name)
    }

    fn get_mbean_info(&self, name: &ObjectName) -> Result<MBeanInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_mbean_info(name)
    }

    fn get_attribute(&self, name: &ObjectName, attribute: &str) -> Result<JmxValue> {
        self.inner.get_attribute(name, attribute)
    }

    fn set_attribute(&self, name: &ObjectName, attribute: &str, value: JmxValue) -> Result<()> {
        self.inner.set_attribute(name, attribute, value)
    }

    fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: Vec<JmxValue>,
        signature: &[String],
    ) -> Result<JmxValue> {
        self.inner.invoke(name, operation, params, signature)
    }

    fn interfaces_of(&self, class_name: &str) -> Result<Vec<String>> {
        self.inner.interfaces_of(class_name)
    }
}

/// Context over a single connection
#[allow(dead_code)]
pub fn context_for(connection: Arc<dyn MBeanServerConnection>) -> JolokiaContext {
    JolokiaContext::new(MBeanServerAccess::single(connection))
}

/// Run a list request through the list handler
#[allow(dead_code)]
pub fn list(ctx: &JolokiaContext, path: &[&str], params: ProcessingParameters) -> Result<Value> {
    let request = JolokiaRequest::list(segments(path)).with_params(params);
    ListHandler.handle_request(ctx, &request, None)
}

#[allow(dead_code)]
pub fn io_failure(message: &str) -> JolokiaError {
    JolokiaError::Io {
        message: message.to_string(),
    }
}
