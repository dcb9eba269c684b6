//! Cache keys for MBeans sharing identical metadata

use crate::model::ObjectInstance;

/// Assigns MBeans to a shared metadata cache entry
///
/// Returning `None` defers to the next provider; when no provider claims an
/// MBean its metadata is inlined.
pub trait CacheKeyProvider: Send + Sync {
    fn determine_key(&self, instance: &ObjectInstance) -> Option<String>;
}

const JAVA_LANG_FAMILIES: &[&str] = &["MemoryPool", "MemoryManager", "GarbageCollector"];
const JAVA_NIO_FAMILIES: &[&str] = &["BufferPool"];

/// Platform MXBean families whose instances all expose the same metadata
///
/// # Example
/// ```
/// use jolokia_core::list::{CacheKeyProvider, JdkManagementCacheKeyProvider};
/// use jolokia_core::model::{ObjectInstance, ObjectName};
///
/// let eden = ObjectInstance::new(
///     ObjectName::parse("java.lang:type=MemoryPool,name=Eden Space").unwrap(),
///     "sun.management.MemoryPoolImpl",
/// );
/// assert_eq!(
///     JdkManagementCacheKeyProvider.determine_key(&eden).as_deref(),
///     Some("java.lang:type=MemoryPool")
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JdkManagementCacheKeyProvider;

impl CacheKeyProvider for JdkManagementCacheKeyProvider {
    fn determine_key(&self, instance: &ObjectInstance) -> Option<String> {
        let name = &instance.object_name;
        let families = match name.domain() {
            "java.lang" => JAVA_LANG_FAMILIES,
            "java.nio" => JAVA_NIO_FAMILIES,
            _ => return None,
        };
        let kind = name.key_property("type")?;
        families
            .contains(&kind)
            .then(|| format!("{}:type={}", name.domain(), kind))
    }
}

/// First key any provider reports, in provider order
pub fn determine_cache_key(
    providers: &[Box<dyn CacheKeyProvider>],
    instance: &ObjectInstance,
) -> Option<String> {
    providers.iter().find_map(|p| p.determine_key(instance))
}
