//! Assembly of the list result tree
//!
//! One `MBeanInfoData` is built per list request. It is populated MBean by
//! MBean and finally truncated and navigated along the request path by
//! [`MBeanInfoData::apply_path`].
//!
//! Tree layout: `domain -> key-property-list -> entry`, where the entry is an
//! object keyed by updater (`class`, `attr`, ...) or, in cache mode, the key of
//! a shared entry in the side `cache` map.

use serde_json::{Map, Value};

use super::cache_key::{determine_cache_key, CacheKeyProvider};
use super::registry::UpdaterRegistry;
use super::request_path::ListPath;
use super::updater::{DataUpdater, UpdateContext};
use super::ListOptions;
use crate::errors::{JolokiaError, Result};
use crate::log_mbean_error;
use crate::model::{MBeanInfo, ObjectName};
use crate::restrictor::Restrictor;
use crate::server::{MBeanServerAccess, MBeanServerConnection};

pub const KEY_CACHE: &str = "cache";
pub const KEY_DOMAINS: &str = "domains";
pub const KEY_ERROR: &str = "error";

/// Counters reported when the request completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListStats {
    pub mbeans: usize,
    pub cache_hits: usize,
    pub errors: usize,
}

pub struct MBeanInfoData<'a> {
    options: ListOptions,
    path: ListPath,
    registry: &'a UpdaterRegistry,
    cache_key_providers: &'a [Box<dyn CacheKeyProvider>],
    restrictor: &'a dyn Restrictor,
    domains: Vec<(String, Map<String, Value>)>,
    cache: Map<String, Value>,
    stats: ListStats,
}

impl<'a> MBeanInfoData<'a> {
    /// Caching is switched off when the path names a single MBean
    pub fn new(
        mut options: ListOptions,
        path: ListPath,
        registry: &'a UpdaterRegistry,
        cache_key_providers: &'a [Box<dyn CacheKeyProvider>],
        restrictor: &'a dyn Restrictor,
    ) -> Self {
        if options.list_cache && path.is_single_target() {
            tracing::debug!("list cache disabled for single mbean path");
            options.list_cache = false;
        }
        Self {
            options,
            path,
            registry,
            cache_key_providers,
            restrictor,
            domains: Vec::new(),
            cache: Map::new(),
            stats: ListStats::default(),
        }
    }

    pub fn path(&self) -> &ListPath {
        &self.path
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn stats(&self) -> ListStats {
        self.stats
    }

    /// Visit every MBean the path selects
    ///
    /// # Errors
    ///
    /// Fails on server errors during the query, on every error of a single
    /// MBean request, and on non-recoverable per-MBean errors otherwise.
    pub fn populate(&mut self, access: &MBeanServerAccess) -> Result<()> {
        if self.path.matches_nothing() {
            return Ok(());
        }
        if self.path.is_single_target() {
            if let Some(name) = self.path.object_name().cloned() {
                if self.restrictor.is_object_name_hidden(&name) {
                    return Err(JolokiaError::InstanceNotFound {
                        mbean: name.to_string(),
                    });
                }
                let connection = access.find_connection(&name)?;
                self.add_mbean_info(connection.as_ref(), &name)?;
            }
            return Ok(());
        }
        let pattern = self.path.object_name().cloned();
        for (connection, name) in access.query_names(pattern.as_ref())? {
            self.add_mbean_info(connection.as_ref(), &name)?;
        }
        Ok(())
    }

    /// Add one MBean to the tree
    ///
    /// # Errors
    ///
    /// See [`MBeanInfoData::populate`].
    pub fn add_mbean_info(
        &mut self,
        connection: &dyn MBeanServerConnection,
        name: &ObjectName,
    ) -> Result<()> {
        if let Some(pattern) = self.path.object_name() {
            if !pattern.apply(name) {
                return Ok(());
            }
        }
        if self.restrictor.is_object_name_hidden(name) {
            return Ok(());
        }
        self.stats.mbeans += 1;
        if self.handle_first_or_second_level(name) {
            return Ok(());
        }
        let cacheable = self.options.list_cache
            && !self.selected_is_instance_specific()
            && !self.restrictor.has_name_specific_rules(name);
        let added = if cacheable {
            self.add_cached_mbean_info(connection, name)
        } else {
            self.add_full_mbean_info(connection, name)
        };
        added.or_else(|err| self.handle_error(name, err))
    }

    /// Depth 0, 1 or 2 needs no metadata: add domain and key list only
    fn handle_first_or_second_level(&mut self, name: &ObjectName) -> bool {
        match self.options.max_depth {
            Some(0) => true,
            Some(1) => {
                let domain = self.domain_key(name);
                self.domain_map(domain);
                true
            }
            Some(2) => {
                let (domain, keys) = (self.domain_key(name), self.keys_key(name));
                self.domain_map(domain).insert(keys, Value::from(1));
                true
            }
            _ => false,
        }
    }

    fn add_full_mbean_info(
        &mut self,
        connection: &dyn MBeanServerConnection,
        name: &ObjectName,
    ) -> Result<()> {
        let info = connection.get_mbean_info(name)?;
        let entry = self.build_entry(connection, name, &info, true)?;
        if !entry.is_empty() {
            self.insert(name, Value::Object(entry));
        }
        Ok(())
    }

    fn add_cached_mbean_info(
        &mut self,
        connection: &dyn MBeanServerConnection,
        name: &ObjectName,
    ) -> Result<()> {
        let instance = connection.get_object_instance(name)?;
        let Some(cache_key) = determine_cache_key(self.cache_key_providers, &instance) else {
            return self.add_full_mbean_info(connection, name);
        };
        if self.cache.contains_key(&cache_key) {
            self.stats.cache_hits += 1;
        } else {
            let info = connection.get_mbean_info(name)?;
            let entry = self.build_entry(connection, name, &info, false)?;
            if entry.is_empty() {
                return Ok(());
            }
            self.cache.insert(cache_key.clone(), Value::Object(entry));
        }
        self.insert(name, Value::String(cache_key));
        Ok(())
    }

    /// Run the selected updater, or all default ones
    fn build_entry(
        &self,
        connection: &dyn MBeanServerConnection,
        name: &ObjectName,
        info: &MBeanInfo,
        include_instance_specific: bool,
    ) -> Result<Map<String, Value>> {
        let ctx = UpdateContext {
            name,
            info,
            restrictor: self.restrictor,
            connection,
            options: &self.options,
        };
        let mut entry = Map::new();
        if let Some(selector) = self.path.selector() {
            let updater = self.registry.get(selector)?;
            let filter = self.path.item_filter();
            match updater.extract(&ctx, filter)? {
                Some(fragment) => {
                    entry.insert(updater.key().to_string(), fragment);
                }
                None if filter.is_some() && self.path.is_single_target() => {
                    return Err(JolokiaError::invalid_path(format!(
                        "no {} '{}' on {}",
                        selector,
                        filter.unwrap_or_default(),
                        name
                    )));
                }
                None => {}
            }
            return Ok(entry);
        }
        let updaters: Vec<&dyn DataUpdater> = self
            .registry
            .defaults(&self.options)
            .filter(|u| include_instance_specific || !u.is_instance_specific())
            .collect();
        for updater in updaters {
            if let Some(fragment) = updater.extract(&ctx, None)? {
                entry.insert(updater.key().to_string(), fragment);
            }
        }
        Ok(entry)
    }

    fn selected_is_instance_specific(&self) -> bool {
        self.path
            .selector()
            .and_then(|s| self.registry.get(s).ok())
            .is_some_and(|u| u.is_instance_specific())
    }

    /// Record a per-MBean error in place, or propagate it
    fn handle_error(&mut self, name: &ObjectName, err: JolokiaError) -> Result<()> {
        if self.path.is_single_target() || !err.is_per_mbean_recoverable() {
            return Err(err);
        }
        log_mbean_error!("list", name, &err);
        self.stats.errors += 1;
        let mut entry = Map::new();
        entry.insert(KEY_ERROR.to_string(), Value::String(err.to_string()));
        self.insert(name, Value::Object(entry));
        Ok(())
    }

    fn domain_key(&self, name: &ObjectName) -> String {
        match &self.options.provider {
            Some(provider) => format!("{}@{}", provider, name.domain()),
            None => name.domain().to_string(),
        }
    }

    fn keys_key(&self, name: &ObjectName) -> String {
        if self.options.use_canonical_name {
            name.canonical_key_property_list_string()
        } else {
            name.key_property_list_string()
        }
    }

    /// Key lists of one domain, created on first use
    fn domain_map(&mut self, domain: String) -> &mut Map<String, Value> {
        let idx = match self.domains.iter().position(|(d, _)| *d == domain) {
            Some(idx) => idx,
            None => {
                self.domains.push((domain, Map::new()));
                self.domains.len() - 1
            }
        };
        &mut self.domains[idx].1
    }

    fn insert(&mut self, name: &ObjectName, value: Value) {
        let (domain, keys) = (self.domain_key(name), self.keys_key(name));
        self.domain_map(domain).insert(keys, value);
    }

    /// Truncate to the depth limit and navigate to the requested subtree
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if a navigated level does not hold exactly one
    /// value.
    pub fn apply_path(self) -> Result<Value> {
        let max_depth = self.options.max_depth;
        let retrieve_at_depth = self.path.retrieve_at_depth();
        let mut domains = Value::Object(
            self.domains
                .into_iter()
                .map(|(domain, keys)| (domain, Value::Object(keys)))
                .collect(),
        );
        let mut cache = Value::Object(self.cache);
        if max_depth == Some(0) {
            domains = Value::Object(Map::new());
        } else if let Some(depth) = max_depth {
            domains = truncate(domains, depth);
            cache = match cache {
                Value::Object(entries) => Value::Object(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, truncate(v, depth.saturating_sub(2))))
                        .collect(),
                ),
                other => other,
            };
        }

        let value = if max_depth.is_some_and(|d| d <= retrieve_at_depth) {
            domains
        } else {
            navigate(domains, retrieve_at_depth)?
        };

        if self.options.list_cache {
            let mut wrapped = Map::new();
            wrapped.insert(KEY_CACHE.to_string(), cache);
            wrapped.insert(KEY_DOMAINS.to_string(), value);
            Ok(Value::Object(wrapped))
        } else {
            Ok(value)
        }
    }
}

/// Replace objects nested deeper than `depth` levels by `1`
fn truncate(value: Value, depth: usize) -> Value {
    match value {
        Value::Object(_) if depth == 0 => Value::from(1),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, truncate(v, depth - 1)))
                .collect(),
        ),
        other => other,
    }
}

/// Descend `levels` single-valued levels
fn navigate(mut value: Value, levels: usize) -> Result<Value> {
    for level in 0..levels {
        value = match value {
            Value::Object(map) if map.is_empty() => return Ok(Value::Object(Map::new())),
            Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
                Some((_, inner)) => inner,
                None => return Ok(Value::Object(Map::new())),
            },
            Value::Object(map) => {
                return Err(JolokiaError::illegal_state(format!(
                    "expected one value at level {} of the list result, found {}",
                    level,
                    map.len()
                )))
            }
            other => {
                return Err(JolokiaError::illegal_state(format!(
                    "cannot descend into {} at level {} of the list result",
                    other, level
                )))
            }
        };
    }
    Ok(value)
}
