use super::updater::DataUpdater;
use super::updaters::{
    AttributeDataUpdater, ClassNameDataUpdater, ConstructorDataUpdater, DescriptionDataUpdater,
    ListInterfacesDataUpdater, ListKeysDataUpdater, NotificationDataUpdater, OperationDataUpdater,
};
use super::ListOptions;
use crate::errors::{JolokiaError, Result};

/// Ordered set of data updaters, looked up by selector
///
/// Built once and shared by every list request. Registration order is the
/// order of keys in each MBean entry.
pub struct UpdaterRegistry {
    updaters: Vec<Box<dyn DataUpdater>>,
}

impl Default for UpdaterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl UpdaterRegistry {
    pub fn empty() -> Self {
        Self {
            updaters: Vec::new(),
        }
    }

    /// The built-in updaters: `class`, `desc`, `attr`, `op`, `ctor`, `notif`,
    /// `keys`, `interfaces`
    pub fn standard() -> Self {
        Self::empty()
            .register(Box::new(ClassNameDataUpdater))
            .register(Box::new(DescriptionDataUpdater))
            .register(Box::new(AttributeDataUpdater))
            .register(Box::new(OperationDataUpdater))
            .register(Box::new(ConstructorDataUpdater))
            .register(Box::new(NotificationDataUpdater))
            .register(Box::new(ListKeysDataUpdater))
            .register(Box::new(ListInterfacesDataUpdater))
    }

    /// Add an updater; a later updater with the same key replaces the earlier
    /// one in place
    pub fn register(mut self, updater: Box<dyn DataUpdater>) -> Self {
        match self.updaters.iter().position(|u| u.key() == updater.key()) {
            Some(idx) => self.updaters[idx] = updater,
            None => self.updaters.push(updater),
        }
        self
    }

    /// # Errors
    ///
    /// Returns `UnknownUpdater` if no updater owns `selector`.
    pub fn get(&self, selector: &str) -> Result<&dyn DataUpdater> {
        self.updaters
            .iter()
            .find(|u| u.key() == selector)
            .map(|u| u.as_ref())
            .ok_or_else(|| JolokiaError::UnknownUpdater {
                selector: selector.to_string(),
            })
    }

    /// Updaters that run when no selector is given
    pub fn defaults<'a>(
        &'a self,
        options: &'a ListOptions,
    ) -> impl Iterator<Item = &'a dyn DataUpdater> + 'a {
        self.updaters
            .iter()
            .map(|u| u.as_ref())
            .filter(move |u| u.enabled_by_default(options))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.updaters.iter().map(|u| u.key()).collect()
    }
}
