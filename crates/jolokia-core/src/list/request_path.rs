//! Interpretation of the path of a list request
//!
//! `[domain, key-properties, selector, item]`: the first two segments form an
//! ObjectName (pattern), the third picks a single data updater and the fourth
//! an item inside that updater's fragment. Missing segments and `*` are
//! wildcards.

use super::registry::UpdaterRegistry;
use crate::errors::{JolokiaError, Result};
use crate::model::ObjectName;
use crate::path::is_wildcard;

pub const MAX_LIST_PATH_SEGMENTS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ListPath {
    object_name: Option<ObjectName>,
    selector: Option<String>,
    item_filter: Option<String>,
    retrieve_at_depth: usize,
    matches_nothing: bool,
}

fn segment(segments: &[String], idx: usize) -> Option<&str> {
    segments
        .get(idx)
        .map(String::as_str)
        .filter(|s| !s.is_empty() && !is_wildcard(s))
}

impl ListPath {
    /// Path selecting everything
    pub fn all() -> Self {
        Self {
            object_name: None,
            selector: None,
            item_filter: None,
            retrieve_at_depth: 0,
            matches_nothing: false,
        }
    }

    /// Interpret path segments
    ///
    /// With a `provider`, the `<provider>@` prefix is stripped from the
    /// domain, pattern or not. An unprefixed concrete domain matches nothing;
    /// an unprefixed pattern is used as is.
    ///
    /// # Errors
    ///
    /// Returns `PathTooLong` for more than four segments or an item on a
    /// scalar facet, `UnknownUpdater` for an unknown selector and
    /// `MalformedObjectName` if domain and keys do not form an ObjectName.
    pub fn parse(
        segments: &[String],
        provider: Option<&str>,
        registry: &UpdaterRegistry,
    ) -> Result<Self> {
        if segments.len() > MAX_LIST_PATH_SEGMENTS {
            return Err(JolokiaError::PathTooLong {
                element: "list".to_string(),
                path: segments.to_vec(),
            });
        }

        let mut matches_nothing = false;
        let domain = segment(segments, 0).map(|d| match provider {
            Some(p) => match d.strip_prefix(&format!("{}@", p)) {
                Some(stripped) => stripped.to_string(),
                None => {
                    matches_nothing = !d.contains(['*', '?']);
                    d.to_string()
                }
            },
            None => d.to_string(),
        });
        let keys = segment(segments, 1);
        let selector = segment(segments, 2).map(str::to_string);
        let item_filter = segment(segments, 3).map(str::to_string);

        if let Some(selector) = &selector {
            let updater = registry.get(selector)?;
            if item_filter.is_some() && !updater.accepts_filter() {
                return Err(JolokiaError::PathTooLong {
                    element: selector.clone(),
                    path: segments.to_vec(),
                });
            }
        } else if item_filter.is_some() {
            return Err(JolokiaError::invalid_path(
                "an item requires an updater selector",
            ));
        }

        let object_name = match (&domain, keys) {
            (None, None) => None,
            _ => Some(ObjectName::parse(&format!(
                "{}:{}",
                domain.as_deref().unwrap_or("*"),
                keys.unwrap_or("*")
            ))?),
        };

        let retrieve_at_depth = match (&domain, &object_name) {
            (None, _) | (_, None) => 0,
            (Some(d), Some(_)) if d.contains(['*', '?']) => 0,
            (Some(_), Some(name)) if name.is_pattern() => 1,
            _ => 2 + usize::from(selector.is_some()) + usize::from(item_filter.is_some()),
        };

        Ok(Self {
            object_name,
            selector,
            item_filter,
            retrieve_at_depth,
            matches_nothing,
        })
    }

    /// ObjectName (pattern) the path restricts to, `None` for all MBeans
    pub fn object_name(&self) -> Option<&ObjectName> {
        self.object_name.as_ref()
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn item_filter(&self) -> Option<&str> {
        self.item_filter.as_deref()
    }

    /// Levels of the result tree to skip before the requested value
    pub fn retrieve_at_depth(&self) -> usize {
        self.retrieve_at_depth
    }

    /// Whether the path names exactly one MBean
    pub fn is_single_target(&self) -> bool {
        self.object_name.as_ref().is_some_and(|n| !n.is_pattern())
    }

    /// Whether the path cannot match any MBean under the active provider
    pub fn matches_nothing(&self) -> bool {
        self.matches_nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(path: &[&str]) -> Result<ListPath> {
        let segments: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        ListPath::parse(&segments, None, &UpdaterRegistry::standard())
    }

    #[test]
    fn test_retrieve_depth_by_specificity() {
        assert_eq!(parse(&[]).unwrap().retrieve_at_depth(), 0);
        assert_eq!(parse(&["*"]).unwrap().retrieve_at_depth(), 0);
        assert_eq!(parse(&["java.*", "type=Memory"]).unwrap().retrieve_at_depth(), 0);
        assert_eq!(parse(&["java.lang"]).unwrap().retrieve_at_depth(), 1);
        assert_eq!(parse(&["java.lang", "type=*"]).unwrap().retrieve_at_depth(), 1);
        assert_eq!(parse(&["java.lang", "type=Memory"]).unwrap().retrieve_at_depth(), 2);
        assert_eq!(
            parse(&["java.lang", "type=Memory", "attr"]).unwrap().retrieve_at_depth(),
            3
        );
        assert_eq!(
            parse(&["java.lang", "type=Memory", "attr", "Verbose"])
                .unwrap()
                .retrieve_at_depth(),
            4
        );
    }

    #[test]
    fn test_single_target() {
        assert!(parse(&["java.lang", "type=Memory"]).unwrap().is_single_target());
        assert!(!parse(&["java.lang"]).unwrap().is_single_target());
        assert!(!parse(&[]).unwrap().is_single_target());
    }

    #[test]
    fn test_too_long_paths() {
        let err = parse(&["a", "b=c", "attr", "x", "y"]).unwrap_err();
        assert!(matches!(err, JolokiaError::PathTooLong { .. }));
        let err = parse(&["a", "b=c", "desc", "x"]).unwrap_err();
        assert!(matches!(err, JolokiaError::PathTooLong { .. }));
    }

    #[test]
    fn test_unknown_selector_and_bad_name() {
        assert!(matches!(
            parse(&["a", "b=c", "bogus"]).unwrap_err(),
            JolokiaError::UnknownUpdater { .. }
        ));
        assert!(matches!(
            parse(&["a", "novalue"]).unwrap_err(),
            JolokiaError::MalformedObjectName { .. }
        ));
    }

    #[test]
    fn test_provider_prefix() {
        let registry = UpdaterRegistry::standard();
        let segments = vec!["proxy@java.lang".to_string(), "type=Memory".to_string()];
        let path = ListPath::parse(&segments, Some("proxy"), &registry).unwrap();
        assert_eq!(path.object_name().unwrap().domain(), "java.lang");
        assert!(!path.matches_nothing());

        let segments = vec!["java.lang".to_string()];
        let path = ListPath::parse(&segments, Some("proxy"), &registry).unwrap();
        assert!(path.matches_nothing());

        let segments = vec!["*".to_string()];
        let path = ListPath::parse(&segments, Some("proxy"), &registry).unwrap();
        assert!(!path.matches_nothing());

        let segments = vec!["proxy@java.*".to_string()];
        let path = ListPath::parse(&segments, Some("proxy"), &registry).unwrap();
        assert_eq!(path.object_name().unwrap().domain(), "java.*");
        assert!(!path.matches_nothing());
    }
}
