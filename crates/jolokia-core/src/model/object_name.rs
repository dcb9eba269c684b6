//! JMX object names
//!
//! An [`ObjectName`] is `domain:key=value[,key=value...]`, optionally a
//! pattern: wildcards (`*`, `?`) in the domain, a trailing `*` in the key list
//! (property-list pattern) or wildcards in an unquoted value (property-value
//! pattern). Key properties keep their registration order; the canonical form
//! sorts them lexically by key.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{JolokiaError, Result};

const FORBIDDEN_KEY_CHARS: &[char] = &[':', ',', '=', '*', '?', '"', '\n'];
const FORBIDDEN_VALUE_CHARS: &[char] = &[',', '=', ':', '"', '\n'];

#[derive(Clone)]
pub struct ObjectName {
    domain: String,
    properties: Vec<(String, String)>,
    domain_pattern: bool,
    property_list_pattern: bool,
    property_value_pattern: bool,
    canonical: String,
}

impl ObjectName {
    /// Parse an object name
    ///
    /// # Errors
    ///
    /// Returns `MalformedObjectName` when the text violates the JMX syntax.
    pub fn parse(name: &str) -> Result<Self> {
        let malformed = |reason: &str| JolokiaError::MalformedObjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let colon = name.find(':').ok_or_else(|| malformed("missing ':'"))?;
        let domain = &name[..colon];
        if domain.contains('\n') {
            return Err(malformed("domain contains a newline"));
        }
        let key_list = &name[colon + 1..];
        if key_list.is_empty() {
            return Err(malformed("key properties cannot be empty"));
        }

        let mut properties: Vec<(String, String)> = Vec::new();
        let mut property_list_pattern = false;
        let mut property_value_pattern = false;

        for item in split_key_list(key_list).map_err(|r| malformed(&r))? {
            if item == "*" {
                if property_list_pattern {
                    return Err(malformed("more than one '*' in key properties"));
                }
                property_list_pattern = true;
                continue;
            }
            let eq = item
                .find('=')
                .ok_or_else(|| malformed("key property without '='"))?;
            let (key, value) = (&item[..eq], &item[eq + 1..]);
            if key.is_empty() {
                return Err(malformed("empty key"));
            }
            if key.contains(FORBIDDEN_KEY_CHARS) {
                return Err(malformed(&format!("invalid character in key '{}'", key)));
            }
            if value.is_empty() {
                return Err(malformed(&format!("empty value for key '{}'", key)));
            }
            if value.starts_with('"') {
                property_value_pattern |= check_quoted(value).map_err(|r| malformed(&r))?;
            } else {
                if value.contains(FORBIDDEN_VALUE_CHARS) {
                    return Err(malformed(&format!("invalid character in value '{}'", value)));
                }
                property_value_pattern |= value.contains(['*', '?']);
            }
            if properties.iter().any(|(k, _)| k == key) {
                return Err(malformed(&format!("duplicate key '{}'", key)));
            }
            properties.push((key.to_string(), value.to_string()));
        }

        if properties.is_empty() && !property_list_pattern {
            return Err(malformed("key properties cannot be empty"));
        }

        Ok(Self::assemble(
            domain.to_string(),
            properties,
            property_list_pattern,
            property_value_pattern,
        ))
    }

    /// Pattern matching every MBean of one domain (`domain:*`)
    ///
    /// # Errors
    ///
    /// Returns `MalformedObjectName` for an invalid domain.
    pub fn domain_pattern_of(domain: &str) -> Result<Self> {
        Self::parse(&format!("{}:*", domain))
    }

    fn assemble(
        domain: String,
        properties: Vec<(String, String)>,
        property_list_pattern: bool,
        property_value_pattern: bool,
    ) -> Self {
        let domain_pattern = domain.contains(['*', '?']);
        let mut name = Self {
            domain,
            properties,
            domain_pattern,
            property_list_pattern,
            property_value_pattern,
            canonical: String::new(),
        };
        name.canonical = name.render(&name.canonical_key_property_list_string());
        name
    }

    fn render(&self, keys: &str) -> String {
        let suffix = match (self.property_list_pattern, keys.is_empty()) {
            (false, _) => "",
            (true, true) => "*",
            (true, false) => ",*",
        };
        format!("{}:{}{}", self.domain, keys, suffix)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Value of one key property, as written (quoted values keep their quotes)
    pub fn key_property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Key properties in registration order
    pub fn key_properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// `k=v,...` in registration order
    pub fn key_property_list_string(&self) -> String {
        join_properties(self.properties.iter())
    }

    /// `k=v,...` sorted lexically by key
    pub fn canonical_key_property_list_string(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.properties.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        join_properties(sorted.into_iter())
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    pub fn is_pattern(&self) -> bool {
        self.domain_pattern || self.property_list_pattern || self.property_value_pattern
    }

    pub fn is_domain_pattern(&self) -> bool {
        self.domain_pattern
    }

    pub fn is_property_list_pattern(&self) -> bool {
        self.property_list_pattern
    }

    pub fn is_property_value_pattern(&self) -> bool {
        self.property_value_pattern
    }

    /// Whether this name (usually a pattern) matches the concrete `name`
    ///
    /// A pattern never matches another pattern.
    pub fn apply(&self, name: &ObjectName) -> bool {
        if name.is_pattern() {
            return false;
        }
        let domain_matches = if self.domain_pattern {
            wildcard_match(&self.domain, &name.domain)
        } else {
            self.domain == name.domain
        };
        if !domain_matches {
            return false;
        }
        if !self.property_list_pattern && !self.property_value_pattern {
            return self.canonical_key_property_list_string()
                == name.canonical_key_property_list_string();
        }
        if !self.property_list_pattern && self.properties.len() != name.properties.len() {
            return false;
        }
        self.properties.iter().all(|(key, value)| {
            name.key_property(key).is_some_and(|actual| {
                if value.starts_with('"') || !value.contains(['*', '?']) {
                    value == actual
                } else {
                    wildcard_match(value, actual)
                }
            })
        })
    }
}

fn join_properties<'a>(props: impl Iterator<Item = &'a (String, String)>) -> String {
    props
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split the key list on commas outside of quoted values
fn split_key_list(key_list: &str) -> std::result::Result<Vec<&str>, String> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, ch) in key_list.char_indices() {
        if in_quotes {
            match (escaped, ch) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => {
                items.push(&key_list[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err("unterminated quoted value".to_string());
    }
    items.push(&key_list[start..]);
    Ok(items)
}

/// Validate a quoted value; returns whether it contains unescaped wildcards
fn check_quoted(value: &str) -> std::result::Result<bool, String> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|_| value.len() >= 2)
        .ok_or_else(|| format!("invalid quoted value {}", value))?;
    let mut wildcard = false;
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('"' | '\\' | '*' | '?' | 'n') => {}
                _ => return Err(format!("invalid escape in quoted value {}", value)),
            },
            '"' | '\n' => return Err(format!("invalid character in quoted value {}", value)),
            '*' | '?' => wildcard = true,
            _ => {}
        }
    }
    Ok(wildcard)
}

/// Glob match supporting `*` (any run) and `?` (one char)
pub(crate) fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&self.key_property_list_string()))
    }
}

impl fmt::Debug for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectName({})", self)
    }
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ObjectName {}

impl Hash for ObjectName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl FromStr for ObjectName {
    type Err = JolokiaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ObjectName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn on(s: &str) -> ObjectName {
        ObjectName::parse(s).unwrap()
    }

    #[test]
    fn test_registration_vs_canonical_order() {
        let name = on("d:b=2,a=1");
        assert_eq!(name.key_property_list_string(), "b=2,a=1");
        assert_eq!(name.canonical_key_property_list_string(), "a=1,b=2");
        assert_eq!(name.canonical_name(), "d:a=1,b=2");
        assert_eq!(name.to_string(), "d:b=2,a=1");
    }

    #[test]
    fn test_equality_ignores_key_order() {
        assert_eq!(on("d:b=2,a=1"), on("d:a=1,b=2"));
    }

    #[test]
    fn test_malformed_names() {
        for bad in ["nodomain", "d:", "d:a", "d:=1", "d:a=", "d:a=1,a=2", "d:a=1,*,*", "d:a=\"x"] {
            let err = ObjectName::parse(bad).unwrap_err();
            assert!(
                matches!(err, JolokiaError::MalformedObjectName { .. }),
                "{} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_pattern_flags() {
        assert!(on("java.*:type=Memory").is_domain_pattern());
        assert!(on("java.lang:*").is_property_list_pattern());
        assert!(on("java.lang:type=Memory,*").is_property_list_pattern());
        assert!(on("java.lang:type=Mem*").is_property_value_pattern());
        assert!(!on("java.lang:type=\"Memory\"").is_pattern());
        assert!(on("java.lang:type=\"Mem*\"").is_property_value_pattern());
    }

    #[test]
    fn test_pattern_rendering() {
        assert_eq!(on("d:*").canonical_name(), "d:*");
        assert_eq!(on("d:b=1,*").canonical_name(), "d:b=1,*");
    }

    #[test]
    fn test_apply_matching() {
        let memory_pool = on("java.lang:type=MemoryPool,name=Eden Space");

        assert!(on("java.lang:*").apply(&memory_pool));
        assert!(on("*:type=MemoryPool,*").apply(&memory_pool));
        assert!(on("java.l?ng:name=Eden*,type=MemoryPool").apply(&memory_pool));
        assert!(!on("java.lang:type=MemoryPool").apply(&memory_pool));
        assert!(!on("java.nio:*").apply(&memory_pool));
        assert!(on("java.lang:name=Eden Space,type=MemoryPool").apply(&memory_pool));
        assert!(!on("java.lang:*").apply(&on("java.lang:*")));
    }

    #[test]
    fn test_quoted_values_keep_quotes() {
        let name = on("d:name=\"a,b\",type=x");
        assert_eq!(name.key_property("name"), Some("\"a,b\""));
        assert_eq!(name.key_properties().len(), 2);
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("a*c", "abbbc"));
        assert!(wildcard_match("a?c", "abc"));
        assert!(!wildcard_match("a?c", "ac"));
        assert!(wildcard_match("*Pool*", "MemoryPoolX"));
        assert!(!wildcard_match("a*d", "abc"));
    }

    #[test]
    fn test_serde_as_string() {
        let name = on("d:b=2,a=1");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"d:b=2,a=1\"");
        let back: ObjectName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    proptest! {
        #[test]
        fn prop_canonical_keys_sorted(
            props in prop::collection::btree_map("[a-z]{1,6}", "[A-Za-z0-9.]{1,6}", 1..6)
        ) {
            let pairs: Vec<String> = props.iter().rev().map(|(k, v)| format!("{}={}", k, v)).collect();
            let registered = pairs.join(",");
            let name = ObjectName::parse(&format!("d:{}", registered)).unwrap();

            let sorted: Vec<String> = props.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            prop_assert_eq!(name.key_property_list_string(), registered);
            prop_assert_eq!(name.canonical_key_property_list_string(), sorted.join(","));
            prop_assert_eq!(&name, &ObjectName::parse(&format!("d:{}", sorted.join(","))).unwrap());
        }
    }
}
