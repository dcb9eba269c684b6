//! Parsed agent requests
//!
//! Requests arrive either as a JSON object (`{"type": "read", "mbean": ...}`)
//! or as a GET-style path (`read/java.lang:type=Memory/HeapMemoryUsage/used`)
//! whose segments use the `!` escaping of [`crate::path`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ProcessingParameters;
use crate::errors::{JolokiaError, Result};
use crate::model::{JmxValue, ObjectName, OpenType};
use crate::path::{combine_to_path, parse_path};
use crate::serialize::{from_json, from_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    List,
    Read,
    Write,
    Exec,
    Search,
}

impl RequestType {
    pub const ALL: [RequestType; 5] = [
        RequestType::List,
        RequestType::Read,
        RequestType::Write,
        RequestType::Exec,
        RequestType::Search,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::List => "list",
            RequestType::Read => "read",
            RequestType::Write => "write",
            RequestType::Exec => "exec",
            RequestType::Search => "search",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = JolokiaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| JolokiaError::invalid_request(format!("unknown request type '{}'", s)))
    }
}

/// A value supplied for a write or an operation argument
#[derive(Debug, Clone, PartialEq)]
pub enum RequestValue {
    /// From a JSON request body
    Json(Value),
    /// From a GET path segment
    Text(String),
}

impl RequestValue {
    /// Convert to the declared type
    ///
    /// # Errors
    ///
    /// Returns `ValueConversion` if the value does not fit the type.
    pub fn convert(&self, type_name: &str, open_type: Option<&OpenType>) -> Result<JmxValue> {
        match (self, open_type) {
            (RequestValue::Json(json), _) => from_json(type_name, json, open_type),
            (RequestValue::Text(text), Some(open_type)) => {
                let json: Value = serde_json::from_str(text).map_err(|e| {
                    JolokiaError::ValueConversion {
                        value: text.clone(),
                        target_type: open_type.class_name(),
                        reason: e.to_string(),
                    }
                })?;
                from_json(type_name, &json, Some(open_type))
            }
            (RequestValue::Text(text), None) => from_string(type_name, text),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            RequestValue::Json(json) => json.clone(),
            RequestValue::Text(text) => Value::String(text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JolokiaRequest {
    pub request_type: RequestType,
    pub mbean: Option<ObjectName>,
    /// Attribute names of a read or write; empty reads all
    pub attributes: Vec<String>,
    pub operation: Option<String>,
    pub arguments: Vec<RequestValue>,
    pub value: Option<RequestValue>,
    /// Inner path (read/write) or list path
    pub path: Vec<String>,
    pub params: ProcessingParameters,
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(JolokiaError::invalid_request(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

fn path_field(map: &Map<String, Value>) -> Result<Vec<String>> {
    match map.get("path") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(parse_path(s)),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Ok(other.to_string()),
            })
            .collect(),
        Some(other) => Err(JolokiaError::invalid_request(format!(
            "'path' must be a string or an array, got {}",
            other
        ))),
    }
}

impl JolokiaRequest {
    pub fn new(request_type: RequestType) -> Self {
        Self {
            request_type,
            mbean: None,
            attributes: Vec::new(),
            operation: None,
            arguments: Vec::new(),
            value: None,
            path: Vec::new(),
            params: ProcessingParameters::default(),
        }
    }

    /// List request for the given path segments
    pub fn list(path: Vec<String>) -> Self {
        Self {
            path,
            ..Self::new(RequestType::List)
        }
    }

    pub fn with_mbean(mut self, mbean: ObjectName) -> Self {
        self.mbean = Some(mbean);
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }

    pub fn with_params(mut self, params: ProcessingParameters) -> Self {
        self.params = params;
        self
    }

    /// Parse the JSON request form
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for missing or malformed fields and
    /// `MalformedObjectName` for a bad `mbean`.
    pub fn from_json(json: &Value) -> Result<Self> {
        let map = json
            .as_object()
            .ok_or_else(|| JolokiaError::invalid_request("request must be a JSON object"))?;
        let request_type: RequestType = str_field(map, "type")?
            .ok_or_else(|| JolokiaError::invalid_request("missing request type"))?
            .parse()?;
        let mut request = Self::new(request_type);
        request.mbean = str_field(map, "mbean")?.map(ObjectName::parse).transpose()?;
        request.attributes = match map.get("attribute") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        JolokiaError::invalid_request("attribute names must be strings")
                    })
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(JolokiaError::invalid_request(format!(
                    "invalid attribute {}",
                    other
                )))
            }
        };
        request.operation = str_field(map, "operation")?.map(str::to_string);
        request.arguments = match map.get("arguments") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().cloned().map(RequestValue::Json).collect(),
            Some(single) => vec![RequestValue::Json(single.clone())],
        };
        request.value = map.get("value").cloned().map(RequestValue::Json);
        request.path = path_field(map)?;
        if let Some(config) = map.get("config") {
            request.params = ProcessingParameters::from_json(config)?;
        }
        request.validate()?;
        Ok(request)
    }

    /// Parse the GET path form, `<type>/<segments...>`
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if required segments are missing.
    pub fn from_get_path(path: &str) -> Result<Self> {
        let segments = parse_path(path);
        let (first, rest) = segments
            .split_first()
            .ok_or_else(|| JolokiaError::invalid_request("empty request path"))?;
        let request_type: RequestType = first.parse()?;
        let mut request = Self::new(request_type);
        let mut rest = rest.iter().cloned();
        match request_type {
            RequestType::List => request.path = rest.collect(),
            RequestType::Search => {
                request.mbean = rest.next().map(|n| ObjectName::parse(&n)).transpose()?;
            }
            RequestType::Read => {
                request.mbean = rest.next().map(|n| ObjectName::parse(&n)).transpose()?;
                if let Some(attribute) = rest.next().filter(|a| !a.is_empty()) {
                    request.attributes = vec![attribute];
                }
                request.path = rest.collect();
            }
            RequestType::Write => {
                request.mbean = rest.next().map(|n| ObjectName::parse(&n)).transpose()?;
                request.attributes = rest.next().into_iter().collect();
                request.value = rest.next().map(RequestValue::Text);
                request.path = rest.collect();
            }
            RequestType::Exec => {
                request.mbean = rest.next().map(|n| ObjectName::parse(&n)).transpose()?;
                request.operation = rest.next();
                request.arguments = rest.map(RequestValue::Text).collect();
            }
        }
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        let needs_mbean = !matches!(self.request_type, RequestType::List);
        if needs_mbean && self.mbean.is_none() {
            return Err(JolokiaError::invalid_request(format!(
                "{} request requires an mbean",
                self.request_type
            )));
        }
        match self.request_type {
            RequestType::Write if self.attributes.len() != 1 || self.value.is_none() => Err(
                JolokiaError::invalid_request("write request requires one attribute and a value"),
            ),
            RequestType::Exec if self.operation.is_none() => Err(JolokiaError::invalid_request(
                "exec request requires an operation",
            )),
            _ => Ok(()),
        }
    }

    /// Echo of the request included in the response envelope
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.request_type.to_string()));
        if let Some(mbean) = &self.mbean {
            map.insert("mbean".into(), Value::String(mbean.to_string()));
        }
        match self.attributes.as_slice() {
            [] => {}
            [single] => {
                map.insert("attribute".into(), Value::String(single.clone()));
            }
            many => {
                map.insert(
                    "attribute".into(),
                    Value::Array(many.iter().cloned().map(Value::String).collect()),
                );
            }
        }
        if let Some(operation) = &self.operation {
            map.insert("operation".into(), Value::String(operation.clone()));
        }
        if !self.arguments.is_empty() {
            map.insert(
                "arguments".into(),
                Value::Array(self.arguments.iter().map(RequestValue::to_json).collect()),
            );
        }
        if let Some(value) = &self.value {
            map.insert("value".into(), value.to_json());
        }
        if !self.path.is_empty() {
            map.insert("path".into(), Value::String(combine_to_path(&self.path)));
        }
        Value::Object(map)
    }
}
