use jolokia_core_types::RequestId;
use thiserror::Error;

/// Result type alias using JolokiaError
pub type Result<T> = std::result::Result<T, JolokiaError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code and to the status a transport should
/// report. The taxonomy follows the three families the agent distinguishes:
/// caller mistakes, environment conditions and internal invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller input
    InvalidInput,
    InvalidPath,
    MalformedObjectName,
    UnknownUpdater,
    InvalidValue,

    // Lookup
    InstanceNotFound,
    AttributeNotFound,
    OperationNotFound,
    AmbiguousOperation,

    // Access
    Forbidden,
    NotReadable,
    NotWritable,

    // Environment
    Io,
    Introspection,
    Reflection,
    LimitExceeded,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::MalformedObjectName => "ERR_MALFORMED_OBJECT_NAME",
            ExErrorKind::UnknownUpdater => "ERR_UNKNOWN_UPDATER",
            ExErrorKind::InvalidValue => "ERR_INVALID_VALUE",
            ExErrorKind::InstanceNotFound => "ERR_INSTANCE_NOT_FOUND",
            ExErrorKind::AttributeNotFound => "ERR_ATTRIBUTE_NOT_FOUND",
            ExErrorKind::OperationNotFound => "ERR_OPERATION_NOT_FOUND",
            ExErrorKind::AmbiguousOperation => "ERR_AMBIGUOUS_OPERATION",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::NotReadable => "ERR_NOT_READABLE",
            ExErrorKind::NotWritable => "ERR_NOT_WRITABLE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Introspection => "ERR_INTROSPECTION",
            ExErrorKind::Reflection => "ERR_REFLECTION",
            ExErrorKind::LimitExceeded => "ERR_LIMIT_EXCEEDED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Status code a transport reports for this kind
    pub fn http_status(&self) -> u16 {
        match self {
            ExErrorKind::InvalidInput
            | ExErrorKind::InvalidPath
            | ExErrorKind::MalformedObjectName
            | ExErrorKind::UnknownUpdater
            | ExErrorKind::InvalidValue
            | ExErrorKind::AmbiguousOperation
            | ExErrorKind::NotReadable
            | ExErrorKind::NotWritable => 400,
            ExErrorKind::Forbidden => 403,
            ExErrorKind::InstanceNotFound
            | ExErrorKind::AttributeNotFound
            | ExErrorKind::OperationNotFound => 404,
            ExErrorKind::Io
            | ExErrorKind::Introspection
            | ExErrorKind::Reflection
            | ExErrorKind::LimitExceeded
            | ExErrorKind::Serialization
            | ExErrorKind::Config
            | ExErrorKind::Internal => 500,
        }
    }

    /// Whether the caller caused the error (4xx family)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status())
    }
}

/// Canonical structured error type
///
/// Carries the classification of an error together with the context needed
/// to render the error envelope a transport returns to the client.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    mbean: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            mbean: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the MBean the error refers to
    pub fn with_mbean(mut self, mbean: impl Into<String>) -> Self {
        self.mbean = Some(mbean.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn mbean(&self) -> Option<&str> {
        self.mbean.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the JSON error envelope returned to clients
    pub fn to_envelope(&self) -> serde_json::Value {
        let mut envelope = serde_json::Map::new();
        envelope.insert("error_type".into(), self.code().into());
        envelope.insert("error".into(), self.to_string().into());
        envelope.insert("error_code".into(), self.code().into());
        envelope.insert("status".into(), self.http_status().into());
        if let Some(request_id) = &self.request_id {
            envelope.insert("request_id".into(), request_id.as_str().into());
        }
        serde_json::Value::Object(envelope)
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(mbean) = &self.mbean {
            write!(f, " (mbean: {})", mbean)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for agent operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JolokiaError {
    // ===== Caller input =====
    /// A request path could not be interpreted
    #[error("Invalid path: {reason}")]
    InvalidPath { reason: String },

    /// A path has more segments than the addressed element can consume
    #[error("Path {path:?} is too long for '{element}'")]
    PathTooLong { element: String, path: Vec<String> },

    /// Selector segment names no known data updater
    #[error("No data updater registered for selector '{selector}'")]
    UnknownUpdater { selector: String },

    /// ObjectName syntax error
    #[error("Malformed ObjectName '{name}': {reason}")]
    MalformedObjectName { name: String, reason: String },

    /// A concrete ObjectName was required
    #[error("ObjectName pattern not allowed here: {name}")]
    PatternNotAllowed { name: String },

    /// Request payload is inconsistent
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A value could not be converted to the requested type
    #[error("Cannot convert {value} to {target_type}: {reason}")]
    ValueConversion {
        value: String,
        target_type: String,
        reason: String,
    },

    // ===== Lookup =====
    /// The MBean is not registered with any server
    #[error("No MBean registered as {mbean}")]
    InstanceNotFound { mbean: String },

    /// Attribute (or inner path element) does not exist
    #[error("No attribute '{attribute}' on {mbean}")]
    AttributeNotFound { mbean: String, attribute: String },

    /// Operation does not exist
    #[error("No operation '{operation}' on {mbean}")]
    OperationNotFound { mbean: String, operation: String },

    /// More than one overload matches an exec request
    #[error("Operation '{operation}' on {mbean} is overloaded, candidates: {candidates:?}")]
    AmbiguousOperation {
        mbean: String,
        operation: String,
        candidates: Vec<String>,
    },

    // ===== Access =====
    /// The restrictor refused the access
    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    /// Attribute exists but is not readable
    #[error("Attribute '{attribute}' on {mbean} is not readable")]
    AttributeNotReadable { mbean: String, attribute: String },

    /// Attribute exists but is not writable
    #[error("Attribute '{attribute}' on {mbean} is not writable")]
    AttributeNotWritable { mbean: String, attribute: String },

    // ===== Environment =====
    /// Connection level failure talking to an MBean server
    #[error("I/O error: {message}")]
    Io { message: String },

    /// The server could not introspect an MBean
    #[error("Introspection failed for {mbean}: {message}")]
    Introspection { mbean: String, message: String },

    /// The MBean threw while being accessed
    #[error("Reflection error on {mbean}: {message}")]
    Reflection { mbean: String, message: String },

    /// The server reported an illegal state for one MBean
    #[error("MBean server illegal state: {message}")]
    ServerIllegalState { message: String },

    /// A property getter failed during reflective extraction
    #[error("Cannot read property '{property}' of {class_name}: {reason}")]
    PropertyUnreadable {
        class_name: String,
        property: String,
        reason: String,
    },

    /// Serialization object budget exhausted
    #[error("Object limit of {limit} exceeded during serialization")]
    ObjectLimitExceeded { limit: usize },

    /// Value (de)serialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ===== Internal =====
    /// Internal invariant violation, never recovered
    #[error("Internal error: {message}")]
    IllegalState { message: String },
}

impl JolokiaError {
    /// Whether this error may be recorded inline at one MBean's position of a
    /// multi-MBean listing instead of failing the whole request.
    pub fn is_per_mbean_recoverable(&self) -> bool {
        matches!(
            self,
            JolokiaError::Io { .. }
                | JolokiaError::InstanceNotFound { .. }
                | JolokiaError::ServerIllegalState { .. }
        )
    }

    pub fn kind(&self) -> ExErrorKind {
        ExError::from(self.clone()).kind()
    }

    pub(crate) fn io(message: impl Into<String>) -> Self {
        JolokiaError::Io {
            message: message.into(),
        }
    }

    pub(crate) fn illegal_state(message: impl Into<String>) -> Self {
        JolokiaError::IllegalState {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_path(reason: impl Into<String>) -> Self {
        JolokiaError::InvalidPath {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        JolokiaError::InvalidRequest {
            reason: reason.into(),
        }
    }
}

/// Convert JolokiaError to the structured ExError
impl From<JolokiaError> for ExError {
    fn from(err: JolokiaError) -> Self {
        let message = err.to_string();
        match err {
            JolokiaError::InvalidPath { .. } | JolokiaError::PathTooLong { .. } => {
                ExError::new(ExErrorKind::InvalidPath).with_message(message)
            }
            JolokiaError::UnknownUpdater { .. } => {
                ExError::new(ExErrorKind::UnknownUpdater).with_message(message)
            }
            JolokiaError::MalformedObjectName { name, .. } => {
                ExError::new(ExErrorKind::MalformedObjectName)
                    .with_mbean(name)
                    .with_message(message)
            }
            JolokiaError::PatternNotAllowed { name } => ExError::new(ExErrorKind::InvalidInput)
                .with_mbean(name)
                .with_message(message),
            JolokiaError::InvalidRequest { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            JolokiaError::ValueConversion { .. } => {
                ExError::new(ExErrorKind::InvalidValue).with_message(message)
            }
            JolokiaError::InstanceNotFound { mbean } => {
                ExError::new(ExErrorKind::InstanceNotFound)
                    .with_mbean(mbean)
                    .with_message(message)
            }
            JolokiaError::AttributeNotFound { mbean, .. } => {
                ExError::new(ExErrorKind::AttributeNotFound)
                    .with_mbean(mbean)
                    .with_message(message)
            }
            JolokiaError::OperationNotFound { mbean, .. } => {
                ExError::new(ExErrorKind::OperationNotFound)
                    .with_mbean(mbean)
                    .with_message(message)
            }
            JolokiaError::AmbiguousOperation { mbean, .. } => {
                ExError::new(ExErrorKind::AmbiguousOperation)
                    .with_mbean(mbean)
                    .with_message(message)
            }
            JolokiaError::AccessDenied { .. } => {
                ExError::new(ExErrorKind::Forbidden).with_message(message)
            }
            JolokiaError::AttributeNotReadable { mbean, .. } => {
                ExError::new(ExErrorKind::NotReadable)
                    .with_mbean(mbean)
                    .with_message(message)
            }
            JolokiaError::AttributeNotWritable { mbean, .. } => {
                ExError::new(ExErrorKind::NotWritable)
                    .with_mbean(mbean)
                    .with_message(message)
            }
            JolokiaError::Io { .. } | JolokiaError::ServerIllegalState { .. } => {
                ExError::new(ExErrorKind::Io).with_message(message)
            }
            JolokiaError::Introspection { mbean, .. } => {
                ExError::new(ExErrorKind::Introspection)
                    .with_mbean(mbean)
                    .with_message(message)
            }
            JolokiaError::Reflection { mbean, .. } => ExError::new(ExErrorKind::Reflection)
                .with_mbean(mbean)
                .with_message(message),
            JolokiaError::PropertyUnreadable { .. } => {
                ExError::new(ExErrorKind::Reflection).with_message(message)
            }
            JolokiaError::ObjectLimitExceeded { .. } => {
                ExError::new(ExErrorKind::LimitExceeded).with_message(message)
            }
            JolokiaError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            JolokiaError::Config { .. } => ExError::new(ExErrorKind::Config).with_message(message),
            JolokiaError::IllegalState { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to JolokiaError
impl From<serde_json::Error> for JolokiaError {
    fn from(err: serde_json::Error) -> Self {
        JolokiaError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_per_family() {
        let cases = [
            (ExErrorKind::InvalidPath, 400),
            (ExErrorKind::UnknownUpdater, 400),
            (ExErrorKind::Forbidden, 403),
            (ExErrorKind::InstanceNotFound, 404),
            (ExErrorKind::Io, 500),
            (ExErrorKind::Internal, 500),
        ];
        for (kind, status) in cases {
            assert_eq!(kind.http_status(), status, "Wrong status for {:?}", kind);
        }
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(JolokiaError::io("down").is_per_mbean_recoverable());
        assert!(JolokiaError::InstanceNotFound {
            mbean: "d:a=1".into()
        }
        .is_per_mbean_recoverable());
        assert!(!JolokiaError::illegal_state("bug").is_per_mbean_recoverable());
        assert!(!JolokiaError::Introspection {
            mbean: "d:a=1".into(),
            message: "boom".into()
        }
        .is_per_mbean_recoverable());
    }

    #[test]
    fn test_envelope_shape() {
        let err: ExError = JolokiaError::UnknownUpdater {
            selector: "bogus".into(),
        }
        .into();
        let err = err.with_request_id(RequestId::from_string("r-1"));

        let envelope = err.to_envelope();
        assert_eq!(envelope["status"], 400);
        assert_eq!(envelope["error_code"], "ERR_UNKNOWN_UPDATER");
        assert_eq!(envelope["request_id"], "r-1");
        assert!(envelope["error"].as_str().unwrap().contains("bogus"));
    }

    #[test]
    fn test_display_includes_mbean() {
        let err: ExError = JolokiaError::InstanceNotFound {
            mbean: "java.lang:type=Memory".into(),
        }
        .into();
        let text = err.to_string();
        assert!(text.starts_with("[ERR_INSTANCE_NOT_FOUND]"));
        assert!(text.contains("(mbean: java.lang:type=Memory)"));
    }
}
