//! Request logging macros
//!
//! `log_op_start!`, `log_op_end!` and `log_op_error!` bracket one agent
//! request. The op is the request type and every event carries the request id
//! of the dispatcher's `RequestContext`, so the events of one request can be
//! joined with its response envelope. Error events add the stable error code,
//! the transport status and the MBean the error was raised for.
//!
//! `log_mbean_error!` reports a per-MBean failure that a multi-MBean request
//! records in its result instead of failing.

/// Log the start of a request
///
/// ```
/// # use jolokia_core::log_op_start;
/// # use jolokia_core::core_types::RequestId;
/// let request_id = RequestId::new();
/// log_op_start!("list", request_id);
/// log_op_start!("read", request_id, mbean = "java.lang:type=Memory");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr, $request_id:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            request_id = %$request_id,
        );
    };
    ($op:expr, $request_id:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            request_id = %$request_id,
            $($field)*
        );
    };
}

/// Log the successful end of a request
///
/// ```
/// # use jolokia_core::log_op_end;
/// # use jolokia_core::core_types::RequestId;
/// log_op_end!("list", RequestId::new(), duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, $request_id:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            request_id = %$request_id,
            duration_ms = $duration,
        );
    };
    ($op:expr, $request_id:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            request_id = %$request_id,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log a failed request
///
/// Takes anything convertible into an `ExError`.
///
/// ```
/// # use jolokia_core::{log_op_error, errors::JolokiaError};
/// # use jolokia_core::core_types::RequestId;
/// let err = JolokiaError::InstanceNotFound { mbean: "d:a=1".to_string() };
/// log_op_error!("read", RequestId::new(), err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $request_id:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            request_id = %$request_id,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            status = ex_err.http_status(),
            mbean = ex_err.mbean(),
            "{}",
            ex_err.message()
        );
    }};
}

/// Log a per-MBean error recorded inline in a multi-MBean result
///
/// ```
/// # use jolokia_core::{log_mbean_error, errors::JolokiaError};
/// let err = JolokiaError::Io { message: "connection reset".to_string() };
/// log_mbean_error!("list", "java.lang:type=Memory", &err);
/// ```
#[macro_export]
macro_rules! log_mbean_error {
    ($op:expr, $mbean:expr, $err:expr) => {{
        let err: &$crate::errors::JolokiaError = $err;
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_MBEAN_ERROR,
            mbean = %$mbean,
            err_code = err.kind().code(),
            "{}",
            err
        );
    }};
}
