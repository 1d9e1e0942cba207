//! Structured logging helpers.
//!
//! Every log line emitted during startup carries consistent fields so the
//! JSON output can be filtered by module:
//! - `module`: Module name (logging, core, routing, mqtt, amqp, http)
//! - `message`: Log message
//! - Additional context fields

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    // Info level with module
    (info, $module:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            module = $module,
            $($($field)*,)?
            $msg
        )
    };

    // Warn level with module
    (warn, $module:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            module = $module,
            $($($field)*,)?
            $msg
        )
    };

    // Error level with module
    (error, $module:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            module = $module,
            $($($field)*,)?
            $msg
        )
    };

    // Debug level with module
    (debug, $module:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            module = $module,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a listener-related event with the bound endpoint.
#[macro_export]
macro_rules! log_listener_event {
    ($level:ident, $module:expr, $msg:expr, $scheme:expr, $port:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            module = $module,
            scheme = %$scheme,
            port = $port,
            $($($field)*,)?
            $msg
        )
    };
}
