// Macros file - tracing macros are imported within the macro definitions

/// Standardized logging macros for consistent field names across the client.
///
/// Sessions are identified by `session_id` and `session_kind`, reports by
/// `report_kind`, generation by `mode` and `item_count`.

// ============================================================================
// Session Logging Macros
// ============================================================================

/// Log a session lifecycle event
#[macro_export]
macro_rules! log_session_event {
    ($kind:expr, session_id = $session_id:expr, position = $position:expr, $msg:expr) => {
        tracing::debug!(
            session_kind = $kind,
            session_id = %$session_id,
            position = $position,
            "Session event: {}", $msg
        );
    };
    ($kind:expr, session_id = $session_id:expr, score = $score:expr, total = $total:expr, duration_ms = $duration:expr, $msg:expr) => {
        tracing::info!(
            session_kind = $kind,
            session_id = %$session_id,
            score = $score,
            total = $total,
            duration_ms = $duration,
            "Session event: {}", $msg
        );
    };
    ($kind:expr, session_id = $session_id:expr, duration_ms = $duration:expr, $msg:expr) => {
        tracing::info!(
            session_kind = $kind,
            session_id = %$session_id,
            duration_ms = $duration,
            "Session event: {}", $msg
        );
    };
    ($kind:expr, session_id = $session_id:expr, $msg:expr) => {
        tracing::info!(
            session_kind = $kind,
            session_id = %$session_id,
            "Session event: {}", $msg
        );
    };
}

/// Log a session operation that was ignored by a transition guard
#[macro_export]
macro_rules! log_session_ignored {
    ($kind:expr, session_id = $session_id:expr, $operation:expr, $reason:expr) => {
        tracing::debug!(
            session_kind = $kind,
            session_id = %$session_id,
            operation = $operation,
            "Session operation ignored: {}", $reason
        );
    };
}

// ============================================================================
// Generation Logging Macros
// ============================================================================

/// Log generation requests with mode context
#[macro_export]
macro_rules! log_generation {
    (start, mode = $mode:expr, item_count = $count:expr, source = $source:expr) => {
        tracing::info!(
            component = "generation",
            mode = %$mode,
            item_count = $count,
            source = %$source,
            "Generation request dispatched"
        );
    };
    (success, mode = $mode:expr, item_count = $count:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = "generation",
            mode = %$mode,
            item_count = $count,
            duration_ms = $duration,
            "Generation completed successfully"
        );
    };
    (failure, error = $error:expr, duration_ms = $duration:expr) => {
        tracing::warn!(
            component = "generation",
            error = %$error,
            duration_ms = $duration,
            "Generation failed"
        );
    };
}

// ============================================================================
// Report Logging Macros
// ============================================================================

/// Log result-persistence report lifecycle
#[macro_export]
macro_rules! log_report {
    (dispatched, report_kind = $kind:expr) => {
        tracing::debug!(
            component = "reporting",
            report_kind = $kind,
            "Report dispatched"
        );
    };
    (succeeded, report_kind = $kind:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = "reporting",
            report_kind = $kind,
            duration_ms = $duration,
            "Report saved successfully"
        );
    };
    (failed, report_kind = $kind:expr, error = $error:expr) => {
        tracing::error!(
            component = "reporting",
            report_kind = $kind,
            error = %$error,
            "Report failed to save"
        );
    };
    (drained, count = $count:expr) => {
        tracing::info!(
            component = "reporting",
            count = $count,
            "Outstanding reports drained"
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and shutdown events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (shutdown, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "shutdown",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}
