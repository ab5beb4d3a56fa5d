//! ---
//! rules_section: "03-logging"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Structured logging context and lifecycle events."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
//! Debug logging macro carrying a [`crate::LogContext`].

/// Shared expansion of the logging macro.
#[doc(hidden)]
#[macro_export]
macro_rules! __rules_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            $level,
            rule = ctx.rule.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            mode = ctx.mode.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a debug log enriched with rule context.
#[macro_export]
macro_rules! rules_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__rules_event!(tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__rules_event!(tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}
