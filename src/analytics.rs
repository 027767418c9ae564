//! Analytics collaborator.
//!
//! Fire-and-forget: implementations must not panic or block, and nothing
//! they do can influence the submission state machine.

use serde_json::Value;

pub const FORM_CATEGORY: &str = "form";
pub const ACTION_ERROR: &str = "error";
pub const ACTION_SUCCESS: &str = "success";

pub trait Analytics: Send + Sync {
    fn track(&self, category: &str, action: &str, args: &[Value]);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn track(&self, _category: &str, _action: &str, _args: &[Value]) {}
}

/// Emits every event as a `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn track(&self, category: &str, action: &str, args: &[Value]) {
        let args = Value::Array(args.to_vec());
        tracing::info!(
            target: "formbridge::analytics",
            category = %category,
            action = %action,
            args = %args,
            "Analytics event"
        );
    }
}
