//! Base trait for intents.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (field edits, submit, reset)
/// - System events (mutation responses, route changes)
pub trait Intent: Send + 'static {}
