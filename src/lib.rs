//! Dual-mode form submission for server-rendered pages.
//!
//! Every form works the same with or without client-side scripting: AJAX
//! submissions go through [`submission::FormSubmission`], and full-page
//! POSTs are replayed into the same state machine by [`legacy::mount`].

pub mod analytics;
pub mod config;
pub mod context;
pub mod errors;
pub mod formset;
pub mod hidden;
pub mod history;
pub mod legacy;
pub mod logging;
pub mod mvi;
pub mod router;
pub mod session;
pub mod submission;
pub mod value;
