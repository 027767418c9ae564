//! No-JavaScript (full-page POST) submissions.
//!
//! Without scripting, a form POSTs to the page it lives on. The server runs
//! the mutation, then re-renders the page with a record of that POST. The
//! first render replays the outcome into the form exactly as if it had come
//! back over AJAX: errors are shown, or the server answers with a redirect.

mod decode;
mod post;
mod reconcile;

pub use decode::{decode_post_fields, LegacyError};
pub use post::{discriminator_fields, LegacyOutcome, LegacyPost, LegacyPostSlot};
pub use reconcile::{mount, LegacyMount};

/// Hidden field carrying the mutation identifier.
pub const GRAPHQL_FIELD: &str = "graphql";
/// Hidden field carrying the optional form id.
pub const LEGACY_FORM_ID_FIELD: &str = "legacyFormId";

pub(crate) fn is_discriminator(name: &str) -> bool {
    name == GRAPHQL_FIELD || name == LEGACY_FORM_ID_FIELD
}
