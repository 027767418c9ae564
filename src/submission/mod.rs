//! Form submission state machine.
//!
//! [`SubmissionReducer`] owns every state transition; [`FormSubmission`]
//! drives it, performing the side effects (mutation call, session merge,
//! analytics, redirect) and feeding their outcomes back as intents.
//!
//! ```text
//! Idle ──submit──→ Submitting ──errors──────────→ Idle (errors shown)
//!                      │ └──────success─────────→ Idle
//!                      └──success + redirect──→ SuccessRedirecting
//! SuccessRedirecting ──back to origin route──→ Idle
//! ```

mod form;
mod intent;
mod mutation;
mod redirect;
mod reducer;
mod state;

pub use form::{
    FormServices, FormSubmission, SubmissionError, SubmissionOptions, SubmitOutcome,
    SuccessCallback,
};
pub use intent::SubmissionIntent;
pub use mutation::{Mutation, MutationError, MutationOutput};
pub use redirect::RedirectTarget;
pub use reducer::SubmissionReducer;
pub use state::{Phase, SubmissionState, SuccessRedirect};
