use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::submission::{
    FormServices, FormSubmission, Mutation, SubmissionError, SubmissionOptions, SubmissionState,
};

use super::post::{LegacyOutcome, LegacyPostSlot};

/// What the page shell should render for a form.
pub enum LegacyMount<M: Mutation> {
    Form(FormSubmission<M>),
    /// Answer the request with a redirect instead of rendering the form.
    Redirect(String),
}

impl<M: Mutation> fmt::Debug for LegacyMount<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyMount::Form(form) => f.debug_tuple("Form").field(form).finish(),
            LegacyMount::Redirect(to) => f.debug_tuple("Redirect").field(to).finish(),
        }
    }
}

impl<M: Mutation> LegacyMount<M> {
    pub fn into_form(self) -> Option<FormSubmission<M>> {
        match self {
            LegacyMount::Form(form) => Some(form),
            LegacyMount::Redirect(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            LegacyMount::Form(_) => None,
            LegacyMount::Redirect(to) => Some(to),
        }
    }
}

/// Mount a form, replaying a matching full-page POST if there is one.
///
/// A POST that failed validation seeds the form with the submitted values
/// and their errors. A POST that succeeded and resolves to a redirect
/// becomes [`LegacyMount::Redirect`], unless it was a persist form.
pub fn mount<M>(
    slot: &LegacyPostSlot,
    mutation: M,
    initial: &M::Input,
    options: SubmissionOptions<M>,
    services: FormServices,
) -> Result<LegacyMount<M>, SubmissionError>
where
    M: Mutation,
    M::Output: DeserializeOwned,
{
    let Some(post) = slot.take_matching(mutation.graphql_id(), options.form_id.as_deref()) else {
        return FormSubmission::new(mutation, initial, options, services).map(LegacyMount::Form);
    };

    tracing::debug!(
        graphql = %post.graphql,
        legacy_form_id = ?post.legacy_form_id,
        "Replaying full-page POST"
    );

    let persist = post.is_persist_form(&services.config.legacy.persist_field_prefix);
    let state = SubmissionState::new(post.input.clone());

    match post.outcome {
        LegacyOutcome::Errors {
            errors,
            namespaced_errors,
        } => {
            let state = state.with_errors(errors, namespaced_errors);
            Ok(LegacyMount::Form(FormSubmission::from_state(
                mutation, state, options, services,
            )))
        }
        LegacyOutcome::Success { output } => {
            let target = if persist {
                None
            } else {
                resolve_redirect(&options, output, &post.input)?
            };
            match target {
                Some(to) => {
                    tracing::info!(to = %to, "Full-page POST succeeded, redirecting");
                    Ok(LegacyMount::Redirect(to))
                }
                None => Ok(LegacyMount::Form(FormSubmission::from_state(
                    mutation, state, options, services,
                ))),
            }
        }
    }
}

fn resolve_redirect<M>(
    options: &SubmissionOptions<M>,
    output: Value,
    input: &crate::value::FormData,
) -> Result<Option<String>, SubmissionError>
where
    M: Mutation,
    M::Output: DeserializeOwned,
{
    let Some(redirect) = &options.on_success_redirect else {
        return Ok(None);
    };
    let output: M::Output = serde_json::from_value(output)?;
    let input: M::Input = serde_json::from_value(Value::Object(input.clone()))?;
    Ok(redirect.resolve(&output, &input))
}
