use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::analytics::{Analytics, ACTION_ERROR, ACTION_SUCCESS, FORM_CATEGORY};
use crate::config::Config;
use crate::context::{FieldSetter, FormContext, FormsetOptions};
use crate::errors::{normalize, normalize_namespaced, FormErrors, NamespacedServerErrors};
use crate::hidden::HiddenField;
use crate::history::{GuardState, HistoryBlocker, HistoryError, HistoryGuard};
use crate::legacy;
use crate::mvi::Reducer;
use crate::router::Router;
use crate::session::{Session, SessionStore};
use crate::value::FormData;

use super::intent::SubmissionIntent;
use super::mutation::Mutation;
use super::redirect::RedirectTarget;
use super::reducer::SubmissionReducer;
use super::state::{SubmissionState, SuccessRedirect};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Form input must serialize to an object")]
    InputNotObject,

    #[error("Form input could not be converted: {0}")]
    Input(#[from] serde_json::Error),

    #[error("Field '{field}' is not part of this form")]
    UnknownField { field: String },

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Called after a successful mutation, once the session patch is merged.
pub type SuccessCallback<O> = Arc<dyn Fn(&O, &Session) + Send + Sync>;

pub struct SubmissionOptions<M: Mutation> {
    /// Distinguishes several forms bound to the same mutation on one page.
    pub form_id: Option<String>,
    pub id_prefix: String,
    pub on_success_redirect: Option<RedirectTarget<M::Input, M::Output>>,
    pub on_success: Option<SuccessCallback<M::Output>>,
}

impl<M: Mutation> Default for SubmissionOptions<M> {
    fn default() -> Self {
        Self {
            form_id: None,
            id_prefix: String::new(),
            on_success_redirect: None,
            on_success: None,
        }
    }
}

impl<M: Mutation> SubmissionOptions<M> {
    pub fn form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = Some(form_id.into());
        self
    }

    pub fn id_prefix(mut self, id_prefix: impl Into<String>) -> Self {
        self.id_prefix = id_prefix.into();
        self
    }

    pub fn redirect(mut self, target: RedirectTarget<M::Input, M::Output>) -> Self {
        self.on_success_redirect = Some(target);
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&M::Output, &Session) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }
}

/// Application-wide collaborators a form works against.
#[derive(Clone)]
pub struct FormServices {
    pub router: Arc<dyn Router>,
    pub session: SessionStore,
    pub history: Arc<HistoryBlocker>,
    pub analytics: Arc<dyn Analytics>,
    pub config: Arc<Config>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight; nothing was sent.
    AlreadySubmitting,
    /// The form unmounted while the mutation was pending.
    Discarded,
    Failed(FormErrors),
    TransportFailed,
    Succeeded { redirect: Option<String> },
}

/// State shared with field setters and the history guard callback.
struct Shared {
    state: Arc<Mutex<SubmissionState>>,
    guard: Mutex<HistoryGuard>,
    will_unmount: AtomicBool,
}

impl Shared {
    fn new(state: SubmissionState, history: Arc<HistoryBlocker>) -> Self {
        let state = Arc::new(Mutex::new(state));
        let observed = Arc::clone(&state);
        let guard = HistoryGuard::new(
            history,
            Arc::new(move || observed.lock().should_guard()),
        );
        Self {
            state,
            guard: Mutex::new(guard),
            will_unmount: AtomicBool::new(false),
        }
    }

    fn is_unmounting(&self) -> bool {
        self.will_unmount.load(Ordering::SeqCst)
    }

    /// Run one transition and bring the history guard in line with it.
    ///
    /// Returns `None` when the form is unmounting and the transition was
    /// discarded.
    fn dispatch(&self, intent: SubmissionIntent) -> Result<Option<SubmissionState>, SubmissionError> {
        let mut guard = self.guard.lock();
        if self.is_unmounting() {
            tracing::debug!(?intent, "Form unmounting, transition discarded");
            return Ok(None);
        }

        let next = {
            let mut state = self.state.lock();
            let next = SubmissionReducer::reduce(state.clone(), intent);
            *state = next.clone();
            next
        };
        guard.sync(next.should_guard())?;
        Ok(Some(next))
    }

    /// Like [`Shared::dispatch`], falling back to the current state when
    /// the transition was discarded.
    fn dispatch_or_current(&self, intent: SubmissionIntent) -> Result<SubmissionState, SubmissionError> {
        match self.dispatch(intent)? {
            Some(next) => Ok(next),
            None => Ok(self.state.lock().clone()),
        }
    }

    /// Enter `Submitting` unless already there, returning the input to send.
    fn begin_submit<T: DeserializeOwned>(&self) -> Result<Option<T>, SubmissionError> {
        let mut guard = self.guard.lock();
        if self.is_unmounting() {
            return Ok(None);
        }

        let (input, next) = {
            let mut state = self.state.lock();
            if state.is_loading {
                return Ok(None);
            }
            let input = serde_json::from_value(Value::Object(state.current.clone()))?;
            let next = SubmissionReducer::reduce(state.clone(), SubmissionIntent::Submit);
            *state = next.clone();
            (input, next)
        };
        guard.sync(next.should_guard())?;
        Ok(Some(input))
    }

    fn set_field(&self, field: &str, value: Value) -> Result<(), SubmissionError> {
        if !self.state.lock().current.contains_key(field) {
            return Err(SubmissionError::UnknownField {
                field: field.to_string(),
            });
        }
        self.dispatch(SubmissionIntent::FieldChanged {
            field: field.to_string(),
            value,
        })?;
        Ok(())
    }

    fn unmount(&self) -> Result<(), SubmissionError> {
        let mut guard = self.guard.lock();
        self.will_unmount.store(true, Ordering::SeqCst);
        guard.release()?;
        Ok(())
    }
}

/// One mounted form bound to a mutation.
pub struct FormSubmission<M: Mutation> {
    mutation: M,
    options: SubmissionOptions<M>,
    services: FormServices,
    shared: Arc<Shared>,
}

impl<M: Mutation> fmt::Debug for FormSubmission<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSubmission")
            .field("graphql", &self.mutation.graphql_id())
            .field("form_id", &self.options.form_id)
            .field("state", &*self.shared.state.lock())
            .finish_non_exhaustive()
    }
}

impl<M: Mutation> FormSubmission<M> {
    /// Mount a form with `initial` as its starting values.
    pub fn new(
        mutation: M,
        initial: &M::Input,
        options: SubmissionOptions<M>,
        services: FormServices,
    ) -> Result<Self, SubmissionError> {
        let data = to_form_data(initial)?;
        Ok(Self::from_state(
            mutation,
            SubmissionState::new(data),
            options,
            services,
        ))
    }

    /// Mount a form from a prepared state (e.g. one seeded by a legacy POST).
    pub fn from_state(
        mutation: M,
        state: SubmissionState,
        options: SubmissionOptions<M>,
        services: FormServices,
    ) -> Self {
        let shared = Arc::new(Shared::new(state, Arc::clone(&services.history)));
        Self {
            mutation,
            options,
            services,
            shared,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.shared.state.lock().clone()
    }

    pub fn guard_state(&self) -> GuardState {
        self.shared.guard.lock().state()
    }

    pub fn options(&self) -> &SubmissionOptions<M> {
        &self.options
    }

    pub fn set_field(&self, field: &str, value: Value) -> Result<(), SubmissionError> {
        self.shared.set_field(field, value)
    }

    /// Change handler for render contexts.
    pub fn setter(&self) -> FieldSetter {
        let shared = Arc::clone(&self.shared);
        Arc::new(move |field: &str, value: Value| {
            if let Err(e) = shared.set_field(field, value) {
                tracing::warn!(field = %field, error = %e, "Field change rejected");
            }
        })
    }

    /// Render context over a state snapshot.
    pub fn context<'a>(&self, snapshot: &'a SubmissionState) -> FormContext<'a> {
        FormContext::new(&snapshot.current, self.setter())
            .id_prefix(self.options.id_prefix.clone())
            .loading(snapshot.is_loading)
            .errors(snapshot.errors.as_ref())
            .namespaced_errors(snapshot.namespaced_errors.as_ref())
            .check_mode(self.services.config.render_checks.mode)
    }

    /// Formset layout options carrying the configured defaults.
    pub fn formset_options(&self) -> FormsetOptions {
        FormsetOptions::from_config(&self.services.config.formsets)
    }

    /// Hidden inputs that let the server route a no-JS POST to this form.
    pub fn hidden_fields(&self) -> Vec<HiddenField> {
        legacy::discriminator_fields(self.mutation.graphql_id(), self.options.form_id.as_deref())
    }

    /// Restore the initial values. Ignored while a submission is in flight.
    pub fn reset(&self) -> Result<SubmissionState, SubmissionError> {
        self.shared.dispatch_or_current(SubmissionIntent::Reset)
    }

    /// Report a router transition; backing out of a post-submit redirect
    /// re-enables the form.
    pub fn on_route_change(&self, from: &str, to: &str) -> Result<SubmissionState, SubmissionError> {
        self.shared.dispatch_or_current(SubmissionIntent::RouteChanged {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Stop applying transitions and drop the navigation guard.
    ///
    /// A pending mutation still resolves; its result is ignored.
    pub fn unmount(&self) -> Result<(), SubmissionError> {
        self.shared.unmount()
    }

    /// Send the current values through the mutation.
    pub async fn submit(&self) -> Result<SubmitOutcome, SubmissionError> {
        if self.shared.is_unmounting() {
            return Ok(SubmitOutcome::Discarded);
        }
        let Some(input) = self.shared.begin_submit::<M::Input>()? else {
            tracing::debug!(graphql = %self.mutation.graphql_id(), "Submission already in flight");
            return Ok(SubmitOutcome::AlreadySubmitting);
        };

        let result = self.mutation.call(input.clone()).await;

        if self.shared.is_unmounting() {
            tracing::debug!(graphql = %self.mutation.graphql_id(), "Form unmounted mid-request, result discarded");
            return Ok(SubmitOutcome::Discarded);
        }

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(graphql = %self.mutation.graphql_id(), error = %e, "Mutation failed");
                let message = self.services.config.errors.network_error_message.clone();
                if self
                    .shared
                    .dispatch(SubmissionIntent::TransportFailed { message })?
                    .is_none()
                {
                    return Ok(SubmitOutcome::Discarded);
                }
                self.track(ACTION_ERROR, vec![json!("__transport__"), json!(e.to_string())]);
                return Ok(SubmitOutcome::TransportFailed);
            }
        };

        if output.has_errors() {
            let errors = normalize(&output.errors);
            let namespaced_errors = (!output.namespaced_errors.is_empty())
                .then(|| normalize_namespaced(&output.namespaced_errors));
            tracing::debug!(
                graphql = %self.mutation.graphql_id(),
                count = errors.count(),
                "Submission returned validation errors"
            );
            let applied = self.shared.dispatch(SubmissionIntent::Failed {
                errors: errors.clone(),
                namespaced_errors,
            })?;
            if applied.is_none() {
                return Ok(SubmitOutcome::Discarded);
            }
            for error in &output.errors {
                self.track(ACTION_ERROR, vec![json!(error.field), json!(error.messages)]);
            }
            for (field, messages) in namespaced_error_entries(&output.namespaced_errors) {
                self.track(ACTION_ERROR, vec![json!(field), json!(messages)]);
            }
            return Ok(SubmitOutcome::Failed(errors));
        }

        let target = self
            .options
            .on_success_redirect
            .as_ref()
            .and_then(|redirect| redirect.resolve(&output.data, &input));
        let redirect = target.as_ref().map(|to| SuccessRedirect {
            from: self.services.router.current_path(),
            to: to.clone(),
        });
        let applied = self.shared.dispatch(SubmissionIntent::Succeeded {
            redirect: redirect.clone(),
        })?;
        if applied.is_none() {
            return Ok(SubmitOutcome::Discarded);
        }

        let session = match &output.session {
            Some(patch) => self.services.session.apply_patch(patch),
            None => self.services.session.get(),
        };
        self.track(ACTION_SUCCESS, vec![json!(target)]);

        if self.shared.is_unmounting() {
            tracing::debug!(graphql = %self.mutation.graphql_id(), "Form unmounted during success handling");
            return Ok(SubmitOutcome::Discarded);
        }

        if let Some(on_success) = &self.options.on_success {
            on_success(&output.data, &session);
        }

        if let Some(redirect) = &redirect {
            tracing::info!(from = %redirect.from, to = %redirect.to, "Redirecting after submission");
            self.services.router.push(&redirect.to);
        }

        Ok(SubmitOutcome::Succeeded { redirect: target })
    }

    fn track(&self, action: &str, mut args: Vec<Value>) {
        args.insert(0, json!(self.options.form_id));
        self.services.analytics.track(FORM_CATEGORY, action, &args);
    }
}

/// Per-error `(field, messages)` entries of a formset-bearing response.
///
/// Plain namespaces report under their own name; formset rows report under
/// their POST name, `${namespace}-${index}-${field}`.
fn namespaced_error_entries(
    collection: &BTreeMap<String, NamespacedServerErrors>,
) -> Vec<(String, Vec<String>)> {
    let mut entries = Vec::new();
    for (namespace, payload) in collection {
        match payload {
            NamespacedServerErrors::Fields(payload) => {
                if !payload.non_field_errors.is_empty() {
                    entries.push((namespace.clone(), payload.non_field_errors.clone()));
                }
                entries.extend(
                    payload
                        .field_errors
                        .iter()
                        .map(|error| (namespace.clone(), error.messages.clone())),
                );
            }
            NamespacedServerErrors::Formset(payload) => {
                if !payload.non_form_errors.is_empty() {
                    entries.push((namespace.clone(), payload.non_form_errors.clone()));
                }
                for (index, row) in payload.form_errors.iter().enumerate() {
                    entries.extend(row.iter().map(|error| {
                        (format!("{namespace}-{index}-{}", error.field), error.messages.clone())
                    }));
                }
            }
        }
    }
    entries
}

fn to_form_data<T: serde::Serialize>(input: &T) -> Result<FormData, SubmissionError> {
    match serde_json::to_value(input)? {
        Value::Object(map) => Ok(map),
        _ => Err(SubmissionError::InputNotObject),
    }
}
