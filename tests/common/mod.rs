//! Shared test utilities and scripted collaborators.

#![allow(dead_code, unused_imports)]

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use formbridge::analytics::Analytics;
use formbridge::config::Config;
use formbridge::errors::ServerFieldError;
use formbridge::history::{ConfirmPrompt, HistoryBlocker};
use formbridge::router::MemoryRouter;
use formbridge::session::{Session, SessionPatch, SessionStore};
use formbridge::submission::{FormServices, Mutation, MutationError, MutationOutput};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Notify;

// -- Form inputs --------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRow {
    pub court: String,
    pub index_number: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorCasesInput {
    pub has_prior_cases: bool,
    pub cases: Vec<CaseRow>,
}

pub fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

// -- Analytics ----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub category: String,
    pub action: String,
    pub args: Vec<Value>,
}

#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<TrackedEvent>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events.lock().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.action.clone()).collect()
    }
}

impl Analytics for RecordingAnalytics {
    fn track(&self, category: &str, action: &str, args: &[Value]) {
        self.events.lock().push(TrackedEvent {
            category: category.to_string(),
            action: action.to_string(),
            args: args.to_vec(),
        });
    }
}

// -- Confirm prompt -----------------------------------------------------------

pub struct ScriptedPrompt {
    accept: bool,
    asked: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn declining() -> Self {
        Self {
            accept: false,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, _message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.accept
    }
}

// -- Mutation -----------------------------------------------------------------

pub type Response = Result<MutationOutput<Value>, MutationError>;

/// What a [`ScriptedMutation`] saw, shared with the test.
#[derive(Default)]
pub struct MutationLog {
    calls: AtomicUsize,
    inputs: Mutex<Vec<Value>>,
}

impl MutationLog {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<Value> {
        self.inputs.lock().clone()
    }
}

/// Mutation answering from a queue of canned responses.
///
/// With a gate, every call waits for `gate.notify_one()` before answering.
pub struct ScriptedMutation<I> {
    id: String,
    responses: Arc<Mutex<VecDeque<Response>>>,
    log: Arc<MutationLog>,
    gate: Option<Arc<Notify>>,
    _input: PhantomData<fn() -> I>,
}

impl<I> ScriptedMutation<I> {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            log: Arc::new(MutationLog::default()),
            gate: None,
            _input: PhantomData,
        }
    }

    pub fn respond(self, response: Response) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn log(&self) -> Arc<MutationLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl<I> Mutation for ScriptedMutation<I>
where
    I: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Input = I;
    type Output = Value;

    fn graphql_id(&self) -> &str {
        &self.id
    }

    async fn call(&self, input: I) -> Response {
        self.log.calls.fetch_add(1, Ordering::SeqCst);
        self.log
            .inputs
            .lock()
            .push(serde_json::to_value(&input).expect("input serializes"));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.responses.lock().pop_front();
        next.unwrap_or_else(|| Ok(MutationOutput::success(Value::Null)))
    }
}

pub fn errors(list: &[(&str, &[&str])]) -> Vec<ServerFieldError> {
    list.iter()
        .map(|(field, messages)| ServerFieldError::new(*field, messages.iter().copied()))
        .collect()
}

pub fn failing(list: &[(&str, &[&str])]) -> Response {
    Ok(MutationOutput::success(Value::Null).with_errors(errors(list)))
}

pub fn succeeding(data: Value) -> Response {
    Ok(MutationOutput::success(data))
}

pub fn succeeding_with_session(data: Value, session: SessionPatch) -> Response {
    Ok(MutationOutput::success(data).with_session(session))
}

/// Spin until the mutation has been entered `n` times.
pub async fn wait_for_calls(log: &MutationLog, n: usize) {
    while log.calls() < n {
        tokio::task::yield_now().await;
    }
}

// -- Environment --------------------------------------------------------------

pub struct TestEnv {
    pub router: Arc<MemoryRouter>,
    pub session: SessionStore,
    pub history: Arc<HistoryBlocker>,
    pub analytics: Arc<RecordingAnalytics>,
    pub config: Arc<Config>,
}

impl TestEnv {
    pub fn new(path: &str) -> Self {
        Self::with_config(path, Config::default())
    }

    pub fn with_config(path: &str, config: Config) -> Self {
        Self {
            router: Arc::new(MemoryRouter::new(path)),
            session: SessionStore::new(Session::new()),
            history: Arc::new(HistoryBlocker::new(&config.navigation)),
            analytics: Arc::new(RecordingAnalytics::default()),
            config: Arc::new(config),
        }
    }

    pub fn services(&self) -> FormServices {
        FormServices {
            router: self.router.clone(),
            session: self.session.clone(),
            history: Arc::clone(&self.history),
            analytics: self.analytics.clone(),
            config: Arc::clone(&self.config),
        }
    }
}
