use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::errors::{NamespacedServerErrors, ServerFieldError};
use crate::session::SessionPatch;

/// Failures of the mutation call itself, as opposed to validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("GraphQL error: {0}")]
    Graphql(String),
}

/// What a mutation resolves with.
///
/// An empty `errors` list (and no namespaced errors) means success.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutput<O> {
    pub errors: Vec<ServerFieldError>,
    pub namespaced_errors: BTreeMap<String, NamespacedServerErrors>,
    pub session: Option<SessionPatch>,
    pub data: O,
}

impl<O> MutationOutput<O> {
    pub fn success(data: O) -> Self {
        Self {
            errors: Vec::new(),
            namespaced_errors: BTreeMap::new(),
            session: None,
            data,
        }
    }

    pub fn with_session(mut self, session: SessionPatch) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_errors(mut self, errors: Vec<ServerFieldError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_namespaced_errors(
        mut self,
        namespaced_errors: BTreeMap<String, NamespacedServerErrors>,
    ) -> Self {
        self.namespaced_errors = namespaced_errors;
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.namespaced_errors.is_empty()
    }
}

/// Injected server call behind a form.
#[async_trait]
pub trait Mutation: Send + Sync {
    type Input: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
    type Output: Send + Sync + 'static;

    /// Identifier posted as the `graphql` hidden field.
    fn graphql_id(&self) -> &str;

    async fn call(&self, input: Self::Input)
        -> Result<MutationOutput<Self::Output>, MutationError>;
}
