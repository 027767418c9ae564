use crate::errors::FormErrors;
use crate::mvi::Reducer;
use crate::value::data_equivalent;

use super::intent::SubmissionIntent;
use super::state::{Phase, SubmissionState};

pub struct SubmissionReducer;

impl Reducer for SubmissionReducer {
    type State = SubmissionState;
    type Intent = SubmissionIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SubmissionIntent::FieldChanged { field, value } => {
                let mut state = state;
                state.current.insert(field, value);
                state.is_dirty = !data_equivalent(&state.current, &state.initial);
                state
            }
            SubmissionIntent::Submit => {
                if state.is_loading {
                    return state;
                }
                SubmissionState {
                    phase: Phase::Submitting,
                    is_loading: true,
                    errors: None,
                    namespaced_errors: None,
                    was_submitted_successfully: false,
                    ..state
                }
            }
            SubmissionIntent::Failed {
                errors,
                namespaced_errors,
            } => SubmissionState {
                phase: Phase::Idle,
                is_loading: false,
                errors: Some(errors),
                namespaced_errors,
                ..state
            },
            SubmissionIntent::TransportFailed { message } => SubmissionState {
                phase: Phase::Idle,
                is_loading: false,
                errors: Some(FormErrors {
                    non_field_errors: vec![message],
                    ..FormErrors::default()
                }),
                namespaced_errors: None,
                ..state
            },
            SubmissionIntent::Succeeded { redirect } => match redirect {
                // Stay loading through the navigation.
                Some(redirect) => SubmissionState {
                    phase: Phase::SuccessRedirecting,
                    is_loading: true,
                    was_submitted_successfully: true,
                    last_success_redirect: Some(redirect),
                    ..state
                },
                None => SubmissionState {
                    phase: Phase::Idle,
                    is_loading: false,
                    was_submitted_successfully: true,
                    ..state
                },
            },
            SubmissionIntent::RouteChanged { from, to } => {
                let backed_out = state
                    .last_success_redirect
                    .as_ref()
                    .is_some_and(|redirect| redirect.to == from && redirect.from == to);
                if !backed_out {
                    return state;
                }
                SubmissionState {
                    phase: Phase::Idle,
                    is_loading: false,
                    was_submitted_successfully: false,
                    ..state
                }
            }
            // A submission in flight owns the form until it resolves.
            SubmissionIntent::Reset if state.phase == Phase::Submitting => state,
            SubmissionIntent::Reset => SubmissionState::new(state.initial),
        }
    }
}
