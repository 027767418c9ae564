//! Model-View-Intent primitives.
//!
//! Form state only changes by feeding an intent through a reducer. The async
//! submission driver performs side effects (network, session, navigation)
//! and reports each outcome back as an intent.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Render
//!    ↑                               │
//!    └───────────────────────────────┘
//! ```

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
