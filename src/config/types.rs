use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render_checks: RenderChecksConfig,
    #[serde(default)]
    pub formsets: FormsetConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub legacy: LegacyConfig,
    #[serde(default)]
    pub errors: ErrorsConfig,
}

/// How a render pass reports fields that were never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderCheckMode {
    /// Fail the render pass with an error.
    Strict,
    /// Log a warning and carry on.
    Warn,
}

impl Default for RenderCheckMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            RenderCheckMode::Strict
        } else {
            RenderCheckMode::Warn
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderChecksConfig {
    #[serde(default)]
    pub mode: RenderCheckMode,
}

/// Defaults applied to formsets that don't set their own limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormsetConfig {
    /// Blank rows appended for renders without client-side scripting (default: 1).
    #[serde(default = "default_extra")]
    pub default_extra: usize,
    /// Upper bound on rows when a formset sets none (default: unbounded).
    #[serde(default)]
    pub default_max_num: Option<usize>,
    /// Hard cap on the row count a POST body may declare (default: 1000).
    #[serde(default = "default_absolute_max")]
    pub absolute_max: usize,
}

/// In-app navigation guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Text of the "leave this page?" prompt.
    #[serde(default = "default_confirm_message")]
    pub confirm_message: String,
    /// Suffix marking a route as the modal variant of another route.
    #[serde(default = "default_modal_suffix")]
    pub modal_suffix: String,
}

/// No-JS (full-page POST) submission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyConfig {
    /// POST field name prefix that keeps a successful form on its page.
    #[serde(default = "default_persist_field_prefix")]
    pub persist_field_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsConfig {
    /// Non-field error shown when the mutation itself fails.
    #[serde(default = "default_network_error_message")]
    pub network_error_message: String,
}

fn default_extra() -> usize {
    1
}

fn default_absolute_max() -> usize {
    crate::formset::DEFAULT_ABSOLUTE_MAX
}

fn default_confirm_message() -> String {
    "Are you sure you want to leave this page? Changes you have made may not be saved."
        .to_string()
}

fn default_modal_suffix() -> String {
    "-modal".to_string()
}

fn default_persist_field_prefix() -> String {
    "__persist".to_string()
}

fn default_network_error_message() -> String {
    "Sorry, something went wrong. Please try again.".to_string()
}

impl Default for FormsetConfig {
    fn default() -> Self {
        Self {
            default_extra: default_extra(),
            default_max_num: None,
            absolute_max: default_absolute_max(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            confirm_message: default_confirm_message(),
            modal_suffix: default_modal_suffix(),
        }
    }
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            persist_field_prefix: default_persist_field_prefix(),
        }
    }
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            network_error_message: default_network_error_message(),
        }
    }
}
