//! Optional process-wide default locations.
//!
//! Components that need a temporary or current directory take it as a
//! parameter. This module only backs convenience wrappers that want a
//! process-wide fallback. It starts empty: call [`init`] once at startup and
//! [`reset`] to return to the empty state.

use parking_lot::{const_rwlock, RwLock};
use tracing::debug;

use crate::types::PathSettings;

/// Default locations shared by the whole process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessDefaults {
    /// Directory for temporary files
    pub temp_directory: Option<String>,

    /// Directory relative paths resolve against
    pub current_directory: Option<String>,
}

impl From<&PathSettings> for ProcessDefaults {
    fn from(settings: &PathSettings) -> Self {
        Self {
            temp_directory: settings.temp_directory.clone(),
            current_directory: settings.current_directory.clone(),
        }
    }
}

static DEFAULTS: RwLock<Option<ProcessDefaults>> = const_rwlock(None);

/// Install the process defaults, replacing any earlier ones
pub fn init(defaults: ProcessDefaults) {
    debug!(?defaults, "installing process defaults");
    *DEFAULTS.write() = Some(defaults);
}

/// The installed defaults, or `None` before [`init`] and after [`reset`]
pub fn get() -> Option<ProcessDefaults> {
    DEFAULTS.read().clone()
}

/// Remove the installed defaults
pub fn reset() {
    *DEFAULTS.write() = None;
}

pub fn temp_directory() -> Option<String> {
    DEFAULTS.read().as_ref()?.temp_directory.clone()
}

pub fn current_directory() -> Option<String> {
    DEFAULTS.read().as_ref()?.current_directory.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The defaults are global, so the whole lifecycle lives in one test.
    #[test]
    fn test_lifecycle() {
        reset();
        assert_eq!(get(), None);
        assert_eq!(temp_directory(), None);

        let settings = PathSettings {
            temp_directory: Some("/scratch".to_string()),
            ..PathSettings::default()
        };
        init(ProcessDefaults::from(&settings));
        assert_eq!(temp_directory().as_deref(), Some("/scratch"));
        assert_eq!(current_directory(), None);

        init(ProcessDefaults {
            temp_directory: None,
            current_directory: Some("/work".to_string()),
        });
        assert_eq!(temp_directory(), None);
        assert_eq!(current_directory().as_deref(), Some("/work"));

        reset();
        assert_eq!(get(), None);
    }
}
