//! Shared helpers for the Actions host: preference storage and path handling.

pub mod path_processing;
pub mod preferences;

pub use path_processing::expand_tilde;
pub use preferences::{PreferencesError, PreferencesPayload, UserPreferences};
