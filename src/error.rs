//! Core engine errors
//!
//! Failures raised by value coercion, projection and document patching.
//! File and process failures live with the collaborators that perform them.

/// Errors produced by the settings resolution and reflection engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A settings value has a kind with no command-line representation
    #[error("Unsupported value kind at '{path}': {kind} values are not supported")]
    UnsupportedValueKind { path: String, kind: &'static str },

    /// A document selector cannot be navigated in the target document
    #[error("Malformed selector: {0}")]
    MalformedSelector(String),

    /// The native build property was required but no dart defines exist
    #[error("No dart defines to encode into the native build property")]
    EmptyDefineSet,

    /// A flag or command line has a quote that is never closed
    #[error("Unbalanced quotes in '{0}'")]
    UnbalancedQuotes(String),
}
