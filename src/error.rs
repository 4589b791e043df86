//! Error types for the JSS engine.

use thiserror::Error;

/// Root error type for engine operations.
#[derive(Error, Debug, Clone)]
pub enum JssError {
    /// No renderer could be resolved for a rule or sheet
    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),

    /// A plugin hook failed and aborted the pipeline
    #[error("Plugin '{plugin}' failed in {hook}: {source}")]
    Plugin {
        plugin: String,
        hook: &'static str,
        #[source]
        source: PluginError,
    },

    /// A sheet entry was not a style mapping
    #[error("Invalid style for rule '{0}': expected a mapping")]
    InvalidStyle(String),
}

/// Errors raised by plugin hooks.
#[derive(Error, Debug, Clone)]
pub enum PluginError {
    /// Hook execution failed
    #[error("Hook execution failed: {0}")]
    ExecutionFailed(String),

    /// Plugin refused the rule, sheet or value it was handed
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Errors raised by renderer resolution.
#[derive(Error, Debug, Clone)]
pub enum RendererError {
    /// No renderer available for the given options
    #[error("No renderer found: {0}")]
    NotFound(String),
}

impl From<String> for PluginError {
    fn from(msg: String) -> Self {
        PluginError::ExecutionFailed(msg)
    }
}

impl From<&str> for PluginError {
    fn from(msg: &str) -> Self {
        PluginError::ExecutionFailed(msg.to_string())
    }
}

/// Result type alias for plugin hooks.
pub type PluginResult<T> = Result<T, PluginError>;

/// Result type alias for renderer resolution.
pub type RendererResult<T> = Result<T, RendererError>;

/// Result type alias for engine operations.
pub type JssResult<T> = Result<T, JssError>;
