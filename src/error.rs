//! Failure taxonomy for a resolution request.
//!
//! Display strings are what the caller sees: [`generate_resolution`]
//! never fails, it returns the message instead.
//!
//! [`generate_resolution`]: crate::pipeline::ResolutionPipeline::generate_resolution

/// Marker contained in the missing-credential message.
pub const MISSING_CREDENTIAL_MARKER: &str = "API Key is missing";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("Error: API Key is missing. Set it in the secrets file, the environment, or the key file.")]
    MissingCredential,

    #[error("Error initializing AI model: {0}")]
    ModelInit(String),

    /// Knowledge store could not be built. Recovered by the degraded path
    /// inside the pipeline; only [`search`] reports it.
    ///
    /// [`search`]: crate::pipeline::ResolutionPipeline::search
    #[error("Knowledge base unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("An error occurred while generating the response: {0}")]
    Generation(String),
}
