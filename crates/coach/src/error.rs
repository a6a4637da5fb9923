use promptcademy_core::error::CoreError;
use promptcademy_core::scoring::ScoreResult;

/// Remediation shown when no API key is configured.
pub const CONFIGURE_ACTION: &str =
    "Set OPENAI_API_KEY on the server to enable AI scoring, then resubmit.";

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    /// No API key was configured.
    #[error("AI coach is not configured")]
    NotConfigured,

    /// The request was rejected before any upstream call.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("Upstream API error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl CoachError {
    /// Safe body to return alongside this failure.
    ///
    /// Never echoes upstream bodies or credentials.
    pub fn fallback_result(&self) -> ScoreResult {
        match self {
            Self::NotConfigured => ScoreResult::unavailable(
                "AI scoring is not available on this server.",
                CONFIGURE_ACTION,
            ),
            Self::Invalid(_) => ScoreResult::unavailable(
                "The submission could not be scored.",
                "Provide a deliverable and a rubric.",
            ),
            Self::Request(_) | Self::Api { .. } => ScoreResult::unavailable(
                "Coach scoring failed.",
                "Try again in a moment.",
            ),
        }
    }
}
