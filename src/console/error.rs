use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Backend request failed: transport error, non-2xx status or an
    /// undecodable body.
    #[error("request to {endpoint} failed: {message}")]
    Fetch { endpoint: String, message: String },

    /// Malformed hierarchy, bounds or image payload.
    #[error("malformed {context}: {message}")]
    Parse { context: String, message: String },

    /// The snapshot image has no on-screen size yet.
    #[error("image geometry unavailable")]
    GeometryUnavailable,

    /// A gesture dispatch is still awaiting acknowledgement.
    #[error("a gesture is already in flight")]
    Busy,

    #[error("no collection session is active")]
    NoSession,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ConsoleError {
    pub fn fetch(endpoint: impl Into<String>, message: impl ToString) -> Self {
        ConsoleError::Fetch {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Expected timing races rather than faults: the triggering interaction
    /// is dropped without telling the operator.
    pub fn is_silent(&self) -> bool {
        matches!(self, ConsoleError::GeometryUnavailable | ConsoleError::Busy)
    }
}
