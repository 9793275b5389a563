//! Error types for VoyagerMate operations

/// Result type for VoyagerMate operations
pub type Result<T> = std::result::Result<T, VoyagerError>;

/// Error taxonomy for the orchestration core.
///
/// Every completion call can fail in one of three distinguishable ways:
/// the call itself never completed (`Transport`), a reply came back but did
/// not conform to the requested schema or closed value set (`Decode`), or the
/// service declined to answer (`Refusal`). Refinement-loop exhaustion is NOT
/// an error; it surfaces as a `RefinementResult` whose final round carries
/// `accepted == false`.
#[derive(Debug, thiserror::Error)]
pub enum VoyagerError {
    /// The completion call could not be completed (network/service failure)
    #[error("transport error: {0}")]
    Transport(String),

    /// A response was returned but did not match the requested schema
    #[error("decode error: {0}")]
    Decode(String),

    /// The underlying service declined to answer
    #[error("completion refused: {0}")]
    Refusal(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A tool invocation failed
    #[error("tool '{name}' failed: {message}")]
    Tool { name: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoyagerError {
    /// Build a decode error from a serde failure, keeping the offending
    /// payload's shape out of the message (it may be large).
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        VoyagerError::Decode(format!("{}: {}", context.into(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_transport_are_distinguishable() {
        let decode = VoyagerError::Decode("bad intent".into());
        let transport = VoyagerError::Transport("connection reset".into());

        assert!(matches!(decode, VoyagerError::Decode(_)));
        assert!(matches!(transport, VoyagerError::Transport(_)));
    }

    #[test]
    fn decode_helper_keeps_context() {
        let err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let wrapped = VoyagerError::decode("failed to parse plan", err);
        assert!(wrapped.to_string().contains("failed to parse plan"));
    }
}
