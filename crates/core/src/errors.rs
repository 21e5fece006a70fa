use thiserror::Error;

/// Failure taxonomy for one request resolution. Every external-call wrapper
/// converts its own failures into one of these at the edge; raw transport
/// errors never reach the interaction layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("no employee matched `{name}`")]
    NotFound { name: String },
    #[error("transport failure talking to {service}: {message}")]
    Transport { service: String, message: String },
    #[error("expected a day count from the model, got `{raw}`")]
    Parse { raw: String },
    #[error("the reasoning loop could not decide after {iterations} steps")]
    Reasoning { iterations: usize },
}

impl ResolutionError {
    pub fn transport(service: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Transport { service: service.into(), message: message.to_string() }
    }

    /// Stable inline message for the user-facing surface.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Employee not found. Please check the name and try again.",
            Self::Transport { .. } => {
                "A backing service is unavailable. Please retry in a moment."
            }
            Self::Parse { .. } => "The assistant could not read the requested dates. Please rephrase.",
            Self::Reasoning { .. } => {
                "The assistant could not reach a decision for this request."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ResolutionError;

    #[test]
    fn transport_helper_builds_readable_message() {
        let error = ResolutionError::transport("directory", "connection refused");
        assert_eq!(
            error.to_string(),
            "transport failure talking to directory: connection refused"
        );
    }

    #[test]
    fn every_variant_has_a_user_safe_message() {
        let variants = [
            ResolutionError::NotFound { name: "Jonh Doe".to_string() },
            ResolutionError::transport("balance", "timeout"),
            ResolutionError::Parse { raw: "about three".to_string() },
            ResolutionError::Reasoning { iterations: 8 },
        ];

        for variant in variants {
            assert!(!variant.user_message().is_empty());
            assert!(!variant.user_message().contains("reqwest"));
        }
    }
}
