//! Errors surfaced by the update pipeline.

/// Failure reported by a render behavior.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + 'static>),
}

impl RenderError {
    /// Build a render error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        RenderError::Message(message.into())
    }
}

/// Errors from flushing an element's pending updates.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Refinement kept producing changes past the configured cap.
    #[error(
        "refinement on `{element}` did not settle after {rounds} rounds (still changing: {})",
        .fields.join(", ")
    )]
    RefinementDiverged {
        element: String,
        rounds: usize,
        fields: Vec<String>,
    },
    /// A render behavior failed. The new snapshot was already committed.
    #[error("render by `{behavior}` on `{element}` failed: {source}")]
    Render {
        element: String,
        behavior: String,
        #[source]
        source: RenderError,
    },
}

impl UpdateError {
    /// Name of the element the error belongs to.
    pub fn element(&self) -> &str {
        match self {
            UpdateError::RefinementDiverged { element, .. } | UpdateError::Render { element, .. } => {
                element
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diverged_message_lists_fields() {
        let err = UpdateError::RefinementDiverged {
            element: "spinner".into(),
            rounds: 32,
            fields: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "refinement on `spinner` did not settle after 32 rounds (still changing: a, b)"
        );
        assert_eq!(err.element(), "spinner");
    }

    #[test]
    fn render_message_includes_source() {
        let err = UpdateError::Render {
            element: "list".into(),
            behavior: "Painter".into(),
            source: RenderError::msg("no canvas"),
        };
        assert_eq!(err.to_string(), "render by `Painter` on `list` failed: no canvas");
        assert!(std::error::Error::source(&err).is_some());
    }
}
