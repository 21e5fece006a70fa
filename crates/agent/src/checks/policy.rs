use std::sync::Arc;

use tracing::info;

use leavewise_core::{DateExpression, PolicyStore, ResolutionError, Verdict};

use crate::interpret::{InterpretContext, Interpreter};

/// Judges requested dates against the company policy document. All policy
/// reasoning is delegated to the model; this component only supplies the
/// cached document text.
pub struct PolicyChecker {
    store: Arc<PolicyStore>,
    interpreter: Arc<dyn Interpreter>,
}

impl PolicyChecker {
    pub fn new(store: Arc<PolicyStore>, interpreter: Arc<dyn Interpreter>) -> Self {
        Self { store, interpreter }
    }

    pub async fn check(&self, expression: &DateExpression) -> Result<Verdict, ResolutionError> {
        let document = self
            .store
            .document_text()
            .await
            .map_err(|error| ResolutionError::transport("policy store", error))?;

        info!(
            event_name = "check.policy.start",
            dates = %expression,
            "checking requested dates against company policy"
        );
        self.interpreter.interpret(expression, InterpretContext::Policy { document }).await
    }
}
