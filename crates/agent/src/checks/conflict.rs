use std::sync::Arc;

use tracing::info;

use leavewise_core::{DateExpression, EmployeeId, EventSource, ResolutionError, Verdict};

use crate::interpret::{InterpretContext, Interpreter};

/// Judges requested dates against the employee's calendar. The event list
/// comes from an injected source; whether any event falls inside the request
/// is delegated entirely to the model.
pub struct ConflictChecker {
    events: Arc<dyn EventSource>,
    interpreter: Arc<dyn Interpreter>,
}

impl ConflictChecker {
    pub fn new(events: Arc<dyn EventSource>, interpreter: Arc<dyn Interpreter>) -> Self {
        Self { events, interpreter }
    }

    pub async fn check(
        &self,
        employee_id: EmployeeId,
        expression: &DateExpression,
    ) -> Result<Verdict, ResolutionError> {
        let events = self.events.events_for(employee_id).await?;
        info!(
            event_name = "check.conflict.start",
            employee_id = %employee_id,
            event_count = events.len(),
            dates = %expression,
            "checking requested dates against the calendar"
        );

        self.interpreter.interpret(expression, InterpretContext::Schedule { events: &events }).await
    }
}
