//! Model-delegated date reasoning.
//!
//! Day counting, policy interpretation, and calendar intersection are pushed
//! into natural-language model calls on purpose, mirroring the behavior this
//! assistant is specified to preserve. Everything funnels through the
//! `Interpreter` trait so a deterministic date parser and interval checker
//! can be substituted later without touching the checkers.

use std::sync::Arc;

use async_trait::async_trait;

use leavewise_core::{DateExpression, EventRecord, ResolutionError, Verdict};

use crate::llm::LlmClient;

/// What the dates are being judged against.
pub enum InterpretContext<'a> {
    /// The policy document text.
    Policy { document: &'a str },
    /// The employee's scheduled events.
    Schedule { events: &'a [EventRecord] },
}

#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Number of discrete days implied by the expression: a single date is 1,
    /// a range is the inclusive day count, a list is the entry count.
    async fn estimate_days(&self, expression: &DateExpression) -> Result<u32, ResolutionError>;

    /// Judge the requested dates against the given context.
    async fn interpret(
        &self,
        expression: &DateExpression,
        context: InterpretContext<'_>,
    ) -> Result<Verdict, ResolutionError>;
}

pub struct ModelInterpreter {
    llm: Arc<dyn LlmClient>,
}

impl ModelInterpreter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    async fn complete(&self, prompt: &str) -> Result<String, ResolutionError> {
        self.llm
            .complete(prompt)
            .await
            .map_err(|error| ResolutionError::transport("language model", error))
    }
}

#[async_trait]
impl Interpreter for ModelInterpreter {
    async fn estimate_days(&self, expression: &DateExpression) -> Result<u32, ResolutionError> {
        let prompt = format!(
            r#"Analyze the following leave request: "{expression}"

1. If the request mentions a single date, return the number of days as 1.
2. If the request mentions a date range, calculate the total number of days in the range, inclusive of both ends.
3. If the request mentions multiple separate dates, count the separate days requested.

Reply only with the number of days."#
        );

        let reply = self.complete(&prompt).await?;
        reply
            .trim()
            .parse::<u32>()
            .map_err(|_| ResolutionError::Parse { raw: reply.trim().to_string() })
    }

    async fn interpret(
        &self,
        expression: &DateExpression,
        context: InterpretContext<'_>,
    ) -> Result<Verdict, ResolutionError> {
        let prompt = match context {
            InterpretContext::Policy { document } => format!(
                r#"Given these policies: {document}
Analyze the request: "{expression}"
1. If a single date is mentioned, check if leave is allowed for that date.
2. If a range of dates is mentioned, check if leave is allowed for the full range.
3. If multiple separate dates are mentioned, check if leave is allowed for each date.
Reply with:
✅ Positive OR ❌ Negative, followed by a short reason."#
            ),
            InterpretContext::Schedule { events } => {
                let event_list = serde_json::to_string(events)
                    .map_err(|error| ResolutionError::transport("event source", error))?;
                format!(
                    r#"Given these scheduled events: {event_list}
Analyze the following request: "{expression}"
1. If a single date is mentioned, check if there is any event on that date.
2. If a date range is mentioned, check if there are any events during the full range.
3. If multiple separate dates are mentioned, check if there are any events on each of those dates.
Reply with:
✅ Positive OR ❌ Negative, followed by a short reason."#
                )
            }
        };

        let reply = self.complete(&prompt).await?;
        Ok(Verdict::from_model_text(&reply))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use leavewise_core::{DateExpression, EventRecord, Outcome, ResolutionError};

    use super::{Interpreter, InterpretContext, ModelInterpreter};
    use crate::llm::{LlmClient, LlmError};

    struct CannedLlm {
        reply: &'static str,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedLlm {
        fn new(reply: &'static str) -> Self {
            Self { reply, prompts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().expect("prompt log").push(prompt.to_string());
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn single_date_estimates_one_day() {
        let interpreter = ModelInterpreter::new(Arc::new(CannedLlm::new("1")));
        let days = interpreter
            .estimate_days(&DateExpression::new("10 Feb"))
            .await
            .expect("estimate should succeed");
        assert_eq!(days, 1);
    }

    #[tokio::test]
    async fn range_estimate_passes_the_model_count_through() {
        let interpreter = ModelInterpreter::new(Arc::new(CannedLlm::new("11")));
        let days = interpreter
            .estimate_days(&DateExpression::new("10 Feb to 20 Feb"))
            .await
            .expect("estimate should succeed");
        assert_eq!(days, 11);
    }

    #[tokio::test]
    async fn non_numeric_estimate_is_a_parse_error() {
        let interpreter = ModelInterpreter::new(Arc::new(CannedLlm::new("about three days")));
        let error = interpreter
            .estimate_days(&DateExpression::new("10 Feb, 5 Mar"))
            .await
            .expect_err("non-numeric reply must fail");
        assert_eq!(error, ResolutionError::Parse { raw: "about three days".to_string() });
    }

    #[tokio::test]
    async fn policy_context_embeds_the_document_in_the_prompt() {
        let llm = Arc::new(CannedLlm::new("✅ Positive, no restriction applies."));
        let interpreter = ModelInterpreter::new(llm.clone());

        let verdict = interpreter
            .interpret(
                &DateExpression::new("10 Feb"),
                InterpretContext::Policy { document: "No leave during the March freeze." },
            )
            .await
            .expect("interpretation should succeed");

        assert_eq!(verdict.outcome, Outcome::Positive);
        let prompts = llm.prompts.lock().expect("prompt log");
        assert!(prompts[0].contains("No leave during the March freeze."));
        assert!(prompts[0].contains("10 Feb"));
    }

    #[tokio::test]
    async fn schedule_context_serializes_the_event_list() {
        let llm = Arc::new(CannedLlm::new("❌ Negative, Meeting with CEO falls on 10 Feb."));
        let interpreter = ModelInterpreter::new(llm.clone());

        let events =
            vec![EventRecord::new("Meeting with CEO", "Plan for Q3", "2025-02-10", "2025-02-10")];
        let verdict = interpreter
            .interpret(&DateExpression::new("10 Feb"), InterpretContext::Schedule { events: &events })
            .await
            .expect("interpretation should succeed");

        assert_eq!(verdict.outcome, Outcome::Negative);
        let prompts = llm.prompts.lock().expect("prompt log");
        assert!(prompts[0].contains("Meeting with CEO"));
    }
}
