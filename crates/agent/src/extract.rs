//! Prompt-only extraction helpers: pure text transforms with no side effects
//! beyond the model call.

use std::sync::Arc;

use leavewise_core::{DateExpression, ResolutionError};

use crate::llm::LlmClient;

/// Pulls the employee name out of a free-text query and corrects typos.
pub struct NameExtractor {
    llm: Arc<dyn LlmClient>,
}

impl NameExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, query: &str) -> Result<String, ResolutionError> {
        let prompt = format!(
            r#"Extract the name from the following request and correct any typos:
"{query}"
Reply with only the name."#
        );

        let reply = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|error| ResolutionError::transport("language model", error))?;
        Ok(reply.trim().to_string())
    }
}

/// Normalizes the leave dates mentioned in a query into one of three shapes:
/// `DD MMM`, `DD MMM to DD MMM`, or `DD MMM, DD MMM, ...`.
pub struct DateExtractor {
    llm: Arc<dyn LlmClient>,
}

impl DateExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, query: &str) -> Result<DateExpression, ResolutionError> {
        let prompt = format!(
            r#"Analyze the request: "{query}"

1. Determine whether the request mentions:
   - A single leave date (e.g. '10 Feb')
   - A date range (e.g. '10 Feb to 20 Feb')
   - Multiple separate leave dates (e.g. '10 Feb, 5 Mar, 7 Apr')

2. Based on the above, extract the dates and format them:
   - A single date as 'DD MMM'.
   - A date range as 'DD MMM to DD MMM'.
   - Multiple separate dates as a comma-separated list in 'DD MMM, DD MMM' format.

Reply only with the extracted dates in the correct format."#
        );

        let reply = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|error| ResolutionError::transport("language model", error))?;
        Ok(DateExpression::new(reply))
    }
}
