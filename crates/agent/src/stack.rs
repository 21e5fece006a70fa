//! Production wiring for the resolution pipeline.

use std::sync::Arc;

use thiserror::Error;

use leavewise_core::config::AppConfig;
use leavewise_core::{EmployeeMatch, EventSource, PolicyStore, ResolutionError, StaticEventTable};

use crate::checks::{BalanceChecker, ConflictChecker, HttpLeaveLedger, LeaveLedger, PolicyChecker};
use crate::directory::{resolve_employee_match, DirectoryClient};
use crate::extract::{DateExtractor, NameExtractor};
use crate::interpret::{Interpreter, ModelInterpreter};
use crate::llm::{ChatCompletionClient, LlmClient, LlmError};
use crate::runtime::AgentRuntime;
use crate::tools::{BalanceTool, ConflictTool, DateExtractionTool, PolicyTool, ToolRegistry};

#[derive(Debug, Error)]
pub enum StackError {
    #[error("language model gateway setup failed: {0}")]
    Gateway(#[from] LlmError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Everything the interaction layer needs, assembled from config: the agent
/// runtime with its four tools, the directory client, and the name extractor.
pub struct ResolutionStack {
    pub runtime: AgentRuntime,
    pub directory: DirectoryClient,
    pub names: NameExtractor,
}

impl ResolutionStack {
    pub fn from_config(config: &AppConfig) -> Result<Self, StackError> {
        let llm: Arc<dyn LlmClient> = Arc::new(ChatCompletionClient::from_config(&config.llm)?);
        let interpreter: Arc<dyn Interpreter> = Arc::new(ModelInterpreter::new(llm.clone()));

        let store = Arc::new(PolicyStore::new(&config.policy.document_dir));
        let events: Arc<dyn EventSource> = Arc::new(StaticEventTable::demo());
        let ledger: Arc<dyn LeaveLedger> =
            Arc::new(HttpLeaveLedger::from_config(&config.services)?);

        let mut tools = ToolRegistry::default();
        tools.register(DateExtractionTool::new(DateExtractor::new(llm.clone())));
        tools.register(BalanceTool::new(BalanceChecker::new(ledger, interpreter.clone())));
        tools.register(PolicyTool::new(PolicyChecker::new(store, interpreter.clone())));
        tools.register(ConflictTool::new(ConflictChecker::new(events, interpreter)));

        Ok(Self {
            runtime: AgentRuntime::new(llm.clone(), tools),
            directory: DirectoryClient::from_config(&config.services)?,
            names: NameExtractor::new(llm),
        })
    }

    /// Name-resolution step: correct the name, look it up, and halt with
    /// `NotFound` before any leave checks when the directory has no match.
    pub async fn search_employees(&self, raw_query: &str) -> Result<EmployeeMatch, ResolutionError> {
        resolve_employee_match(&self.names, &self.directory, raw_query).await
    }
}
