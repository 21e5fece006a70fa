//! End-to-end coverage of the request-resolution pipeline with a scripted
//! language model: name lookup, then the tool-calling loop over the real
//! checkers.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use leavewise_agent::checks::{
    BalanceChecker, ConflictChecker, LeaveLedger, PolicyChecker,
};
use leavewise_agent::directory::{resolve_employee_match, Directory, DirectoryLookup};
use leavewise_agent::extract::{DateExtractor, NameExtractor};
use leavewise_agent::interpret::ModelInterpreter;
use leavewise_agent::llm::{LlmClient, LlmError};
use leavewise_agent::runtime::AgentRuntime;
use leavewise_agent::tools::{
    BalanceTool, ConflictTool, DateExtractionTool, PolicyTool, ToolRegistry,
};
use leavewise_core::{
    EmployeeId, EmployeeMatch, EventSource, LeaveBalance, PolicyStore, ResolutionError,
    ResolutionRequest, StaticEventTable,
};

struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log").clone()
    }

    fn consumed(&self) -> bool {
        self.replies.lock().expect("script").is_empty()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().expect("prompt log").push(prompt.to_string());
        self.replies
            .lock()
            .expect("script")
            .pop_front()
            .ok_or_else(|| LlmError::InvalidRequest("script exhausted".to_string()))
    }
}

struct RecordingLedger {
    remaining: Option<u32>,
    calls: Mutex<Vec<EmployeeId>>,
}

impl RecordingLedger {
    fn new(remaining: Option<u32>) -> Arc<Self> {
        Arc::new(Self { remaining, calls: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> Vec<EmployeeId> {
        self.calls.lock().expect("call log").clone()
    }
}

#[async_trait]
impl LeaveLedger for RecordingLedger {
    async fn balance_for(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<LeaveBalance>, ResolutionError> {
        self.calls.lock().expect("call log").push(employee_id);
        Ok(self.remaining.map(|remaining_days| LeaveBalance { employee_id, remaining_days }))
    }
}

struct SingleMatchDirectory;

#[async_trait]
impl Directory for SingleMatchDirectory {
    async fn find_employees(&self, name: &str) -> Result<DirectoryLookup, ResolutionError> {
        Ok(DirectoryLookup::Match(EmployeeMatch {
            name: name.to_string(),
            candidate_ids: vec![EmployeeId(1)],
        }))
    }
}

fn write_policy(dir: &Path) {
    fs::write(
        dir.join("leave-policy.txt"),
        "Casual leave is allowed on working days outside the March release freeze.",
    )
    .expect("write policy document");
}

fn build_runtime(llm: Arc<ScriptedLlm>, ledger: Arc<RecordingLedger>, policy_dir: &Path) -> AgentRuntime {
    let llm: Arc<dyn LlmClient> = llm;
    let interpreter = Arc::new(ModelInterpreter::new(llm.clone()));

    let mut tools = ToolRegistry::default();
    tools.register(DateExtractionTool::new(DateExtractor::new(llm.clone())));
    tools.register(BalanceTool::new(BalanceChecker::new(ledger, interpreter.clone())));
    tools.register(PolicyTool::new(PolicyChecker::new(
        Arc::new(PolicyStore::new(policy_dir)),
        interpreter.clone(),
    )));
    let events: Arc<dyn EventSource> = Arc::new(StaticEventTable::demo());
    tools.register(ConflictTool::new(ConflictChecker::new(events, interpreter)));

    AgentRuntime::new(llm, tools)
}

#[tokio::test]
async fn single_day_request_with_sufficient_balance_resolves_positively() {
    let policy_dir = TempDir::new().expect("temp dir");
    write_policy(policy_dir.path());

    let query = "Can John Doe take a leave on Feb 10th?";
    let llm = ScriptedLlm::new(&[
        // name extraction ahead of the directory lookup
        "John Doe",
        // loop: normalize the dates first
        r#"{"function": "extract_leave_date", "arguments": {"query": "Can John Doe take a leave on Feb 10th?"}}"#,
        "10 Feb",
        // loop: balance check (estimate consumed by the interpreter)
        r#"{"function": "check_leave_balance", "arguments": {"employee_id": 1, "requested_dates": "10 Feb"}}"#,
        "1",
        // loop: policy check
        r#"{"function": "check_leave_policy", "arguments": {"requested_dates": "10 Feb"}}"#,
        "✅ Positive, 10 Feb is outside the release freeze.",
        // loop: calendar check
        r#"{"function": "check_calendar_conflicts", "arguments": {"employee_id": 1, "requested_dates": "10 Feb"}}"#,
        "✅ Positive, nothing blocks the whole day.",
        // final synthesis
        "✅ Yes. John Doe can take leave on 10 Feb: balance is sufficient, policy allows it, and the calendar is clear.",
    ]);

    let ledger = RecordingLedger::new(Some(3));
    let found = resolve_employee_match(
        &NameExtractor::new(llm.clone()),
        &SingleMatchDirectory,
        query,
    )
    .await
    .expect("directory should match");
    assert_eq!(found.candidate_ids.len(), 1, "exactly one candidate must be offered");

    let runtime = build_runtime(llm.clone(), ledger.clone(), policy_dir.path());
    let resolution = runtime
        .resolve(&ResolutionRequest::new(found.candidate_ids[0], query))
        .await
        .expect("resolution should succeed");

    assert!(resolution.answer.starts_with("✅ Yes."));
    assert_eq!(resolution.iterations, 5);
    assert!(!resolution.gave_up);
    assert_eq!(ledger.calls(), vec![EmployeeId(1)]);
    assert!(llm.consumed(), "every scripted reply should have been used");

    let prompts = llm.prompts();
    assert!(
        prompts.iter().any(|prompt| prompt.contains("Observation: ✅ Leave available. Remaining CL: 3")),
        "the positive balance verdict must flow back into the loop transcript"
    );
}

#[tokio::test]
async fn eleven_day_range_against_five_remaining_days_resolves_negatively() {
    let policy_dir = TempDir::new().expect("temp dir");
    write_policy(policy_dir.path());

    let llm = ScriptedLlm::new(&[
        r#"{"function": "extract_leave_date", "arguments": {"query": "leave from 10 Feb to 20 Feb"}}"#,
        "10 Feb to 20 Feb",
        r#"{"function": "check_leave_balance", "arguments": {"employee_id": 1, "requested_dates": "10 Feb to 20 Feb"}}"#,
        "11",
        "❌ No. The request covers 11 days but only 5 days of casual leave remain.",
    ]);

    let ledger = RecordingLedger::new(Some(5));
    let runtime = build_runtime(llm.clone(), ledger.clone(), policy_dir.path());

    let resolution = runtime
        .resolve(&ResolutionRequest::new(EmployeeId(1), "leave from 10 Feb to 20 Feb"))
        .await
        .expect("resolution should succeed");

    assert!(resolution.answer.starts_with("❌ No."));
    let prompts = llm.prompts();
    assert!(
        prompts.iter().any(|prompt| prompt.contains("Observation: ❌ No casual leave balance left.")),
        "the negative balance verdict must flow back into the loop transcript"
    );
}

#[tokio::test]
async fn employee_without_events_gets_a_no_conflict_verdict() {
    let policy_dir = TempDir::new().expect("temp dir");
    write_policy(policy_dir.path());

    let llm = ScriptedLlm::new(&[
        r#"{"function": "check_calendar_conflicts", "arguments": {"employee_id": 3, "requested_dates": "5 Mar"}}"#,
        "✅ Positive, there are no scheduled events on 5 Mar.",
        "✅ Employee 3 has no calendar conflicts on 5 Mar.",
    ]);

    let ledger = RecordingLedger::new(Some(3));
    let runtime = build_runtime(llm.clone(), ledger.clone(), policy_dir.path());

    let resolution = runtime
        .resolve(&ResolutionRequest::new(EmployeeId(3), "Can employee 3 take leave on 5 Mar?"))
        .await
        .expect("resolution should succeed");

    assert!(resolution.answer.starts_with("✅"));

    let prompts = llm.prompts();
    assert!(
        prompts.iter().any(|prompt| prompt.contains("Given these scheduled events: []")),
        "an absent calendar must be presented to the model as an empty list"
    );
    assert!(ledger.calls().is_empty(), "the conflict check must not touch the ledger");
}

#[tokio::test]
async fn not_found_employee_halts_before_any_checks() {
    struct EmptyDirectory;

    #[async_trait]
    impl Directory for EmptyDirectory {
        async fn find_employees(&self, _name: &str) -> Result<DirectoryLookup, ResolutionError> {
            Ok(DirectoryLookup::NotFound)
        }
    }

    // Only the name-correction reply is scripted: nothing downstream may run.
    let llm = ScriptedLlm::new(&["John Doe"]);

    let error = resolve_employee_match(
        &NameExtractor::new(llm.clone()),
        &EmptyDirectory,
        "Can Jonh Doe take a leave on Feb 10th?",
    )
    .await
    .expect_err("typo-corrected name still has no directory match");

    assert_eq!(error, ResolutionError::NotFound { name: "John Doe".to_string() });
    assert!(llm.consumed(), "only the name-extraction call may reach the model");
}

#[tokio::test]
async fn ambiguous_directory_match_presents_every_candidate() {
    struct AmbiguousDirectory;

    #[async_trait]
    impl Directory for AmbiguousDirectory {
        async fn find_employees(&self, name: &str) -> Result<DirectoryLookup, ResolutionError> {
            Ok(DirectoryLookup::Match(EmployeeMatch {
                name: name.to_string(),
                candidate_ids: vec![EmployeeId(1), EmployeeId(4), EmployeeId(5)],
            }))
        }
    }

    let llm = ScriptedLlm::new(&["John Doe"]);
    let found = resolve_employee_match(
        &NameExtractor::new(llm),
        &AmbiguousDirectory,
        "Can John Doe take leave tomorrow?",
    )
    .await
    .expect("directory should match");

    assert!(found.is_ambiguous());
    assert_eq!(found.candidate_ids, vec![EmployeeId(1), EmployeeId(4), EmployeeId(5)]);
}
