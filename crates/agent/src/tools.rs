//! Tool registry for the reasoning loop.
//!
//! Each checker is wrapped as a named tool. Failures never abort the loop:
//! `dispatch` folds every error into an `ERROR: ...` observation so the model
//! can see it and adjust its next step.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use leavewise_core::{DateExpression, EmployeeId, ResolutionError};

use crate::checks::{BalanceChecker, ConflictChecker, PolicyChecker};
use crate::extract::DateExtractor;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    /// One-line description advertised in the system prompt.
    fn usage(&self) -> &'static str;
    /// JSON argument shape advertised in the system prompt.
    fn arguments(&self) -> &'static str;
    async fn execute(&self, args: &Value) -> Result<String, ResolutionError>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.push(Box::new(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// System prompt advertising the registered tools, in registration order.
    pub fn system_prompt(&self) -> String {
        let mut parts = vec![
            "You are Leavewise, an assistant that decides whether an employee can take leave by using tools.".to_string(),
            String::new(),
            "IMPORTANT RULES:".to_string(),
            "1. To call a tool, your ENTIRE response must be ONLY the JSON object. No explanation, no markdown fences, no text before or after.".to_string(),
            "2. When you have enough information for a final answer, respond with plain text only. Summarize the balance, policy, and calendar findings with a clear yes or no.".to_string(),
            "3. Never guess or invent tool output. Always call the tool and wait for the real result.".to_string(),
            "4. Extract the leave dates first; the other tools expect the normalized date expression.".to_string(),
            String::new(),
            "Tool call format (your entire response must be exactly this):".to_string(),
            r#"{"function": "tool_name", "arguments": {"arg1": "value1"}}"#.to_string(),
            String::new(),
            "Available tools:".to_string(),
        ];

        for tool in &self.tools {
            parts.push(String::new());
            parts.push(format!("## {}", tool.name()));
            parts.push(tool.usage().to_string());
            parts.push(format!("Arguments: {}", tool.arguments()));
        }

        parts.join("\n")
    }

    /// Dispatch a tool call by name. The return value is always an
    /// observation string; errors come back as `ERROR: ...` text.
    pub async fn dispatch(&self, name: &str, arguments_json: &str) -> String {
        debug!(
            event_name = "tool.dispatch",
            tool = name,
            arguments = arguments_json,
            "dispatching tool call"
        );

        let raw = arguments_json.trim();
        let args: Value = if raw.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(raw) {
                Ok(value) => value,
                Err(error) => return format!("ERROR: could not parse tool arguments: {error}"),
            }
        };

        let Some(tool) = self.tools.iter().find(|tool| tool.name() == name) else {
            warn!(event_name = "tool.unknown", tool = name, "model requested an unknown tool");
            return format!(
                "ERROR: unknown tool `{name}`. Available tools: {}",
                self.tool_names().join(", ")
            );
        };

        match tool.execute(&args).await {
            Ok(observation) => observation,
            Err(error) => format!("ERROR: {error}"),
        }
    }
}

fn string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::trim).filter(|value| !value.is_empty()).map(String::from)
}

fn employee_id_arg(args: &Value) -> Option<EmployeeId> {
    let value = args.get("employee_id")?;
    if let Some(id) = value.as_i64() {
        return Some(EmployeeId(id));
    }
    value.as_str().and_then(|raw| raw.trim().parse::<i64>().ok()).map(EmployeeId)
}

pub struct DateExtractionTool {
    extractor: DateExtractor,
}

impl DateExtractionTool {
    pub fn new(extractor: DateExtractor) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Tool for DateExtractionTool {
    fn name(&self) -> &'static str {
        "extract_leave_date"
    }

    fn usage(&self) -> &'static str {
        "Extract the leave dates from the request and normalize them to 'DD MMM', 'DD MMM to DD MMM', or 'DD MMM, DD MMM'."
    }

    fn arguments(&self) -> &'static str {
        r#"{"query": "the leave request text"}"#
    }

    async fn execute(&self, args: &Value) -> Result<String, ResolutionError> {
        let Some(query) = string_arg(args, "query") else {
            return Ok("ERROR: the `query` argument is required".to_string());
        };
        let expression = self.extractor.extract(&query).await?;
        debug!(
            event_name = "tool.extract_leave_date.normalized",
            shape = ?expression.shape(),
            "normalized the requested dates"
        );
        Ok(expression.to_string())
    }
}

pub struct BalanceTool {
    checker: BalanceChecker,
}

impl BalanceTool {
    pub fn new(checker: BalanceChecker) -> Self {
        Self { checker }
    }
}

#[async_trait]
impl Tool for BalanceTool {
    fn name(&self) -> &'static str {
        "check_leave_balance"
    }

    fn usage(&self) -> &'static str {
        "Check whether the employee has enough remaining leave credit for the requested dates."
    }

    fn arguments(&self) -> &'static str {
        r#"{"employee_id": 1, "requested_dates": "10 Feb"}"#
    }

    async fn execute(&self, args: &Value) -> Result<String, ResolutionError> {
        let Some(employee_id) = employee_id_arg(args) else {
            return Ok("ERROR: a numeric `employee_id` argument is required".to_string());
        };
        let Some(dates) = string_arg(args, "requested_dates") else {
            return Ok("ERROR: the `requested_dates` argument is required".to_string());
        };

        let verdict = self.checker.check(employee_id, &DateExpression::new(dates)).await?;
        Ok(verdict.to_string())
    }
}

pub struct PolicyTool {
    checker: PolicyChecker,
}

impl PolicyTool {
    pub fn new(checker: PolicyChecker) -> Self {
        Self { checker }
    }
}

#[async_trait]
impl Tool for PolicyTool {
    fn name(&self) -> &'static str {
        "check_leave_policy"
    }

    fn usage(&self) -> &'static str {
        "Check whether company policy restricts leave on the requested dates."
    }

    fn arguments(&self) -> &'static str {
        r#"{"requested_dates": "10 Feb to 20 Feb"}"#
    }

    async fn execute(&self, args: &Value) -> Result<String, ResolutionError> {
        let Some(dates) = string_arg(args, "requested_dates") else {
            return Ok("ERROR: the `requested_dates` argument is required".to_string());
        };

        let verdict = self.checker.check(&DateExpression::new(dates)).await?;
        Ok(verdict.to_string())
    }
}

pub struct ConflictTool {
    checker: ConflictChecker,
}

impl ConflictTool {
    pub fn new(checker: ConflictChecker) -> Self {
        Self { checker }
    }
}

#[async_trait]
impl Tool for ConflictTool {
    fn name(&self) -> &'static str {
        "check_calendar_conflicts"
    }

    fn usage(&self) -> &'static str {
        "Check whether the employee has meetings or events on the requested dates."
    }

    fn arguments(&self) -> &'static str {
        r#"{"employee_id": 1, "requested_dates": "10 Feb"}"#
    }

    async fn execute(&self, args: &Value) -> Result<String, ResolutionError> {
        let Some(employee_id) = employee_id_arg(args) else {
            return Ok("ERROR: a numeric `employee_id` argument is required".to_string());
        };
        let Some(dates) = string_arg(args, "requested_dates") else {
            return Ok("ERROR: the `requested_dates` argument is required".to_string());
        };

        let verdict = self.checker.check(employee_id, &DateExpression::new(dates)).await?;
        Ok(verdict.to_string())
    }
}
