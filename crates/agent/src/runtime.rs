use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use leavewise_core::{ResolutionError, ResolutionRequest};

use crate::llm::LlmClient;
use crate::tools::ToolRegistry;

/// Hard ceiling on reasoning steps per request. The loop never runs past it;
/// exhaustion produces the give-up answer below.
const MAX_ITERATIONS: usize = 8;

const GIVE_UP_ANSWER: &str = "I could not reach a decision on this leave request after consulting the available checks. Please rephrase the request or try again.";

/// Terminal output of one resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub answer: String,
    pub iterations: usize,
    pub gave_up: bool,
}

impl Resolution {
    /// Convert the degraded give-up answer into an explicit error for callers
    /// that need a hard failure instead of best-effort text.
    pub fn require_decided(self) -> Result<Self, ResolutionError> {
        if self.gave_up {
            Err(ResolutionError::Reasoning { iterations: self.iterations })
        } else {
            Ok(self)
        }
    }
}

/// Zero-shot tool-calling loop. Each step sends the accumulated transcript to
/// the gateway; a JSON tool call is dispatched and its observation appended,
/// plain text terminates the loop as the final answer.
pub struct AgentRuntime {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl AgentRuntime {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        Self { llm, tools }
    }

    pub async fn resolve(
        &self,
        request: &ResolutionRequest,
    ) -> Result<Resolution, ResolutionError> {
        let instruction = request.instruction();
        info!(
            event_name = "agent.resolve.start",
            employee_id = %request.employee_id,
            "starting request resolution"
        );

        let mut transcript =
            format!("{}\n\nRequest: {}\n", self.tools.system_prompt(), instruction);

        for iteration in 1..=MAX_ITERATIONS {
            let reply = self
                .llm
                .complete(&transcript)
                .await
                .map_err(|error| ResolutionError::transport("language model", error))?;

            match parse_tool_call(&reply) {
                Some(call) => {
                    debug!(
                        event_name = "agent.resolve.tool_call",
                        employee_id = %request.employee_id,
                        iteration,
                        tool = %call.name,
                        "model selected a tool"
                    );
                    let observation = self.tools.dispatch(&call.name, &call.arguments).await;
                    transcript.push_str(&format!(
                        "\nAction: {}\nObservation: {}\n",
                        reply.trim(),
                        observation
                    ));
                }
                None => {
                    info!(
                        event_name = "agent.resolve.final_answer",
                        employee_id = %request.employee_id,
                        iterations = iteration,
                        "resolution produced a final answer"
                    );
                    return Ok(Resolution {
                        answer: reply.trim().to_string(),
                        iterations: iteration,
                        gave_up: false,
                    });
                }
            }
        }

        warn!(
            event_name = "agent.resolve.gave_up",
            employee_id = %request.employee_id,
            iterations = MAX_ITERATIONS,
            "resolution hit the iteration ceiling"
        );
        Ok(Resolution {
            answer: GIVE_UP_ANSWER.to_string(),
            iterations: MAX_ITERATIONS,
            gave_up: true,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ToolCall {
    pub name: String,
    pub arguments: String,
}

/// Parse a tool call out of model output. Handles the formats models
/// actually emit:
/// 1. Raw JSON: `{"function": "...", "arguments": {...}}`
/// 2. Fenced JSON, with or without trailing prose
/// 3. JSON embedded in prose, found by scanning for `{"function"`
pub(crate) fn parse_tool_call(content: &str) -> Option<ToolCall> {
    let trimmed = content.trim();

    if let Some(call) = try_parse_function_json(trimmed) {
        return Some(call);
    }

    if let Some(inner) = extract_fenced_block(trimmed) {
        if let Some(call) = try_parse_function_json(inner.trim()) {
            return Some(call);
        }
    }

    if let Some(position) = trimmed.find("{\"function\"") {
        let candidate = &trimmed[position..];
        if let Some(json_str) = extract_balanced_json(candidate) {
            if let Some(call) = try_parse_function_json(json_str) {
                return Some(call);
            }
        }
    }

    None
}

fn try_parse_function_json(raw: &str) -> Option<ToolCall> {
    let json: Value = serde_json::from_str(raw).ok()?;
    let function = json.get("function")?.as_str()?;
    let arguments = json.get("arguments")?;
    Some(ToolCall { name: function.to_string(), arguments: arguments.to_string() })
}

/// Body of the first markdown code fence, tolerating trailing prose after
/// the closing fence.
fn extract_fenced_block(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    let body_start_rel = after_opening.find('\n')? + 1;
    let body_start = fence_start + 3 + body_start_rel;

    let closing = content[body_start..].find("```")?;
    let body_end = body_start + closing;

    if body_start >= body_end {
        return None;
    }

    Some(&content[body_start..body_end])
}

/// Balanced JSON object starting at position 0, respecting string literals.
fn extract_balanced_json(raw: &str) -> Option<&str> {
    if !raw.starts_with('{') {
        return None;
    }
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (index, ch) in raw.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[..=index]);
                }
            }
            _ => {}
        }
    }
    None
}
