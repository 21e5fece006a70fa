use leavewise_agent::stack::ResolutionStack;
use leavewise_core::config::{AppConfig, LoadOptions};
use leavewise_core::{EmployeeId, ResolutionError, ResolutionRequest};

use super::CommandResult;

pub fn run(query: &str, employee_id: Option<i64>) -> CommandResult {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                2,
            );
        }
    };

    runtime.block_on(resolve_query(query, employee_id))
}

async fn resolve_query(query: &str, employee_id: Option<i64>) -> CommandResult {
    if query.trim().is_empty() {
        return CommandResult::failure("ask", "empty_query", "enter a leave request first", 2);
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("ask", "config", error.to_string(), 2),
    };

    let stack = match ResolutionStack::from_config(&config) {
        Ok(stack) => stack,
        Err(error) => return CommandResult::failure("ask", "stack", error.to_string(), 2),
    };

    let chosen = match employee_id {
        Some(id) => EmployeeId(id),
        None => match stack.search_employees(query).await {
            Ok(found) if found.is_ambiguous() => {
                let ids = found
                    .candidate_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return CommandResult::failure(
                    "ask",
                    "ambiguous_match",
                    format!(
                        "{} matches several employee ids ({ids}); re-run with --employee-id",
                        found.name
                    ),
                    1,
                );
            }
            Ok(found) => found.candidate_ids[0],
            Err(error) => {
                return CommandResult::failure("ask", error_class(&error), error.to_string(), 1)
            }
        },
    };

    match stack.runtime.resolve(&ResolutionRequest::new(chosen, query)).await {
        Ok(resolution) if resolution.gave_up => {
            CommandResult::failure("ask", "reasoning", resolution.answer, 1)
        }
        Ok(resolution) => CommandResult::success("ask", resolution.answer),
        Err(error) => CommandResult::failure("ask", error_class(&error), error.to_string(), 1),
    }
}

fn error_class(error: &ResolutionError) -> &'static str {
    match error {
        ResolutionError::NotFound { .. } => "not_found",
        ResolutionError::Transport { .. } => "transport",
        ResolutionError::Parse { .. } => "parse",
        ResolutionError::Reasoning { .. } => "reasoning",
    }
}
