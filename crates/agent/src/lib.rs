//! Agent runtime - the request-resolution pipeline.
//!
//! This crate turns a free-text leave query plus one selected employee id
//! into a final verdict. It provides:
//! - The language model gateway (`llm`) every other component calls
//! - Name/date extraction helpers (`extract`)
//! - The directory client (`directory`)
//! - Balance, policy, and calendar-conflict checkers (`checks`)
//! - The bounded tool-calling loop that orchestrates them (`runtime`)
//!
//! # Architecture
//!
//! ```text
//! query -> NameExtractor -> DirectoryClient -> candidate selection
//!       -> AgentRuntime { extract_leave_date | check_leave_balance
//!                         | check_leave_policy | check_calendar_conflicts }
//!       -> final answer
//! ```
//!
//! Date parsing, policy reading, and interval intersection are deliberately
//! delegated to the model behind the `interpret::Interpreter` seam, so a
//! deterministic implementation can replace them without touching callers.

pub mod checks;
pub mod directory;
pub mod extract;
pub mod interpret;
pub mod llm;
pub mod runtime;
pub mod stack;
pub mod tools;

pub use directory::{Directory, DirectoryClient, DirectoryLookup};
pub use llm::{ChatCompletionClient, LlmClient, LlmError};
pub use runtime::{AgentRuntime, Resolution};
pub use stack::ResolutionStack;
