use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to an employee by the directory service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a directory lookup: the canonical name plus every candidate id
/// the directory returned, in directory order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeMatch {
    pub name: String,
    pub candidate_ids: Vec<EmployeeId>,
}

impl EmployeeMatch {
    pub fn is_ambiguous(&self) -> bool {
        self.candidate_ids.len() > 1
    }
}

/// Per-request resolution context: one explicitly chosen employee id plus the
/// original free-text query. Constructed at the interaction edge and passed
/// down the call chain; nothing process-wide holds a "current selection".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub employee_id: EmployeeId,
    pub query: String,
}

impl ResolutionRequest {
    pub fn new(employee_id: EmployeeId, query: impl Into<String>) -> Self {
        Self { employee_id, query: query.into() }
    }

    /// Instruction string handed to the reasoning loop.
    pub fn instruction(&self) -> String {
        format!("Employee ID: {}. {}", self.employee_id, self.query)
    }
}

/// Shape of a normalized date expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateShape {
    Single,
    Range,
    List,
}

/// A model-normalized date expression in one of three shapes: a single date
/// (`10 Feb`), an inclusive range (`10 Feb to 20 Feb`), or a comma-separated
/// list (`10 Feb, 5 Mar`). Downstream checkers re-interpret the raw string
/// themselves; this type only carries and classifies it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateExpression(String);

impl DateExpression {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn shape(&self) -> DateShape {
        if self.0.contains(" to ") {
            DateShape::Range
        } else if self.0.contains(',') {
            DateShape::List
        } else {
            DateShape::Single
        }
    }
}

impl fmt::Display for DateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remaining leave credit for one employee, as reported by the balance
/// service. Read-only on this side; the service owns the truth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub employee_id: EmployeeId,
    pub remaining_days: u32,
}

/// One scheduled calendar entry for an employee. Dates are ISO `YYYY-MM-DD`
/// strings exactly as the event source reports them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub subject: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
}

impl EventRecord {
    pub fn new(
        subject: impl Into<String>,
        description: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Positive,
    Negative,
}

impl Outcome {
    fn marker(self) -> &'static str {
        match self {
            Self::Positive => "✅",
            Self::Negative => "❌",
        }
    }
}

/// A checker's judgment: positive/negative plus a short rationale. Rendered
/// with the marker convention the rest of the pipeline expects (`✅ …` or
/// `❌ …`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub rationale: String,
}

impl Verdict {
    pub fn positive(rationale: impl Into<String>) -> Self {
        Self { outcome: Outcome::Positive, rationale: rationale.into() }
    }

    pub fn negative(rationale: impl Into<String>) -> Self {
        Self { outcome: Outcome::Negative, rationale: rationale.into() }
    }

    /// Classify verbatim model output by its leading marker. Replies that
    /// carry neither marker nor a leading Positive/Negative word fail closed.
    pub fn from_model_text(text: &str) -> Self {
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();

        let outcome = if trimmed.starts_with("✅") || lowered.starts_with("positive") {
            Outcome::Positive
        } else if trimmed.starts_with("❌") || lowered.starts_with("negative") {
            Outcome::Negative
        } else if trimmed.contains("✅") && !trimmed.contains("❌") {
            Outcome::Positive
        } else {
            Outcome::Negative
        };

        let rationale = trimmed
            .trim_start_matches(['✅', '❌'])
            .trim_start()
            .trim_start_matches(|c: char| matches!(c, ':' | '-' | ','))
            .trim_start()
            .to_string();

        Self { outcome, rationale }
    }

    pub fn is_positive(&self) -> bool {
        self.outcome == Outcome::Positive
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.outcome.marker(), self.rationale)
    }
}
