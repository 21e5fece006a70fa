pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod policy;

pub use domain::{
    DateExpression, DateShape, EmployeeId, EmployeeMatch, EventRecord, LeaveBalance, Outcome,
    ResolutionRequest, Verdict,
};
pub use errors::ResolutionError;
pub use events::{EventSource, StaticEventTable};
pub use policy::{PolicyError, PolicyStore};
