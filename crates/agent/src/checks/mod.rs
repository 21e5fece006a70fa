pub mod balance;
pub mod conflict;
pub mod policy;

pub use balance::{BalanceChecker, HttpLeaveLedger, LeaveLedger};
pub use conflict::ConflictChecker;
pub use policy::PolicyChecker;
