use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use leavewise_core::config::ServicesConfig;
use leavewise_core::{DateExpression, EmployeeId, LeaveBalance, ResolutionError, Verdict};

use crate::interpret::Interpreter;

/// Remaining-leave lookup seam. `Ok(None)` means the balance service does not
/// know the employee (or reported an error for them); transport failures are
/// surfaced as errors.
#[async_trait]
pub trait LeaveLedger: Send + Sync {
    async fn balance_for(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<LeaveBalance>, ResolutionError>;
}

/// HTTP ledger backed by the balance service.
pub struct HttpLeaveLedger {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLeaveLedger {
    pub fn from_config(config: &ServicesConfig) -> Result<Self, ResolutionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ResolutionError::transport("balance service", error))?;

        Ok(Self { http, base_url: config.directory_base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl LeaveLedger for HttpLeaveLedger {
    async fn balance_for(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<LeaveBalance>, ResolutionError> {
        let url = format!("{}/leave/{}", self.base_url, employee_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| ResolutionError::transport("balance service", error))?;

        let body: Value = response
            .json()
            .await
            .map_err(|error| ResolutionError::transport("balance service", error))?;

        Ok(parse_balance(&body, employee_id))
    }
}

/// `remaining_cl` on success, an `error` key (or nothing usable) otherwise.
fn parse_balance(body: &Value, employee_id: EmployeeId) -> Option<LeaveBalance> {
    if body.get("error").is_some() {
        return None;
    }
    body.get("remaining_cl")
        .and_then(Value::as_i64)
        .filter(|remaining| *remaining >= 0)
        .map(|remaining| LeaveBalance { employee_id, remaining_days: remaining as u32 })
}

/// Two-phase balance check: fetch the remaining credit, then compare it to
/// the model-estimated day count for the requested dates.
pub struct BalanceChecker {
    ledger: Arc<dyn LeaveLedger>,
    interpreter: Arc<dyn Interpreter>,
}

impl BalanceChecker {
    pub fn new(ledger: Arc<dyn LeaveLedger>, interpreter: Arc<dyn Interpreter>) -> Self {
        Self { ledger, interpreter }
    }

    pub async fn check(
        &self,
        employee_id: EmployeeId,
        expression: &DateExpression,
    ) -> Result<Verdict, ResolutionError> {
        let Some(balance) = self.ledger.balance_for(employee_id).await? else {
            return Ok(Verdict::negative("Employee not found."));
        };

        let requested = self.interpreter.estimate_days(expression).await?;
        info!(
            event_name = "check.balance.compared",
            employee_id = %employee_id,
            remaining = balance.remaining_days,
            requested,
            "compared remaining leave credit against the request"
        );

        if balance.remaining_days >= requested {
            Ok(Verdict::positive(format!(
                "Leave available. Remaining CL: {}",
                balance.remaining_days
            )))
        } else {
            Ok(Verdict::negative("No casual leave balance left."))
        }
    }
}
