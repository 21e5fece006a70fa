use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use leavewise_core::config::ServicesConfig;
use leavewise_core::{EmployeeId, EmployeeMatch, ResolutionError};

use crate::extract::NameExtractor;

/// Outcome of a directory lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryLookup {
    Match(EmployeeMatch),
    NotFound,
}

/// Name-to-identifier resolution seam.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_employees(&self, name: &str) -> Result<DirectoryLookup, ResolutionError>;
}

/// HTTP client for the remote employee directory.
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn from_config(config: &ServicesConfig) -> Result<Self, ResolutionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ResolutionError::transport("directory", error))?;

        Ok(Self { http, base_url: config.directory_base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl Directory for DirectoryClient {
    async fn find_employees(&self, name: &str) -> Result<DirectoryLookup, ResolutionError> {
        let url = format!("{}/leave-request", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("employee_name", name)])
            .send()
            .await
            .map_err(|error| ResolutionError::transport("directory", error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::transport(
                "directory",
                format!("directory returned HTTP {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|error| ResolutionError::transport("directory", error))?;
        if body.trim().is_empty() {
            return Ok(DirectoryLookup::NotFound);
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|error| ResolutionError::transport("directory", error))?;

        Ok(match parse_lookup(&value) {
            Some(found) => DirectoryLookup::Match(found),
            None => DirectoryLookup::NotFound,
        })
    }
}

/// Parse a directory response body. The wire format carries `employee_ids` as
/// a list of identifiers nested one level (`[[1, 2]]`); a flat list is
/// tolerated as well. Anything without a name or at least one id is no match.
pub fn parse_lookup(body: &Value) -> Option<EmployeeMatch> {
    let name = body.get("employee_name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let raw_ids = body.get("employee_ids")?.as_array()?;
    let mut candidate_ids = Vec::new();
    for entry in raw_ids {
        match entry {
            Value::Array(nested) => {
                candidate_ids.extend(nested.iter().filter_map(Value::as_i64).map(EmployeeId));
            }
            other => {
                if let Some(id) = other.as_i64() {
                    candidate_ids.push(EmployeeId(id));
                }
            }
        }
    }

    if candidate_ids.is_empty() {
        return None;
    }

    Some(EmployeeMatch { name: name.to_string(), candidate_ids })
}

/// Run the name-resolution step of the pipeline: correct the name with the
/// model, then look it up. `NotFound` halts the flow here, before any leave
/// checks run.
pub async fn resolve_employee_match(
    names: &NameExtractor,
    directory: &dyn Directory,
    raw_query: &str,
) -> Result<EmployeeMatch, ResolutionError> {
    let name = names.extract(raw_query).await?;
    info!(
        event_name = "directory.lookup.start",
        employee_name = %name,
        "resolving employee name against the directory"
    );

    match directory.find_employees(&name).await? {
        DirectoryLookup::Match(found) => Ok(found),
        DirectoryLookup::NotFound => Err(ResolutionError::NotFound { name }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use leavewise_core::{EmployeeId, ResolutionError};

    use super::{parse_lookup, resolve_employee_match, Directory, DirectoryLookup};
    use crate::extract::NameExtractor;
    use crate::llm::{LlmClient, LlmError};

    #[test]
    fn nested_id_list_is_flattened_one_level() {
        let body = json!({ "employee_name": "John Doe", "employee_ids": [[1, 2, 3]] });
        let found = parse_lookup(&body).expect("match");
        assert_eq!(found.name, "John Doe");
        assert_eq!(found.candidate_ids, vec![EmployeeId(1), EmployeeId(2), EmployeeId(3)]);
    }

    #[test]
    fn flat_id_list_is_tolerated() {
        let body = json!({ "employee_name": "Jane Roe", "employee_ids": [7] });
        let found = parse_lookup(&body).expect("match");
        assert_eq!(found.candidate_ids, vec![EmployeeId(7)]);
    }

    #[test]
    fn empty_or_malformed_bodies_are_no_match() {
        let cases = [
            json!(null),
            json!({}),
            json!({ "employee_name": "John Doe" }),
            json!({ "employee_name": "John Doe", "employee_ids": [] }),
            json!({ "employee_name": "John Doe", "employee_ids": [[]] }),
            json!({ "employee_name": "", "employee_ids": [[1]] }),
        ];

        for (index, body) in cases.iter().enumerate() {
            assert!(parse_lookup(body).is_none(), "case {index} should be no match: {body}");
        }
    }

    struct CannedLlm(&'static str);

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct EmptyDirectory;

    #[async_trait]
    impl Directory for EmptyDirectory {
        async fn find_employees(&self, _name: &str) -> Result<DirectoryLookup, ResolutionError> {
            Ok(DirectoryLookup::NotFound)
        }
    }

    #[tokio::test]
    async fn corrected_name_that_still_misses_halts_with_not_found() {
        let names = NameExtractor::new(Arc::new(CannedLlm("John Doe")));
        let error = resolve_employee_match(&names, &EmptyDirectory, "Can Jonh Doe take leave?")
            .await
            .expect_err("empty directory should not match");
        assert_eq!(error, ResolutionError::NotFound { name: "John Doe".to_string() });
    }
}
