use leavewise_agent::directory::{Directory, DirectoryClient};
use leavewise_core::config::{AppConfig, LoadOptions};
use leavewise_core::PolicyStore;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_gateway_credentials(&config));
            checks.push(check_policy_document(&config));
            checks.push(check_directory_connectivity(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["gateway_credentials", "policy_document", "directory_connectivity"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_gateway_credentials(config: &AppConfig) -> DoctorCheck {
    DoctorCheck {
        name: "gateway_credentials",
        status: CheckStatus::Pass,
        details: format!(
            "provider `{}` credentials validated by config contract (base url: {})",
            config.llm.provider.as_str(),
            config.llm.effective_base_url()
        ),
    }
}

fn check_policy_document(config: &AppConfig) -> DoctorCheck {
    let store = PolicyStore::new(&config.policy.document_dir);
    match store.locate() {
        Ok(path) => DoctorCheck {
            name: "policy_document",
            status: CheckStatus::Pass,
            details: format!("found `{}`", path.display()),
        },
        Err(error) => DoctorCheck {
            name: "policy_document",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_directory_connectivity(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "directory_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let client = DirectoryClient::from_config(&config.services)
            .map_err(|error| error.to_string())?;
        // Any well-formed response proves the service is reachable; a miss
        // for this probe name is expected.
        client.find_employees("healthcheck-probe").await.map_err(|error| error.to_string())?;
        Ok::<(), String>(())
    });

    match result {
        Ok(()) => DoctorCheck {
            name: "directory_connectivity",
            status: CheckStatus::Pass,
            details: format!("reached `{}`", config.services.directory_base_url),
        },
        Err(error) => {
            DoctorCheck { name: "directory_connectivity", status: CheckStatus::Fail, details: error }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
