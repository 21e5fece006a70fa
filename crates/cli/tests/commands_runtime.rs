use std::env;
use std::sync::{Mutex, OnceLock};

use leavewise_cli::commands::{ask, config, doctor};
use serde_json::Value;

#[test]
fn config_reports_redacted_api_key_with_env_source() {
    with_env(&[("LEAVEWISE_LLM_API_KEY", "gsk-test-value")], || {
        let output = config::run();

        assert!(output.starts_with("effective config"), "unexpected output: {output}");
        assert!(
            output.contains("- llm.api_key = <redacted> (source: env (LEAVEWISE_LLM_API_KEY))"),
            "api key line should be redacted and attributed to env: {output}"
        );
        assert!(!output.contains("gsk-test-value"), "secret must never be printed");
    });
}

#[test]
fn config_reports_validation_failure_without_api_key() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.contains("config validation failed"), "unexpected output: {output}");
        assert!(output.contains("llm.api_key"), "failure should name the missing key: {output}");
    });
}

#[test]
fn doctor_fails_config_check_without_api_key() {
    with_env(&[], || {
        let output = doctor::run(true);
        let payload: Value =
            serde_json::from_str(&output).expect("doctor --json should emit valid JSON");

        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
    });
}

#[test]
fn ask_rejects_an_empty_query_before_loading_anything() {
    with_env(&[], || {
        let result = ask::run("   ", None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "empty_query");
    });
}

#[test]
fn ask_reports_config_failure_without_api_key() {
    with_env(&[], || {
        let result = ask::run("Can John Doe take a leave on Feb 10th?", None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "LEAVEWISE_LLM_PROVIDER",
        "LEAVEWISE_LLM_API_KEY",
        "LEAVEWISE_LLM_BASE_URL",
        "LEAVEWISE_LLM_MODEL",
        "LEAVEWISE_LLM_TIMEOUT_SECS",
        "LEAVEWISE_LLM_MAX_RETRIES",
        "LEAVEWISE_DIRECTORY_BASE_URL",
        "LEAVEWISE_DIRECTORY_TIMEOUT_SECS",
        "LEAVEWISE_POLICY_DOCUMENT_DIR",
        "LEAVEWISE_SERVER_BIND_ADDRESS",
        "LEAVEWISE_SERVER_PORT",
        "LEAVEWISE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "LEAVEWISE_LOGGING_LEVEL",
        "LEAVEWISE_LOGGING_FORMAT",
        "LEAVEWISE_LOG_LEVEL",
        "LEAVEWISE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
