use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use leavewise_agent::directory::Directory;
use leavewise_agent::extract::NameExtractor;
use leavewise_agent::runtime::AgentRuntime;
use leavewise_agent::stack::{ResolutionStack, StackError};
use leavewise_core::config::{AppConfig, ConfigError, LoadOptions};
use leavewise_core::PolicyStore;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<AgentRuntime>,
    pub directory: Arc<dyn Directory>,
    pub names: Arc<NameExtractor>,
    pub policy: Arc<PolicyStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stack(#[from] StackError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let stack = ResolutionStack::from_config(&config)?;
    let policy = Arc::new(PolicyStore::new(&config.policy.document_dir));

    info!(
        event_name = "system.bootstrap.stack_assembled",
        correlation_id = "bootstrap",
        provider = config.llm.provider.as_str(),
        directory_base_url = %config.services.directory_base_url,
        "resolution stack assembled"
    );

    Ok(Application {
        config,
        runtime: Arc::new(stack.runtime),
        directory: Arc::new(stack.directory),
        names: Arc::new(stack.names),
        policy,
    })
}
