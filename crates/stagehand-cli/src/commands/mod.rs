//! Command dispatch and handler modules.

mod nexus;
mod portal;
mod publish;

use std::future::Future;

use miette::Result;
use stagehand_core::config::GlobalConfig;
use stagehand_core::credentials::Credentials;
use stagehand_core::properties::{load_env_file, ENV_FILE_NAME};
use stagehand_util::errors::StagehandError;

use crate::cli::{Cli, Command};

/// Resolved configuration shared by every command.
pub struct Context {
    pub config: GlobalConfig,
    pub credentials: Credentials,
}

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = context(&cli)?;
    match cli.command {
        Command::Publish {
            projects,
            build_dir,
            automatic,
            validate,
        } => publish::exec(ctx, &projects, build_dir, automatic, validate),
        Command::Drop { deployment_id } => publish::exec_drop(ctx, &deployment_id),
        Command::Status { deployment_id } => portal::exec_status(ctx, &deployment_id),
        Command::Validate { deployment_id } => portal::exec_validate(ctx, &deployment_id),
        Command::Release { deployment_id } => portal::exec_release(ctx, &deployment_id),
        Command::Nexus { action } => nexus::exec(ctx, action),
    }
}

/// Load config and `.stagehand.env`, then resolve credentials. Fails before
/// any network activity when credentials are missing.
fn context(cli: &Cli) -> Result<Context> {
    let config = GlobalConfig::load(cli.config.as_deref())?;
    let cwd = std::env::current_dir().map_err(StagehandError::Io)?;
    let env = load_env_file(&cwd.join(ENV_FILE_NAME))?;
    let credentials = config.credentials(&env, cli.username.clone(), cli.password.clone())?;
    tracing::debug!(
        "Portal {}, Nexus {}",
        config.portal.base_url,
        config.nexus.base_url
    );
    Ok(Context {
        config,
        credentials,
    })
}

/// Run an async operation to completion on a fresh runtime.
fn block_on<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| StagehandError::Generic {
        message: format!("Failed to start async runtime: {e}"),
    })?;
    rt.block_on(fut)
}
