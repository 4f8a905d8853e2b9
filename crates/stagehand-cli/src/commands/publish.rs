//! Handlers for `stagehand publish` and `stagehand drop`.

use std::path::PathBuf;

use miette::Result;
use stagehand_ops::ops_publish::{self, PublishRequest};

use super::{block_on, Context};

pub fn exec(
    ctx: Context,
    projects: &[String],
    build_dir: PathBuf,
    automatic: bool,
    validate: bool,
) -> Result<()> {
    let projects = projects
        .iter()
        .map(|spec| ops_publish::parse_project_spec(spec))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let request = PublishRequest {
        build_dir,
        projects,
        automatic,
        validate,
    };
    block_on(async {
        ops_publish::publish(&ctx.config, ctx.credentials, request).await?;
        Ok(())
    })
}

pub fn exec_drop(ctx: Context, deployment_id: &str) -> Result<()> {
    block_on(ops_publish::drop_deployment(
        &ctx.config,
        ctx.credentials,
        deployment_id,
    ))
}
