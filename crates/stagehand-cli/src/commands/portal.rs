//! Handlers for `stagehand status`, `validate` and `release`.

use miette::Result;
use stagehand_ops::ops_portal;

use super::{block_on, Context};

pub fn exec_status(ctx: Context, deployment_id: &str) -> Result<()> {
    block_on(async {
        ops_portal::status_of(&ctx.config, ctx.credentials, deployment_id).await?;
        Ok(())
    })
}

pub fn exec_validate(ctx: Context, deployment_id: &str) -> Result<()> {
    block_on(async {
        ops_portal::validate(&ctx.config, ctx.credentials, deployment_id).await?;
        Ok(())
    })
}

pub fn exec_release(ctx: Context, deployment_id: &str) -> Result<()> {
    block_on(ops_portal::release(&ctx.config, ctx.credentials, deployment_id))
}
