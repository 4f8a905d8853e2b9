//! Handler for `stagehand nexus`.

use miette::Result;
use stagehand_ops::ops_nexus;

use super::{block_on, Context};
use crate::cli::NexusAction;

pub fn exec(ctx: Context, action: NexusAction) -> Result<()> {
    let Context {
        config,
        credentials,
    } = ctx;
    block_on(async move {
        match action {
            NexusAction::Profiles => {
                ops_nexus::profiles(&config, credentials).await?;
            }
            NexusAction::Create { group, profile } => {
                ops_nexus::create(&config, credentials, &group, profile.as_deref()).await?;
            }
            NexusAction::CloseAndRelease { repository } => {
                ops_nexus::close_and_release(&config, credentials, repository.as_deref()).await?;
            }
            NexusAction::Drop { repository } => {
                ops_nexus::drop_repository(&config, credentials, &repository).await?;
            }
        }
        Ok(())
    })
}
