//! Formation commands scoped by branch.

use reviewapps_core::{FormationAdjuster, FormationChange};

use crate::cli::{BranchArgs, UpdateFormationArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{render_formation, render_formation_entry};

pub(crate) async fn handle_list_formation(ctx: &AppContext, args: &BranchArgs) -> CliResult<()> {
    let formation = FormationAdjuster::new(&ctx.platform)
        .list(&ctx.config.pipeline, &args.branch)
        .await?;
    render_formation(&formation, args.output.format())
}

pub(crate) async fn handle_update_formation(
    ctx: &AppContext,
    args: &UpdateFormationArgs,
) -> CliResult<()> {
    let change = FormationChange {
        process_type: args.formation_type.clone(),
        quantity: args.quantity,
        size: args.size.clone(),
    };
    let updated = FormationAdjuster::new(&ctx.platform)
        .update(&ctx.config.pipeline, &args.branch, &change)
        .await?;
    render_formation_entry(&updated, args.output.format())
}
