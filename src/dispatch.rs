//! Action execution by id.

use crate::capability::ActionOutcome;
use crate::catalog::identity::EntityId;
use crate::catalog::model::Item;
use crate::context::ResolutionContext;
use crate::error::{EngineError, EngineResult};
use tracing::info;

/// Resolve the three ids through the entity directory and run the action.
///
/// The handler's outcome is returned to the caller; a handler failure comes
/// back as [`EngineError::ActionExecution`]. Type compatibility between the
/// objects and the action is not re-checked here.
pub async fn run_action(
    ctx: &ResolutionContext,
    direct_id: &EntityId,
    action_id: &EntityId,
    indirect_id: Option<&EntityId>,
) -> EngineResult<ActionOutcome> {
    let direct = lookup(ctx, direct_id)?;
    let action = lookup(ctx, action_id)?;
    let indirect = indirect_id.map(|id| lookup(ctx, id)).transpose()?;

    let handle = match (&action.action, action.is_action()) {
        (Some(handle), true) => handle.clone(),
        _ => return Err(EngineError::NotAnAction(action.id)),
    };
    if action.indirect_types.is_some() && indirect.is_none() {
        return Err(EngineError::MissingIndirect { action: action.id });
    }

    info!(
        action = %action.name,
        direct = %direct.id,
        indirect = indirect.as_ref().map(|item| item.id.as_str()).unwrap_or("-"),
        "running action"
    );
    handle
        .action()
        .run(&direct, indirect.as_ref())
        .await
        .map_err(|source| EngineError::ActionExecution {
            action: action.id.clone(),
            source,
        })
}

fn lookup(ctx: &ResolutionContext, id: &EntityId) -> EngineResult<Item> {
    ctx.directory()
        .get(id)
        .ok_or_else(|| EngineError::UnknownEntity(id.clone()))
}
