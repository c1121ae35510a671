use crate::error::{IdleError, Result};
use crate::types::Group;

/// Finds the group whose id equals `target` as a string.
pub fn resolve_group<'a>(groups: &'a [Group], target: &str) -> Result<&'a Group> {
    let target = target.trim();
    tracing::debug!(target: "groupme_idle::scanner::resolver", "Searching groups for ID {}", target);

    for group in groups {
        tracing::debug!(
            target: "groupme_idle::scanner::resolver",
            "  Checking {} versus {}",
            group.id,
            target
        );
        if group.id == target {
            tracing::debug!(
                target: "groupme_idle::scanner::resolver",
                "Found group ID {} named {}",
                group.id,
                group.name
            );
            return Ok(group);
        }
    }

    Err(IdleError::GroupNotFound(target.to_string()))
}
