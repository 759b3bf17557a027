//! Directory tag synchronizer.
//!
//! Every entity a tariff references is tagged with its role (`Forwarder`,
//! `Carrier`, `POL`, `POD`) in the partner directory. Tagging is best-effort
//! metadata: failures are logged and counted, never returned, so a directory
//! outage cannot fail a tariff write. Re-running on tagged entities is a no-op.

use crate::core::directory::{Directory, TagRole};

/// Outcome of one synchronization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Tags newly attached
    pub attached: usize,
    /// References that already carried their tag
    pub already_tagged: usize,
    /// References that could not be tagged
    pub failed: usize,
}

/// Ensures each present reference carries the tag for its role.
pub async fn sync_tags(
    directory: &dyn Directory,
    references: &[(TagRole, Option<i64>)],
) -> SyncReport {
    let mut report = SyncReport::default();

    for &(role, entity_id) in references {
        let Some(entity_id) = entity_id else {
            continue;
        };

        match tag_entity(directory, role, entity_id).await {
            Ok(true) => report.attached += 1,
            Ok(false) => report.already_tagged += 1,
            Err(e) => {
                tracing::warn!("Could not tag entity {entity_id} as {role}: {e}");
                report.failed += 1;
            }
        }
    }

    if report.attached > 0 || report.failed > 0 {
        tracing::debug!(?report, "Directory tag sync finished");
    }
    report
}

/// Attaches the role tag if missing; returns whether a tag was attached.
async fn tag_entity(
    directory: &dyn Directory,
    role: TagRole,
    entity_id: i64,
) -> crate::errors::Result<bool> {
    let tag_id = directory.find_or_create_tag(role.tag_name()).await?;
    if directory.has_tag(entity_id, tag_id).await? {
        return Ok(false);
    }
    directory.attach_tag(entity_id, tag_id).await?;
    Ok(true)
}
