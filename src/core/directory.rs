//! Partner directory interface.
//!
//! Tariffs reference forwarders, carriers, ports and countries that belong to an
//! external directory. The engine only needs to classify those entries with role
//! tags and to read their display names, so that is all the [`Directory`] trait
//! exposes. [`SeaDirectory`] implements it over the partner tables of the local
//! database.

use crate::{
    entities::{Partner, PartnerTag, PartnerTagLink, partner, partner_tag, partner_tag_link},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::collections::HashMap;
use std::fmt;

/// Role under which a tariff references a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRole {
    /// Quoting forwarder
    Forwarder,
    /// Shipping line
    Carrier,
    /// Port of loading
    PortOfLoading,
    /// Port of discharge
    PortOfDischarge,
}

impl TagRole {
    /// Name of the directory tag for this role
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Forwarder => "Forwarder",
            Self::Carrier => "Carrier",
            Self::PortOfLoading => "POL",
            Self::PortOfDischarge => "POD",
        }
    }
}

impl fmt::Display for TagRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Operations the tariff engine needs from the partner directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Returns the id of the tag with this name, creating it if needed.
    async fn find_or_create_tag(&self, name: &str) -> Result<i64>;

    /// Attaches a tag to an entity.
    async fn attach_tag(&self, entity_id: i64, tag_id: i64) -> Result<()>;

    /// Whether the entity already carries the tag.
    async fn has_tag(&self, entity_id: i64, tag_id: i64) -> Result<bool>;

    /// Display name of an entity, `None` if the directory does not know it.
    async fn display_name(&self, entity_id: i64) -> Result<Option<String>>;
}

/// Display names keyed by directory id
pub type Names = HashMap<i64, String>;

/// Label for a directory id: its display name, or `#<id>` when unknown.
#[must_use]
pub fn label_for(names: &Names, entity_id: i64) -> String {
    names
        .get(&entity_id)
        .cloned()
        .unwrap_or_else(|| format!("#{entity_id}"))
}

/// Looks up display names for a set of ids.
///
/// Best effort: ids the directory does not know, or fails to answer for, are left
/// out and logged, so callers fall back to [`label_for`]'s `#<id>` form.
pub async fn resolve_names<I>(directory: &dyn Directory, ids: I) -> Names
where
    I: IntoIterator<Item = i64>,
{
    let mut names = Names::new();
    for id in ids {
        if names.contains_key(&id) {
            continue;
        }
        match directory.display_name(id).await {
            Ok(Some(name)) => {
                names.insert(id, name);
            }
            Ok(None) => tracing::debug!("Directory has no entry for id {id}"),
            Err(e) => tracing::warn!("Could not resolve directory name for id {id}: {e}"),
        }
    }
    names
}

/// Directory backed by the `partners`, `partner_tags` and `partner_tag_links` tables.
#[derive(Debug, Clone)]
pub struct SeaDirectory {
    db: DatabaseConnection,
}

impl SeaDirectory {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a partner with the given name.
    pub async fn create_partner(&self, name: &str) -> Result<partner::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "partner name cannot be empty"));
        }

        let model = partner::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Returns the partner with this exact name, creating it if needed.
    pub async fn find_or_create_partner(&self, name: &str) -> Result<partner::Model> {
        let existing = Partner::find()
            .filter(partner::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await?;
        match existing {
            Some(found) => Ok(found),
            None => self.create_partner(name).await,
        }
    }

    /// Names of the tags attached to a partner, sorted alphabetically.
    pub async fn tag_names(&self, entity_id: i64) -> Result<Vec<String>> {
        let tag_ids: Vec<i64> = PartnerTagLink::find()
            .filter(partner_tag_link::Column::PartnerId.eq(entity_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();

        let mut names: Vec<String> = PartnerTag::find()
            .filter(partner_tag::Column::Id.is_in(tag_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl Directory for SeaDirectory {
    async fn find_or_create_tag(&self, name: &str) -> Result<i64> {
        let existing = PartnerTag::find()
            .filter(partner_tag::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        if let Some(tag) = existing {
            return Ok(tag.id);
        }

        tracing::info!("Creating directory tag `{name}`");
        let tag = partner_tag::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };
        Ok(tag.insert(&self.db).await?.id)
    }

    async fn attach_tag(&self, entity_id: i64, tag_id: i64) -> Result<()> {
        if Partner::find_by_id(entity_id).one(&self.db).await?.is_none() {
            return Err(Error::Directory {
                message: format!("partner {entity_id} does not exist"),
            });
        }
        if self.has_tag(entity_id, tag_id).await? {
            return Ok(());
        }

        let link = partner_tag_link::ActiveModel {
            partner_id: Set(entity_id),
            tag_id: Set(tag_id),
            ..Default::default()
        };
        link.insert(&self.db).await?;
        Ok(())
    }

    async fn has_tag(&self, entity_id: i64, tag_id: i64) -> Result<bool> {
        let count = PartnerTagLink::find()
            .filter(partner_tag_link::Column::PartnerId.eq(entity_id))
            .filter(partner_tag_link::Column::TagId.eq(tag_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn display_name(&self, entity_id: i64) -> Result<Option<String>> {
        Ok(Partner::find_by_id(entity_id)
            .one(&self.db)
            .await?
            .map(|found| found.name))
    }
}
