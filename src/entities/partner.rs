//! Partner entity - A directory entry referenced by tariffs.
//!
//! Forwarders, carriers, ports and countries all live here. Tariffs only hold
//! their ids; role classification is expressed through tags.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    /// Unique identifier for the partner
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g. "Maersk", "Manzanillo")
    #[sea_orm(unique)]
    pub name: String,
    /// When the partner was created
    pub created_at: DateTime,
}

/// Defines relationships between Partner and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One partner has many tag links
    #[sea_orm(has_many = "super::partner_tag_link::Entity")]
    TagLinks,
}

impl Related<super::partner_tag_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TagLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
