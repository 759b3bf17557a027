//! Partner tag link entity - Attaches a tag to a partner.
//!
//! The `(partner_id, tag_id)` pair is kept unique by the directory code, which
//! checks for an existing link before inserting.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner tag link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partner_tag_links")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tagged partner
    pub partner_id: i64,
    /// Attached tag
    pub tag_id: i64,
}

/// Defines relationships between `PartnerTagLink` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one partner
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::PartnerId",
        to = "super::partner::Column::Id"
    )]
    Partner,
    /// Each link belongs to one tag
    #[sea_orm(
        belongs_to = "super::partner_tag::Entity",
        from = "Column::TagId",
        to = "super::partner_tag::Column::Id"
    )]
    Tag,
}

impl Related<super::partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::partner_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
