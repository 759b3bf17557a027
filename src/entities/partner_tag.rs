//! Partner tag entity - A classification label such as `Forwarder` or `POL`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner tag database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partner_tags")]
pub struct Model {
    /// Unique identifier for the tag
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tag name, unique across the directory
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between `PartnerTag` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One tag is attached through many links
    #[sea_orm(has_many = "super::partner_tag_link::Entity")]
    Links,
}

impl Related<super::partner_tag_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
