//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod partner;
pub mod partner_tag;
pub mod partner_tag_link;
pub mod tariff;

// Re-export specific types to avoid conflicts
pub use partner::{Column as PartnerColumn, Entity as Partner, Model as PartnerModel};
pub use partner_tag::{Column as PartnerTagColumn, Entity as PartnerTag, Model as PartnerTagModel};
pub use partner_tag_link::{
    Column as PartnerTagLinkColumn, Entity as PartnerTagLink, Model as PartnerTagLinkModel,
};
pub use tariff::{
    Column as TariffColumn, Entity as Tariff, EquipmentType, Model as TariffModel, TariffState,
};
