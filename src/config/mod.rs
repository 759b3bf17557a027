/// Database configuration and connection management
pub mod database;

/// Seed file loading (partners and tariffs) from TOML
pub mod seed;

/// Application settings loaded from config.toml
pub mod settings;
