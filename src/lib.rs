//! WoWDB - World of Warcraft character database
//!
//! Fetches a character's equipment and guild from the armory API, stores it in
//! SQLite and serves character, item and guild pages over HTTP.

pub mod armory;
pub mod database;
pub mod error;
pub mod render;
pub mod upsert;
pub mod web;

pub use armory::{ArmoryClient, CharacterSnapshot};
pub use database::init_schema;
pub use error::{Result, WowDbError};
pub use upsert::{insert_character, InsertScript};
