//! Client for the armory game-data API: character profiles and item metadata

mod client;
mod models;

pub use client::{ArmoryClient, CharacterSnapshot, ItemSnapshot, DEFAULT_ARMORY_URL};
pub use models::{
    CharacterProfile, Difficulty, EquippedItem, ItemInfo, ItemQuality, ItemSource, TalentSpec,
};

#[cfg(test)]
pub(crate) mod fixtures;
