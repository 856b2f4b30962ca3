//! Armory API client
//!
//! Uses async reqwest; one client is shared across all requests.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::models::{CharacterProfile, EquippedItem, ItemInfo};
use crate::error::{Result, WowDbError};

/// Default armory endpoint, overridable with `--armory-url`
pub const DEFAULT_ARMORY_URL: &str = "https://www.wowarmory.com/api";

const USER_AGENT: &str = "wowdb/0.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to insert one character: the profile plus item metadata
#[derive(Debug, Clone)]
pub struct CharacterSnapshot {
    pub profile: CharacterProfile,
    pub items: Vec<ItemSnapshot>,
}

/// An equipped item together with its metadata and the metadata of its gems
#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    pub equipped: EquippedItem,
    pub info: ItemInfo,
    pub gems: Vec<ItemInfo>,
}

pub struct ArmoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArmoryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        log::info!("Armory client using {}", base_url);
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a character profile by name and realm
    pub async fn fetch_character(&self, name: &str, realm: &str) -> Result<CharacterProfile> {
        let url = format!(
            "{}/character/{}/{}",
            self.base_url,
            urlencoding::encode(realm),
            urlencoding::encode(name)
        );

        match self.get_json(&url).await {
            Err(WowDbError::HttpStatus(status)) if status == StatusCode::NOT_FOUND => {
                Err(WowDbError::CharacterNotFound(format!("{}-{}", name, realm)))
            }
            other => other,
        }
    }

    /// Fetch item metadata (name, level, quality, gem color, drop source)
    pub async fn fetch_item(&self, id: u64) -> Result<ItemInfo> {
        let url = format!("{}/item/{}", self.base_url, id);

        match self.get_json(&url).await {
            Err(WowDbError::HttpStatus(status)) if status == StatusCode::NOT_FOUND => {
                Err(WowDbError::ItemNotFound(id))
            }
            other => other,
        }
    }

    /// Fetch a character and the metadata of everything it has equipped.
    ///
    /// Each distinct item id (equipped items and gems alike) is requested once.
    pub async fn fetch_snapshot(&self, name: &str, realm: &str) -> Result<CharacterSnapshot> {
        let profile = self.fetch_character(name, realm).await?;
        log::info!(
            "Fetched {} ({} {}, {} equipped items)",
            profile.slug(),
            profile.class,
            profile.guild.as_deref().unwrap_or("<no guild>"),
            profile.items.len()
        );

        let mut seen: HashMap<u64, ItemInfo> = HashMap::new();
        let mut items = Vec::with_capacity(profile.items.len());

        for equipped in &profile.items {
            let info = self.fetch_item_once(&mut seen, equipped.id).await?;

            let mut gems = Vec::new();
            for geid in equipped.gem_ids() {
                gems.push(self.fetch_item_once(&mut seen, geid).await?);
            }

            items.push(ItemSnapshot {
                equipped: equipped.clone(),
                info,
                gems,
            });
        }

        log::debug!(
            "Snapshot for {} needed {} item lookups",
            profile.slug(),
            seen.len()
        );

        Ok(CharacterSnapshot { profile, items })
    }

    async fn fetch_item_once(&self, seen: &mut HashMap<u64, ItemInfo>, id: u64) -> Result<ItemInfo> {
        if let Some(info) = seen.get(&id) {
            return Ok(info.clone());
        }
        let info = self.fetch_item(id).await?;
        seen.insert(id, info.clone());
        Ok(info)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Armory returned {} for {}", status, url);
            return Err(WowDbError::HttpStatus(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
