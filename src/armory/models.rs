//! Armory response types

use serde::Deserialize;

/// Character profile as returned by `GET /character/{realm}/{name}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub name: String,
    pub realm: String,
    pub class: String,
    #[serde(default)]
    pub guild: Option<String>,
    #[serde(default)]
    pub talent_specs: Vec<TalentSpec>,
    #[serde(default)]
    pub items: Vec<EquippedItem>,
}

/// One talent build: points spent in each of the three trees
#[derive(Debug, Clone, Deserialize)]
pub struct TalentSpec {
    pub trees: [u32; 3],
    #[serde(default)]
    pub active: bool,
}

impl TalentSpec {
    /// Renders the point distribution as `a/b/c`
    pub fn summary(&self) -> String {
        self.trees
            .iter()
            .map(|points| points.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl CharacterProfile {
    /// The active talent spec, or the first one listed if none is flagged active
    pub fn main_spec(&self) -> Option<&TalentSpec> {
        self.talent_specs
            .iter()
            .find(|spec| spec.active)
            .or_else(|| self.talent_specs.first())
    }

    /// The other talent spec when the character has two
    pub fn secondary_spec(&self) -> Option<&TalentSpec> {
        let main = self.main_spec()?;
        self.talent_specs
            .iter()
            .find(|spec| !std::ptr::eq(*spec, main))
    }

    /// `Name-Realm`, the form used in URLs and log lines
    pub fn slug(&self) -> String {
        format!("{}-{}", self.name, self.realm)
    }
}

/// An item in one of the character's equipment slots
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippedItem {
    pub id: u64,
    /// 0 when the item carries no enchant
    #[serde(default)]
    pub permanent_enchant: u64,
    #[serde(default)]
    pub enchant_name: Option<String>,
    #[serde(default)]
    pub gems: Vec<Option<u64>>,
}

impl EquippedItem {
    /// Enchant id, treating the armory's 0 as "no enchant"
    pub fn enchant_id(&self) -> Option<u64> {
        (self.permanent_enchant != 0).then_some(self.permanent_enchant)
    }

    /// Enchant display name, falling back to the id when the armory has none
    pub fn enchant_label(&self) -> Option<String> {
        let eid = self.enchant_id()?;
        Some(
            self.enchant_name
                .clone()
                .unwrap_or_else(|| eid.to_string()),
        )
    }

    /// Ids of the socketed gems, skipping empty sockets
    pub fn gem_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.gems.iter().flatten().copied()
    }
}

/// Item metadata as returned by `GET /item/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInfo {
    pub id: u64,
    pub name: String,
    pub level: u32,
    #[serde(default)]
    pub quality: ItemQuality,
    /// Gem color for gems ("Red", "Meta", ...); absent for other items
    #[serde(rename = "type", default)]
    pub gem_type: Option<String>,
    #[serde(default)]
    pub source: Option<ItemSource>,
}

/// Where an item drops. Either part may be missing (vendor and quest items).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSource {
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default)]
    pub creature_name: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl ItemSource {
    /// Raid or zone name, `None` when absent or blank
    pub fn raid(&self) -> Option<&str> {
        non_blank(self.area_name.as_deref())
    }

    /// Boss name, `None` when absent or blank
    pub fn boss(&self) -> Option<&str> {
        non_blank(self.creature_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Raid difficulty, `"n"` or `"h"` on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Difficulty {
    #[default]
    #[serde(rename = "n")]
    Normal,
    #[serde(rename = "h")]
    Heroic,
}

impl Difficulty {
    /// Single-character flag stored in `Raid.heroic`
    pub fn as_flag(self) -> &'static str {
        match self {
            Difficulty::Normal => "n",
            Difficulty::Heroic => "h",
        }
    }

    pub fn is_heroic(self) -> bool {
        self == Difficulty::Heroic
    }
}

/// Item rarity (0 = Poor through 7 = Heirloom)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum ItemQuality {
    Poor,
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Artifact,
    Heirloom,
}

impl TryFrom<u8> for ItemQuality {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            0 => ItemQuality::Poor,
            1 => ItemQuality::Common,
            2 => ItemQuality::Uncommon,
            3 => ItemQuality::Rare,
            4 => ItemQuality::Epic,
            5 => ItemQuality::Legendary,
            6 => ItemQuality::Artifact,
            7 => ItemQuality::Heirloom,
            other => return Err(format!("unknown item quality: {}", other)),
        })
    }
}

impl ItemQuality {
    pub fn name(self) -> &'static str {
        match self {
            ItemQuality::Poor => "Poor",
            ItemQuality::Common => "Common",
            ItemQuality::Uncommon => "Uncommon",
            ItemQuality::Rare => "Rare",
            ItemQuality::Epic => "Epic",
            ItemQuality::Legendary => "Legendary",
            ItemQuality::Artifact => "Artifact",
            ItemQuality::Heirloom => "Heirloom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_json() -> &'static str {
        r#"{
            "name": "Sedawk",
            "realm": "Sargeras",
            "class": "Druid",
            "guild": "Ensidia",
            "talentSpecs": [
                { "trees": [0, 51, 20], "active": false },
                { "trees": [14, 0, 57], "active": true }
            ],
            "items": [
                { "id": 40395, "slot": 0, "permanentEnchant": 3817, "gems": [41398, null, 40111] },
                { "id": 40250, "slot": 1 }
            ]
        }"#
    }

    #[test]
    fn profile_deserializes_with_defaults() {
        let profile: CharacterProfile = serde_json::from_str(profile_json()).unwrap();
        assert_eq!(profile.slug(), "Sedawk-Sargeras");
        assert_eq!(profile.guild.as_deref(), Some("Ensidia"));
        assert_eq!(profile.items.len(), 2);

        let bare = &profile.items[1];
        assert_eq!(bare.permanent_enchant, 0);
        assert!(bare.gems.is_empty());
        assert!(bare.enchant_id().is_none());
        assert!(bare.enchant_label().is_none());
    }

    #[test]
    fn main_spec_prefers_active_tree() {
        let profile: CharacterProfile = serde_json::from_str(profile_json()).unwrap();
        assert_eq!(profile.main_spec().unwrap().summary(), "14/0/57");
        assert_eq!(profile.secondary_spec().unwrap().summary(), "0/51/20");
    }

    #[test]
    fn single_spec_has_no_secondary() {
        let json = r#"{
            "name": "Bribbomir", "realm": "Mannoroth", "class": "Warrior",
            "talentSpecs": [{ "trees": [57, 14, 0] }]
        }"#;
        let profile: CharacterProfile = serde_json::from_str(json).unwrap();
        assert!(profile.guild.is_none());
        assert_eq!(profile.main_spec().unwrap().summary(), "57/14/0");
        assert!(profile.secondary_spec().is_none());
    }

    #[test]
    fn enchant_label_falls_back_to_id() {
        let profile: CharacterProfile = serde_json::from_str(profile_json()).unwrap();
        let helm = &profile.items[0];
        assert_eq!(helm.enchant_id(), Some(3817));
        assert_eq!(helm.enchant_label().as_deref(), Some("3817"));
        assert_eq!(helm.gem_ids().collect::<Vec<_>>(), vec![41398, 40111]);
    }

    #[test]
    fn item_info_deserializes_gem_and_source() {
        let json = r#"{
            "id": 40111, "name": "Bold Cardinal Ruby", "level": 80,
            "quality": 4, "type": "Red"
        }"#;
        let gem: ItemInfo = serde_json::from_str(json).unwrap();
        assert_eq!(gem.quality, ItemQuality::Epic);
        assert_eq!(gem.gem_type.as_deref(), Some("Red"));
        assert!(gem.source.is_none());

        let json = r#"{
            "id": 40395, "name": "Torch of Holy Fire", "level": 226, "quality": 4,
            "source": { "areaName": "Naxxramas", "creatureName": "Kel'Thuzad", "difficulty": "h" }
        }"#;
        let item: ItemInfo = serde_json::from_str(json).unwrap();
        let source = item.source.unwrap();
        assert_eq!(source.boss(), Some("Kel'Thuzad"));
        assert_eq!(source.raid(), Some("Naxxramas"));
        assert!(source.difficulty.is_heroic());
        assert_eq!(source.difficulty.as_flag(), "h");
    }

    #[test]
    fn source_tolerates_missing_creature() {
        let json = r#"{
            "id": 44133, "name": "Arcanum of Torment", "level": 80, "quality": 1,
            "source": { "areaName": "Dalaran", "creatureName": null }
        }"#;
        let item: ItemInfo = serde_json::from_str(json).unwrap();
        let source = item.source.unwrap();
        assert_eq!(source.raid(), Some("Dalaran"));
        assert!(source.boss().is_none());
        assert_eq!(source.difficulty, Difficulty::Normal);

        let json = r#"{
            "id": 44133, "name": "Arcanum of Torment", "level": 80,
            "source": { "areaName": "  " }
        }"#;
        let item: ItemInfo = serde_json::from_str(json).unwrap();
        let source = item.source.unwrap();
        assert!(source.raid().is_none());
        assert!(source.boss().is_none());
    }

    #[test]
    fn unknown_quality_is_rejected() {
        let json = r#"{ "id": 1, "name": "Broken", "level": 1, "quality": 42 }"#;
        assert!(serde_json::from_str::<ItemInfo>(json).is_err());
    }
}
