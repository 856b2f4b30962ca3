//! Test data shared by the database, upsert and web tests

use super::{
    CharacterProfile, CharacterSnapshot, Difficulty, EquippedItem, ItemInfo, ItemQuality,
    ItemSnapshot, ItemSource, TalentSpec,
};

/// Create a character profile with one active spec and no items
pub fn test_profile(name: &str, realm: &str, guild: Option<&str>) -> CharacterProfile {
    CharacterProfile {
        name: name.to_string(),
        realm: realm.to_string(),
        class: "Druid".to_string(),
        guild: guild.map(str::to_string),
        talent_specs: vec![TalentSpec {
            trees: [0, 51, 20],
            active: true,
        }],
        items: Vec::new(),
    }
}

/// Create item metadata with no drop source
pub fn test_item(id: u64, name: &str, level: u32) -> ItemInfo {
    ItemInfo {
        id,
        name: name.to_string(),
        level,
        quality: ItemQuality::Epic,
        gem_type: None,
        source: None,
    }
}

pub fn test_gem(id: u64, name: &str, color: &str) -> ItemInfo {
    ItemInfo {
        gem_type: Some(color.to_string()),
        ..test_item(id, name, 80)
    }
}

pub fn test_equipped(id: u64, permanent_enchant: u64, gems: &[u64]) -> EquippedItem {
    EquippedItem {
        id,
        permanent_enchant,
        enchant_name: None,
        gems: gems.iter().copied().map(Some).collect(),
    }
}

pub fn kel_thuzad_heroic() -> ItemSource {
    ItemSource {
        area_name: Some("Naxxramas".to_string()),
        creature_name: Some("Kel'Thuzad".to_string()),
        difficulty: Difficulty::Heroic,
    }
}

/// Sedawk-Sargeras of Ensidia wearing three items:
/// an enchanted helm with two gems, a plain cloak with no source, and a
/// staff from the same boss as the helm sharing one gem with it
pub fn test_snapshot() -> CharacterSnapshot {
    test_snapshot_for("Sedawk", "Sargeras", Some("Ensidia"))
}

pub fn test_snapshot_for(name: &str, realm: &str, guild: Option<&str>) -> CharacterSnapshot {
    let helm = test_equipped(40395, 3817, &[41398, 40111]);
    let cloak = test_equipped(40250, 0, &[]);
    let staff = test_equipped(40388, 0, &[40111]);

    let mut profile = test_profile(name, realm, guild);
    profile.items = vec![helm.clone(), cloak.clone(), staff.clone()];

    let meta = test_gem(41398, "Relentless Earthsiege Diamond", "Meta");
    let ruby = test_gem(40111, "Bold Cardinal Ruby", "Red");

    CharacterSnapshot {
        profile,
        items: vec![
            ItemSnapshot {
                equipped: helm,
                info: ItemInfo {
                    source: Some(kel_thuzad_heroic()),
                    ..test_item(40395, "Valorous Dreamwalker Headguard", 226)
                },
                gems: vec![meta, ruby.clone()],
            },
            ItemSnapshot {
                equipped: cloak,
                info: test_item(40250, "Aged Winter Cloak", 200),
                gems: Vec::new(),
            },
            ItemSnapshot {
                equipped: staff,
                info: ItemInfo {
                    source: Some(kel_thuzad_heroic()),
                    ..test_item(40388, "Journey's End", 226)
                },
                gems: vec![ruby],
            },
        ],
    }
}
