//! Idempotent insert of one character snapshot
//!
//! Inserts in dependency order Realm -> Guild -> Character, then per item
//! Item -> Character_has_Item -> Enchant -> Gem -> Raid/Monster/Monster_has_Item.
//! Every step looks the row up first and only inserts when it is missing, so
//! re-importing a character adds nothing. Name lookups (realm, guild,
//! character, raid, monster) are case-insensitive, like the page queries.
//!
//! Statements are executed with bound parameters; the returned [`InsertScript`]
//! holds the same statements rendered as literal SQL for display.

use std::fmt;

use rusqlite::{params, Connection, OptionalExtension, Params, Transaction};

use crate::armory::{CharacterProfile, CharacterSnapshot, ItemInfo, ItemSnapshot, ItemSource};
use crate::error::Result;

/// The SQL executed (and skipped) by one insert run
#[derive(Debug, Clone)]
pub struct InsertScript {
    lines: Vec<String>,
    inserted: usize,
    skipped: usize,
}

impl InsertScript {
    fn new(slug: &str) -> Self {
        Self {
            lines: vec![format!(
                "-- WoWDB insert script for {}\n-- generated {}\n",
                slug,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            )],
            inserted: 0,
            skipped: 0,
        }
    }

    fn record(&mut self, label: &str, sql: String) {
        self.lines.push(format!("-- inserting {}\n{}\n", label, sql));
        self.inserted += 1;
    }

    fn skip(&mut self, what: String) {
        self.lines.push(format!("-- {} is in the DB, skipping...\n", what));
        self.skipped += 1;
    }

    fn note(&mut self, text: String) {
        self.lines.push(format!("-- {}\n", text));
    }

    /// Number of INSERT statements executed
    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Number of rows that already existed
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl fmt::Display for InsertScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Quote a string as an SQL literal
fn sql_text(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn sql_opt<T: fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NULL".to_string(),
    }
}

/// Armory ids as stored in INT columns
fn db_id(id: u64) -> i64 {
    id as i64
}

/// Look up a single id column, `None` when no row matches
fn find_id<P: Params>(tx: &Transaction<'_>, sql: &str, params: P) -> Result<Option<i64>> {
    let mut stmt = tx.prepare_cached(sql)?;
    Ok(stmt.query_row(params, |row| row.get(0)).optional()?)
}

/// Insert a character and everything it has equipped.
///
/// Runs in one transaction; the returned script lists every statement executed
/// and every row that was already present.
pub fn insert_character(conn: &mut Connection, snapshot: &CharacterSnapshot) -> Result<InsertScript> {
    let profile = &snapshot.profile;
    let tx = conn.transaction()?;
    let mut script = InsertScript::new(&profile.slug());

    let reid = upsert_realm(&tx, &mut script, &profile.realm)?;
    let gid = match &profile.guild {
        Some(guild) => Some(upsert_guild(&tx, &mut script, guild, reid)?),
        None => {
            script.note(format!("{} is not in a guild", profile.name));
            None
        }
    };
    let cid = upsert_character(&tx, &mut script, profile, reid, gid)?;

    for item in &snapshot.items {
        upsert_item(&tx, &mut script, cid, item)?;
    }

    tx.commit()?;

    log::info!(
        "Imported {}: {} statements executed, {} rows already present",
        profile.slug(),
        script.inserted(),
        script.skipped()
    );
    Ok(script)
}

fn upsert_realm(tx: &Transaction<'_>, script: &mut InsertScript, name: &str) -> Result<i64> {
    if let Some(reid) = find_id(
        tx,
        "SELECT reid FROM Realm WHERE name = ?1 COLLATE NOCASE",
        params![name],
    )? {
        script.skip(format!("Realm {}", name));
        return Ok(reid);
    }

    tx.execute("INSERT INTO Realm (name) VALUES (?1)", params![name])?;
    script.record(
        name,
        format!("INSERT INTO Realm (name) VALUES ({});", sql_text(name)),
    );
    Ok(tx.last_insert_rowid())
}

fn upsert_guild(
    tx: &Transaction<'_>,
    script: &mut InsertScript,
    name: &str,
    reid: i64,
) -> Result<i64> {
    if let Some(gid) = find_id(
        tx,
        "SELECT gid FROM Guild WHERE name = ?1 COLLATE NOCASE AND Realm_reid = ?2",
        params![name, reid],
    )? {
        script.skip(format!("Guild {}", name));
        return Ok(gid);
    }

    tx.execute(
        "INSERT INTO Guild (name, Realm_reid) VALUES (?1, ?2)",
        params![name, reid],
    )?;
    script.record(
        name,
        format!(
            "INSERT INTO Guild (name, Realm_reid) VALUES ({}, {});",
            sql_text(name),
            reid
        ),
    );
    Ok(tx.last_insert_rowid())
}

fn upsert_character(
    tx: &Transaction<'_>,
    script: &mut InsertScript,
    profile: &CharacterProfile,
    reid: i64,
    gid: Option<i64>,
) -> Result<i64> {
    if let Some(cid) = find_id(
        tx,
        "SELECT cid FROM Character WHERE name = ?1 COLLATE NOCASE AND Realm_reid = ?2",
        params![&profile.name, reid],
    )? {
        script.skip(format!("Character {}", profile.name));
        return Ok(cid);
    }

    let mspec = profile
        .main_spec()
        .map(|spec| spec.summary())
        .unwrap_or_default();
    let sspec = profile.secondary_spec().map(|spec| spec.summary());

    tx.execute(
        "INSERT INTO Character (Guild_gid, name, Realm_reid, class, mspec, sspec)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![gid, &profile.name, reid, &profile.class, &mspec, &sspec],
    )?;
    script.record(
        &profile.name,
        format!(
            "INSERT INTO Character (Guild_gid, name, Realm_reid, class, mspec, sspec) VALUES ({}, {}, {}, {}, {}, {});",
            sql_opt(gid),
            sql_text(&profile.name),
            reid,
            sql_text(&profile.class),
            sql_text(&mspec),
            sql_opt(sspec.as_deref().map(sql_text)),
        ),
    );
    Ok(tx.last_insert_rowid())
}

fn upsert_item(
    tx: &Transaction<'_>,
    script: &mut InsertScript,
    cid: i64,
    item: &ItemSnapshot,
) -> Result<()> {
    let info = &item.info;
    let eid = item.equipped.enchant_id();
    let db_eid = eid.map(db_id);

    // The same armory item with a different enchant is a separate row
    let iid = match find_id(
        tx,
        "SELECT iid FROM Item WHERE id = ?1 AND Enchant_eid IS ?2",
        params![db_id(info.id), db_eid],
    )? {
        Some(iid) => {
            script.skip(format!("Item {} ({})", info.name, info.id));
            iid
        }
        None => {
            tx.execute(
                "INSERT INTO Item (Enchant_eid, name, ilvl, id) VALUES (?1, ?2, ?3, ?4)",
                params![db_eid, &info.name, info.level, db_id(info.id)],
            )?;
            script.record(
                &info.name,
                format!(
                    "INSERT INTO Item (Enchant_eid, name, ilvl, id) VALUES ({}, {}, {}, {});",
                    sql_opt(eid),
                    sql_text(&info.name),
                    info.level,
                    info.id
                ),
            );
            tx.last_insert_rowid()
        }
    };

    link_character_item(tx, script, cid, iid)?;

    if let (Some(eid), Some(label)) = (eid, item.equipped.enchant_label()) {
        upsert_enchant(tx, script, eid, &label)?;
    }

    for gem in &item.gems {
        upsert_gem(tx, script, gem, iid)?;
    }

    match &info.source {
        Some(source) => upsert_source(tx, script, source, info.id, iid)?,
        None => script.note(format!("Item {} has no known drop source", info.id)),
    }

    Ok(())
}

fn link_character_item(
    tx: &Transaction<'_>,
    script: &mut InsertScript,
    cid: i64,
    iid: i64,
) -> Result<()> {
    if find_id(
        tx,
        "SELECT 1 FROM Character_has_Item WHERE Character_cid = ?1 AND Item_iid = ?2",
        params![cid, iid],
    )?
    .is_some()
    {
        script.skip(format!("Character+Item {}+{}", cid, iid));
        return Ok(());
    }

    tx.execute(
        "INSERT INTO Character_has_Item (Character_cid, Item_iid) VALUES (?1, ?2)",
        params![cid, iid],
    )?;
    script.record(
        &format!("Character+Item {}+{}", cid, iid),
        format!(
            "INSERT INTO Character_has_Item (Character_cid, Item_iid) VALUES ({}, {});",
            cid, iid
        ),
    );
    Ok(())
}

fn upsert_enchant(
    tx: &Transaction<'_>,
    script: &mut InsertScript,
    eid: u64,
    name: &str,
) -> Result<()> {
    if find_id(tx, "SELECT eid FROM Enchant WHERE eid = ?1", params![db_id(eid)])?.is_some() {
        script.skip(format!("Enchant {}", eid));
        return Ok(());
    }

    tx.execute(
        "INSERT INTO Enchant (eid, name) VALUES (?1, ?2)",
        params![db_id(eid), name],
    )?;
    script.record(
        &format!("Enchant {}", eid),
        format!(
            "INSERT INTO Enchant (eid, name) VALUES ({}, {});",
            eid,
            sql_text(name)
        ),
    );
    Ok(())
}

fn upsert_gem(tx: &Transaction<'_>, script: &mut InsertScript, gem: &ItemInfo, iid: i64) -> Result<()> {
    if find_id(
        tx,
        "SELECT geid FROM Gem WHERE geid = ?1 AND Item_iid = ?2",
        params![db_id(gem.id), iid],
    )?
    .is_some()
    {
        script.skip(format!("Gem {} in item {}", gem.id, iid));
        return Ok(());
    }

    let color = gem.gem_type.as_deref().unwrap_or_default();
    let quality = gem.quality.name();

    tx.execute(
        "INSERT INTO Gem (geid, Item_iid, name, color, quality) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![db_id(gem.id), iid, &gem.name, color, quality],
    )?;
    script.record(
        &gem.name,
        format!(
            "INSERT INTO Gem (geid, Item_iid, name, color, quality) VALUES ({}, {}, {}, {}, {});",
            gem.id,
            iid,
            sql_text(&gem.name),
            sql_text(color),
            sql_text(quality)
        ),
    );
    Ok(())
}

/// Raid -> Monster -> Monster_has_Item for one drop source
fn upsert_source(
    tx: &Transaction<'_>,
    script: &mut InsertScript,
    source: &ItemSource,
    item_id: u64,
    iid: i64,
) -> Result<()> {
    let Some(raid) = source.raid() else {
        script.note(format!("Item {} has no known drop source", item_id));
        return Ok(());
    };
    let heroic = source.difficulty.as_flag();

    let rid = match find_id(
        tx,
        "SELECT rid FROM Raid WHERE name = ?1 COLLATE NOCASE AND heroic = ?2",
        params![raid, heroic],
    )? {
        Some(rid) => {
            script.skip(format!("Raid {} ({})", raid, heroic));
            rid
        }
        None => {
            tx.execute(
                "INSERT INTO Raid (name, heroic) VALUES (?1, ?2)",
                params![raid, heroic],
            )?;
            script.record(
                raid,
                format!(
                    "INSERT INTO Raid (name, heroic) VALUES ({}, {});",
                    sql_text(raid),
                    sql_text(heroic)
                ),
            );
            tx.last_insert_rowid()
        }
    };

    let Some(monster) = source.boss() else {
        script.note(format!("Item {} drops in {} from an unknown source", item_id, raid));
        return Ok(());
    };
    let mid = match find_id(
        tx,
        "SELECT mid FROM Monster WHERE Raid_rid = ?1 AND name = ?2 COLLATE NOCASE",
        params![rid, monster],
    )? {
        Some(mid) => {
            script.skip(format!("Monster {}", monster));
            mid
        }
        None => {
            tx.execute(
                "INSERT INTO Monster (Raid_rid, name) VALUES (?1, ?2)",
                params![rid, monster],
            )?;
            script.record(
                monster,
                format!(
                    "INSERT INTO Monster (Raid_rid, name) VALUES ({}, {});",
                    rid,
                    sql_text(monster)
                ),
            );
            tx.last_insert_rowid()
        }
    };

    if find_id(
        tx,
        "SELECT 1 FROM Monster_has_Item WHERE Monster_mid = ?1 AND Item_iid = ?2",
        params![mid, iid],
    )?
    .is_some()
    {
        script.skip(format!("Monster+Item {}+{}", monster, iid));
        return Ok(());
    }

    tx.execute(
        "INSERT INTO Monster_has_Item (Monster_mid, Item_iid) VALUES (?1, ?2)",
        params![mid, iid],
    )?;
    script.record(
        &format!("Monster+Item {}+{}", monster, iid),
        format!(
            "INSERT INTO Monster_has_Item (Monster_mid, Item_iid) VALUES ({}, {});",
            mid, iid
        ),
    );
    Ok(())
}
