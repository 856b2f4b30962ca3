//! Schema and read-only queries
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Name comparisons are case-insensitive so `/char/sedawk-sargeras` finds `Sedawk`.

use rusqlite::{params, Connection, OptionalExtension};

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Initialize the database schema
///
/// Safe to run more than once: every table is `CREATE TABLE IF NOT EXISTS`.
///
/// Foreign keys are declared but not enforced on this connection: an item
/// row is written before the enchant it references (see `upsert`).
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", false)?;
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS Realm (
            reid INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(20) NOT NULL
        );

        CREATE TABLE IF NOT EXISTS Guild (
            gid INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(24) NULL,
            Realm_reid INT NOT NULL,
            CONSTRAINT fk_Guild_Realm1
                FOREIGN KEY (Realm_reid) REFERENCES Realm (reid)
        );

        -- Guild_gid is NULL for characters without a guild
        CREATE TABLE IF NOT EXISTS Character (
            cid INTEGER PRIMARY KEY AUTOINCREMENT,
            Guild_gid INT NULL,
            name VARCHAR(12) NOT NULL,
            Realm_reid INT NOT NULL,
            class VARCHAR(12) NOT NULL,
            mspec CHAR(10) NOT NULL,
            sspec CHAR(10) NULL,
            CONSTRAINT fk_Character_Guild
                FOREIGN KEY (Guild_gid) REFERENCES Guild (gid),
            CONSTRAINT fk_Character_Realm1
                FOREIGN KEY (Realm_reid) REFERENCES Realm (reid)
        );

        CREATE TABLE IF NOT EXISTS Enchant (
            eid INT NOT NULL,
            name VARCHAR(150) NOT NULL,
            PRIMARY KEY (eid)
        );

        -- id is the armory item id; iid is the row id other tables reference
        CREATE TABLE IF NOT EXISTS Item (
            iid INTEGER PRIMARY KEY AUTOINCREMENT,
            Enchant_eid INT,
            name VARCHAR(150) NOT NULL,
            ilvl INT NOT NULL,
            id INT NOT NULL,
            CONSTRAINT fk_Item_Enchant1
                FOREIGN KEY (Enchant_eid) REFERENCES Enchant (eid)
        );

        CREATE TABLE IF NOT EXISTS Raid (
            rid INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(45) NOT NULL,
            heroic CHAR(1) NOT NULL
        );

        CREATE TABLE IF NOT EXISTS Monster (
            mid INTEGER PRIMARY KEY AUTOINCREMENT,
            Raid_rid INT NOT NULL,
            name VARCHAR(150) NOT NULL,
            CONSTRAINT fk_Monster_Raid1
                FOREIGN KEY (Raid_rid) REFERENCES Raid (rid)
        );

        CREATE TABLE IF NOT EXISTS Gem (
            geid INT NOT NULL,
            Item_iid INT NOT NULL,
            name VARCHAR(150) NOT NULL,
            color VARCHAR(20) NOT NULL,
            quality VARCHAR(20) NOT NULL,
            PRIMARY KEY (geid, Item_iid),
            CONSTRAINT fk_Gem_Item1
                FOREIGN KEY (Item_iid) REFERENCES Item (iid)
        );

        CREATE TABLE IF NOT EXISTS Character_has_Item (
            Character_cid INT NOT NULL,
            Item_iid INT NOT NULL,
            PRIMARY KEY (Character_cid, Item_iid),
            CONSTRAINT fk_Character_has_Item_Character1
                FOREIGN KEY (Character_cid) REFERENCES Character (cid),
            CONSTRAINT fk_Character_has_Item_Item1
                FOREIGN KEY (Item_iid) REFERENCES Item (iid)
        );

        CREATE TABLE IF NOT EXISTS Monster_has_Item (
            Monster_mid INT NOT NULL,
            Item_iid INT NOT NULL,
            PRIMARY KEY (Monster_mid, Item_iid),
            CONSTRAINT fk_Monster_has_Item_Monster1
                FOREIGN KEY (Monster_mid) REFERENCES Monster (mid),
            CONSTRAINT fk_Monster_has_Item_Item1
                FOREIGN KEY (Item_iid) REFERENCES Item (iid)
        );
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

// ── Page Query Functions ──────────────────────────────────────────────────

/// A stored character and its realm (index page entry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterListing {
    pub name: String,
    pub realm: String,
}

/// Header data for the character page
#[derive(Debug, Clone)]
pub struct CharacterSheet {
    pub name: String,
    pub realm: String,
    pub class: String,
    pub mspec: String,
    pub sspec: Option<String>,
    pub guild: Option<String>,
}

/// One equipped item with its enchant, gems and drop sources
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub iid: i64,
    /// Armory item id (used for Wowhead links)
    pub id: i64,
    pub name: String,
    pub ilvl: u32,
    pub enchant_eid: Option<i64>,
    pub enchant: Option<String>,
    pub gems: Vec<GemRow>,
    pub sources: Vec<DropSource>,
}

#[derive(Debug, Clone)]
pub struct GemRow {
    pub geid: i64,
    pub name: String,
    pub color: String,
    pub quality: String,
}

#[derive(Debug, Clone)]
pub struct DropSource {
    pub monster: String,
    pub raid: String,
    pub heroic: bool,
}

/// Every (character, realm) pair in the database, ordered by realm then name
pub fn character_list(conn: &Connection) -> DbResult<Vec<CharacterListing>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, r.name
         FROM Character c
         JOIN Realm r ON r.reid = c.Realm_reid
         ORDER BY r.name, c.name",
    )?;

    let results: DbResult<Vec<CharacterListing>> = stmt
        .query_map([], |row| {
            Ok(CharacterListing {
                name: row.get(0)?,
                realm: row.get(1)?,
            })
        })?
        .collect();
    results
}

/// Class, spec and guild of one character
pub fn character_sheet(
    conn: &Connection,
    name: &str,
    realm: &str,
) -> DbResult<Option<CharacterSheet>> {
    conn.query_row(
        "SELECT c.name, r.name, c.class, c.mspec, c.sspec, g.name
         FROM Character c
         JOIN Realm r ON r.reid = c.Realm_reid
         LEFT JOIN Guild g ON g.gid = c.Guild_gid
         WHERE c.name = ?1 COLLATE NOCASE AND r.name = ?2 COLLATE NOCASE",
        params![name, realm],
        |row| {
            Ok(CharacterSheet {
                name: row.get(0)?,
                realm: row.get(1)?,
                class: row.get(2)?,
                mspec: row.get(3)?,
                sspec: row.get(4)?,
                guild: row.get(5)?,
            })
        },
    )
    .optional()
}

/// All items a character wears, in insertion order
pub fn item_list(conn: &Connection, name: &str, realm: &str) -> DbResult<Vec<ItemRow>> {
    let mut stmt = conn.prepare(
        "SELECT i.iid, i.id, i.name, i.ilvl, i.Enchant_eid, e.name
         FROM Item i
         JOIN Character_has_Item ci ON ci.Item_iid = i.iid
         JOIN Character c ON c.cid = ci.Character_cid
         JOIN Realm r ON r.reid = c.Realm_reid
         LEFT JOIN Enchant e ON e.eid = i.Enchant_eid
         WHERE c.name = ?1 COLLATE NOCASE AND r.name = ?2 COLLATE NOCASE
         ORDER BY i.iid",
    )?;

    let items: DbResult<Vec<ItemRow>> = stmt
        .query_map(params![name, realm], |row| {
            Ok(ItemRow {
                iid: row.get(0)?,
                id: row.get(1)?,
                name: row.get(2)?,
                ilvl: row.get(3)?,
                enchant_eid: row.get(4)?,
                enchant: row.get(5)?,
                gems: Vec::new(),
                sources: Vec::new(),
            })
        })?
        .collect();

    let mut items = items?;
    for item in &mut items {
        item.gems = gems_for_item(conn, item.iid)?;
        item.sources = sources_for_item(conn, item.iid)?;
    }
    Ok(items)
}

fn gems_for_item(conn: &Connection, iid: i64) -> DbResult<Vec<GemRow>> {
    let mut stmt = conn.prepare_cached(
        "SELECT geid, name, color, quality FROM Gem WHERE Item_iid = ?1 ORDER BY rowid",
    )?;
    let results: DbResult<Vec<GemRow>> = stmt
        .query_map(params![iid], |row| {
            Ok(GemRow {
                geid: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                quality: row.get(3)?,
            })
        })?
        .collect();
    results
}

fn sources_for_item(conn: &Connection, iid: i64) -> DbResult<Vec<DropSource>> {
    let mut stmt = conn.prepare_cached(
        "SELECT m.name, r.name, r.heroic
         FROM Monster_has_Item mi
         JOIN Monster m ON m.mid = mi.Monster_mid
         JOIN Raid r ON r.rid = m.Raid_rid
         WHERE mi.Item_iid = ?1
         ORDER BY r.name, m.name",
    )?;
    let results: DbResult<Vec<DropSource>> = stmt
        .query_map(params![iid], |row| {
            let heroic: String = row.get(2)?;
            Ok(DropSource {
                monster: row.get(0)?,
                raid: row.get(1)?,
                heroic: heroic == "h",
            })
        })?
        .collect();
    results
}

/// Names of the characters in a guild on a realm, alphabetically
pub fn guild_listing(conn: &Connection, guild: &str, realm: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT c.name
         FROM Character c
         JOIN Realm r ON r.reid = c.Realm_reid
         JOIN Guild g ON g.gid = c.Guild_gid
         WHERE g.name = ?1 COLLATE NOCASE AND r.name = ?2 COLLATE NOCASE
         ORDER BY c.name",
    )?;

    let results: DbResult<Vec<String>> = stmt
        .query_map(params![guild, realm], |row| row.get(0))?
        .collect();
    results
}

/// Row count of a schema table (diagnostics and tests)
pub fn table_count(conn: &Connection, table: Table) -> DbResult<i64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", table.name()),
        [],
        |row| row.get(0),
    )
}

/// The tables created by [`init_schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Realm,
    Guild,
    Character,
    Enchant,
    Item,
    Raid,
    Monster,
    Gem,
    CharacterHasItem,
    MonsterHasItem,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Realm,
        Table::Guild,
        Table::Character,
        Table::Enchant,
        Table::Item,
        Table::Raid,
        Table::Monster,
        Table::Gem,
        Table::CharacterHasItem,
        Table::MonsterHasItem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Realm => "Realm",
            Table::Guild => "Guild",
            Table::Character => "Character",
            Table::Enchant => "Enchant",
            Table::Item => "Item",
            Table::Raid => "Raid",
            Table::Monster => "Monster",
            Table::Gem => "Gem",
            Table::CharacterHasItem => "Character_has_Item",
            Table::MonsterHasItem => "Monster_has_Item",
        }
    }
}
