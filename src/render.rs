//! HTML pages
//!
//! Every page is wrapped in [`layout`]. All database and URL text goes through
//! [`html_escape`]; link targets additionally go through `urlencoding`.

use crate::database::{CharacterListing, CharacterSheet, ItemRow};

const STYLESHEET: &str = "https://www.w3.org/StyleSheets/Core/Midnight";
const TOOLTIP_SCRIPT: &str = "https://wow.zamimg.com/widgets/power.js";

/// Example characters linked from the index page
const EXAMPLE_CHARACTERS: [&str; 3] = ["Sedawk-Sargeras", "Bribbomir-Mannoroth", "Onomatopeea-Sargeras"];

/// Simple HTML escaping for text and attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `/char/Name-Realm`
pub fn character_href(name: &str, realm: &str) -> String {
    format!(
        "/char/{}-{}",
        urlencoding::encode(name),
        urlencoding::encode(realm)
    )
}

/// `/guild/Guild-Realm`
pub fn guild_href(guild: &str, realm: &str) -> String {
    format!(
        "/guild/{}-{}",
        urlencoding::encode(guild),
        urlencoding::encode(realm)
    )
}

fn wowhead_href(item_id: i64) -> String {
    format!("https://www.wowhead.com/item={}", item_id)
}

/// Shared page frame: title, stylesheet, tooltip script, error banner, footer
pub fn layout(error: Option<&str>, body: &str) -> String {
    let banner = match error {
        Some(message) => format!(
            r#"<div id="err" class="warning">{}</div>"#,
            html_escape(message)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>WoWDB</title>
    <link rel="stylesheet" href="{STYLESHEET}" type="text/css">
    <script src="{TOOLTIP_SCRIPT}"></script>
</head>
<body>
    <h1>WoWDB</h1>
    {banner}
{body}
    <div id="footer"><small>&copy; DM</small></div>
</body>
</html>
"#
    )
}

/// Index: stored characters, example insert links and known gaps
pub fn index_page(characters: &[CharacterListing], error: Option<&str>) -> String {
    let mut body = String::new();

    if !characters.is_empty() {
        body.push_str("    The database currently contains:\n    <ul>\n");
        for c in characters {
            body.push_str(&format!(
                "        <li><a href=\"{}\">{}-{}</a></li>\n",
                html_escape(&character_href(&c.name, &c.realm)),
                html_escape(&c.name),
                html_escape(&c.realm)
            ));
        }
        body.push_str("    </ul>\n");
    }

    body.push_str(
        "    <br>\n    URLs of this form fetch a character from the armory and insert it, \
         returning the SQL that was executed:\n    <ul>\n",
    );
    for example in EXAMPLE_CHARACTERS {
        let href = format!("/insert/{}.sql", example);
        body.push_str(&format!(
            "        <li><a href=\"{href}\">{href}</a></li>\n",
            href = html_escape(&href)
        ));
    }
    body.push_str(
        "        <li>Any others should work too. Reload this page once you've added a character to browse the DB.</li>\n    </ul>\n",
    );
    body.push_str(
        "    Known gaps:\n    <ul>\n\
         \x20       <li>Secondary spec is only stored when the armory reports two talent specs.</li>\n\
         \x20       <li>Enchants the armory does not name are listed by id.</li>\n\
         \x20   </ul>\n",
    );

    layout(error, &body)
}

/// Character sheet and item list
pub fn character_page(sheet: &CharacterSheet, items: &[ItemRow]) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "    <h2>{}-{}</h2>\n",
        html_escape(&sheet.name),
        html_escape(&sheet.realm)
    ));
    body.push_str(&format!(
        "    <p>\n        Class: {}<br>\n        Spec: {}",
        html_escape(&sheet.class),
        html_escape(&sheet.mspec)
    ));
    if let Some(sspec) = &sheet.sspec {
        body.push_str(&format!("<br>\n        Secondary spec: {}", html_escape(sspec)));
    }
    if let Some(guild) = &sheet.guild {
        body.push_str(&format!(
            "<br>\n        Guild: <a href=\"{}\">{}</a>",
            html_escape(&guild_href(guild, &sheet.realm)),
            html_escape(guild)
        ));
    }
    body.push_str("\n    </p>\n");

    if !items.is_empty() {
        body.push_str("    <h3>Items:</h3>\n    <ul>\n");
        for item in items {
            body.push_str(&item_entry(item));
        }
        body.push_str("    </ul>\n");
    }

    layout(None, &body)
}

fn item_entry(item: &ItemRow) -> String {
    let mut li = format!(
        "        <li>\n            Name: <a href=\"{}\">{}</a><br>\n            ilvl: {}",
        wowhead_href(item.id),
        html_escape(&item.name),
        item.ilvl
    );

    for gem in &item.gems {
        li.push_str(&format!(
            "<br>\n            Gem: <a href=\"{}\">{}</a> ({})",
            wowhead_href(gem.geid),
            html_escape(&gem.name),
            html_escape(&gem.color)
        ));
    }
    if let Some(enchant) = &item.enchant {
        li.push_str(&format!("<br>\n            Enchant: {}", html_escape(enchant)));
    }
    for source in &item.sources {
        li.push_str(&format!(
            "<br>\n            Dropped by: {}<br>\n            In: {}{}",
            html_escape(&source.monster),
            html_escape(&source.raid),
            if source.heroic { " (Heroic)" } else { "" }
        ));
    }

    li.push_str("\n        </li>\n");
    li
}

/// Shown when `/char/...` names a character that was never inserted
pub fn missing_character_page(name: &str, realm: &str) -> String {
    let body = format!(
        "    <h2>{name}-{realm}</h2>\n    <p>Not in the database yet. Try <a href=\"{href}\">{href}</a>.</p>\n",
        name = html_escape(name),
        realm = html_escape(realm),
        href = html_escape(&format!(
            "/insert/{}-{}.sql",
            urlencoding::encode(name),
            urlencoding::encode(realm)
        ))
    );
    layout(None, &body)
}

/// Guild roster
pub fn guild_page(guild: &str, realm: &str, members: &[String]) -> String {
    let mut body = format!(
        "    <h2>{}</h2>\n    <h3>{}</h3>\n",
        html_escape(guild),
        html_escape(realm)
    );

    if members.is_empty() {
        body.push_str("    <p>No characters from this guild are in the database.</p>\n");
    } else {
        body.push_str("    <ul>\n");
        for member in members {
            body.push_str(&format!(
                "        <li><a href=\"{}\">{}</a></li>\n",
                html_escape(&character_href(member, realm)),
                html_escape(member)
            ));
        }
        body.push_str("    </ul>\n");
    }

    layout(None, &body)
}
