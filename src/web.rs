//! Web front end
//!
//! Four routes: insert a character (returns the SQL it ran), view a character,
//! view a guild, and the index page for everything else.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use rusqlite::Connection;

use crate::armory::ArmoryClient;
use crate::database::{character_list, character_sheet, guild_listing, item_list};
use crate::error::{Result, WowDbError};
use crate::render;
use crate::upsert::insert_character;

/// Shared application state (database connection + armory client)
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    armory: Arc<ArmoryClient>,
}

impl AppState {
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| WowDbError::LockPoisoned)
    }
}

/// Split `Name-Realm` (or `Guild-Realm`) on the first hyphen.
///
/// Character and guild names cannot contain hyphens; realm names can
/// (`Azjol-Nerub`), so everything after the first one is the realm.
pub fn split_slug(slug: &str) -> Result<(String, String)> {
    match slug.split_once('-') {
        Some((name, realm)) if !name.trim().is_empty() && !realm.trim().is_empty() => {
            Ok((name.trim().to_string(), realm.trim().to_string()))
        }
        _ => Err(WowDbError::InvalidSlug(slug.to_string())),
    }
}

fn status_for(err: &WowDbError) -> StatusCode {
    match err {
        WowDbError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
        WowDbError::CharacterNotFound(_) | WowDbError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        WowDbError::Network(_) | WowDbError::HttpStatus(_) | WowDbError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
        WowDbError::Database(_) | WowDbError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Errors render the index page with the message in the warning banner
impl IntoResponse for WowDbError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request failed: {}", self);
        }
        (status, Html(render::index_page(&[], Some(&self.to_string())))).into_response()
    }
}

/// GET /insert/{Name-Realm}.sql
async fn insert_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response> {
    let character = slug
        .strip_suffix(".sql")
        .ok_or_else(|| WowDbError::InvalidSlug(slug.clone()))?;
    let (name, realm) = split_slug(character)?;

    let snapshot = state.armory.fetch_snapshot(&name, &realm).await?;

    let script = {
        let mut conn = state.conn()?;
        insert_character(&mut conn, &snapshot)?
    };

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        script.to_string(),
    )
        .into_response())
}

/// GET /char/{Name-Realm}
async fn character_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response> {
    let (name, realm) = split_slug(&slug)?;
    let conn = state.conn()?;

    match character_sheet(&conn, &name, &realm)? {
        Some(sheet) => {
            let items = item_list(&conn, &sheet.name, &sheet.realm)?;
            Ok(Html(render::character_page(&sheet, &items)).into_response())
        }
        None => Ok((
            StatusCode::NOT_FOUND,
            Html(render::missing_character_page(&name, &realm)),
        )
            .into_response()),
    }
}

/// GET /guild/{Guild-Realm}
async fn guild_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let (guild, realm) = split_slug(&slug)?;
    let conn = state.conn()?;
    let members = guild_listing(&conn, &guild, &realm)?;
    Ok(Html(render::guild_page(&guild, &realm, &members)))
}

/// GET / and every unmatched path
async fn index_handler(State(state): State<AppState>) -> Result<Html<String>> {
    let conn = state.conn()?;
    let characters = character_list(&conn)?;
    Ok(Html(render::index_page(&characters, None)))
}

/// Build the web server router
pub fn create_router(db: Arc<Mutex<Connection>>, armory: Arc<ArmoryClient>) -> Router {
    let state = AppState { db, armory };

    Router::new()
        .route("/", get(index_handler))
        .route("/insert/{slug}", get(insert_handler))
        .route("/char/{slug}", get(character_handler))
        .route("/guild/{slug}", get(guild_handler))
        .fallback(index_handler)
        .with_state(state)
}

/// Start the web server and run until Ctrl-C
pub async fn serve(
    db: Arc<Mutex<Connection>>,
    armory: Arc<ArmoryClient>,
    addr: SocketAddr,
) -> std::io::Result<()> {
    let app = create_router(db, armory);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("WoWDB listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    log::info!("Shutting down web server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armory::fixtures::{test_snapshot, test_snapshot_for};
    use crate::init_schema;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router(snapshots: &[crate::armory::CharacterSnapshot]) -> Router {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        for snapshot in snapshots {
            insert_character(&mut conn, snapshot).unwrap();
        }
        // Nothing in these tests reaches the armory
        let armory = Arc::new(ArmoryClient::new("http://127.0.0.1:9").unwrap());
        create_router(Arc::new(Mutex::new(conn)), armory)
    }

    async fn request(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn split_slug_on_first_hyphen() {
        assert_eq!(
            split_slug("Sedawk-Sargeras").unwrap(),
            ("Sedawk".to_string(), "Sargeras".to_string())
        );
        assert_eq!(
            split_slug("Tank-Azjol-Nerub").unwrap(),
            ("Tank".to_string(), "Azjol-Nerub".to_string())
        );
    }

    #[test]
    fn split_slug_rejects_malformed() {
        assert!(matches!(split_slug("Sedawk"), Err(WowDbError::InvalidSlug(_))));
        assert!(matches!(split_slug("-Sargeras"), Err(WowDbError::InvalidSlug(_))));
        assert!(matches!(split_slug("Sedawk-"), Err(WowDbError::InvalidSlug(_))));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            status_for(&WowDbError::InvalidSlug("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&WowDbError::CharacterNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&WowDbError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&WowDbError::LockPoisoned),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn index_lists_characters() {
        let router = test_router(&[test_snapshot()]);
        let (status, body) = request(router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<a href="/char/Sedawk-Sargeras">Sedawk-Sargeras</a>"#));
    }

    #[tokio::test]
    async fn unknown_path_falls_back_to_index() {
        let router = test_router(&[]);
        let (status, body) = request(router, "/no/such/page").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/insert/Sedawk-Sargeras.sql"));
        assert!(!body.contains("The database currently contains"));
    }

    #[tokio::test]
    async fn character_page_shows_items() {
        let router = test_router(&[test_snapshot()]);
        let (status, body) = request(router, "/char/sedawk-sargeras").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h2>Sedawk-Sargeras</h2>"));
        assert!(body.contains("Journey&#39;s End"));
        assert!(body.contains(r#"<a href="/guild/Ensidia-Sargeras">Ensidia</a>"#));
    }

    #[tokio::test]
    async fn unknown_character_is_404() {
        let router = test_router(&[]);
        let (status, body) = request(router, "/char/Nobody-Sargeras").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("/insert/Nobody-Sargeras.sql"));
    }

    #[tokio::test]
    async fn malformed_slug_renders_error_banner() {
        let router = test_router(&[]);
        let (status, body) = request(router, "/char/Sedawk").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(r#"<div id="err" class="warning">Expected Name-Realm, got: Sedawk</div>"#));
    }

    #[tokio::test]
    async fn guild_page_lists_members() {
        let router = test_router(&[
            test_snapshot_for("Sedawk", "Sargeras", Some("Ensidia")),
            test_snapshot_for("Kungen", "Sargeras", Some("Ensidia")),
        ]);
        let (status, body) = request(router, "/guild/Ensidia-Sargeras").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<a href="/char/Kungen-Sargeras">Kungen</a>"#));
        assert!(body.contains(r#"<a href="/char/Sedawk-Sargeras">Sedawk</a>"#));
    }

    #[tokio::test]
    async fn guild_realm_with_space_is_decoded() {
        let router = test_router(&[test_snapshot_for("Sedawk", "Burning Legion", Some("Ensidia"))]);
        let (status, body) = request(router, "/guild/Ensidia-Burning%20Legion").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h3>Burning Legion</h3>"));
        assert!(body.contains(r#"<a href="/char/Sedawk-Burning%20Legion">Sedawk</a>"#));
    }

    #[tokio::test]
    async fn insert_requires_sql_suffix() {
        let router = test_router(&[]);
        let (status, _) = request(router, "/insert/Sedawk-Sargeras").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
