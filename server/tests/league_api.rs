//! Write routes against a live Postgres.
//!
//! Needs `DATABASE_URL` (a `.env` file works); the schema is migrated on
//! connect. Without a database every test returns early.

use actix_web::{cookie::Cookie, http::StatusCode, test, web, App};
use league_server::{
    config::Settings,
    db::{self, entry_repo, player_repo},
    http::{
        self,
        auth::{issue_token, SESSION_COOKIE},
    },
};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> Option<(Settings, PgPool)> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    };
    let settings = Settings {
        database_url,
        server_addr: "127.0.0.1:0".into(),
        max_connections: 2,
        admin_email: "admin@league.test".into(),
        admin_password_hash: String::new(),
        session_secret: "0123456789abcdef0123456789abcdef".into(),
        session_ttl_minutes: 60,
        secure_cookies: false,
    };
    let pool = db::connect(&settings).await.expect("connect and migrate");
    Some((settings, pool))
}

fn admin_cookie(settings: &Settings) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, issue_token(settings).unwrap())
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

macro_rules! league_app {
    ($settings:expr, $pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($settings.clone()))
                .app_data(web::Data::new($pool.clone()))
                .configure(http::routes::init_routes),
        )
        .await
    };
}

/// Run a request and return its status with the JSON body.
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

fn id_of(body: &Value) -> Uuid {
    body["id"].as_str().unwrap().parse().unwrap()
}

#[actix_web::test]
async fn entries_for_unknown_game_are_not_found() {
    let Some((settings, pool)) = setup().await else { return };
    let app = league_app!(settings, pool);

    let (status, _) = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/games/{}/entries", Uuid::new_v4()))
            .cookie(admin_cookie(&settings))
            .set_json(json!([]))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unknown_player_rejects_the_whole_batch() {
    let Some((settings, pool)) = setup().await else { return };
    let app = league_app!(settings, pool);
    let cookie = admin_cookie(&settings);

    let (status, player) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/players")
            .cookie(cookie.clone())
            .set_json(json!({ "name": unique("Alice") }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let known = id_of(&player);

    let (status, game) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/games")
            .cookie(cookie.clone())
            .set_json(json!({ "date": "2024-05-03", "bankCost": 500 }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let game_id = id_of(&game);

    let stranger = Uuid::new_v4();
    let (status, body) = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/games/{game_id}/entries"))
            .cookie(cookie.clone())
            .set_json(json!([
                { "playerId": known, "boughtChips": 100, "leftChips": 150 },
                { "playerId": stranger, "boughtChips": 1, "leftChips": 2 },
            ]))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains(&stranger.to_string()));
    assert!(entry_repo::list_for_game(&pool, game_id).await.unwrap().is_empty());

    let (status, body) = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/games/{game_id}/entries"))
            .cookie(cookie.clone())
            .set_json(json!([{ "playerId": known, "boughtChips": "100", "leftChips": 150 }]))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], 1);

    let stored = entry_repo::list_for_game(&pool, game_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!((stored[0].bought_chips, stored[0].left_chips), (100, 150));

    player_repo::delete(&pool, known).await.unwrap();
}

#[actix_web::test]
async fn second_close_conflicts_and_keeps_first_timestamp() {
    let Some((settings, pool)) = setup().await else { return };
    let app = league_app!(settings, pool);
    let cookie = admin_cookie(&settings);

    let (_, game) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/games")
            .cookie(cookie.clone())
            .set_json(json!({ "title": unique("Close me") }))
    );
    let game_id = id_of(&game);
    assert_eq!(game["status"], "OPEN");

    let (status, closed) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/games/{game_id}/close"))
            .cookie(cookie.clone())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "CLOSED");
    assert!(closed["closedAt"].is_string());

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/games/{game_id}/close"))
            .cookie(cookie.clone())
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, current) = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/games/{game_id}"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["status"], "CLOSED");
    assert_eq!(current["closedAt"], closed["closedAt"]);

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/games/{}/close", Uuid::new_v4()))
            .cookie(cookie)
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn duplicate_player_names_conflict() {
    let Some((settings, pool)) = setup().await else { return };
    let app = league_app!(settings, pool);
    let cookie = admin_cookie(&settings);
    let name = unique("Bob");

    let (status, first) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/players")
            .cookie(cookie.clone())
            .set_json(json!({ "name": name }))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/players")
            .cookie(cookie.clone())
            .set_json(json!({ "name": format!("  {name} ") }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, second) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/players")
            .cookie(cookie.clone())
            .set_json(json!({ "name": unique("Carol") }))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/players/{}", id_of(&second)))
            .cookie(cookie.clone())
            .set_json(json!({ "name": name }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    player_repo::delete(&pool, id_of(&first)).await.unwrap();
    player_repo::delete(&pool, id_of(&second)).await.unwrap();
}

#[actix_web::test]
async fn duplicate_subscribers_conflict() {
    let Some((settings, pool)) = setup().await else { return };
    let app = league_app!(settings, pool);
    let email = format!("{}@league.test", unique("fan"));

    let (status, sub) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/subscribe")
            .set_json(json!({ "email": email }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["verified"], false);

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/subscribe")
            .set_json(json!({ "email": email.to_uppercase() }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let token = sub["unsubscribeToken"].as_str().unwrap().to_string();
    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/unsubscribe")
            .set_json(json!({ "token": token }))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/unsubscribe")
            .set_json(json!({ "token": token }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn null_in_patch_clears_only_that_field() {
    let Some((settings, pool)) = setup().await else { return };
    let app = league_app!(settings, pool);
    let cookie = admin_cookie(&settings);

    let (_, game) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/games")
            .cookie(cookie.clone())
            .set_json(json!({ "title": unique("Patch"), "date": "2024-06-07", "bankCost": 500 }))
    );
    let game_id = id_of(&game);

    let (status, patched) = call!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/games/{game_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "bankCost": null }))
    );
    assert_eq!(status, StatusCode::OK);
    assert!(patched["bankCost"].is_null());
    assert_eq!(patched["date"], "2024-06-07");

    let (_, patched) = call!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/games/{game_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "date": null }))
    );
    assert!(patched["date"].is_null());
    assert_eq!(patched["title"], game["title"]);

    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/games/{game_id}"))
            .cookie(cookie)
    );
    assert_eq!(status, StatusCode::OK);
}
