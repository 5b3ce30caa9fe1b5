//! End-to-end session tests against a real Postgres instance.
//!
//! These spin up the full server on a random port with a throwaway
//! database, so they are ignored by default; run them with
//! `cargo test -- --ignored` against a local Postgres.

use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;

use chirpd::configuration::{get_configuration, DatabaseSettings, Settings};
use chirpd::startup::run;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub settings: Settings,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(listener, connection_pool.clone(), configuration.clone())
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
        settings: configuration,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

async fn register_and_login(app: &TestApp, email: &str, password: &str) -> Value {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/users", app.address))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let response = client
        .post(format!("{}/api/login", app.address))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    response.json().await.expect("Failed to parse login response")
}

// --- Login ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn login_returns_user_and_token_pair() {
    let app = spawn_app().await;

    let body = register_and_login(&app, "carol@example.com", "secret123").await;
    assert!(body.get("token").is_some());
    assert!(body.get("refresh_token").is_some());
    assert_eq!(body["email"], "carol@example.com");
    assert_eq!(body["is_premium"], false);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    register_and_login(&app, "dave@example.com", "secret123").await;

    let unknown = client
        .post(format!("{}/api/login", app.address))
        .json(&json!({ "email": "a@x.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request.");
    let wrong_password = client
        .post(format!("{}/api/login", app.address))
        .json(&json!({ "email": "dave@example.com", "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, unknown.status().as_u16());
    assert_eq!(401, wrong_password.status().as_u16());

    let unknown_body: Value = unknown.json().await.unwrap();
    let wrong_body: Value = wrong_password.json().await.unwrap();
    assert_eq!(unknown_body["message"], wrong_body["message"]);
    assert_eq!(unknown_body["code"], wrong_body["code"]);
}

// --- Refresh / revoke ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn refresh_token_mints_new_access_tokens_without_rotation() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, "erin@example.com", "secret123").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    // The same refresh token keeps working; it is not rotated on use
    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/refresh", app.address))
            .header("Authorization", format!("Bearer {}", refresh_token))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(200, response.status().as_u16());

        let body: Value = response.json().await.unwrap();
        assert!(body["token"].as_str().unwrap().len() > 0);
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn expired_refresh_token_cannot_mint_access_tokens() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, "oscar@example.com", "secret123").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();
    let auth_header = format!("Bearer {}", refresh_token);

    // Live token refreshes fine
    let before = client
        .post(format!("{}/api/refresh", app.address))
        .header("Authorization", &auth_header)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, before.status().as_u16());

    // Backdate the token past its lifetime; the user has exactly one row
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET expires_at = now() - interval '1 day'
        WHERE user_id = (SELECT id FROM users WHERE email = 'oscar@example.com')
        "#,
    )
    .execute(&app.db_pool)
    .await
    .expect("Failed to backdate refresh token");

    let after = client
        .post(format!("{}/api/refresh", app.address))
        .header("Authorization", &auth_header)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, after.status().as_u16());

    // Externally identical to every other refresh failure
    let body: Value = after.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoke_is_idempotent_and_kills_the_session() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, "frank@example.com", "secret123").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();
    let auth_header = format!("Bearer {}", refresh_token);

    let first = client
        .post(format!("{}/api/revoke", app.address))
        .header("Authorization", &auth_header)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, first.status().as_u16());

    // Revoking again still succeeds
    let second = client
        .post(format!("{}/api/revoke", app.address))
        .header("Authorization", &auth_header)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, second.status().as_u16());

    // But the token can never refresh again
    let refresh = client
        .post(format!("{}/api/refresh", app.address))
        .header("Authorization", &auth_header)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, refresh.status().as_u16());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoked_and_unknown_tokens_get_the_same_response() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, "grace@example.com", "secret123").await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    client
        .post(format!("{}/api/revoke", app.address))
        .header("Authorization", format!("Bearer {}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request.");

    let revoked = client
        .post(format!("{}/api/refresh", app.address))
        .header("Authorization", format!("Bearer {}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request.");
    let unknown = client
        .post(format!("{}/api/refresh", app.address))
        .header("Authorization", format!("Bearer {}", "A".repeat(64)))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(revoked.status(), unknown.status());
    let revoked_body: Value = revoked.json().await.unwrap();
    let unknown_body: Value = unknown.json().await.unwrap();
    assert_eq!(revoked_body["message"], unknown_body["message"]);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn wrong_authorization_scheme_never_reaches_the_store() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/refresh", app.address))
        .header("Authorization", "Token abc")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Protected resources ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn chirp_creation_requires_a_valid_access_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, "heidi@example.com", "secret123").await;
    let access_token = login["token"].as_str().unwrap();

    let unauthenticated = client
        .post(format!("{}/api/chirps", app.address))
        .json(&json!({ "body": "hello world" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, unauthenticated.status().as_u16());

    let response = client
        .post(format!("{}/api/chirps", app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .json(&json!({ "body": "This is a kerfuffle opinion" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["body"], "This is a **** opinion");
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn only_the_author_can_delete_a_chirp() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let author = register_and_login(&app, "ivan@example.com", "secret123").await;
    let intruder = register_and_login(&app, "judy@example.com", "secret123").await;

    let created: Value = client
        .post(format!("{}/api/chirps", app.address))
        .header("Authorization", format!("Bearer {}", author["token"].as_str().unwrap()))
        .json(&json!({ "body": "mine alone" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    let chirp_id = created["id"].as_str().unwrap();

    let forbidden = client
        .delete(format!("{}/api/chirps/{}", app.address, chirp_id))
        .header("Authorization", format!("Bearer {}", intruder["token"].as_str().unwrap()))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(403, forbidden.status().as_u16());

    let deleted = client
        .delete(format!("{}/api/chirps/{}", app.address, chirp_id))
        .header("Authorization", format!("Bearer {}", author["token"].as_str().unwrap()))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, deleted.status().as_u16());
}

// --- Webhook ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn webhook_upgrade_flips_premium_flag() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, "kim@example.com", "secret123").await;
    let user_id = login["id"].as_str().unwrap();

    let no_key = client
        .post(format!("{}/api/webhooks", app.address))
        .json(&json!({ "event": "user.upgraded", "data": { "user_id": user_id } }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, no_key.status().as_u16());

    let response = client
        .post(format!("{}/api/webhooks", app.address))
        .header(
            "Authorization",
            format!("ApiKey {}", app.settings.auth.webhook_api_key),
        )
        .json(&json!({ "event": "user.upgraded", "data": { "user_id": user_id } }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let (is_premium,): (bool,) =
        sqlx::query_as("SELECT is_premium FROM users WHERE email = 'kim@example.com'")
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch user");
    assert!(is_premium);
}
