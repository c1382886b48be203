use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use rolodex_api::app::{build_router, services::AppServices};
use rolodex_api::config::Config;
use rolodex_infra::RecordingMailer;
use rolodex_limiter::Quota;

struct TestServer {
    base_url: String,
    mailer: Arc<RecordingMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_quotas(Quota::per_minute(10_000), Quota::per_hour(100_000)).await
    }

    /// Same router as prod, bound to an ephemeral port, with a recording
    /// mailer so tests can read verification tokens back out.
    async fn spawn_with_quotas(write_quota: Quota, read_quota: Quota) -> Self {
        let config = Config::for_tests("test-secret");
        let mailer = Arc::new(RecordingMailer::new());

        let mut services = AppServices::in_memory(&config);
        services.mailer = mailer.clone();
        services.write_quota = write_quota;
        services.read_quota = read_quota;

        let app = build_router(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            base_url,
            mailer,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register(client: &reqwest::Client, srv: &TestServer, email: &str) -> reqwest::Response {
    client
        .post(format!("{}/register", srv.base_url))
        .json(&json!({ "email": email, "password": "hunter22" }))
        .send()
        .await
        .unwrap()
}

async fn verify(client: &reqwest::Client, srv: &TestServer, email: &str) {
    let token = srv
        .mailer
        .last_token_for(email)
        .expect("verification email should have been recorded");
    let res = client
        .get(format!("{}/verify-email?token={}", srv.base_url, token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

/// Register, verify, and log in; returns the access token.
async fn onboard(client: &reqwest::Client, srv: &TestServer, email: &str) -> String {
    let res = register(client, srv, email).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    verify(client, srv, email).await;

    let res = client
        .post(format!("{}/login", srv.base_url))
        .json(&json!({ "email": email, "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

fn contact_body(first: &str) -> serde_json::Value {
    json!({
        "first_name": first,
        "last_name": "Lovelace",
        "email": format!("{}@example.com", first.to_lowercase()),
        "phone": "+44 20 7946 0000",
        "birth_date": "1990-06-05",
        "notes": null,
    })
}

#[tokio::test]
async fn root_and_health_are_public() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = reqwest::get(format!("{}/", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn registration_and_verification_flow() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = register(&client, &srv, "ada@example.com").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["is_verified"], false);
    assert!(body.get("password_hash").is_none());

    // Login is refused until the email is verified.
    let res = client
        .post(format!("{}/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = srv.mailer.last_token_for("ada@example.com").unwrap();
    verify(&client, &srv, "ada@example.com").await;

    // The token is single use.
    let res = client
        .get(format!("{}/verify-email?token={}", srv.base_url, token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_email_and_short_password_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    assert_eq!(
        register(&client, &srv, "ada@example.com").await.status(),
        StatusCode::CREATED
    );
    let res = register(&client, &srv, "ada@example.com").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(format!("{}/register", srv.base_url))
        .json(&json!({ "email": "short@example.com", "password": "five5" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_uniform_401s() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    onboard(&client, &srv, "ada@example.com").await;

    for (email, password) in [
        ("ada@example.com", "wrong-password"),
        ("nobody@example.com", "hunter22"),
    ] {
        let res = client
            .post(format!("{}/login", srv.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn protected_routes_require_a_valid_access_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/contacts/", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers().get("www-authenticate").unwrap(),
        "Bearer"
    );

    let res = client
        .get(format!("{}/contacts/", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_tokens_cannot_be_used_as_access_tokens() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    onboard(&client, &srv, "ada@example.com").await;

    let res = client
        .post(format!("{}/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let refresh_token = body["refresh_token"].as_str().unwrap();

    let res = client
        .get(format!("{}/contacts/", srv.base_url))
        .bearer_auth(refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_issues_a_new_pair() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    onboard(&client, &srv, "ada@example.com").await;

    let res = client
        .post(format!("{}/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let access_token = body["access_token"].as_str().unwrap().to_string();
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/refresh", srv.base_url))
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let pair: serde_json::Value = res.json().await.unwrap();
    assert!(pair["access_token"].as_str().is_some());
    assert!(pair["refresh_token"].as_str().is_some());

    // A live access token is also exchangeable: the endpoint checks
    // structural validity, not the kind tag.
    let res = client
        .post(format!("{}/refresh", srv.base_url))
        .json(&json!({ "refresh_token": access_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let pair: serde_json::Value = res.json().await.unwrap();
    assert!(pair["access_token"].as_str().is_some());
    assert!(pair["refresh_token"].as_str().is_some());

    let res = client
        .post(format!("{}/refresh", srv.base_url))
        .json(&json!({ "refresh_token": "garbage" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn resend_verification_rotates_the_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &srv, "ada@example.com").await;
    let old_token = srv.mailer.last_token_for("ada@example.com").unwrap();

    let res = client
        .post(format!(
            "{}/resend-verification?email=ada@example.com",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let new_token = srv.mailer.last_token_for("ada@example.com").unwrap();
    assert_ne!(old_token, new_token);

    // The replaced token no longer verifies; the fresh one does.
    let res = client
        .get(format!("{}/verify-email?token={}", srv.base_url, old_token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/verify-email?token={}", srv.base_url, new_token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Verified accounts cannot request another token.
    let res = client
        .post(format!(
            "{}/resend-verification?email=ada@example.com",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!(
            "{}/resend-verification?email=nobody@example.com",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contact_lifecycle_create_read_update_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = onboard(&client, &srv, "ada@example.com").await;

    let res = client
        .post(format!("{}/contacts/", srv.base_url))
        .bearer_auth(&token)
        .json(&contact_body("Grace"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/contacts/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["first_name"], "Grace");

    let res = client
        .put(format!("{}/contacts/{}", srv.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "phone": "+1 555 0100" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["phone"], "+1 555 0100");
    assert_eq!(updated["first_name"], "Grace");

    let res = client
        .get(format!("{}/contacts/", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let res = client
        .delete(format!("{}/contacts/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/contacts/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contacts_are_isolated_between_owners() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let ada = onboard(&client, &srv, "ada@example.com").await;
    let bob = onboard(&client, &srv, "bob@example.com").await;

    let res = client
        .post(format!("{}/contacts/", srv.base_url))
        .bearer_auth(&ada)
        .json(&contact_body("Grace"))
        .send()
        .await
        .unwrap();
    let id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // The other owner sees 404 for reads and mutations alike.
    let res = client
        .get(format!("{}/contacts/{}", srv.base_url, id))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/contacts/{}", srv.base_url, id))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/contacts/", srv.base_url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert!(res.json::<serde_json::Value>().await.unwrap()
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn search_and_birthday_queries() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = onboard(&client, &srv, "ada@example.com").await;

    for first in ["Grace", "Alan"] {
        let res = client
            .post(format!("{}/contacts/", srv.base_url))
            .bearer_auth(&token)
            .json(&contact_body(first))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/contacts/search/?query=gra", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let hits: serde_json::Value = res.json().await.unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["first_name"], "Grace");

    let res = client
        .get(format!(
            "{}/contacts/birthdays/upcoming/?days=365",
            srv.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<serde_json::Value>().await.unwrap()
            .as_array()
            .unwrap()
            .len(),
        2
    );

    let res = client
        .get(format!(
            "{}/contacts/birthdays/upcoming/?days=9999",
            srv.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rate_limit_rejects_with_headers() {
    let srv =
        TestServer::spawn_with_quotas(Quota::per_minute(3), Quota::per_hour(100_000)).await;
    let client = reqwest::Client::new();
    let token = onboard(&client, &srv, "ada@example.com").await;

    for i in 0..3 {
        let res = client
            .post(format!("{}/contacts/", srv.base_url))
            .bearer_auth(&token)
            .json(&contact_body(&format!("C{i}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .post(format!("{}/contacts/", srv.base_url))
        .bearer_auth(&token)
        .json(&contact_body("Over"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers().get("x-ratelimit-limit").unwrap(), "3");
    assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), "0");
    assert!(res.headers().contains_key("retry-after"));
    assert!(res.headers().contains_key("x-ratelimit-reset"));

    // Reads use a separate class and stay admitted.
    let res = client
        .get(format!("{}/contacts/", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn avatar_upload_and_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = onboard(&client, &srv, "ada@example.com").await;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
            .file_name("avatar.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let res = client
        .put(format!("{}/users/avatar", srv.base_url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["avatar_url"].as_str().unwrap().starts_with("/avatars/"));

    // Non-image parts are refused.
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::text("plain text")
            .file_name("note.txt")
            .mime_str("text/plain")
            .unwrap(),
    );
    let res = client
        .put(format!("{}/users/avatar", srv.base_url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(format!("{}/users/avatar", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/users/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.json::<serde_json::Value>().await.unwrap()["avatar_url"].is_null());
}
