//! Integration tests for the HTTP API, driven through the router without
//! binding a socket. Each test gets its own in-memory database; Brevo is
//! stood in for by wiremock where the newsletter relay matters.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use majalla::config::BrevoConfig;
use majalla::content::ContentBlock;
use majalla::http::{router, AppState};
use majalla::relay::BrevoRelay;
use majalla::storage::{ArticleStatus, Database, NewArticle, NewUser};

async fn test_app() -> (Router, Database) {
    let db = Database::open(":memory:").await.unwrap();
    let relay = BrevoRelay::new(&BrevoConfig::default());
    let app = router(AppState {
        db: db.clone(),
        relay,
    });
    (app, db)
}

async fn test_app_with_brevo(brevo_base: &str) -> (Router, Database) {
    let db = Database::open(":memory:").await.unwrap();
    let relay = BrevoRelay::new(&BrevoConfig {
        api_key: Some("test-key".into()),
        list_id: Some(7),
        base_url: brevo_base.to_string(),
    });
    let app = router(AppState {
        db: db.clone(),
        relay,
    });
    (app, db)
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as_user(uri: &str, user_id: i64) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .body(Body::empty())
        .unwrap()
}

fn send_json(http_method: &str, uri: &str, user_id: Option<i64>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(http_method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn seed_user(db: &Database) -> i64 {
    db.insert_user(&NewUser {
        username: "reader".into(),
        email: "reader@example.com".into(),
        ..Default::default()
    })
    .await
    .unwrap()
}

fn seed_article(slug: &str, title: &str, featured: bool) -> NewArticle {
    NewArticle {
        slug: slug.to_string(),
        title: title.to_string(),
        title_ar: Some(format!("{} بالعربية", title)),
        excerpt: format!("About {}", title),
        status: ArticleStatus::Published,
        featured,
        published_at: Some(Utc::now() - Duration::days(1)),
        ..Default::default()
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_account_routes_require_user_header() {
    let (app, _db) = test_app().await;

    for request in [
        get("/api/account/recently-read"),
        send_json("POST", "/api/account/recently-read", None, json!({"slug": "x"})),
        send_json("PATCH", "/api/account/profile", None, json!({"firstName": "A"})),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_garbage_user_header_rejected() {
    let (app, _db) = test_app().await;
    let request = Request::builder()
        .uri("/api/account/recently-read")
        .header("x-user-id", "not-a-number")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Articles
// ============================================================================

#[tokio::test]
async fn test_list_articles_default_limit() {
    let (app, db) = test_app().await;
    for i in 0..6 {
        db.insert_article(&seed_article(&format!("a-{}", i), &format!("A{}", i), false))
            .await
            .unwrap();
    }

    let response = app.oneshot(get("/api/articles")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_list_articles_limit_parsing() {
    let (app, db) = test_app().await;
    for i in 0..6 {
        db.insert_article(&seed_article(&format!("a-{}", i), &format!("A{}", i), false))
            .await
            .unwrap();
    }

    // Explicit limit
    let response = app.clone().oneshot(get("/api/articles?limit=2")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 2);

    // Unparseable limit falls back to the default
    let response = app
        .clone()
        .oneshot(get("/api/articles?limit=abc"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 4);

    // Zero is clamped up to one
    let response = app.oneshot(get("/api/articles?limit=0")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_articles_featured_filter() {
    let (app, db) = test_app().await;
    db.insert_article(&seed_article("plain", "Plain", false))
        .await
        .unwrap();
    db.insert_article(&seed_article("starred", "Starred", true))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/articles?featured=true"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let articles = body["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["slug"], "starred");

    // Only the literal "true" filters
    let response = app.oneshot(get("/api/articles?featured=yes")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_article_unknown_slug_404() {
    let (app, _db) = test_app().await;
    let response = app.oneshot(get("/api/articles/no-such-piece")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_get_article_renders_blocks_per_locale() {
    let (app, db) = test_app().await;
    let mut article = seed_article("bilingual", "Bilingual", false);
    article.blocks = vec![ContentBlock::Text {
        text_html: Some("<p>Hello</p>".into()),
        arabic_content: Some("<p>مرحبا</p>".into()),
    }];
    db.insert_article(&article).await.unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/articles/bilingual"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rendered = body["article"]["rendered"][0].as_str().unwrap();
    assert!(rendered.contains("<p>Hello</p>"));

    let response = app
        .oneshot(get("/api/articles/bilingual?locale=ar"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let rendered = body["article"]["rendered"][0].as_str().unwrap();
    assert!(rendered.contains("مرحبا"));
    assert_eq!(body["article"]["title"]["ar"], "Bilingual بالعربية");
    assert!(body["article"]["blocks"].is_array());
}

#[tokio::test]
async fn test_get_article_counts_views() {
    let (app, db) = test_app().await;
    db.insert_article(&seed_article("counted", "Counted", false))
        .await
        .unwrap();

    for _ in 0..3 {
        app.clone()
            .oneshot(get("/api/articles/counted"))
            .await
            .unwrap();
    }

    let article = db.get_published_by_slug("counted").await.unwrap().unwrap();
    assert_eq!(article.view_count, 3);
}

#[tokio::test]
async fn test_list_categories() {
    let (app, db) = test_app().await;
    db.create_category("culture", "Culture", "ثقافة")
        .await
        .unwrap();

    let response = app.oneshot(get("/api/article-categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["slug"], "culture");
    assert_eq!(categories[0]["titleAr"], "ثقافة");
}

// ============================================================================
// Account: Recently Read
// ============================================================================

#[tokio::test]
async fn test_record_and_list_recently_read() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db).await;
    db.insert_article(&seed_article("old-amman", "Old Amman", false))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/account/recently-read",
            Some(user_id),
            json!({"slug": "old-amman"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let response = app
        .oneshot(get_as_user("/api/account/recently-read", user_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["article"]["slug"], "old-amman");
    assert!(items[0]["readAt"].is_string());
}

#[tokio::test]
async fn test_record_read_validates_slug() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db).await;

    for slug in [json!(""), json!("   "), json!("x".repeat(300))] {
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/account/recently-read",
                Some(user_id),
                json!({ "slug": slug }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_slug");
    }
}

#[tokio::test]
async fn test_record_read_unknown_article_404() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db).await;

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/account/recently-read",
            Some(user_id),
            json!({"slug": "nope"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_record_read_unknown_user_404() {
    let (app, db) = test_app().await;
    db.insert_article(&seed_article("exists", "Exists", false))
        .await
        .unwrap();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/account/recently-read",
            Some(424242),
            json!({"slug": "exists"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "user_not_found");
}

// ============================================================================
// Account: Profile
// ============================================================================

#[tokio::test]
async fn test_update_profile_trims_and_persists() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db).await;

    let response = app
        .oneshot(send_json(
            "PATCH",
            "/api/account/profile",
            Some(user_id),
            json!({"firstName": "  Rami  ", "lastName": "Nasser"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user = db.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.first_name, "Rami");
    assert_eq!(user.last_name, "Nasser");
}

#[tokio::test]
async fn test_update_profile_rejects_empty_update() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db).await;

    let response = app
        .oneshot(send_json(
            "PATCH",
            "/api/account/profile",
            Some(user_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no_updates");
}

#[tokio::test]
async fn test_update_profile_blank_field_clears_value() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db).await;
    db.update_profile(
        user_id,
        &majalla::storage::ProfileUpdate {
            first_name: Some("Rami".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // A present-but-blank field is a recognized update that clears the value
    let response = app
        .oneshot(send_json(
            "PATCH",
            "/api/account/profile",
            Some(user_id),
            json!({"firstName": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user = db.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.first_name, "");
}

// ============================================================================
// Newsletter
// ============================================================================

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let (app, _db) = test_app().await;

    for email in ["", "not-an-email", "a @b.com", "a@b"] {
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/newsletter",
                None,
                json!({ "email": email }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "email: {email:?}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_email");
    }
}

#[tokio::test]
async fn test_newsletter_stores_and_relays() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/contacts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, db) = test_app_with_brevo(&mock_server.uri()).await;

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/newsletter",
            None,
            json!({"email": "  Reader@Example.COM "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["brevo"]["ok"], true);
    assert_eq!(body["brevo"]["status"], 201);

    // Address normalized before storage
    assert_eq!(db.subscriber_count().await.unwrap(), 1);
    let row: (String,) = sqlx::query_as("SELECT email FROM newsletter_subscribers")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(row.0, "reader@example.com");
}

#[tokio::test]
async fn test_newsletter_succeeds_when_relay_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/contacts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (app, db) = test_app_with_brevo(&mock_server.uri()).await;

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/newsletter",
            None,
            json!({"email": "reader@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["brevo"]["ok"], false);
    assert_eq!(body["brevo"]["status"], 500);

    // The local record is the source of truth
    assert_eq!(db.subscriber_count().await.unwrap(), 1);
}
