//! End-to-end API tests: the real router, real stores on a scratch data
//! directory, no socket. Requests are built by hand and pushed through
//! `Router::dispatch`, which is exactly what the server does per request.

use std::sync::Arc;
use std::time::Duration;

use plinth::app::{self, AppState};
use plinth::config::Config;
use plinth::store::Store as _;
use plinth::{Method, Request, Response, Router};

struct TestApp {
    state: Arc<AppState>,
    router: Router,
    // Held for its Drop: the scratch data directory lives as long as the app.
    _data_dir: tempfile::TempDir,
}

async fn test_app() -> TestApp {
    let data_dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: data_dir.path().to_owned(),
        token_lifetime: Duration::from_secs(3600),
        ..Config::default()
    };
    let state = AppState::new(config).await.unwrap();
    let router = app::router(&state);
    TestApp { state, router, _data_dir: data_dir }
}

fn json_body(resp: &Response) -> serde_json::Value {
    serde_json::from_slice(resp.body()).unwrap()
}

async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let req = Request::builder(Method::Post, "/api/login")
        .json(&serde_json::json!({ "username": username, "password": password }))
        .build();
    let resp = app.router.dispatch(req).await;
    assert_eq!(resp.status_code(), 200, "login failed: {:?}", json_body(&resp));
    json_body(&resp)["access_token"].as_str().unwrap().to_owned()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// ── todos ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn todo_created_is_immediately_readable() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/todos")
                .json(&serde_json::json!({ "task": "water the plants" }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 201);
    let created = json_body(&resp);

    let listed = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/todos").build())
        .await;
    assert_eq!(json_body(&listed), serde_json::json!([created]));
    assert_eq!(created["completed"], false);
}

#[tokio::test]
async fn todo_double_delete_is_404_the_second_time() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/todos")
                .json(&serde_json::json!({ "task": "x" }))
                .build(),
        )
        .await;
    let id = json_body(&resp)["id"].as_str().unwrap().to_owned();

    let first = app
        .router
        .dispatch(Request::builder(Method::Delete, &format!("/api/todos/{id}")).build())
        .await;
    assert_eq!(first.status_code(), 204);

    let second = app
        .router
        .dispatch(Request::builder(Method::Delete, &format!("/api/todos/{id}")).build())
        .await;
    assert_eq!(second.status_code(), 404);
}

#[tokio::test]
async fn todo_toggle_flips_completed_and_bulk_delete_removes_finished() {
    let app = test_app().await;
    let mut ids = Vec::new();
    for task in ["a", "b"] {
        let resp = app
            .router
            .dispatch(
                Request::builder(Method::Post, "/api/todos")
                    .json(&serde_json::json!({ "task": task }))
                    .build(),
            )
            .await;
        ids.push(json_body(&resp)["id"].as_str().unwrap().to_owned());
    }

    let toggled = app
        .router
        .dispatch(Request::builder(Method::Patch, &format!("/api/todos/{}", ids[0])).build())
        .await;
    assert_eq!(json_body(&toggled)["completed"], true);

    let resp = app
        .router
        .dispatch(Request::builder(Method::Delete, "/api/todos/completed").build())
        .await;
    assert_eq!(resp.status_code(), 204);

    let listed = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/todos").build())
        .await;
    let remaining = json_body(&listed);
    assert_eq!(remaining.as_array().unwrap().len(), 1);
    assert_eq!(remaining[0]["id"], ids[1].as_str());
}

#[tokio::test]
async fn todo_blank_task_is_400() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/todos")
                .json(&serde_json::json!({ "task": "   " }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 400);
}

// ── guestbook ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn guestbook_rejects_blank_name_and_persists_nothing() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/entries")
                .json(&serde_json::json!({ "name": "  ", "message": "hi" }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 400);
    assert!(app.state.entries.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn guestbook_paginates_in_insertion_order() {
    let app = test_app().await;
    for i in 0..7 {
        let resp = app
            .router
            .dispatch(
                Request::builder(Method::Post, "/api/entries")
                    .json(&serde_json::json!({ "name": "guest", "message": format!("m{i}") }))
                    .build(),
            )
            .await;
        assert_eq!(resp.status_code(), 201);
    }

    let page2 = app
        .router
        .dispatch(
            Request::builder(Method::Get, "/api/entries")
                .query("page", "2")
                .query("limit", "5")
                .build(),
        )
        .await;
    let entries = json_body(&page2);
    let messages: Vec<_> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(messages, ["m5", "m6"]);

    let bad = app
        .router
        .dispatch(
            Request::builder(Method::Get, "/api/entries")
                .query("page", "0")
                .build(),
        )
        .await;
    assert_eq!(bad.status_code(), 400);
}

#[tokio::test]
async fn guestbook_page_far_past_the_end_is_empty_not_an_error() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/entries")
                .json(&serde_json::json!({ "name": "guest", "message": "only one" }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 201);

    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Get, "/api/entries")
                .query("page", &u64::MAX.to_string())
                .query("limit", "5")
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(json_body(&resp), serde_json::json!([]));
}

#[tokio::test]
async fn guestbook_survives_a_reopen() {
    let data_dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: data_dir.path().to_owned(),
        ..Config::default()
    };

    let before = {
        let state = AppState::new(config.clone()).await.unwrap();
        let router = app::router(&state);
        let resp = router
            .dispatch(
                Request::builder(Method::Post, "/api/entries")
                    .json(&serde_json::json!({ "name": "guest", "message": "still here" }))
                    .build(),
            )
            .await;
        assert_eq!(resp.status_code(), 201);
        json_body(&resp)
    };

    // A fresh process over the same data directory sees the same record.
    let state = AppState::new(config).await.unwrap();
    let router = app::router(&state);
    let listed = router
        .dispatch(Request::builder(Method::Get, "/api/entries").build())
        .await;
    assert_eq!(json_body(&listed), serde_json::json!([before]));
}

// ── polls ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn poll_with_one_option_is_400_and_not_persisted() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/poll/create")
                .json(&serde_json::json!({ "question": "only one?", "options": ["yes"] }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 400);
    assert!(app.state.polls.list().await.unwrap().is_empty());

    let latest = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/poll/latest").build())
        .await;
    assert_eq!(latest.status_code(), 404);
}

#[tokio::test]
async fn poll_vote_increments_one_option() {
    let app = test_app().await;
    let created = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/poll/create")
                .json(&serde_json::json!({ "question": "tabs or spaces?", "options": ["tabs", "spaces"] }))
                .build(),
        )
        .await;
    assert_eq!(created.status_code(), 201);
    let poll_id = json_body(&created)["id"].as_str().unwrap().to_owned();

    let voted = app
        .router
        .dispatch(Request::builder(Method::Post, &format!("/api/poll/vote/{poll_id}/spaces")).build())
        .await;
    assert_eq!(voted.status_code(), 200);
    let poll = json_body(&voted);
    let votes: Vec<_> = poll["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| (o["label"].as_str().unwrap().to_owned(), o["votes"].as_u64().unwrap()))
        .collect();
    assert_eq!(votes, [("tabs".to_owned(), 0), ("spaces".to_owned(), 1)]);

    let missing_option = app
        .router
        .dispatch(Request::builder(Method::Post, &format!("/api/poll/vote/{poll_id}/emacs")).build())
        .await;
    assert_eq!(missing_option.status_code(), 404);

    let missing_poll = app
        .router
        .dispatch(Request::builder(Method::Post, "/api/poll/vote/ghost/tabs").build())
        .await;
    assert_eq!(missing_poll.status_code(), 404);
}

// ── auth ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/login")
                .json(&serde_json::json!({ "username": "user1", "password": "wrong" }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 401);
}

#[tokio::test]
async fn protected_read_needs_a_token() {
    let app = test_app().await;
    let bare = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/secret-data").build())
        .await;
    assert_eq!(bare.status_code(), 401);

    let token = login(&app, "user1", "password1").await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Get, "/api/secret-data")
                .header("authorization", &bearer(&token))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(json_body(&resp)["role"], "user");
}

#[tokio::test]
async fn admin_route_is_403_for_users_not_401() {
    let app = test_app().await;
    let token = login(&app, "user1", "password1").await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Get, "/api/admin-data")
                .header("authorization", &bearer(&token))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 403);

    let admin_token = login(&app, "admin", "password").await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Get, "/api/admin-data")
                .header("authorization", &bearer(&admin_token))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 200);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = test_app().await;
    let token = login(&app, "user1", "password1").await;

    let out = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/logout")
                .header("authorization", &bearer(&token))
                .build(),
        )
        .await;
    assert_eq!(out.status_code(), 200);

    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Get, "/api/secret-data")
                .header("authorization", &bearer(&token))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 401);
}

#[tokio::test]
async fn malformed_authorization_header_is_401() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/logout")
                .header("authorization", "Token abc")
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 401);
}

// ── posts + likes ─────────────────────────────────────────────────────────────

async fn create_post(app: &TestApp, token: &str, text: &str) -> String {
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/posts")
                .header("authorization", &bearer(token))
                .json(&serde_json::json!({ "text": text }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 201);
    json_body(&resp)["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn double_like_is_conflict_and_unlike_decrements() {
    let app = test_app().await;
    let author = login(&app, "user1", "password1").await;
    let fan = login(&app, "user2", "password2").await;
    let post_id = create_post(&app, &author, "hello world").await;

    let like_path = format!("/api/posts/{post_id}/like");
    let first = app
        .router
        .dispatch(
            Request::builder(Method::Post, &like_path)
                .header("authorization", &bearer(&fan))
                .build(),
        )
        .await;
    assert_eq!(first.status_code(), 204);

    let second = app
        .router
        .dispatch(
            Request::builder(Method::Post, &like_path)
                .header("authorization", &bearer(&fan))
                .build(),
        )
        .await;
    assert_eq!(second.status_code(), 409);

    let count = app
        .router
        .dispatch(Request::builder(Method::Get, &format!("/api/posts/{post_id}/likes-count")).build())
        .await;
    assert_eq!(json_body(&count)["count"], 1);

    let unliked = app
        .router
        .dispatch(
            Request::builder(Method::Delete, &like_path)
                .header("authorization", &bearer(&fan))
                .build(),
        )
        .await;
    assert_eq!(unliked.status_code(), 204);

    let count = app
        .router
        .dispatch(Request::builder(Method::Get, &format!("/api/posts/{post_id}/likes-count")).build())
        .await;
    assert_eq!(json_body(&count)["count"], 0);

    // Unliking with no like left is a 404.
    let again = app
        .router
        .dispatch(
            Request::builder(Method::Delete, &like_path)
                .header("authorization", &bearer(&fan))
                .build(),
        )
        .await;
    assert_eq!(again.status_code(), 404);
}

#[tokio::test]
async fn liking_a_missing_post_is_404() {
    let app = test_app().await;
    let fan = login(&app, "user2", "password2").await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/posts/ghost/like")
                .header("authorization", &bearer(&fan))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 404);
}

#[tokio::test]
async fn only_the_owner_may_delete_a_post() {
    let app = test_app().await;
    let author = login(&app, "user1", "password1").await;
    let other = login(&app, "user2", "password2").await;
    let post_id = create_post(&app, &author, "mine").await;

    let denied = app
        .router
        .dispatch(
            Request::builder(Method::Delete, &format!("/api/posts/{post_id}"))
                .header("authorization", &bearer(&other))
                .build(),
        )
        .await;
    assert_eq!(denied.status_code(), 403);

    let allowed = app
        .router
        .dispatch(
            Request::builder(Method::Delete, &format!("/api/posts/{post_id}"))
                .header("authorization", &bearer(&author))
                .build(),
        )
        .await;
    assert_eq!(allowed.status_code(), 204);
}

#[tokio::test]
async fn posts_list_newest_first_and_filter_by_author() {
    let app = test_app().await;
    let u1 = login(&app, "user1", "password1").await;
    let u2 = login(&app, "user2", "password2").await;
    create_post(&app, &u1, "first").await;
    create_post(&app, &u2, "second").await;

    let listed = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/posts").build())
        .await;
    let posts = json_body(&listed);
    let authors: Vec<_> = posts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["owner_username"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(authors, ["user2", "user1"]);

    let filtered = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/users/user1/posts").build())
        .await;
    let posts = json_body(&filtered);
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["text"], "first");
}

// ── shortener ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn shortener_conflict_on_taken_custom_code() {
    let app = test_app().await;
    let make = |code: &str| {
        serde_json::json!({ "long_url": "https://example.com/a", "custom_code": code })
    };
    let first = app
        .router
        .dispatch(Request::builder(Method::Post, "/api/shorten").json(&make("docs")).build())
        .await;
    assert_eq!(first.status_code(), 201);

    let second = app
        .router
        .dispatch(Request::builder(Method::Post, "/api/shorten").json(&make("docs")).build())
        .await;
    assert_eq!(second.status_code(), 409);
}

#[tokio::test]
async fn shortener_redirects_and_counts_clicks() {
    let app = test_app().await;
    let created = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/shorten")
                .json(&serde_json::json!({ "long_url": "https://example.com/target", "custom_code": "go" }))
                .build(),
        )
        .await;
    assert_eq!(created.status_code(), 201);

    let redirect = app
        .router
        .dispatch(Request::builder(Method::Get, "/go").build())
        .await;
    assert_eq!(redirect.status_code(), 307);
    assert_eq!(redirect.header("location"), Some("https://example.com/target"));

    let stats = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/stats/go").build())
        .await;
    let body = json_body(&stats);
    assert_eq!(body["clicks"], 1);
    assert_eq!(body["long_url"], "https://example.com/target");

    let missing = app
        .router
        .dispatch(Request::builder(Method::Get, "/missing").build())
        .await;
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn shortener_rejects_codes_that_cannot_be_routed() {
    let app = test_app().await;
    for code in ["", "a/b", "has space", "naïve"] {
        let resp = app
            .router
            .dispatch(
                Request::builder(Method::Post, "/api/shorten")
                    .json(&serde_json::json!({
                        "long_url": "https://example.com/a",
                        "custom_code": code,
                    }))
                    .build(),
            )
            .await;
        assert_eq!(resp.status_code(), 400, "code {code:?} should be rejected");
    }
}

#[tokio::test]
async fn shortener_rejects_non_http_urls() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(
            Request::builder(Method::Post, "/api/shorten")
                .json(&serde_json::json!({ "long_url": "ftp://example.com/file" }))
                .build(),
        )
        .await;
    assert_eq!(resp.status_code(), 400);
}

// ── weather ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn weather_without_api_key_is_500() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/weather/London").build())
        .await;
    assert_eq!(resp.status_code(), 500);
    assert_eq!(json_body(&resp)["detail"], "internal error: API key is not configured");
}

// ── substrate-level surface ───────────────────────────────────────────────────

#[tokio::test]
async fn error_bodies_carry_a_detail_field() {
    let app = test_app().await;
    let resp = app
        .router
        .dispatch(Request::builder(Method::Get, "/api/todos/ghost").build())
        .await;
    // No GET route on a single todo: 405 (the collection path exists for
    // PATCH/PUT/DELETE).
    assert_eq!(resp.status_code(), 405);

    let resp = app
        .router
        .dispatch(Request::builder(Method::Delete, "/api/entries/ghost").build())
        .await;
    assert_eq!(resp.status_code(), 404);
    assert!(json_body(&resp)["detail"].is_string());
}

#[tokio::test]
async fn health_probes_answer() {
    let app = test_app().await;
    let live = app
        .router
        .dispatch(Request::builder(Method::Get, "/healthz").build())
        .await;
    assert_eq!(live.status_code(), 200);
    assert_eq!(live.body(), b"ok");

    let ready = app
        .router
        .dispatch(Request::builder(Method::Get, "/readyz").build())
        .await;
    assert_eq!(ready.status_code(), 200);
}
