use crate::fixtures::test_app::TestApp;
use invitegate_db::models::InviteAttempt;
use serde_json::Value;

#[tokio::test]
async fn fifth_miss_locks_the_client_out() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;
    let invite = app.create_invite(&admin, serde_json::json!({})).await;
    let code = invite["code"].as_str().unwrap();
    let user = app.user("guesser", "guesser@test.com");

    for _ in 0..5 {
        let resp = app.redeem(&user, "WRONGCODE123", "203.0.113.50").send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }

    // Even a valid code is refused while locked.
    let resp = app.redeem(&user, code, "203.0.113.50").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 429);
    assert_eq!(resp.headers()["retry-after"], "3600");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "locked_out");
    assert_eq!(body["retry_after_minutes"], 60);

    let attempt = app
        .db
        .collection::<InviteAttempt>(InviteAttempt::COLLECTION)
        .find_one(bson::doc! { "_id": "203_0_113_50" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attempt.failed_attempts, 5);
    assert!(attempt.locked_until.is_some());

    // Another client is unaffected.
    let resp = app.redeem(&user, code, "203.0.113.51").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn redemption_resets_the_counter() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;
    let invite = app
        .create_invite(&admin, serde_json::json!({ "max_uses": 2 }))
        .await;
    let code = invite["code"].as_str().unwrap();
    let alice = app.user("alice-uid", "alice@test.com");
    let bob = app.user("bob-uid", "bob@test.com");

    for _ in 0..4 {
        let resp = app.redeem(&alice, "WRONGCODE123", "203.0.113.60").send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
    let resp = app.redeem(&alice, code, "203.0.113.60").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Four more misses stay under the threshold.
    for _ in 0..4 {
        let resp = app.redeem(&bob, "WRONGCODE123", "203.0.113.60").send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
    let resp = app.redeem(&bob, code, "203.0.113.60").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn previews_do_not_reset_the_counter() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;
    let invite = app
        .create_invite(&admin, serde_json::json!({ "max_uses": -1 }))
        .await;
    let code = invite["code"].as_str().unwrap();

    for _ in 0..4 {
        let resp = app.validate("WRONGCODE123", "203.0.113.65").send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
    let resp = app.validate(code, "203.0.113.65").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app.validate("WRONGCODE123", "203.0.113.65").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let resp = app.validate(code, "203.0.113.65").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 429);
}

#[tokio::test]
async fn malformed_codes_do_not_count() {
    let app = TestApp::spawn_with_settings(|s| s.rate_limit.max_failed_attempts = 2).await;

    for _ in 0..5 {
        let resp = app.validate("x", "203.0.113.70").send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 400);
    }

    let attempt = app
        .db
        .collection::<InviteAttempt>(InviteAttempt::COLLECTION)
        .find_one(bson::doc! { "_id": "203_0_113_70" })
        .await
        .unwrap();
    assert!(attempt.is_none());
}

#[tokio::test]
async fn forwarded_for_is_ignored_unless_trusted() {
    let app = TestApp::spawn_with_settings(|s| s.app.trust_forwarded_for = false).await;

    for i in 0..5 {
        let resp = app
            .validate("WRONGCODE123", &format!("10.0.0.{i}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
    let resp = app.validate("WRONGCODE123", "10.0.0.200").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 429);

    let keys = app
        .db
        .collection::<InviteAttempt>(InviteAttempt::COLLECTION)
        .count_documents(bson::doc! {})
        .await
        .unwrap();
    assert_eq!(keys, 1);
}
