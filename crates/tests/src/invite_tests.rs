use crate::fixtures::test_app::TestApp;
use invitegate_db::models::Invite;
use serde_json::Value;

#[tokio::test]
async fn admin_creates_and_user_redeems() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;

    let invite = app
        .create_invite(
            &admin,
            serde_json::json!({ "expires_in_days": 3, "max_uses": 2, "note": "pilot" }),
        )
        .await;
    let code = invite["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 12);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(invite["max_uses"], 2);
    assert_eq!(invite["current_uses"], 0);
    assert_eq!(invite["note"], "pilot");
    assert_eq!(invite["created_by_email"], admin.email);

    let alice = app.user("alice-uid", "alice@test.com");
    let resp = app.redeem(&alice, &format!(" {} ", code.to_lowercase()), "198.51.100.1").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let grant: Value = resp.json().await.unwrap();
    assert_eq!(grant["role"], "user");

    let bob = app.user("bob-uid", "bob@test.com");
    let resp = app.redeem(&bob, &code, "198.51.100.2").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let carol = app.user("carol-uid", "carol@test.com");
    let resp = app.redeem(&carol, &code, "198.51.100.3").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "uses_exhausted");

    let stored = app
        .db
        .collection::<Invite>(Invite::COLLECTION)
        .find_one(bson::doc! { "_id": &code })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_uses, 2);
    let emails: Vec<_> = stored.used_by.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, vec!["alice@test.com", "bob@test.com"]);
}

#[tokio::test]
async fn same_user_cannot_redeem_twice() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;
    let invite = app
        .create_invite(&admin, serde_json::json!({ "max_uses": -1 }))
        .await;
    let code = invite["code"].as_str().unwrap();

    let alice = app.user("alice-uid", "alice@test.com");
    let resp = app.redeem(&alice, code, "198.51.100.1").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app.redeem(&alice, code, "198.51.100.1").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "already_used");
}

#[tokio::test]
async fn concurrent_redemptions_never_exceed_max_uses() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;
    let invite = app
        .create_invite(&admin, serde_json::json!({ "max_uses": 3 }))
        .await;
    let code = invite["code"].as_str().unwrap().to_string();

    let requests = (0..10).map(|i| {
        let user = app.user(&format!("uid-{i}"), &format!("user{i}@test.com"));
        app.redeem(&user, &code, &format!("192.0.2.{i}")).send()
    });
    let statuses: Vec<u16> = futures::future::join_all(requests)
        .await
        .into_iter()
        .map(|r| r.unwrap().status().as_u16())
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 3);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 7);

    let stored = app
        .db
        .collection::<Invite>(Invite::COLLECTION)
        .find_one(bson::doc! { "_id": &code })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_uses, 3);
    assert_eq!(stored.used_by.len(), 3);
}

#[tokio::test]
async fn revoked_invite_cannot_be_redeemed() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;
    let invite = app.create_invite(&admin, serde_json::json!({})).await;
    let code = invite["code"].as_str().unwrap();

    let resp = app
        .auth_delete(&format!("/api/invite/{}", code), &admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    // Revoking again is still a success.
    let resp = app
        .auth_delete(&format!("/api/invite/{}", code), &admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let alice = app.user("alice-uid", "alice@test.com");
    let resp = app.redeem(&alice, code, "198.51.100.1").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "revoked");

    let resp = app
        .auth_delete("/api/invite/NOSUCHCODE12", &admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn validate_does_not_consume() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;
    let invite = app
        .create_invite(&admin, serde_json::json!({ "role": "admin", "max_uses": 1 }))
        .await;
    let code = invite["code"].as_str().unwrap();

    for _ in 0..3 {
        let resp = app.validate(code, "198.51.100.7").send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["valid"], true);
        assert_eq!(body["role"], "admin");
        assert_eq!(body["remaining_uses"], 1);
    }

    let resp = app.validate("abc", "198.51.100.7").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn only_admins_manage_invites() {
    let app = TestApp::spawn().await;
    let user = app.user("plain-uid", "plain@test.com");

    let resp = app
        .auth_post("/api/invite", &user.token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.auth_get("/api/invite", &user.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .client
        .post(app.url("/api/invite"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn list_returns_newest_first_with_status() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("admin-1").await;

    let first = app.create_invite(&admin, serde_json::json!({})).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let second = app.create_invite(&admin, serde_json::json!({})).await;
    app.auth_delete(
        &format!("/api/invite/{}", first["code"].as_str().unwrap()),
        &admin.token,
    )
    .send()
    .await
    .unwrap();

    let resp = app.auth_get("/api/invite", &admin.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let listed: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["code"], second["code"]);
    assert_eq!(listed[0]["status"], "active");
    assert_eq!(listed[1]["status"], "revoked");
}
