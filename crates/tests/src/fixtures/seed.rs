use invitegate_db::models::Admin;
use invitegate_services::{AuthService, invite::Identity};
use serde_json::Value;

use super::test_app::TestApp;

pub struct SeededUser {
    pub uid: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    /// Mint a provider token for a user. Nothing is stored.
    pub fn user(&self, uid: &str, email: &str) -> SeededUser {
        let token = AuthService::new(self.settings.jwt.clone())
            .issue_token(&Identity::new(uid, email), 3600)
            .expect("Failed to mint token");
        SeededUser {
            uid: uid.to_string(),
            email: email.to_string(),
            token,
        }
    }

    /// A user with a row in the admins collection.
    pub async fn seed_admin(&self, uid: &str) -> SeededUser {
        let user = self.user(uid, &format!("{}@admin.test", uid));
        self.db
            .collection::<Admin>(Admin::COLLECTION)
            .insert_one(Admin {
                uid: user.uid.clone(),
                is_admin: true,
                email: Some(user.email.clone()),
                created_at: Some(bson::DateTime::now()),
                created_by: Some("seed".to_string()),
            })
            .await
            .expect("Failed to seed admin");
        user
    }

    /// Create an invite through the API and return the response body.
    pub async fn create_invite(&self, admin: &SeededUser, body: Value) -> Value {
        let resp = self
            .auth_post("/api/invite", &admin.token)
            .json(&body)
            .send()
            .await
            .expect("Create invite request failed");
        assert_eq!(resp.status().as_u16(), 201, "Create invite failed");
        resp.json().await.expect("Failed to parse invite")
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Redeem `code` as `user`, presenting `client_ip` as the forwarded address.
    pub fn redeem(&self, user: &SeededUser, code: &str, client_ip: &str) -> reqwest::RequestBuilder {
        self.auth_post("/api/invite/redeem", &user.token)
            .header("x-forwarded-for", client_ip)
            .json(&serde_json::json!({ "code": code }))
    }

    pub fn validate(&self, code: &str, client_ip: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url("/api/invite/validate"))
            .header("x-forwarded-for", client_ip)
            .json(&serde_json::json!({ "code": code }))
    }
}
