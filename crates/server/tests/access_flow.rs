use std::sync::Arc;

use async_trait::async_trait;
use db::{
    DBService,
    models::{
        invite::{Invite, InviteStatus},
        role::{MemberTier, Role},
        session::Session,
        trade_idea::{TradeIdeaDetails, TradeSummary},
        user_profile::UserProfile,
    },
};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use server::{DeploymentImpl, error::CONNECTION_ERROR_MESSAGE, routes};
use services::services::{
    identity::{IdentityError, IdentityProvider, SignedIn, SqliteIdentityProvider},
    trade_summary::{DISCLAIMER, SummaryError, TradeSummarizer},
};
use uuid::Uuid;

struct TestApp {
    base: String,
    db: DBService,
    http: Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let db = DBService::new_in_memory().await.unwrap();
        let identity = Arc::new(SqliteIdentityProvider::new(db.pool.clone()));
        Self::spawn_with(db, identity).await
    }

    async fn spawn_with(db: DBService, identity: Arc<dyn IdentityProvider>) -> Self {
        let deployment = DeploymentImpl::with_parts(
            db.clone(),
            identity,
            Some(Arc::new(CannedSummarizer)),
            None,
        );
        let app = routes::router(deployment);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}/api", addr),
            db,
            http: Client::new(),
        }
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = self.http.post(format!("{}{}", self.base, path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.http.get(format!("{}{}", self.base, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn submit_code(&self, code: &str, token: Option<&str>) -> Value {
        let (status, body) = self.post("/access/code", token, json!({ "code": code })).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }

    async fn admin_token(&self) -> String {
        let outcome = self.submit_code("ALPHALINK_ADMIN_888", None).await;
        outcome["token"].as_str().unwrap().to_string()
    }

    async fn member_token(&self, code: &str, name: &str) -> String {
        let outcome = self.submit_code(code, None).await;
        let token = outcome["token"].as_str().unwrap().to_string();
        let (status, _) = self
            .post(
                "/access/profile",
                Some(&token),
                json!({ "display_name": name, "contact_type": "email", "contact_info": "x@y.z" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        token
    }

    async fn invite(&self, code: &str, role: Role, status: InviteStatus) -> Invite {
        let invite = Invite::create(
            &self.db.pool,
            Uuid::new_v4(),
            code,
            "General",
            None,
            role,
            Some(MemberTier::Vip),
        )
        .await
        .unwrap();
        Invite::update_status(&self.db.pool, invite.id, status)
            .await
            .unwrap()
            .unwrap()
    }
}

struct CannedSummarizer;

#[async_trait]
impl TradeSummarizer for CannedSummarizer {
    async fn summarize(
        &self,
        _note: &str,
        _details: &TradeIdeaDetails,
    ) -> Result<TradeSummary, SummaryError> {
        Ok(TradeSummary {
            summary_bullets: vec!["a".into(), "b".into(), "c".into()],
            risk_line: "Gap risk".into(),
            payoff_hint: "Trend".into(),
            disclaimer_line: DISCLAIMER.into(),
        })
    }
}

struct OfflineIdentity;

#[async_trait]
impl IdentityProvider for OfflineIdentity {
    async fn sign_in_anonymously(&self, _token: Option<&str>) -> Result<SignedIn, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }

    async fn resolve(&self, _token: &str) -> Result<Option<Session>, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }

    async fn sign_out(&self, _token: &str) -> Result<bool, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn bootstrap_code_grants_admin() {
    let app = TestApp::spawn().await;

    let outcome = app.submit_code("  alphalink_admin_888  ", None).await;

    assert_eq!(outcome["decision"], "granted_admin");
    assert_eq!(outcome["state"], "active");
    assert_eq!(outcome["profile"]["role"], "admin");
    let token = outcome["token"].as_str().unwrap();

    let (status, me) = app.get("/access/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["state"], "active");
    assert_eq!(me["data"]["role"], "admin");
}

#[tokio::test]
async fn member_code_goes_through_onboarding() {
    let app = TestApp::spawn().await;
    app.invite("VIP2024", Role::Member, InviteStatus::Active).await;

    let outcome = app.submit_code("vip2024", None).await;
    assert_eq!(outcome["decision"], "granted_member");
    assert_eq!(outcome["state"], "onboarding");
    assert!(outcome["profile"].is_null());
    let token = outcome["token"].as_str().unwrap();

    let (status, body) = app
        .post(
            "/access/profile",
            Some(token),
            json!({ "display_name": "   ", "contact_type": "email", "contact_info": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(UserProfile::count(&app.db.pool).await.unwrap(), 0);

    let (status, body) = app
        .post(
            "/access/profile",
            Some(token),
            json!({ "display_name": "Jane", "contact_type": "other", "contact_info": " @jane " }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["contact_type"], "other");
    assert_eq!(body["data"]["contact_info"], "@jane");
    assert_eq!(body["data"]["access_code"], "VIP2024");
    assert_eq!(body["data"]["tier"], "vip");

    let (_, me) = app.get("/access/me", Some(token)).await;
    assert_eq!(me["data"]["state"], "active");

    let resumed = app.submit_code("VIP2024", Some(token)).await;
    assert_eq!(resumed["resumed"], true);
    assert_eq!(resumed["profile"]["display_name"], "Jane");
}

#[tokio::test]
async fn disabled_and_unknown_codes_are_denied() {
    let app = TestApp::spawn().await;
    app.invite("OLD123", Role::Member, InviteStatus::Disabled).await;

    let disabled = app.submit_code("OLD123", None).await;
    assert_eq!(disabled["decision"], "denied");
    assert_eq!(disabled["state"], "awaiting_code");
    assert!(disabled["token"].is_null());

    let unknown = app.submit_code("RANDOMXYZ", None).await;
    assert_eq!(unknown["decision"], "denied");

    assert_eq!(Session::count(&app.db.pool).await.unwrap(), 0);
    assert_eq!(UserProfile::count(&app.db.pool).await.unwrap(), 0);
}

#[tokio::test]
async fn identity_outage_is_a_generic_connection_error() {
    let db = DBService::new_in_memory().await.unwrap();
    let app = TestApp::spawn_with(db, Arc::new(OfflineIdentity)).await;

    let (status, body) = app
        .post("/access/code", None, json!({ "code": "ALPHALINK_ADMIN_888" }))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], CONNECTION_ERROR_MESSAGE);
}

#[tokio::test]
async fn logout_always_succeeds_and_ends_session() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, body) = app.post("/access/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "unauthenticated");

    let (status, _) = app.post("/access/logout", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/access/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_check_stored_role() {
    let app = TestApp::spawn().await;
    app.invite("VIP2024", Role::Member, InviteStatus::Active).await;
    let member = app.member_token("VIP2024", "Jane").await;

    let (status, _) = app.get("/invites", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/invites", Some(&member)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post("/admin/wipe", Some(&member), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let onboarding = app.submit_code("VIP2024", None).await;
    let (status, _) = app
        .get("/highlights", onboarding["token"].as_str())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_issued_invite_can_be_redeemed_and_disabled() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/invites",
            Some(&admin),
            json!({ "recipient": "jane@example.com", "tier": "premium" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let invite = &body["data"];
    assert_eq!(invite["label"], "General");
    let code = invite["code"].as_str().unwrap().to_string();
    let id = invite["id"].as_str().unwrap().to_string();

    let outcome = app.submit_code(&code.to_lowercase(), None).await;
    assert_eq!(outcome["decision"], "granted_member");

    let (status, body) = app
        .post(&format!("/invites/{}/toggle", id), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "disabled");

    let denied = app.submit_code(&code, None).await;
    assert_eq!(denied["decision"], "denied");

    let (_, listed) = app.get("/invites", Some(&admin)).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn trade_ideas_are_admin_posted_and_member_liked() {
    let app = TestApp::spawn().await;
    app.invite("VIP2024", Role::Member, InviteStatus::Active).await;
    let admin = app.admin_token().await;
    let member = app.member_token("VIP2024", "Jane").await;

    let idea = json!({
        "note": "Breakout",
        "details": {
            "instrument_type": "STOCK",
            "ticker": "nvda",
            "direction": "LONG",
            "action": "BUY",
            "timeframe": "SWING",
            "entry_plan": null,
            "stop_loss": null,
            "invalidation": null
        }
    });

    let (status, _) = app.post("/trade-ideas", Some(&member), idea.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post("/trade-ideas", Some(&admin), idea).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["summary"]["disclaimer_line"], DISCLAIMER);
    assert_eq!(body["data"]["details"]["ticker"], "NVDA");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(&format!("/trade-ideas/{}/like", id), Some(&member), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["like_count"], 1);

    let (_, feed) = app.get("/trade-ideas", Some(&member)).await;
    assert_eq!(feed["data"][0]["like_count"], 1);
    assert_eq!(feed["data"][0]["created_by"], "Administrator");
}
