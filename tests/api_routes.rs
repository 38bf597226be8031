use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use futures::StreamExt;
use sea_orm::{DatabaseTransaction, DbErr};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // For `oneshot` method
use uuid::Uuid;

use landlord_api::{
    config::Config,
    entities::{accounts, bills, payments, profiles, subscription_plans, tenants},
    error::ServiceError,
    model::AccountContext,
    repo::{bills::BillsRepo, payments::PaymentsRepo, tenants::TenantsRepo},
    repo::subscriptions::ActiveSubscription,
    service::{
        accounts::{AccountsService, UpdateProfileInput},
        auth::{AuthService, LoginOutput, RegisterInput, RegisterOutput},
        bills::BillsServiceImpl,
        changes::ChangeFeed,
        config::ConfigService,
        dashboard::{DashboardService, DashboardSummary},
        payments::PaymentsServiceImpl,
        properties::{
            CreatePropertyInput, PropertiesService, PropertyFilter, PropertyView,
            UpdatePropertyInput,
        },
        session::{InMemorySessionService, SessionService},
        subscription::{GateSnapshot, PlanQuota, SubscriptionGate, SubscriptionService},
        tenants::{CreateTenantInput, TenantFilter, TenantView, TenantsService, UpdateTenantInput},
        vacancy::{PropertyVacancies, VacancyService, VacantUnit},
    },
    state::{AppParts, AppState},
};

const ACCOUNT: AccountContext = AccountContext {
    account_id: 1,
    account_uid: Uuid::from_u128(0x1),
};
const KNOWN_PROPERTY: Uuid = Uuid::from_u128(0xA1);
const KNOWN_TENANT: Uuid = Uuid::from_u128(0xB1);

fn unsupported() -> DbErr {
    DbErr::Custom("not used by these routes".to_string())
}

fn account_row() -> accounts::Model {
    accounts::Model {
        id: ACCOUNT.account_id,
        uid: ACCOUNT.account_uid,
        email: "ada@example.com".to_string(),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
        deleted_at: None,
        deleted_by: None,
    }
}

fn profile_row() -> profiles::Model {
    profiles::Model {
        account_id: ACCOUNT.account_id,
        full_name: Some("Ada Obi".to_string()),
        phone: None,
        company: None,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn tenant_row() -> tenants::Model {
    tenants::Model {
        id: 10,
        uid: KNOWN_TENANT,
        account_id: ACCOUNT.account_id,
        property_id: 1,
        unit_id: Some(1),
        name: "Chinedu Eze".to_string(),
        email: "chinedu@example.com".to_string(),
        phone: "+234 801 000 0000".to_string(),
        lease_start: None,
        lease_end: None,
        annual_rent: 1_200_000.0,
        monthly_rent: 100_000.0,
        rent_due_day: None,
        payment_status: "due".to_string(),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
        deleted_at: None,
        deleted_by: None,
    }
}

struct FakeConfig(Config);

impl ConfigService for FakeConfig {
    fn port(&self) -> u16 {
        self.0.port
    }

    fn values(&self) -> &Config {
        &self.0
    }
}

struct FakeAuth {
    sessions: Arc<dyn SessionService>,
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn register(&self, input: RegisterInput) -> Result<RegisterOutput, ServiceError> {
        if input.email == "ada@example.com" {
            return Err(ServiceError::conflict("email_taken", "email already registered"));
        }
        Ok(RegisterOutput {
            account: accounts::Model {
                email: input.email,
                ..account_row()
            },
            profile: profile_row(),
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutput, ServiceError> {
        if email != "ada@example.com" || password != "correct-horse" {
            return Err(ServiceError::InvalidCredentials);
        }
        let session_id = self.sessions.create(ACCOUNT).await?;
        Ok(LoginOutput {
            account: account_row(),
            session_id,
        })
    }

    async fn logout(&self, session_id: &str) -> Result<(), ServiceError> {
        Ok(self.sessions.delete(session_id).await?)
    }
}

struct FakeAccounts;

#[async_trait]
impl AccountsService for FakeAccounts {
    async fn me(
        &self,
        _ctx: &AccountContext,
    ) -> Result<(accounts::Model, profiles::Model), ServiceError> {
        Ok((account_row(), profile_row()))
    }

    async fn profile(&self, _ctx: &AccountContext) -> Result<profiles::Model, ServiceError> {
        Ok(profile_row())
    }

    async fn update_profile(
        &self,
        _ctx: &AccountContext,
        input: UpdateProfileInput,
    ) -> Result<profiles::Model, ServiceError> {
        Ok(profiles::Model {
            company: input.company,
            ..profile_row()
        })
    }
}

/// Free plan with both property slots used.
struct FullFreePlan;

#[async_trait]
impl SubscriptionService for FullFreePlan {
    async fn list_plans(&self) -> Result<Vec<subscription_plans::Model>, ServiceError> {
        Ok(Vec::new())
    }

    async fn snapshot(&self, _ctx: &AccountContext) -> GateSnapshot {
        GateSnapshot {
            subscription: None,
            gate: SubscriptionGate::new(
                Some(PlanQuota {
                    name: "Free".to_string(),
                    property_limit: 2,
                }),
                2,
            ),
        }
    }

    async fn change_plan(
        &self,
        _ctx: &AccountContext,
        _plan_name: &str,
    ) -> Result<ActiveSubscription, ServiceError> {
        Err(ServiceError::NotFound("plan"))
    }
}

struct GatedProperties {
    subscriptions: Arc<dyn SubscriptionService>,
}

#[async_trait]
impl PropertiesService for GatedProperties {
    async fn create(
        &self,
        ctx: &AccountContext,
        _input: CreatePropertyInput,
    ) -> Result<PropertyView, ServiceError> {
        self.subscriptions.ensure_can_add_property(ctx).await?;
        Err(ServiceError::Db(unsupported()))
    }

    async fn list(
        &self,
        _ctx: &AccountContext,
        _filter: PropertyFilter,
    ) -> Result<Vec<PropertyView>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get(&self, _ctx: &AccountContext, _uid: Uuid) -> Result<PropertyView, ServiceError> {
        Err(ServiceError::NotFound("property"))
    }

    async fn update(
        &self,
        _ctx: &AccountContext,
        _uid: Uuid,
        _input: UpdatePropertyInput,
    ) -> Result<PropertyView, ServiceError> {
        Err(ServiceError::NotFound("property"))
    }

    async fn delete(&self, _ctx: &AccountContext, _uid: Uuid) -> Result<(), ServiceError> {
        Err(ServiceError::conflict(
            "property_has_tenants",
            "property still has tenants",
        ))
    }
}

struct FixedVacancies;

#[async_trait]
impl VacancyService for FixedVacancies {
    async fn for_property(
        &self,
        _ctx: &AccountContext,
        property_uid: Uuid,
        editing_tenant: Option<Uuid>,
    ) -> Result<PropertyVacancies, ServiceError> {
        if property_uid != KNOWN_PROPERTY {
            return Err(ServiceError::NotFound("property"));
        }
        let mut units = vec![VacantUnit {
            uid: Uuid::from_u128(0xC2),
            unit_number: "2".to_string(),
            is_occupied: false,
        }];
        if editing_tenant == Some(KNOWN_TENANT) {
            units.insert(
                0,
                VacantUnit {
                    uid: Uuid::from_u128(0xC1),
                    unit_number: "1".to_string(),
                    is_occupied: true,
                },
            );
        }
        Ok(PropertyVacancies {
            property_uid,
            property_name: "Lekki Gardens".to_string(),
            units,
        })
    }

    async fn for_account(
        &self,
        ctx: &AccountContext,
        editing_tenant: Option<Uuid>,
    ) -> Result<Vec<PropertyVacancies>, ServiceError> {
        Ok(vec![
            self.for_property(ctx, KNOWN_PROPERTY, editing_tenant)
                .await?,
        ])
    }
}

struct OccupiedUnitTenants;

#[async_trait]
impl TenantsService for OccupiedUnitTenants {
    async fn create(
        &self,
        _ctx: &AccountContext,
        _input: CreateTenantInput,
    ) -> Result<TenantView, ServiceError> {
        Err(ServiceError::conflict("unit_occupied", "unit is already occupied"))
    }

    async fn list(
        &self,
        _ctx: &AccountContext,
        _filter: TenantFilter,
    ) -> Result<Vec<TenantView>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get(&self, _ctx: &AccountContext, _uid: Uuid) -> Result<TenantView, ServiceError> {
        Err(ServiceError::NotFound("tenant"))
    }

    async fn update(
        &self,
        _ctx: &AccountContext,
        _uid: Uuid,
        _input: UpdateTenantInput,
    ) -> Result<TenantView, ServiceError> {
        Err(ServiceError::NotFound("tenant"))
    }

    async fn delete(&self, _ctx: &AccountContext, _uid: Uuid) -> Result<(), ServiceError> {
        Err(ServiceError::NotFound("tenant"))
    }
}

/// Bill rows kept in memory; mirrors the column defaults of the real table.
#[derive(Default)]
struct MemoryBills {
    rows: Mutex<Vec<bills::Model>>,
}

#[async_trait]
impl BillsRepo for MemoryBills {
    async fn insert(&self, mut model: bills::ActiveModel) -> Result<bills::Model, DbErr> {
        let mut rows = self.rows.lock().unwrap();
        let row = bills::Model {
            id: rows.len() as i64 + 1,
            uid: model.uid.take().unwrap(),
            account_id: model.account_id.take().unwrap(),
            tenant_id: model.tenant_id.take().flatten(),
            tenant_name: model.tenant_name.take().flatten(),
            unit_label: model.unit_label.take().flatten(),
            bill_type: model.bill_type.take().unwrap(),
            amount: model.amount.take().unwrap(),
            issue_date: model
                .issue_date
                .take()
                .unwrap_or_else(|| Utc::now().date_naive()),
            due_date: model.due_date.take().unwrap(),
            status: model.status.take().unwrap_or_else(|| "draft".to_string()),
            description: model.description.take().flatten(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            deleted_at: None,
            deleted_by: None,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, _model: bills::ActiveModel) -> Result<bills::Model, DbErr> {
        Err(unsupported())
    }

    async fn find_by_uid(&self, account_id: i64, uid: Uuid) -> Result<Option<bills::Model>, DbErr> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.account_id == account_id && row.uid == uid)
            .cloned())
    }

    async fn list_by_account(&self, account_id: i64) -> Result<Vec<bills::Model>, DbErr> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.account_id == account_id)
            .cloned()
            .collect())
    }
}

struct OneTenant;

#[async_trait]
impl TenantsRepo for OneTenant {
    async fn insert_with_txn(
        &self,
        _txn: &DatabaseTransaction,
        _model: tenants::ActiveModel,
    ) -> Result<tenants::Model, DbErr> {
        Err(unsupported())
    }

    async fn update_with_txn(
        &self,
        _txn: &DatabaseTransaction,
        _model: tenants::ActiveModel,
    ) -> Result<tenants::Model, DbErr> {
        Err(unsupported())
    }

    async fn find_by_uid(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<tenants::Model>, DbErr> {
        let tenant = tenant_row();
        Ok((tenant.account_id == account_id && tenant.uid == uid).then_some(tenant))
    }

    async fn find_by_uid_with_txn(
        &self,
        _txn: &DatabaseTransaction,
        _account_id: i64,
        _uid: Uuid,
    ) -> Result<Option<tenants::Model>, DbErr> {
        Err(unsupported())
    }

    async fn list_by_account(&self, _account_id: i64) -> Result<Vec<tenants::Model>, DbErr> {
        Ok(vec![tenant_row()])
    }

    async fn count_by_property_with_txn(
        &self,
        _txn: &DatabaseTransaction,
        _property_id: i64,
    ) -> Result<u64, DbErr> {
        Err(unsupported())
    }
}

struct TwoPayments;

#[async_trait]
impl PaymentsRepo for TwoPayments {
    async fn list_by_account(&self, account_id: i64) -> Result<Vec<payments::Model>, DbErr> {
        let payment = |amount: f64, status: &str| payments::Model {
            id: 1,
            uid: Uuid::new_v4(),
            account_id,
            tenant_id: None,
            tenant_name: Some("Chinedu Eze".to_string()),
            unit_label: Some("1".to_string()),
            amount,
            paid_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            method: "Bank Transfer".to_string(),
            reference: None,
            payment_type: "rent".to_string(),
            status: status.to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        Ok(vec![payment(100_000.0, "confirmed"), payment(50_000.0, "pending")])
    }
}

struct EmptyDashboard;

#[async_trait]
impl DashboardService for EmptyDashboard {
    async fn summary(&self, _ctx: &AccountContext) -> Result<DashboardSummary, ServiceError> {
        Ok(DashboardSummary::default())
    }
}

struct TestApp {
    router: Router,
    sessions: Arc<dyn SessionService>,
    changes: Arc<ChangeFeed>,
}

impl TestApp {
    fn new() -> Self {
        let sessions: Arc<dyn SessionService> = Arc::new(InMemorySessionService::new(3600));
        let subscriptions: Arc<dyn SubscriptionService> = Arc::new(FullFreePlan);
        let changes = Arc::new(ChangeFeed::new(16));
        let tenants_repo = Arc::new(OneTenant);

        let state = AppState::from_parts(AppParts {
            config: Arc::new(FakeConfig(Config::default())),
            sessions: sessions.clone(),
            auth: Arc::new(FakeAuth {
                sessions: sessions.clone(),
            }),
            accounts: Arc::new(FakeAccounts),
            properties: Arc::new(GatedProperties {
                subscriptions: subscriptions.clone(),
            }),
            subscriptions,
            vacancies: Arc::new(FixedVacancies),
            tenants: Arc::new(OccupiedUnitTenants),
            bills: Arc::new(BillsServiceImpl::new(
                Arc::new(MemoryBills::default()),
                tenants_repo,
                changes.clone(),
            )),
            payments: Arc::new(PaymentsServiceImpl::new(Arc::new(TwoPayments))),
            dashboard: Arc::new(EmptyDashboard),
            changes: changes.clone(),
        });

        Self {
            router: landlord_api::app(state),
            sessions,
            changes,
        }
    }

    async fn cookie(&self) -> String {
        let session_id = self.sessions.create(ACCOUNT).await.unwrap();
        format!("sid={session_id}")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header(header::COOKIE, self.cookie().await)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, self.cookie().await)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

#[tokio::test]
async fn health_needs_no_session() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn account_routes_require_a_session() {
    let app = TestApp::new();

    for uri in ["/api/v1/properties", "/api/v1/subscription", "/api/v1/me"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], "unauthorized");
    }

    let request = Request::builder()
        .uri("/api/v1/properties")
        .header(header::COOKIE, "sid=not-a-session")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid session");
}

#[tokio::test]
async fn login_sets_session_cookie_that_authenticates() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "ada@example.com", "password": "correct-horse" }).to_string(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("sid="));
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/v1/me")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["profile"]["full_name"], "Ada Obi");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "ada@example.com", "password": "nope-nope" }).to_string(),
        ))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            json!({ "email": "ada@example.com", "password": "long-enough" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "email_taken");
}

#[tokio::test]
async fn subscription_reports_exhausted_free_plan() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/subscription").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["property_count"], 2);
    assert_eq!(body["remaining_properties"], 0);
    assert_eq!(body["unbounded"], false);
    assert_eq!(body["can_add_property"], false);
    assert_eq!(body["is_free_plan"], true);
    assert_eq!(body["is_premium"], false);
}

#[tokio::test]
async fn property_create_is_refused_at_plan_limit() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/v1/properties",
            json!({
                "name": "Third Property",
                "address": "1 Marina",
                "property_type": "apartment",
                "units": "4",
                "annual_rent_per_unit": 1_000_000
            }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "plan_limit_reached");
}

#[tokio::test]
async fn bad_list_filter_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/properties?status=demolished").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn occupied_unit_maps_to_conflict() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/v1/tenants",
            json!({
                "property": KNOWN_PROPERTY,
                "unit": Uuid::from_u128(0xC1),
                "name": "Second Tenant",
                "email": "second@example.com",
                "phone": "0802",
                "annual_rent": 600000
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "unit_occupied");
}

#[tokio::test]
async fn vacancies_keep_the_edited_tenants_unit() {
    let app = TestApp::new();

    let (status, body) = app
        .get(&format!("/api/v1/properties/{KNOWN_PROPERTY}/vacancies"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["units"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .get(&format!(
            "/api/v1/properties/{KNOWN_PROPERTY}/vacancies?editing_tenant={KNOWN_TENANT}"
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<&str> = body["units"]
        .as_array()
        .unwrap()
        .iter()
        .map(|unit| unit["unit_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, ["1", "2"]);

    let (status, _) = app
        .get(&format!("/api/v1/properties/{}/vacancies", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vacancy_stream_starts_with_current_list() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri(format!("/api/v1/properties/{KNOWN_PROPERTY}/vacancies/stream"))
        .header(header::COOKIE, app.cookie().await)
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.unwrap().unwrap();
    let text = String::from_utf8(first.to_vec()).unwrap();
    assert!(text.contains("event: vacancies"), "{text}");
    assert!(text.contains("Lekki Gardens"), "{text}");

    // A watched change produces a second event.
    app.changes.publish(landlord_api::service::changes::ChangeEvent::new(
        ACCOUNT.account_id,
        landlord_api::service::changes::ChangeTable::Tenants,
        landlord_api::service::changes::ChangeKind::Insert,
    ));
    let second = tokio::time::timeout(std::time::Duration::from_secs(2), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(String::from_utf8(second.to_vec()).unwrap().contains("event: vacancies"));
}

#[tokio::test]
async fn bill_create_coerces_amount_and_defaults_to_draft() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/v1/bills",
            json!({
                "tenant_name": "Walk-in Tenant",
                "bill_type": "Utility",
                "amount": "15000",
                "due_date": "2999-01-31"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount"], 15000.0);
    assert_eq!(body["status"], "draft");
    assert_eq!(body["display_status"], "draft");
    assert_eq!(body["bill_type"], "utility");

    let uid = body["uid"].as_str().unwrap().to_string();
    let (status, body) = app.get(&format!("/api/v1/bills/{uid}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant_name"], "Walk-in Tenant");
    assert_eq!(body["amount"], 15000.0);
}

#[tokio::test]
async fn bill_for_known_tenant_links_the_tenant() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/v1/bills",
            json!({
                "tenant": KNOWN_TENANT,
                "bill_type": "rent",
                "amount": "not a number",
                "due_date": "2000-01-01",
                "status": "sent"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tenant_uid"], KNOWN_TENANT.to_string());
    assert_eq!(body["tenant_name"], "Chinedu Eze");
    assert_eq!(body["amount"], 0.0);
    assert_eq!(body["status"], "sent");
    assert_eq!(body["display_status"], "overdue");
}

#[tokio::test]
async fn bill_without_any_tenant_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/v1/bills",
            json!({ "bill_type": "rent", "amount": 10, "due_date": "2030-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_failed");
}

#[tokio::test]
async fn payments_come_with_summary() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/payments").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payments"].as_array().unwrap().len(), 2);
    assert_eq!(body["summary"]["confirmed_amount"], 100_000.0);
    assert_eq!(body["summary"]["pending_amount"], 50_000.0);

    let (_, body) = app.get("/api/v1/payments?status=pending").await;
    assert_eq!(body["payments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/bills"].is_object());
}
