use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::{
    repo::{
        account_credentials::SeaOrmAccountCredentialsRepo, accounts::SeaOrmAccountsRepo,
        bills::SeaOrmBillsRepo, payments::SeaOrmPaymentsRepo, profiles::SeaOrmProfilesRepo,
        properties::SeaOrmPropertiesRepo, subscriptions::SeaOrmSubscriptionsRepo,
        tenants::SeaOrmTenantsRepo, units::SeaOrmUnitsRepo,
    },
    service::{
        accounts::{AccountsService, AccountsServiceImpl},
        auth::{AuthService, AuthServiceImpl},
        bills::{BillsService, BillsServiceImpl},
        changes::ChangeFeed,
        config::{ConfigService, ConfigServiceImpl},
        dashboard::{DashboardService, DashboardServiceImpl},
        payments::{PaymentsService, PaymentsServiceImpl},
        properties::{PropertiesService, PropertiesServiceImpl},
        session::{InMemorySessionService, RedisSessionService, SessionService},
        subscription::{SubscriptionService, SubscriptionServiceImpl},
        tenants::{TenantsService, TenantsServiceImpl},
        vacancy::{VacancyService, VacancyServiceImpl},
    },
};

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    pub async fn new() -> Result<Self, sea_orm::DbErr> {
        let conn = crate::db::connect().await?;
        crate::schema::apply(&conn).await?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Everything the handlers reach through `AppState`.
pub struct AppParts {
    pub config: Arc<dyn ConfigService>,
    pub sessions: Arc<dyn SessionService>,
    pub auth: Arc<dyn AuthService>,
    pub accounts: Arc<dyn AccountsService>,
    pub subscriptions: Arc<dyn SubscriptionService>,
    pub properties: Arc<dyn PropertiesService>,
    pub vacancies: Arc<dyn VacancyService>,
    pub tenants: Arc<dyn TenantsService>,
    pub bills: Arc<dyn BillsService>,
    pub payments: Arc<dyn PaymentsService>,
    pub dashboard: Arc<dyn DashboardService>,
    pub changes: Arc<ChangeFeed>,
}

pub struct AppState {
    parts: AppParts,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let config: Arc<dyn ConfigService> = Arc::new(ConfigServiceImpl::new());
        let db: Arc<dyn DatabaseClient> = Arc::new(SeaOrmDatabaseClient::new().await?);
        let values = config.values().clone();

        let sessions: Arc<dyn SessionService> = match &values.redis_url {
            Some(url) => {
                info!("using redis session store");
                Arc::new(
                    RedisSessionService::new(
                        url,
                        values.session_ttl_seconds,
                        values.session_key_prefix.clone(),
                    )
                    .await?,
                )
            }
            None => {
                info!("REDIS_URL not set; using in-memory session store");
                Arc::new(InMemorySessionService::new(values.session_ttl_seconds))
            }
        };

        let changes = Arc::new(ChangeFeed::new(values.change_feed_capacity));

        let accounts_repo = Arc::new(SeaOrmAccountsRepo::new(db.clone()));
        let credentials_repo = Arc::new(SeaOrmAccountCredentialsRepo::new(db.clone()));
        let profiles_repo = Arc::new(SeaOrmProfilesRepo::new(db.clone()));
        let subscriptions_repo = Arc::new(SeaOrmSubscriptionsRepo::new(db.clone()));
        let properties_repo = Arc::new(SeaOrmPropertiesRepo::new(db.clone()));
        let units_repo = Arc::new(SeaOrmUnitsRepo::new());
        let tenants_repo = Arc::new(SeaOrmTenantsRepo::new(db.clone()));
        let bills_repo = Arc::new(SeaOrmBillsRepo::new(db.clone()));
        let payments_repo = Arc::new(SeaOrmPaymentsRepo::new(db.clone()));

        let subscriptions: Arc<dyn SubscriptionService> = Arc::new(SubscriptionServiceImpl::new(
            db.clone(),
            subscriptions_repo.clone(),
            properties_repo.clone(),
        ));

        let parts = AppParts {
            sessions: sessions.clone(),
            auth: Arc::new(AuthServiceImpl::new(
                db.clone(),
                accounts_repo.clone(),
                credentials_repo,
                profiles_repo.clone(),
                subscriptions_repo,
                sessions,
                values.default_plan_name.clone(),
            )),
            accounts: Arc::new(AccountsServiceImpl::new(accounts_repo, profiles_repo)),
            properties: Arc::new(PropertiesServiceImpl::new(
                db.clone(),
                properties_repo.clone(),
                units_repo.clone(),
                tenants_repo.clone(),
                subscriptions.clone(),
                changes.clone(),
            )),
            vacancies: Arc::new(VacancyServiceImpl::new(
                properties_repo.clone(),
                tenants_repo.clone(),
            )),
            tenants: Arc::new(TenantsServiceImpl::new(
                db.clone(),
                tenants_repo.clone(),
                properties_repo.clone(),
                units_repo.clone(),
                changes.clone(),
                values.lease_expiry_warning_days,
            )),
            bills: Arc::new(BillsServiceImpl::new(
                bills_repo.clone(),
                tenants_repo.clone(),
                changes.clone(),
            )),
            payments: Arc::new(PaymentsServiceImpl::new(payments_repo)),
            dashboard: Arc::new(DashboardServiceImpl::new(
                properties_repo,
                tenants_repo,
                bills_repo,
            )),
            subscriptions,
            changes,
            config,
        };

        Ok(Arc::new(Self { parts }))
    }

    pub fn from_parts(parts: AppParts) -> Arc<Self> {
        Arc::new(Self { parts })
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.parts.config.as_ref()
    }

    pub fn sessions(&self) -> &dyn SessionService {
        self.parts.sessions.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthService {
        self.parts.auth.as_ref()
    }

    pub fn accounts(&self) -> &dyn AccountsService {
        self.parts.accounts.as_ref()
    }

    pub fn subscriptions(&self) -> &dyn SubscriptionService {
        self.parts.subscriptions.as_ref()
    }

    pub fn properties(&self) -> &dyn PropertiesService {
        self.parts.properties.as_ref()
    }

    pub fn vacancies(&self) -> Arc<dyn VacancyService> {
        self.parts.vacancies.clone()
    }

    pub fn tenants(&self) -> &dyn TenantsService {
        self.parts.tenants.as_ref()
    }

    pub fn bills(&self) -> &dyn BillsService {
        self.parts.bills.as_ref()
    }

    pub fn payments(&self) -> &dyn PaymentsService {
        self.parts.payments.as_ref()
    }

    pub fn dashboard(&self) -> &dyn DashboardService {
        self.parts.dashboard.as_ref()
    }

    pub fn changes(&self) -> &ChangeFeed {
        self.parts.changes.as_ref()
    }
}
