use argon2::{password_hash::PasswordHash, Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use rand::RngCore;
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    entities::{account_credentials, accounts, profiles},
    error::ServiceError,
    model::AccountContext,
    repo::{
        account_credentials::AccountCredentialsRepo, accounts::AccountsRepo,
        profiles::ProfilesRepo, subscriptions::SubscriptionsRepo,
    },
    service::{
        fields::optional_text, session::SessionService, subscription::new_active_subscription,
    },
    state::DatabaseClient,
};

const PROVIDER_PASSWORD: &str = "password";
const MIN_PASSWORD_LEN: usize = 8;

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub account: accounts::Model,
    pub profile: profiles::Model,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub account: accounts::Model,
    pub session_id: String,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, input: RegisterInput) -> Result<RegisterOutput, ServiceError>;
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutput, ServiceError>;
    async fn logout(&self, session_id: &str) -> Result<(), ServiceError>;
}

pub struct AuthServiceImpl {
    db: Arc<dyn DatabaseClient>,
    accounts_repo: Arc<dyn AccountsRepo>,
    credentials_repo: Arc<dyn AccountCredentialsRepo>,
    profiles_repo: Arc<dyn ProfilesRepo>,
    subscriptions_repo: Arc<dyn SubscriptionsRepo>,
    sessions: Arc<dyn SessionService>,
    default_plan_name: String,
}

impl AuthServiceImpl {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        accounts_repo: Arc<dyn AccountsRepo>,
        credentials_repo: Arc<dyn AccountCredentialsRepo>,
        profiles_repo: Arc<dyn ProfilesRepo>,
        subscriptions_repo: Arc<dyn SubscriptionsRepo>,
        sessions: Arc<dyn SessionService>,
        default_plan_name: String,
    ) -> Self {
        Self {
            db,
            accounts_repo,
            credentials_repo,
            profiles_repo,
            subscriptions_repo,
            sessions,
            default_plan_name,
        }
    }

    fn normalize_email(email: &str) -> Result<String, ServiceError> {
        let value = email.trim().to_lowercase();
        if value.is_empty() || !value.contains('@') {
            return Err(ServiceError::validation("invalid email"));
        }
        Ok(value)
    }

    fn validate_password(password: &str) -> Result<(), ServiceError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }

    fn hash_password(password: &str) -> Result<String, ServiceError> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = argon2::password_hash::SaltString::encode_b64(&salt)
            .map_err(|err| ServiceError::validation(err.to_string()))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| ServiceError::validation(err.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify_password(hash: &str, password: &str) -> Result<(), ServiceError> {
        let parsed = PasswordHash::new(hash).map_err(|_| ServiceError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| ServiceError::InvalidCredentials)
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, input: RegisterInput) -> Result<RegisterOutput, ServiceError> {
        let email = Self::normalize_email(&input.email)?;
        Self::validate_password(&input.password)?;
        if self.accounts_repo.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict("email_taken", "email already registered"));
        }

        let password_hash = Self::hash_password(&input.password)?;
        let full_name = optional_text(input.full_name);
        let accounts_repo = self.accounts_repo.clone();
        let credentials_repo = self.credentials_repo.clone();
        let profiles_repo = self.profiles_repo.clone();
        let subscriptions_repo = self.subscriptions_repo.clone();
        let plan_name = self.default_plan_name.clone();

        let output = self
            .db
            .conn()
            .transaction::<_, RegisterOutput, ServiceError>(|txn| {
                Box::pin(async move {
                    let Some(plan) = subscriptions_repo
                        .find_plan_by_name_with_txn(txn, &plan_name)
                        .await?
                    else {
                        error!(plan = %plan_name, "default plan is not seeded");
                        return Err(ServiceError::Db(sea_orm::DbErr::RecordNotFound(format!(
                            "plan {plan_name}"
                        ))));
                    };

                    let account = accounts_repo
                        .insert_with_txn(
                            txn,
                            accounts::ActiveModel {
                                uid: sea_orm::Set(Uuid::new_v4()),
                                email: sea_orm::Set(email.clone()),
                                ..Default::default()
                            },
                        )
                        .await?;

                    credentials_repo
                        .insert_with_txn(
                            txn,
                            account_credentials::ActiveModel {
                                account_id: sea_orm::Set(account.id),
                                provider: sea_orm::Set(PROVIDER_PASSWORD.to_string()),
                                provider_subject: sea_orm::Set(Some(email)),
                                password_hash: sea_orm::Set(Some(password_hash)),
                                ..Default::default()
                            },
                        )
                        .await?;

                    let profile = profiles_repo
                        .insert_with_txn(
                            txn,
                            profiles::ActiveModel {
                                account_id: sea_orm::Set(account.id),
                                full_name: sea_orm::Set(full_name),
                                phone: sea_orm::Set(None),
                                company: sea_orm::Set(None),
                                ..Default::default()
                            },
                        )
                        .await?;

                    subscriptions_repo
                        .insert_with_txn(txn, new_active_subscription(account.id, plan.id))
                        .await?;

                    Ok(RegisterOutput { account, profile })
                })
            })
            .await?;

        info!(account_uid = %output.account.uid, "account registered");
        Ok(output)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutput, ServiceError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ServiceError::InvalidCredentials);
        }

        let Some(account) = self.accounts_repo.find_by_email(&normalized).await? else {
            return Err(ServiceError::InvalidCredentials);
        };

        let credential = self
            .credentials_repo
            .find_by_account_and_provider(account.id, PROVIDER_PASSWORD)
            .await?;
        let Some(hash) = credential.and_then(|credential| credential.password_hash) else {
            return Err(ServiceError::InvalidCredentials);
        };

        Self::verify_password(&hash, password)?;

        let session_id = self
            .sessions
            .create(AccountContext {
                account_id: account.id,
                account_uid: account.uid,
            })
            .await?;

        Ok(LoginOutput {
            account,
            session_id,
        })
    }

    async fn logout(&self, session_id: &str) -> Result<(), ServiceError> {
        self.sessions.delete(session_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            AuthServiceImpl::normalize_email("  Landlord@Example.COM ").unwrap(),
            "landlord@example.com"
        );
        assert!(AuthServiceImpl::normalize_email("not-an-email").is_err());
        assert!(AuthServiceImpl::normalize_email("   ").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(AuthServiceImpl::validate_password("short").is_err());
        assert!(AuthServiceImpl::validate_password("long enough").is_ok());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = AuthServiceImpl::hash_password("correct horse").unwrap();
        assert!(AuthServiceImpl::verify_password(&hash, "correct horse").is_ok());
        assert!(matches!(
            AuthServiceImpl::verify_password(&hash, "wrong horse"),
            Err(ServiceError::InvalidCredentials)
        ));
    }
}
