use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    entities::{accounts, profiles},
    error::ServiceError,
    model::AccountContext,
    repo::{accounts::AccountsRepo, profiles::ProfilesRepo},
    service::fields::optional_text,
};

/// Absent fields are left unchanged; a blank string clears the field.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[async_trait]
pub trait AccountsService: Send + Sync {
    async fn me(
        &self,
        ctx: &AccountContext,
    ) -> Result<(accounts::Model, profiles::Model), ServiceError>;
    async fn profile(&self, ctx: &AccountContext) -> Result<profiles::Model, ServiceError>;
    async fn update_profile(
        &self,
        ctx: &AccountContext,
        input: UpdateProfileInput,
    ) -> Result<profiles::Model, ServiceError>;
}

pub struct AccountsServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
    profiles_repo: Arc<dyn ProfilesRepo>,
}

impl AccountsServiceImpl {
    pub fn new(accounts_repo: Arc<dyn AccountsRepo>, profiles_repo: Arc<dyn ProfilesRepo>) -> Self {
        Self {
            accounts_repo,
            profiles_repo,
        }
    }
}

#[async_trait]
impl AccountsService for AccountsServiceImpl {
    async fn me(
        &self,
        ctx: &AccountContext,
    ) -> Result<(accounts::Model, profiles::Model), ServiceError> {
        let Some(account) = self.accounts_repo.find_by_uid(ctx.account_uid).await? else {
            return Err(ServiceError::NotFound("account"));
        };
        let profile = self.profile(ctx).await?;
        Ok((account, profile))
    }

    async fn profile(&self, ctx: &AccountContext) -> Result<profiles::Model, ServiceError> {
        self.profiles_repo
            .find_by_account(ctx.account_id)
            .await?
            .ok_or(ServiceError::NotFound("profile"))
    }

    async fn update_profile(
        &self,
        ctx: &AccountContext,
        input: UpdateProfileInput,
    ) -> Result<profiles::Model, ServiceError> {
        let model = self.profile(ctx).await?;

        let mut active: profiles::ActiveModel = model.into();
        if let Some(full_name) = input.full_name {
            active.full_name = sea_orm::Set(optional_text(Some(full_name)));
        }
        if let Some(phone) = input.phone {
            active.phone = sea_orm::Set(optional_text(Some(phone)));
        }
        if let Some(company) = input.company {
            active.company = sea_orm::Set(optional_text(Some(company)));
        }

        Ok(self.profiles_repo.update(active).await?)
    }
}
