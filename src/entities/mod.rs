pub mod account_credentials;
pub mod accounts;
pub mod bills;
pub mod payments;
pub mod profiles;
pub mod properties;
pub mod subscription_plans;
pub mod tenants;
pub mod units;
pub mod user_subscriptions;
