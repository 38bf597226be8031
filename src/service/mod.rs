pub mod accounts;
pub mod auth;
pub mod bills;
pub mod changes;
pub mod config;
pub mod dashboard;
pub mod fields;
pub mod payments;
pub mod properties;
pub mod session;
pub mod subscription;
pub mod tenants;
pub mod vacancy;
