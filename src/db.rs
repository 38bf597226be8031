use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use tokio::net::lookup_host;
use tracing::{info, warn};

fn redact_db_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let (authority, path) = match rest.find('/') {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    };
    let Some((userinfo, host)) = authority.rsplit_once('@') else {
        return url.to_string();
    };
    let user = match userinfo.split_once(':') {
        Some((user, _)) => format!("{}:***", user),
        None => userinfo.to_string(),
    };
    format!("{}://{}@{}{}", scheme, user, host, path)
}

fn extract_host_port(url: &str) -> Option<(String, u16)> {
    let after_scheme = url.split("://").nth(1)?;
    let authority = after_scheme.split('/').next().unwrap_or(after_scheme);
    let hostport = authority.rsplit('@').next().unwrap_or(authority);
    let mut parts = hostport.split(':');
    let host = parts.next()?.to_string();
    let port = parts
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5432);
    Some((host, port))
}

pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let url = env::var("DATABASE_URL")
        .map_err(|_| DbErr::Custom("DATABASE_URL is not set".to_string()))?;
    info!(url = %redact_db_url(&url), "connecting to database");

    if let Some((host, port)) = extract_host_port(&url) {
        match lookup_host((host.as_str(), port)).await {
            Ok(addrs) => {
                let list: Vec<String> = addrs.map(|addr| addr.to_string()).collect();
                info!(%host, port, addrs = ?list, "database host resolved");
            }
            Err(err) => {
                warn!(%host, port, error = %err, "database host lookup failed");
            }
        }
    }

    let mut options = ConnectOptions::new(url);
    options.sqlx_logging(false);
    Database::connect(options).await
}
