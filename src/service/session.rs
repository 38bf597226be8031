use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{error::ServiceError, model::AccountContext};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    pub account_id: i64,
    pub account_uid: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn context(&self) -> AccountContext {
        AccountContext {
            account_id: self.account_id,
            account_uid: self.account_uid,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<SessionError> for ServiceError {
    fn from(err: SessionError) -> Self {
        ServiceError::Session(err.to_string())
    }
}

#[async_trait]
pub trait SessionService: Send + Sync {
    async fn create(&self, ctx: AccountContext) -> Result<String, SessionError>;
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionError>;
    async fn delete(&self, session_id: &str) -> Result<(), SessionError>;
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn new_session(ctx: AccountContext) -> SessionData {
    SessionData {
        account_id: ctx.account_id,
        account_uid: ctx.account_uid,
        created_at: Utc::now(),
    }
}

pub struct RedisSessionService {
    conn: Arc<Mutex<MultiplexedConnection>>,
    ttl_seconds: u64,
    key_prefix: String,
}

impl RedisSessionService {
    pub async fn new(
        redis_url: &str,
        ttl_seconds: u64,
        key_prefix: String,
    ) -> Result<Self, SessionError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            ttl_seconds,
            key_prefix,
        })
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}:session:{}", self.key_prefix, session_id)
    }
}

#[async_trait]
impl SessionService for RedisSessionService {
    async fn create(&self, ctx: AccountContext) -> Result<String, SessionError> {
        let session_id = new_session_id();
        let value = serde_json::to_string(&new_session(ctx))?;

        let mut conn = self.conn.lock().await;
        let key = self.key(&session_id);
        conn.set_ex::<_, _, ()>(key, value, self.ttl_seconds).await?;
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionError> {
        let mut conn = self.conn.lock().await;
        let key = self.key(session_id);
        let value: Option<String> = conn.get(key).await?;
        let Some(value) = value else {
            return Ok(None);
        };
        let session = serde_json::from_str(&value)?;
        Ok(Some(session))
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.lock().await;
        let key = self.key(session_id);
        let _: () = conn.del(key).await?;
        Ok(())
    }
}

/// Process-local session store for single-instance and development runs.
/// Expired entries are dropped lazily on lookup.
pub struct InMemorySessionService {
    sessions: Mutex<HashMap<String, SessionData>>,
    ttl: Duration,
}

impl InMemorySessionService {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds.min(u64::from(u32::MAX)) as i64),
        }
    }

    fn is_expired(&self, session: &SessionData, now: DateTime<Utc>) -> bool {
        now - session.created_at >= self.ttl
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create(&self, ctx: AccountContext) -> Result<String, SessionError> {
        let session_id = new_session_id();
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();
        sessions.retain(|_, session| !self.is_expired(session, now));
        sessions.insert(session_id.clone(), new_session(ctx));
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get(session_id) else {
            return Ok(None);
        };
        if self.is_expired(session, Utc::now()) {
            sessions.remove(session_id);
            return Ok(None);
        }
        Ok(Some(session.clone()))
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions.lock().await.remove(session_id);
        Ok(())
    }
}
