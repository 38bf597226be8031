//! In-process change notifications for account-owned tables.
//!
//! Mutating services publish after their transaction commits; live views
//! (the vacancy stream) subscribe and re-fetch when a relevant table for
//! their account changes.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Properties,
    Units,
    Tenants,
    Bills,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub account_id: i64,
    pub table: ChangeTable,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(account_id: i64, table: ChangeTable, kind: ChangeKind) -> Self {
        Self {
            account_id,
            table,
            kind,
        }
    }

    /// Whether this change can alter the set of vacant units.
    pub fn affects_vacancies(&self) -> bool {
        matches!(
            self.table,
            ChangeTable::Properties | ChangeTable::Units | ChangeTable::Tenants
        )
    }
}

pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // No subscribers is the common case; the send error is expected then.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(
            account_id = event.account_id,
            table = ?event.table,
            kind = ?event.kind,
            receivers,
            "change published"
        );
    }

    pub fn publish_all(&self, account_id: i64, changes: &[(ChangeTable, ChangeKind)]) {
        for (table, kind) in changes {
            self.publish(ChangeEvent::new(account_id, *table, *kind));
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.subscribe();

        feed.publish(ChangeEvent::new(7, ChangeTable::Units, ChangeKind::Update));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.account_id, 7);
        assert_eq!(event.table, ChangeTable::Units);
        assert!(event.affects_vacancies());
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let feed = ChangeFeed::new(1);
        feed.publish(ChangeEvent::new(1, ChangeTable::Bills, ChangeKind::Insert));
    }

    #[test]
    fn bill_changes_do_not_touch_vacancies() {
        let event = ChangeEvent::new(1, ChangeTable::Bills, ChangeKind::Update);
        assert!(!event.affects_vacancies());
    }
}
