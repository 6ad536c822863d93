use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use ulid::Ulid;

use crate::{EntityId, EventId, NodeId, RecordError, StoreError, Timestamp, UserId};

/// Every table the store can mutate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Users,
    UserSshKeys,
    Sessions,
    Tokens,
    UserOauth,
    Routes,
    Datatypes,
    Fields,
    ContentData,
    ContentFields,
    ChangeEvents,
}

impl TableKind {
    pub const ALL: [TableKind; 11] = [
        TableKind::Users,
        TableKind::UserSshKeys,
        TableKind::Sessions,
        TableKind::Tokens,
        TableKind::UserOauth,
        TableKind::Routes,
        TableKind::Datatypes,
        TableKind::Fields,
        TableKind::ContentData,
        TableKind::ContentFields,
        TableKind::ChangeEvents,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Users => "users",
            TableKind::UserSshKeys => "user_ssh_keys",
            TableKind::Sessions => "sessions",
            TableKind::Tokens => "tokens",
            TableKind::UserOauth => "user_oauth",
            TableKind::Routes => "routes",
            TableKind::Datatypes => "datatypes",
            TableKind::Fields => "fields",
            TableKind::ContentData => "content_data",
            TableKind::ContentFields => "content_fields",
            TableKind::ChangeEvents => "change_events",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| StoreError::storage(format!("unknown table '{value}'")))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "insert" => Ok(Operation::Insert),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(StoreError::storage(format!("unknown operation '{other}'"))),
        }
    }
}

/// Attribution attached to a mutation: who, from which node, for which request.
///
/// An empty context is legal and marks internal or bootstrap writes.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuditContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpAddr>,
}

impl AuditContext {
    pub fn new(
        node_id: NodeId,
        actor: UserId,
        request_id: impl Into<String>,
        ip: Option<IpAddr>,
    ) -> Self {
        Self {
            node_id: Some(node_id),
            actor: Some(actor),
            request_id: Some(request_id.into()),
            ip,
        }
    }

    pub fn system() -> Self {
        Self::default()
    }

    pub fn is_system(&self) -> bool {
        self.actor.is_none()
    }
}

/// Immutable record of one committed mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_id: EventId,
    pub table: TableKind,
    pub operation: Operation,
    pub entity_id: Ulid,
    pub audit: AuditContext,
    pub recorded_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
}

impl ChangeEvent {
    pub fn new(
        table: TableKind,
        operation: Operation,
        entity_id: Ulid,
        audit: AuditContext,
        payload: Option<JsonValue>,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            table,
            operation,
            entity_id,
            audit,
            recorded_at: Timestamp::now(),
            payload,
        }
    }

    pub fn entity<T: EntityId>(&self) -> T {
        T::from(self.entity_id)
    }
}

/// Append-only sink for change events. Implementations own durability.
#[async_trait]
pub trait ChangeRecorder: Send + Sync {
    async fn record(&self, event: ChangeEvent) -> Result<(), RecordError>;
}

/// In-process recorder keeping events in arrival order.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<ChangeEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn take(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl ChangeRecorder for MemoryRecorder {
    async fn record(&self, event: ChangeEvent) -> Result<(), RecordError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

/// Forwards events to the `log` facade at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRecorder;

#[async_trait]
impl ChangeRecorder for LogRecorder {
    async fn record(&self, event: ChangeEvent) -> Result<(), RecordError> {
        let actor = event
            .audit
            .actor
            .map(|actor| actor.to_string())
            .unwrap_or_else(|| "system".to_string());
        log::info!(
            "change {} {} {} {} by {actor}",
            event.event_id,
            event.operation,
            event.table,
            event.entity_id
        );
        Ok(())
    }
}
