use std::marker::PhantomData;
use std::net::IpAddr;

use async_trait::async_trait;
use sea_orm::sea_query::{Asterisk, Order, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, QueryResult};

use folio_core::{
    AuditContext, ChangeEvent, ChangeRecorder, EntityId, EventId, RecordError, StoreError,
    StoreResult,
};

use crate::db::FolioChangeEvents;
use crate::dialect::Dialect;
use crate::record::{entity_id, get, id_value, optional_id, optional_id_value};

/// Persists change events into the `change_events` table.
///
/// The recorder owns its own connection handle so it can be pointed at a
/// different database than the one holding the entities.
pub struct TableRecorder<D: Dialect> {
    conn: DatabaseConnection,
    _dialect: PhantomData<fn() -> D>,
}

impl<D: Dialect> TableRecorder<D> {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            _dialect: PhantomData,
        }
    }

    async fn insert(&self, event: &ChangeEvent) -> Result<(), DbErr> {
        let payload = event
            .payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| DbErr::Custom(format!("encode payload: {err}")))?;
        let insert = Query::insert()
            .into_table(FolioChangeEvents::Table)
            .columns([
                FolioChangeEvents::EventId,
                FolioChangeEvents::TableName,
                FolioChangeEvents::Operation,
                FolioChangeEvents::EntityId,
                FolioChangeEvents::Actor,
                FolioChangeEvents::NodeId,
                FolioChangeEvents::RequestId,
                FolioChangeEvents::IpAddress,
                FolioChangeEvents::Payload,
                FolioChangeEvents::RecordedAt,
            ])
            .values([
                id_value::<D>(event.event_id).into(),
                event.table.as_str().into(),
                event.operation.as_str().into(),
                D::id_value(Some(event.entity_id)).into(),
                optional_id_value::<D, _>(event.audit.actor).into(),
                optional_id_value::<D, _>(event.audit.node_id).into(),
                event.audit.request_id.clone().into(),
                event.audit.ip.map(|ip| ip.to_string()).into(),
                payload.into(),
                D::time_value(Some(event.recorded_at)).into(),
            ])
            .map_err(|err| DbErr::Custom(err.to_string()))?
            .to_owned();
        self.conn.execute(D::build(&insert)).await?;
        Ok(())
    }
}

#[async_trait]
impl<D: Dialect> ChangeRecorder for TableRecorder<D> {
    async fn record(&self, event: ChangeEvent) -> Result<(), RecordError> {
        self.insert(&event).await.map_err(|err| {
            log::error!(
                "failed to persist change event {} for {} {}: {err}",
                event.event_id,
                event.table,
                event.entity_id
            );
            RecordError::from(err)
        })
    }
}

/// Most recent change events first.
pub(crate) async fn list_change_events<D: Dialect, C: ConnectionTrait>(
    conn: &C,
    limit: u64,
) -> StoreResult<Vec<ChangeEvent>> {
    let select = Query::select()
        .column(Asterisk)
        .from(FolioChangeEvents::Table)
        .order_by(FolioChangeEvents::EventId, Order::Desc)
        .limit(limit)
        .to_owned();
    let rows = conn.query_all(D::build(&select)).await?;
    rows.iter().map(change_event_from_row::<D>).collect()
}

fn change_event_from_row<D: Dialect>(row: &QueryResult) -> StoreResult<ChangeEvent> {
    let table: String = get(row, FolioChangeEvents::TableName)?;
    let operation: String = get(row, FolioChangeEvents::Operation)?;
    let ip: Option<String> = get(row, FolioChangeEvents::IpAddress)?;
    let ip = ip
        .map(|raw| {
            raw.parse::<IpAddr>()
                .map_err(|err| StoreError::storage(format!("stored ip '{raw}': {err}")))
        })
        .transpose()?;
    let payload: Option<String> = get(row, FolioChangeEvents::Payload)?;
    let payload = payload
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|err| StoreError::storage(format!("stored payload: {err}")))?;
    let entity: D::Id = get(row, FolioChangeEvents::EntityId)?;
    Ok(ChangeEvent {
        event_id: entity_id::<D, EventId>(get(row, FolioChangeEvents::EventId)?)?,
        table: table.parse()?,
        operation: operation.parse()?,
        entity_id: D::id_from_native(entity)?,
        audit: AuditContext {
            node_id: optional_id::<D, _>(get(row, FolioChangeEvents::NodeId)?)?,
            actor: optional_id::<D, _>(get(row, FolioChangeEvents::Actor)?)?,
            request_id: get(row, FolioChangeEvents::RequestId)?,
            ip,
        },
        recorded_at: D::time_from_native(get(row, FolioChangeEvents::RecordedAt)?)?,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use folio_core::{Operation, TableKind, UserId};
    use sea_orm::Database;
    use tempfile::tempdir;

    use super::*;
    use crate::dialect::Sqlite;
    use crate::migration::Migrator;
    use sea_orm_migration::MigratorTrait;

    #[tokio::test]
    async fn persisted_events_read_back_unchanged() {
        let dir = tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("events.sqlite").display());
        let conn = Database::connect(url).await.expect("connect");
        Migrator::up(&conn, None).await.expect("migrate");

        let recorder = TableRecorder::<Sqlite>::new(conn.clone());
        let audit = AuditContext {
            actor: Some(UserId::new()),
            request_id: Some("req-1".to_string()),
            ip: Some("10.0.0.7".parse().expect("ip")),
            ..AuditContext::default()
        };
        let entity = UserId::new();
        let event = ChangeEvent::new(
            TableKind::Users,
            Operation::Delete,
            entity.ulid(),
            audit,
            Some(serde_json::json!({"username": "ada"})),
        );
        recorder.record(event.clone()).await.expect("record");

        let events = list_change_events::<Sqlite, _>(&conn, 10).await.expect("list");
        assert_eq!(events, vec![event]);
    }
}
