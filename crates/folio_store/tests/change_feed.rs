mod support;

use std::net::IpAddr;

use folio_store::{
    AuditContext, ExecContext, NodeId, Operation, StoreResult, TableKind, UpdateUserParams, UserId,
    open_store,
};
use tempfile::tempdir;

use support::{fixed_time, route, sqlite_store, user};

#[tokio::test]
async fn default_recorder_persists_events_in_the_same_database() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = sqlite_store(dir.path()).await;
    let ctx = ExecContext::background();

    let ada = store
        .users()
        .create(&ctx, &AuditContext::system(), &user("ada"))
        .await?;
    let node = NodeId::new();
    let ip: IpAddr = "192.0.2.10".parse().expect("ip");
    let audit = AuditContext::new(node, ada.user_id, "req-7", Some(ip));
    store
        .users()
        .update(
            &ctx,
            &audit,
            &UpdateUserParams {
                user_id: ada.user_id,
                username: "ada".to_string(),
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                hash: "$argon2id$v=19$rotated".to_string(),
                role: "admin".to_string(),
                date_modified: fixed_time(),
            },
        )
        .await?;

    let events = store.list_change_events(&ctx, 10).await?;
    assert_eq!(events.len(), 2);

    let latest = &events[0];
    assert_eq!(latest.operation, Operation::Update);
    assert_eq!(latest.table, TableKind::Users);
    assert_eq!(latest.entity::<UserId>(), ada.user_id);
    assert_eq!(latest.audit.node_id, Some(node));
    assert_eq!(latest.audit.actor, Some(ada.user_id));
    assert_eq!(latest.audit.request_id.as_deref(), Some("req-7"));
    assert_eq!(latest.audit.ip, Some(ip));
    let payload = latest.payload.as_ref().expect("payload");
    assert_eq!(payload["role"], "admin");
    assert!(payload.get("hash").is_none());

    let first = &events[1];
    assert_eq!(first.operation, Operation::Insert);
    assert!(first.audit.is_system());
    assert!(first.event_id < latest.event_id);
    Ok(())
}

#[tokio::test]
async fn change_feed_honours_limit_and_skips_reads() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = sqlite_store(dir.path()).await;
    let ctx = ExecContext::background();
    let audit = AuditContext::system();

    for slug in ["/a", "/b", "/c"] {
        store.routes().create(&ctx, &audit, &route(slug, None)).await?;
    }
    store.routes().list(&ctx).await?;
    store.routes().get_by_slug(&ctx, "/b").await?;

    let all = store.list_change_events(&ctx, 100).await?;
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|event| event.table == TableKind::Routes));

    let latest = store.list_change_events(&ctx, 1).await?;
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].event_id, all[0].event_id);
    Ok(())
}

#[tokio::test]
async fn open_store_uses_configured_backend_and_feed() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    assert_eq!(store.backend_name(), "sqlite");
    assert!(dir.path().join("folio.json").exists());

    let ctx = ExecContext::background();
    assert!(store.list_change_events(&ctx, 10).await?.is_empty());
    Ok(())
}
