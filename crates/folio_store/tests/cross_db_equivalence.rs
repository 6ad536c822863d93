mod support;

use folio_store::{
    AuditContext, CreateSessionParams, CreateTokenParams, CreateUserOauthParams,
    CreateUserSshKeyParams, DatabaseConfig, Dialect, EntityId, ExecContext, FolioConfig, MySql,
    Postgres, Sqlite, Store, StoreResult, Timestamp, UpdateUserSshKeyParams, ViewAssembler,
};
use serde_json::{Value, json};
use tempfile::tempdir;

use support::{content, content_field, datatype, field, fixed_time, route, user};

#[derive(Debug, PartialEq)]
struct ParitySnapshot {
    created: Value,
    secrets: Vec<String>,
    views: Value,
}

/// Identifiers are generated per run, so identifier values are blanked
/// before comparison. Other `*_id` keys holding plain data are kept.
fn strip_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                let is_ulid = item
                    .as_str()
                    .is_some_and(|s| folio_store::parse_ulid("id", s).is_ok());
                if key.ends_with("_id") && is_ulid {
                    *item = Value::Null;
                } else {
                    strip_ids(item);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_ids),
        _ => {}
    }
}

fn to_normalized<T: serde::Serialize>(entity: &T) -> Value {
    let mut value = serde_json::to_value(entity).expect("json");
    strip_ids(&mut value);
    value
}

/// Every identifier a backend hands back must survive its canonical string
/// form unchanged.
fn assert_canonical<I: EntityId>(id: I) {
    let text = id.to_string();
    assert_eq!(text.len(), 26, "{} {text}", I::KIND);
    I::validate(&text).expect("valid identifier");
    assert_eq!(I::parse(&text).expect("parse identifier"), id);
}

fn later(seconds: i64) -> Timestamp {
    Timestamp::from_unix(1_735_689_600 + seconds).expect("timestamp")
}

async fn run_parity_test<D: Dialect>(config: FolioConfig, run: &str) -> StoreResult<ParitySnapshot> {
    let dir = tempdir().expect("tempdir");
    let store = Store::<D>::connect(config.connect_options(dir.path())?).await?;
    let ctx = ExecContext::background();
    let audit = AuditContext::system();

    let author = store
        .users()
        .create(&ctx, &audit, &user(&format!("author{run}")))
        .await?;
    assert_canonical(author.user_id);

    let key = store
        .ssh_keys()
        .create(
            &ctx,
            &audit,
            &CreateUserSshKeyParams {
                user_id: author.user_id,
                public_key: format!("ssh-ed25519 AAAAC3Nza {run}"),
                key_type: "ssh-ed25519".to_string(),
                fingerprint: format!("SHA256:{run}"),
                label: "laptop".to_string(),
                date_created: fixed_time(),
            },
        )
        .await?;
    assert_canonical(key.ssh_key_id);
    assert!(key.last_used.is_none());
    store
        .ssh_keys()
        .update(
            &ctx,
            &audit,
            &UpdateUserSshKeyParams {
                ssh_key_id: key.ssh_key_id,
                label: "laptop (work)".to_string(),
                last_used: Some(later(60)),
            },
        )
        .await?;
    let used_key = store.ssh_keys().get(&ctx, key.ssh_key_id).await?;
    assert_eq!(used_key.last_used, Some(later(60)));

    let session = store
        .sessions()
        .create(
            &ctx,
            &audit,
            &CreateSessionParams {
                user_id: author.user_id,
                created_at: fixed_time(),
                expires_at: later(3_600),
                last_access: Some(later(5)),
                ip_address: Some("203.0.113.9".to_string()),
                user_agent: Some("folio-tests/1.0".to_string()),
                session_data: Some(r#"{"theme":"dark"}"#.to_string()),
            },
        )
        .await?;
    assert_canonical(session.session_id);

    let token = store
        .tokens()
        .create(
            &ctx,
            &audit,
            &CreateTokenParams {
                user_id: author.user_id,
                token_type: "api".to_string(),
                token: format!("tok-{run}"),
                issued_at: fixed_time(),
                expires_at: later(86_400),
                revoked: true,
            },
        )
        .await?;
    assert_canonical(token.token_id);
    assert!(token.revoked);

    let oauth = store
        .oauth()
        .create(
            &ctx,
            &audit,
            &CreateUserOauthParams {
                user_id: author.user_id,
                oauth_provider: "github".to_string(),
                oauth_provider_user_id: format!("gh-{run}"),
                access_token: "gho_access".to_string(),
                refresh_token: "ghr_refresh".to_string(),
                token_expires_at: later(7_200),
                date_created: fixed_time(),
            },
        )
        .await?;
    assert_canonical(oauth.user_oauth_id);

    let mut home_params = route(&format!("/home-{run}"), Some(author.user_id));
    home_params.title = "Home".to_string();
    home_params.status = 2;
    let home = store.routes().create(&ctx, &audit, &home_params).await?;
    assert_canonical(home.route_id);
    assert_eq!(home.status, 2);

    let page = store
        .datatypes()
        .create(&ctx, &audit, &datatype("Page", Some(author.user_id)))
        .await?;
    assert_canonical(page.datatype_id);

    let title = store
        .fields()
        .create(&ctx, &audit, &field("Title", page.datatype_id, None))
        .await?;
    assert_canonical(title.field_id);

    let body = store
        .content_data()
        .create(
            &ctx,
            &audit,
            &content(Some(home.route_id), Some(page.datatype_id), Some(author.user_id)),
        )
        .await?;
    assert_canonical(body.content_data_id);

    let value = store
        .content_fields()
        .create(
            &ctx,
            &audit,
            &content_field(
                Some(home.route_id),
                body.content_data_id,
                title.field_id,
                "Title text",
                Some(author.user_id),
            ),
        )
        .await?;
    assert_canonical(value.content_field_id);

    for event in store.list_change_events(&ctx, 100).await? {
        assert_canonical(event.event_id);
    }

    let stored_user = store.users().get(&ctx, author.user_id).await?;
    let stored_token = store.tokens().get(&ctx, token.token_id).await?;
    let stored_oauth = store.oauth().get(&ctx, oauth.user_oauth_id).await?;
    assert_eq!(stored_token, token);
    assert_eq!(stored_oauth, oauth);

    let assembler = ViewAssembler::new(&store);
    Ok(ParitySnapshot {
        created: json!({
            "user": to_normalized(&author),
            "ssh_key": to_normalized(&key),
            "ssh_key_used": to_normalized(&used_key),
            "session": to_normalized(&session),
            "token": to_normalized(&token),
            "oauth": to_normalized(&oauth),
            "route": to_normalized(&home),
            "datatype": to_normalized(&page),
            "field": to_normalized(&title),
            "content_data": to_normalized(&body),
            "content_field": to_normalized(&value),
        }),
        secrets: vec![
            stored_user.hash,
            stored_token.token,
            stored_oauth.access_token,
            stored_oauth.refresh_token,
        ],
        views: json!({
            "content": to_normalized(&assembler.content_data(&ctx, body.content_data_id).await?),
            "datatype": to_normalized(&assembler.datatype_full(&ctx, page.datatype_id).await?),
            "user": to_normalized(&assembler.user_full(&ctx, author.user_id).await?),
        }),
    })
}

async fn sqlite_baseline(run: &str) -> StoreResult<ParitySnapshot> {
    let baseline_dir = tempdir().expect("tempdir");
    let baseline_config = FolioConfig::default_sqlite(
        baseline_dir
            .path()
            .join("baseline.sqlite")
            .to_string_lossy(),
    );
    run_parity_test::<Sqlite>(baseline_config, run).await
}

fn remote_config(database: DatabaseConfig) -> FolioConfig {
    FolioConfig {
        database,
        pool: None,
        recording_mode: None,
    }
}

fn run_suffix() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}

#[tokio::test]
async fn sqlite_baseline_covers_every_table() -> StoreResult<()> {
    let baseline = sqlite_baseline(&run_suffix()).await?;
    let created = baseline.created.as_object().expect("created map");
    assert_eq!(created.len(), 11);
    assert_eq!(baseline.created["token"]["revoked"], true);
    assert!(baseline.created["token"].get("token").is_none());
    assert_eq!(baseline.created["session"]["ip_address"], "203.0.113.9");
    assert!(baseline.created["ssh_key"]["last_used"].is_null());
    assert!(!baseline.created["ssh_key_used"]["last_used"].is_null());
    assert_eq!(baseline.created["route"]["status"], 2);
    assert_eq!(
        baseline.secrets,
        vec![
            "$argon2id$v=19$stub".to_string(),
            baseline.secrets[1].clone(),
            "gho_access".to_string(),
            "ghr_refresh".to_string(),
        ]
    );
    assert!(baseline.secrets[1].starts_with("tok-"));
    Ok(())
}

#[tokio::test]
async fn cross_db_parity_postgres() -> StoreResult<()> {
    let url = match std::env::var("FOLIO_PG_URL") {
        Ok(url) => url,
        Err(_) => return Ok(()),
    };
    let run = run_suffix();
    let baseline = sqlite_baseline(&run).await?;
    let postgres =
        run_parity_test::<Postgres>(remote_config(DatabaseConfig::Postgres { url }), &run).await?;
    assert_eq!(baseline, postgres);
    Ok(())
}

#[tokio::test]
async fn cross_db_parity_mysql() -> StoreResult<()> {
    let url = match std::env::var("FOLIO_MYSQL_URL") {
        Ok(url) => url,
        Err(_) => return Ok(()),
    };
    let run = run_suffix();
    let baseline = sqlite_baseline(&run).await?;
    let mysql = run_parity_test::<MySql>(remote_config(DatabaseConfig::Mysql { url }), &run).await?;
    assert_eq!(baseline, mysql);
    Ok(())
}
