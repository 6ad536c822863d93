#![allow(dead_code)]

use std::path::Path;

use folio_store::{
    ContentDataId, CreateContentDataParams, CreateContentFieldParams, CreateDatatypeParams,
    CreateFieldParams, CreateRouteParams, CreateUserParams, DatatypeId, FieldId, RouteId,
    SqliteStore, Timestamp, UserId,
};

pub async fn sqlite_store(dir: &Path) -> SqliteStore {
    let url = format!("sqlite://{}?mode=rwc", dir.join("folio.sqlite").display());
    SqliteStore::connect(url).await.expect("connect sqlite")
}

/// Whole seconds, so values survive every backend unchanged.
pub fn fixed_time() -> Timestamp {
    Timestamp::from_unix(1_735_689_600).expect("timestamp")
}

pub fn user(name: &str) -> CreateUserParams {
    CreateUserParams {
        username: name.to_string(),
        name: name.to_string(),
        email: format!("{name}@example.com"),
        hash: "$argon2id$v=19$stub".to_string(),
        role: "editor".to_string(),
        date_created: fixed_time(),
        date_modified: fixed_time(),
    }
}

pub fn route(slug: &str, author: Option<UserId>) -> CreateRouteParams {
    CreateRouteParams {
        slug: slug.to_string(),
        title: slug.trim_start_matches('/').to_string(),
        status: 1,
        author_id: author,
        date_created: fixed_time(),
        date_modified: fixed_time(),
    }
}

pub fn datatype(label: &str, author: Option<UserId>) -> CreateDatatypeParams {
    CreateDatatypeParams {
        parent_id: None,
        label: label.to_string(),
        datatype_type: "ROOT".to_string(),
        author_id: author,
        date_created: fixed_time(),
        date_modified: fixed_time(),
    }
}

pub fn field(label: &str, datatype: DatatypeId, author: Option<UserId>) -> CreateFieldParams {
    CreateFieldParams {
        parent_id: Some(datatype),
        label: label.to_string(),
        data: String::new(),
        field_type: "text".to_string(),
        author_id: author,
        date_created: fixed_time(),
        date_modified: fixed_time(),
    }
}

pub fn content(
    route: Option<RouteId>,
    datatype: Option<DatatypeId>,
    author: Option<UserId>,
) -> CreateContentDataParams {
    CreateContentDataParams {
        route_id: route,
        parent_id: None,
        datatype_id: datatype,
        author_id: author,
        status: "published".to_string(),
        date_created: fixed_time(),
        date_modified: fixed_time(),
    }
}

pub fn content_field(
    route: Option<RouteId>,
    content: ContentDataId,
    field: FieldId,
    value: &str,
    author: Option<UserId>,
) -> CreateContentFieldParams {
    CreateContentFieldParams {
        route_id: route,
        content_data_id: content,
        field_id: field,
        field_value: value.to_string(),
        author_id: author,
        date_created: fixed_time(),
        date_modified: fixed_time(),
    }
}
