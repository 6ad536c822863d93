use serde::{Deserialize, Serialize};

use crate::{
    ContentDataId, ContentFieldId, DatatypeId, FieldId, RouteId, SessionId, StoreError,
    StoreResult, Timestamp, TokenId, UserId, UserOauthId, UserSshKeyId,
};

/// Checks a parameter set before any I/O is attempted.
pub trait Validate {
    fn validate(&self) -> StoreResult<()>;
}

fn require(value: &str, what: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_email(value: &str) -> StoreResult<()> {
    require(value, "email")?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(StoreError::validation(format!("invalid email '{value}'"))),
    }
}

fn require_slug(value: &str) -> StoreResult<()> {
    require(value, "slug")?;
    if !value.starts_with('/') {
        return Err(StoreError::validation(format!(
            "slug '{value}' must start with '/'"
        )));
    }
    Ok(())
}

// users

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hash: String,
    pub role: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserParams {
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hash: String,
    pub role: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserParams {
    pub user_id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hash: String,
    pub role: String,
    pub date_modified: Timestamp,
}

impl Validate for CreateUserParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.username, "username")?;
        require_email(&self.email)?;
        require(&self.hash, "password hash")?;
        require(&self.role, "role")
    }
}

impl Validate for UpdateUserParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.username, "username")?;
        require_email(&self.email)?;
        require(&self.hash, "password hash")?;
        require(&self.role, "role")
    }
}

// user_ssh_keys

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSshKey {
    pub ssh_key_id: UserSshKeyId,
    pub user_id: UserId,
    pub public_key: String,
    pub key_type: String,
    pub fingerprint: String,
    pub label: String,
    pub date_created: Timestamp,
    pub last_used: Option<Timestamp>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserSshKeyParams {
    pub user_id: UserId,
    pub public_key: String,
    pub key_type: String,
    pub fingerprint: String,
    pub label: String,
    pub date_created: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserSshKeyParams {
    pub ssh_key_id: UserSshKeyId,
    pub label: String,
    pub last_used: Option<Timestamp>,
}

impl Validate for CreateUserSshKeyParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.public_key, "public key")?;
        require(&self.key_type, "key type")?;
        require(&self.fingerprint, "fingerprint")
    }
}

impl Validate for UpdateUserSshKeyParams {
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

// sessions

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub last_access: Option<Timestamp>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub session_data: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionParams {
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub last_access: Option<Timestamp>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub session_data: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSessionParams {
    pub session_id: SessionId,
    pub expires_at: Timestamp,
    pub last_access: Option<Timestamp>,
    pub session_data: Option<String>,
}

impl Validate for CreateSessionParams {
    fn validate(&self) -> StoreResult<()> {
        if self.expires_at < self.created_at {
            return Err(StoreError::validation("session expires before it is created"));
        }
        Ok(())
    }
}

impl Validate for UpdateSessionParams {
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

// tokens

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_id: TokenId,
    pub user_id: UserId,
    pub token_type: String,
    #[serde(skip_serializing, default)]
    pub token: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTokenParams {
    pub user_id: UserId,
    pub token_type: String,
    #[serde(skip_serializing, default)]
    pub token: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTokenParams {
    pub token_id: TokenId,
    pub expires_at: Timestamp,
    pub revoked: bool,
}

impl Validate for CreateTokenParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.token_type, "token type")?;
        require(&self.token, "token")
    }
}

impl Validate for UpdateTokenParams {
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

// user_oauth

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOauth {
    pub user_oauth_id: UserOauthId,
    pub user_id: UserId,
    pub oauth_provider: String,
    pub oauth_provider_user_id: String,
    #[serde(skip_serializing, default)]
    pub access_token: String,
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    pub token_expires_at: Timestamp,
    pub date_created: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserOauthParams {
    pub user_id: UserId,
    pub oauth_provider: String,
    pub oauth_provider_user_id: String,
    #[serde(skip_serializing, default)]
    pub access_token: String,
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    pub token_expires_at: Timestamp,
    pub date_created: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserOauthParams {
    pub user_oauth_id: UserOauthId,
    #[serde(skip_serializing, default)]
    pub access_token: String,
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    pub token_expires_at: Timestamp,
}

impl Validate for CreateUserOauthParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.oauth_provider, "oauth provider")?;
        require(&self.oauth_provider_user_id, "oauth provider user id")
    }
}

impl Validate for UpdateUserOauthParams {
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

// routes

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: RouteId,
    pub slug: String,
    pub title: String,
    pub status: i64,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRouteParams {
    pub slug: String,
    pub title: String,
    pub status: i64,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRouteParams {
    pub route_id: RouteId,
    pub slug: String,
    pub title: String,
    pub status: i64,
    pub author_id: Option<UserId>,
    pub date_modified: Timestamp,
}

impl Validate for CreateRouteParams {
    fn validate(&self) -> StoreResult<()> {
        require_slug(&self.slug)?;
        require(&self.title, "title")
    }
}

impl Validate for UpdateRouteParams {
    fn validate(&self) -> StoreResult<()> {
        require_slug(&self.slug)?;
        require(&self.title, "title")
    }
}

// datatypes

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datatype {
    pub datatype_id: DatatypeId,
    pub parent_id: Option<DatatypeId>,
    pub label: String,
    #[serde(rename = "type")]
    pub datatype_type: String,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDatatypeParams {
    pub parent_id: Option<DatatypeId>,
    pub label: String,
    #[serde(rename = "type")]
    pub datatype_type: String,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDatatypeParams {
    pub datatype_id: DatatypeId,
    pub parent_id: Option<DatatypeId>,
    pub label: String,
    #[serde(rename = "type")]
    pub datatype_type: String,
    pub author_id: Option<UserId>,
    pub date_modified: Timestamp,
}

impl Validate for CreateDatatypeParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.label, "label")?;
        require(&self.datatype_type, "type")
    }
}

impl Validate for UpdateDatatypeParams {
    fn validate(&self) -> StoreResult<()> {
        if self.parent_id == Some(self.datatype_id) {
            return Err(StoreError::validation("datatype cannot be its own parent"));
        }
        require(&self.label, "label")?;
        require(&self.datatype_type, "type")
    }
}

// fields

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub field_id: FieldId,
    pub parent_id: Option<DatatypeId>,
    pub label: String,
    pub data: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFieldParams {
    pub parent_id: Option<DatatypeId>,
    pub label: String,
    pub data: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFieldParams {
    pub field_id: FieldId,
    pub parent_id: Option<DatatypeId>,
    pub label: String,
    pub data: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub author_id: Option<UserId>,
    pub date_modified: Timestamp,
}

impl Validate for CreateFieldParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.label, "label")?;
        require(&self.field_type, "type")
    }
}

impl Validate for UpdateFieldParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.label, "label")?;
        require(&self.field_type, "type")
    }
}

// content_data

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentData {
    pub content_data_id: ContentDataId,
    pub route_id: Option<RouteId>,
    pub parent_id: Option<ContentDataId>,
    pub datatype_id: Option<DatatypeId>,
    pub author_id: Option<UserId>,
    pub status: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContentDataParams {
    pub route_id: Option<RouteId>,
    pub parent_id: Option<ContentDataId>,
    pub datatype_id: Option<DatatypeId>,
    pub author_id: Option<UserId>,
    pub status: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateContentDataParams {
    pub content_data_id: ContentDataId,
    pub route_id: Option<RouteId>,
    pub parent_id: Option<ContentDataId>,
    pub datatype_id: Option<DatatypeId>,
    pub author_id: Option<UserId>,
    pub status: String,
    pub date_modified: Timestamp,
}

impl Validate for CreateContentDataParams {
    fn validate(&self) -> StoreResult<()> {
        require(&self.status, "status")
    }
}

impl Validate for UpdateContentDataParams {
    fn validate(&self) -> StoreResult<()> {
        if self.parent_id == Some(self.content_data_id) {
            return Err(StoreError::validation("content cannot be its own parent"));
        }
        require(&self.status, "status")
    }
}

// content_fields

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentField {
    pub content_field_id: ContentFieldId,
    pub route_id: Option<RouteId>,
    pub content_data_id: ContentDataId,
    pub field_id: FieldId,
    pub field_value: String,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContentFieldParams {
    pub route_id: Option<RouteId>,
    pub content_data_id: ContentDataId,
    pub field_id: FieldId,
    pub field_value: String,
    pub author_id: Option<UserId>,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateContentFieldParams {
    pub content_field_id: ContentFieldId,
    pub field_value: String,
    pub author_id: Option<UserId>,
    pub date_modified: Timestamp,
}

impl Validate for CreateContentFieldParams {
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl Validate for UpdateContentFieldParams {
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}
