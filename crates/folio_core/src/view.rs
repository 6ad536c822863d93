//! Read-only composed views.
//!
//! Each assembly issues a fixed number of queries against a [`ViewSource`]:
//! single-valued relations are fetched only when their foreign key is set,
//! one-to-many relations come back from one query each. Absent single
//! relations serialize as omitted keys; empty collections serialize as `[]`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    ContentData, ContentDataId, ContentField, ContentFieldId, Datatype, DatatypeId, ExecContext,
    Field, FieldId, RouteId, Session, SessionId, StoreResult, Timestamp, Token, TokenId, User,
    UserId, UserOauth, UserOauthId, UserSshKey, UserSshKeyId,
};

/// A content field row joined with its field definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentFieldWithDef {
    pub content_field: ContentField,
    pub label: String,
    pub field_type: String,
}

/// The plain (non-audited) reads the assembler depends on.
#[async_trait]
pub trait ViewSource: Send + Sync {
    async fn get_user(&self, ctx: &ExecContext, id: UserId) -> StoreResult<User>;
    async fn get_datatype(&self, ctx: &ExecContext, id: DatatypeId) -> StoreResult<Datatype>;
    async fn get_content_data(
        &self,
        ctx: &ExecContext,
        id: ContentDataId,
    ) -> StoreResult<ContentData>;
    async fn find_oauth_by_user(
        &self,
        ctx: &ExecContext,
        id: UserId,
    ) -> StoreResult<Option<UserOauth>>;
    async fn list_ssh_keys_by_user(
        &self,
        ctx: &ExecContext,
        id: UserId,
    ) -> StoreResult<Vec<UserSshKey>>;
    async fn list_sessions_by_user(
        &self,
        ctx: &ExecContext,
        id: UserId,
    ) -> StoreResult<Vec<Session>>;
    async fn list_tokens_by_user(&self, ctx: &ExecContext, id: UserId) -> StoreResult<Vec<Token>>;
    async fn list_fields_by_datatype(
        &self,
        ctx: &ExecContext,
        id: DatatypeId,
    ) -> StoreResult<Vec<Field>>;
    async fn list_content_fields_with_defs(
        &self,
        ctx: &ExecContext,
        id: ContentDataId,
    ) -> StoreResult<Vec<ContentFieldWithDef>>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    pub user_id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for AuthorView {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSshKeyView {
    pub ssh_key_id: UserSshKeyId,
    pub key_type: String,
    pub fingerprint: String,
    pub label: String,
    pub date_created: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<Timestamp>,
}

impl From<UserSshKey> for UserSshKeyView {
    fn from(key: UserSshKey) -> Self {
        Self {
            ssh_key_id: key.ssh_key_id,
            key_type: key.key_type,
            fingerprint: key.fingerprint,
            label: key.label,
            date_created: key.date_created,
            last_used: key.last_used,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_access: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            created_at: session.created_at,
            expires_at: session.expires_at,
            last_access: session.last_access,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenView {
    pub token_id: TokenId,
    pub token_type: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked: bool,
}

impl From<Token> for TokenView {
    fn from(token: Token) -> Self {
        Self {
            token_id: token.token_id,
            token_type: token.token_type,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            revoked: token.revoked,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOauthView {
    pub user_oauth_id: UserOauthId,
    pub oauth_provider: String,
    pub oauth_provider_user_id: String,
    pub token_expires_at: Timestamp,
    pub date_created: Timestamp,
}

impl From<UserOauth> for UserOauthView {
    fn from(oauth: UserOauth) -> Self {
        Self {
            user_oauth_id: oauth.user_oauth_id,
            oauth_provider: oauth.oauth_provider,
            oauth_provider_user_id: oauth.oauth_provider_user_id,
            token_expires_at: oauth.token_expires_at,
            date_created: oauth.date_created,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFullView {
    pub user_id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<UserOauthView>,
    #[serde(default)]
    pub ssh_keys: Vec<UserSshKeyView>,
    #[serde(default)]
    pub sessions: Vec<SessionView>,
    #[serde(default)]
    pub tokens: Vec<TokenView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatypeSummaryView {
    pub datatype_id: DatatypeId,
    pub label: String,
    #[serde(rename = "type")]
    pub datatype_type: String,
}

impl From<Datatype> for DatatypeSummaryView {
    fn from(datatype: Datatype) -> Self {
        Self {
            datatype_id: datatype.datatype_id,
            label: datatype.label,
            datatype_type: datatype.datatype_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldView {
    pub field_id: FieldId,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub data: String,
}

impl From<Field> for FieldView {
    fn from(field: Field) -> Self {
        Self {
            field_id: field.field_id,
            label: field.label,
            field_type: field.field_type,
            data: field.data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFieldView {
    pub content_field_id: ContentFieldId,
    pub field_id: FieldId,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub value: String,
}

impl From<ContentFieldWithDef> for ContentFieldView {
    fn from(row: ContentFieldWithDef) -> Self {
        Self {
            content_field_id: row.content_field.content_field_id,
            field_id: row.content_field.field_id,
            label: row.label,
            field_type: row.field_type,
            value: row.content_field.field_value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDataView {
    pub content_data_id: ContentDataId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<RouteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ContentDataId>,
    pub status: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<DatatypeSummaryView>,
    #[serde(default)]
    pub fields: Vec<ContentFieldView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatypeFullView {
    pub datatype_id: DatatypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<DatatypeId>,
    pub label: String,
    #[serde(rename = "type")]
    pub datatype_type: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorView>,
    #[serde(default)]
    pub fields: Vec<FieldView>,
}

pub struct ViewAssembler<'a, S: ViewSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: ViewSource + ?Sized> ViewAssembler<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    async fn author(
        &self,
        ctx: &ExecContext,
        author_id: Option<UserId>,
    ) -> StoreResult<Option<AuthorView>> {
        match author_id {
            Some(id) => Ok(Some(self.source.get_user(ctx, id).await?.into())),
            None => Ok(None),
        }
    }

    /// Five queries: user, oauth, ssh keys, sessions, tokens.
    pub async fn user_full(
        &self,
        ctx: &ExecContext,
        user_id: UserId,
    ) -> StoreResult<UserFullView> {
        let user = self.source.get_user(ctx, user_id).await?;
        let oauth = self.source.find_oauth_by_user(ctx, user_id).await?;
        let ssh_keys = self.source.list_ssh_keys_by_user(ctx, user_id).await?;
        let sessions = self.source.list_sessions_by_user(ctx, user_id).await?;
        let tokens = self.source.list_tokens_by_user(ctx, user_id).await?;
        Ok(UserFullView {
            user_id: user.user_id,
            username: user.username,
            name: user.name,
            email: user.email,
            role: user.role,
            date_created: user.date_created,
            date_modified: user.date_modified,
            oauth: oauth.map(UserOauthView::from),
            ssh_keys: ssh_keys.into_iter().map(UserSshKeyView::from).collect(),
            sessions: sessions.into_iter().map(SessionView::from).collect(),
            tokens: tokens.into_iter().map(TokenView::from).collect(),
        })
    }

    /// At most four queries: content, author, datatype, joined field values.
    pub async fn content_data(
        &self,
        ctx: &ExecContext,
        content_data_id: ContentDataId,
    ) -> StoreResult<ContentDataView> {
        let content = self.source.get_content_data(ctx, content_data_id).await?;
        let author = self.author(ctx, content.author_id).await?;
        let datatype = match content.datatype_id {
            Some(id) => Some(self.source.get_datatype(ctx, id).await?.into()),
            None => None,
        };
        let fields = self
            .source
            .list_content_fields_with_defs(ctx, content_data_id)
            .await?;
        Ok(ContentDataView {
            content_data_id: content.content_data_id,
            route_id: content.route_id,
            parent_id: content.parent_id,
            status: content.status,
            date_created: content.date_created,
            date_modified: content.date_modified,
            author,
            datatype,
            fields: fields.into_iter().map(ContentFieldView::from).collect(),
        })
    }

    /// At most three queries: datatype, author, fields.
    pub async fn datatype_full(
        &self,
        ctx: &ExecContext,
        datatype_id: DatatypeId,
    ) -> StoreResult<DatatypeFullView> {
        let datatype = self.source.get_datatype(ctx, datatype_id).await?;
        let author = self.author(ctx, datatype.author_id).await?;
        let fields = self.source.list_fields_by_datatype(ctx, datatype_id).await?;
        Ok(DatatypeFullView {
            datatype_id: datatype.datatype_id,
            parent_id: datatype.parent_id,
            label: datatype.label,
            datatype_type: datatype.datatype_type,
            date_created: datatype.date_created,
            date_modified: datatype.date_modified,
            author,
            fields: fields.into_iter().map(FieldView::from).collect(),
        })
    }
}
