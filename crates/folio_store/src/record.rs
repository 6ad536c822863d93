//! Backend-native row shapes.
//!
//! Every table has one row struct generic over the [`Dialect`], so ids,
//! timestamps and flags keep their native driver types until they are mapped
//! into the backend-independent domain entity.

use sea_orm::sea_query::{Iden, Value as SeaValue};
use sea_orm::{DbErr, QueryResult, TryGetable};
use serde::Serialize;

use folio_core::{
    ContentData, ContentDataId, ContentField, ContentFieldId, CreateContentDataParams,
    CreateContentFieldParams, CreateDatatypeParams, CreateFieldParams, CreateRouteParams,
    CreateSessionParams, CreateTokenParams, CreateUserOauthParams, CreateUserParams,
    CreateUserSshKeyParams, Datatype, DatatypeId, EntityId, Field, FieldId, Route, RouteId,
    Session, SessionId, StoreResult, TableKind, Timestamp, Token, TokenId,
    UpdateContentDataParams, UpdateContentFieldParams, UpdateDatatypeParams, UpdateFieldParams,
    UpdateRouteParams, UpdateSessionParams, UpdateTokenParams, UpdateUserOauthParams,
    UpdateUserParams, UpdateUserSshKeyParams, User, UserId, UserOauth, UserOauthId, UserSshKey,
    UserSshKeyId, Validate,
};

use crate::db::*;
use crate::dialect::Dialect;

pub type ColumnValues<C> = Vec<(C, SeaValue)>;

/// A table's native row for one dialect, plus the column mapping of its
/// create and update parameters.
pub trait Record<D: Dialect>: Sized + Send + Sync + 'static {
    type Column: Iden + Copy + 'static;
    type Id: EntityId;
    type Entity: Serialize + Send + Sync + 'static;
    type Create: Validate + Serialize + Send + Sync + 'static;
    type Update: Validate + Serialize + Send + Sync + 'static;

    const TABLE: TableKind;
    const TABLE_IDEN: Self::Column;
    const ID_COLUMN: Self::Column;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr>;
    fn id(&self) -> StoreResult<Self::Id>;
    fn into_entity(self) -> StoreResult<Self::Entity>;
    fn insert_values(id: Self::Id, params: &Self::Create) -> ColumnValues<Self::Column>;
    fn update_id(params: &Self::Update) -> Self::Id;
    fn update_values(params: &Self::Update) -> ColumnValues<Self::Column>;
}

pub(crate) fn get<T: TryGetable>(row: &QueryResult, col: impl Iden) -> Result<T, DbErr> {
    row.try_get("", &Iden::to_string(&col))
}

pub(crate) fn entity_id<D: Dialect, T: EntityId>(value: D::Id) -> StoreResult<T> {
    D::id_from_native(value).map(T::from)
}

pub(crate) fn optional_id<D: Dialect, T: EntityId>(
    value: Option<D::Id>,
) -> StoreResult<Option<T>> {
    value.map(entity_id::<D, T>).transpose()
}

pub(crate) fn id_value<D: Dialect>(id: impl EntityId) -> SeaValue {
    D::id_value(Some(id.ulid()))
}

pub(crate) fn optional_id_value<D: Dialect, T: EntityId>(id: Option<T>) -> SeaValue {
    D::id_value(id.map(|id| id.ulid()))
}

fn time_value<D: Dialect>(ts: Timestamp) -> SeaValue {
    D::time_value(Some(ts))
}

fn optional_time<D: Dialect>(value: Option<D::Time>) -> StoreResult<Option<Timestamp>> {
    value.map(D::time_from_native).transpose()
}

// users

pub struct UserRow<D: Dialect> {
    pub user_id: D::Id,
    pub username: String,
    pub name: String,
    pub email: String,
    pub hash: String,
    pub role: String,
    pub date_created: D::Time,
    pub date_modified: D::Time,
}

impl<D: Dialect> Record<D> for UserRow<D> {
    type Column = FolioUsers;
    type Id = UserId;
    type Entity = User;
    type Create = CreateUserParams;
    type Update = UpdateUserParams;

    const TABLE: TableKind = TableKind::Users;
    const TABLE_IDEN: FolioUsers = FolioUsers::Table;
    const ID_COLUMN: FolioUsers = FolioUsers::UserId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            user_id: get(row, FolioUsers::UserId)?,
            username: get(row, FolioUsers::Username)?,
            name: get(row, FolioUsers::Name)?,
            email: get(row, FolioUsers::Email)?,
            hash: get(row, FolioUsers::Hash)?,
            role: get(row, FolioUsers::Role)?,
            date_created: get(row, FolioUsers::DateCreated)?,
            date_modified: get(row, FolioUsers::DateModified)?,
        })
    }

    fn id(&self) -> StoreResult<UserId> {
        entity_id::<D, _>(self.user_id.clone())
    }

    fn into_entity(self) -> StoreResult<User> {
        Ok(User {
            user_id: entity_id::<D, _>(self.user_id)?,
            username: self.username,
            name: self.name,
            email: self.email,
            hash: self.hash,
            role: self.role,
            date_created: D::time_from_native(self.date_created)?,
            date_modified: D::time_from_native(self.date_modified)?,
        })
    }

    fn insert_values(id: UserId, params: &CreateUserParams) -> ColumnValues<FolioUsers> {
        vec![
            (FolioUsers::UserId, id_value::<D>(id)),
            (FolioUsers::Username, params.username.clone().into()),
            (FolioUsers::Name, params.name.clone().into()),
            (FolioUsers::Email, params.email.clone().into()),
            (FolioUsers::Hash, params.hash.clone().into()),
            (FolioUsers::Role, params.role.clone().into()),
            (FolioUsers::DateCreated, time_value::<D>(params.date_created)),
            (FolioUsers::DateModified, time_value::<D>(params.date_modified)),
        ]
    }

    fn update_id(params: &UpdateUserParams) -> UserId {
        params.user_id
    }

    fn update_values(params: &UpdateUserParams) -> ColumnValues<FolioUsers> {
        vec![
            (FolioUsers::Username, params.username.clone().into()),
            (FolioUsers::Name, params.name.clone().into()),
            (FolioUsers::Email, params.email.clone().into()),
            (FolioUsers::Hash, params.hash.clone().into()),
            (FolioUsers::Role, params.role.clone().into()),
            (FolioUsers::DateModified, time_value::<D>(params.date_modified)),
        ]
    }
}

// user_ssh_keys

pub struct UserSshKeyRow<D: Dialect> {
    pub ssh_key_id: D::Id,
    pub user_id: D::Id,
    pub public_key: String,
    pub key_type: String,
    pub fingerprint: String,
    pub label: String,
    pub date_created: D::Time,
    pub last_used: Option<D::Time>,
}

impl<D: Dialect> Record<D> for UserSshKeyRow<D> {
    type Column = FolioUserSshKeys;
    type Id = UserSshKeyId;
    type Entity = UserSshKey;
    type Create = CreateUserSshKeyParams;
    type Update = UpdateUserSshKeyParams;

    const TABLE: TableKind = TableKind::UserSshKeys;
    const TABLE_IDEN: FolioUserSshKeys = FolioUserSshKeys::Table;
    const ID_COLUMN: FolioUserSshKeys = FolioUserSshKeys::SshKeyId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            ssh_key_id: get(row, FolioUserSshKeys::SshKeyId)?,
            user_id: get(row, FolioUserSshKeys::UserId)?,
            public_key: get(row, FolioUserSshKeys::PublicKey)?,
            key_type: get(row, FolioUserSshKeys::KeyType)?,
            fingerprint: get(row, FolioUserSshKeys::Fingerprint)?,
            label: get(row, FolioUserSshKeys::Label)?,
            date_created: get(row, FolioUserSshKeys::DateCreated)?,
            last_used: get(row, FolioUserSshKeys::LastUsed)?,
        })
    }

    fn id(&self) -> StoreResult<UserSshKeyId> {
        entity_id::<D, _>(self.ssh_key_id.clone())
    }

    fn into_entity(self) -> StoreResult<UserSshKey> {
        Ok(UserSshKey {
            ssh_key_id: entity_id::<D, _>(self.ssh_key_id)?,
            user_id: entity_id::<D, _>(self.user_id)?,
            public_key: self.public_key,
            key_type: self.key_type,
            fingerprint: self.fingerprint,
            label: self.label,
            date_created: D::time_from_native(self.date_created)?,
            last_used: optional_time::<D>(self.last_used)?,
        })
    }

    fn insert_values(
        id: UserSshKeyId,
        params: &CreateUserSshKeyParams,
    ) -> ColumnValues<FolioUserSshKeys> {
        vec![
            (FolioUserSshKeys::SshKeyId, id_value::<D>(id)),
            (FolioUserSshKeys::UserId, id_value::<D>(params.user_id)),
            (FolioUserSshKeys::PublicKey, params.public_key.clone().into()),
            (FolioUserSshKeys::KeyType, params.key_type.clone().into()),
            (FolioUserSshKeys::Fingerprint, params.fingerprint.clone().into()),
            (FolioUserSshKeys::Label, params.label.clone().into()),
            (FolioUserSshKeys::DateCreated, time_value::<D>(params.date_created)),
            (FolioUserSshKeys::LastUsed, D::time_value(None)),
        ]
    }

    fn update_id(params: &UpdateUserSshKeyParams) -> UserSshKeyId {
        params.ssh_key_id
    }

    fn update_values(params: &UpdateUserSshKeyParams) -> ColumnValues<FolioUserSshKeys> {
        vec![
            (FolioUserSshKeys::Label, params.label.clone().into()),
            (FolioUserSshKeys::LastUsed, D::time_value(params.last_used)),
        ]
    }
}

// sessions

pub struct SessionRow<D: Dialect> {
    pub session_id: D::Id,
    pub user_id: D::Id,
    pub created_at: D::Time,
    pub expires_at: D::Time,
    pub last_access: Option<D::Time>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub session_data: Option<String>,
}

impl<D: Dialect> Record<D> for SessionRow<D> {
    type Column = FolioSessions;
    type Id = SessionId;
    type Entity = Session;
    type Create = CreateSessionParams;
    type Update = UpdateSessionParams;

    const TABLE: TableKind = TableKind::Sessions;
    const TABLE_IDEN: FolioSessions = FolioSessions::Table;
    const ID_COLUMN: FolioSessions = FolioSessions::SessionId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            session_id: get(row, FolioSessions::SessionId)?,
            user_id: get(row, FolioSessions::UserId)?,
            created_at: get(row, FolioSessions::CreatedAt)?,
            expires_at: get(row, FolioSessions::ExpiresAt)?,
            last_access: get(row, FolioSessions::LastAccess)?,
            ip_address: get(row, FolioSessions::IpAddress)?,
            user_agent: get(row, FolioSessions::UserAgent)?,
            session_data: get(row, FolioSessions::SessionData)?,
        })
    }

    fn id(&self) -> StoreResult<SessionId> {
        entity_id::<D, _>(self.session_id.clone())
    }

    fn into_entity(self) -> StoreResult<Session> {
        Ok(Session {
            session_id: entity_id::<D, _>(self.session_id)?,
            user_id: entity_id::<D, _>(self.user_id)?,
            created_at: D::time_from_native(self.created_at)?,
            expires_at: D::time_from_native(self.expires_at)?,
            last_access: optional_time::<D>(self.last_access)?,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            session_data: self.session_data,
        })
    }

    fn insert_values(id: SessionId, params: &CreateSessionParams) -> ColumnValues<FolioSessions> {
        vec![
            (FolioSessions::SessionId, id_value::<D>(id)),
            (FolioSessions::UserId, id_value::<D>(params.user_id)),
            (FolioSessions::CreatedAt, time_value::<D>(params.created_at)),
            (FolioSessions::ExpiresAt, time_value::<D>(params.expires_at)),
            (FolioSessions::LastAccess, D::time_value(params.last_access)),
            (FolioSessions::IpAddress, params.ip_address.clone().into()),
            (FolioSessions::UserAgent, params.user_agent.clone().into()),
            (FolioSessions::SessionData, params.session_data.clone().into()),
        ]
    }

    fn update_id(params: &UpdateSessionParams) -> SessionId {
        params.session_id
    }

    fn update_values(params: &UpdateSessionParams) -> ColumnValues<FolioSessions> {
        vec![
            (FolioSessions::ExpiresAt, time_value::<D>(params.expires_at)),
            (FolioSessions::LastAccess, D::time_value(params.last_access)),
            (FolioSessions::SessionData, params.session_data.clone().into()),
        ]
    }
}

// tokens

pub struct TokenRow<D: Dialect> {
    pub token_id: D::Id,
    pub user_id: D::Id,
    pub token_type: String,
    pub token: String,
    pub issued_at: D::Time,
    pub expires_at: D::Time,
    pub revoked: D::Flag,
}

impl<D: Dialect> Record<D> for TokenRow<D> {
    type Column = FolioTokens;
    type Id = TokenId;
    type Entity = Token;
    type Create = CreateTokenParams;
    type Update = UpdateTokenParams;

    const TABLE: TableKind = TableKind::Tokens;
    const TABLE_IDEN: FolioTokens = FolioTokens::Table;
    const ID_COLUMN: FolioTokens = FolioTokens::TokenId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            token_id: get(row, FolioTokens::TokenId)?,
            user_id: get(row, FolioTokens::UserId)?,
            token_type: get(row, FolioTokens::TokenType)?,
            token: get(row, FolioTokens::Token)?,
            issued_at: get(row, FolioTokens::IssuedAt)?,
            expires_at: get(row, FolioTokens::ExpiresAt)?,
            revoked: get(row, FolioTokens::Revoked)?,
        })
    }

    fn id(&self) -> StoreResult<TokenId> {
        entity_id::<D, _>(self.token_id.clone())
    }

    fn into_entity(self) -> StoreResult<Token> {
        Ok(Token {
            token_id: entity_id::<D, _>(self.token_id)?,
            user_id: entity_id::<D, _>(self.user_id)?,
            token_type: self.token_type,
            token: self.token,
            issued_at: D::time_from_native(self.issued_at)?,
            expires_at: D::time_from_native(self.expires_at)?,
            revoked: D::flag_from_native(self.revoked),
        })
    }

    fn insert_values(id: TokenId, params: &CreateTokenParams) -> ColumnValues<FolioTokens> {
        vec![
            (FolioTokens::TokenId, id_value::<D>(id)),
            (FolioTokens::UserId, id_value::<D>(params.user_id)),
            (FolioTokens::TokenType, params.token_type.clone().into()),
            (FolioTokens::Token, params.token.clone().into()),
            (FolioTokens::IssuedAt, time_value::<D>(params.issued_at)),
            (FolioTokens::ExpiresAt, time_value::<D>(params.expires_at)),
            (FolioTokens::Revoked, D::flag_value(params.revoked)),
        ]
    }

    fn update_id(params: &UpdateTokenParams) -> TokenId {
        params.token_id
    }

    fn update_values(params: &UpdateTokenParams) -> ColumnValues<FolioTokens> {
        vec![
            (FolioTokens::ExpiresAt, time_value::<D>(params.expires_at)),
            (FolioTokens::Revoked, D::flag_value(params.revoked)),
        ]
    }
}

// user_oauth

pub struct UserOauthRow<D: Dialect> {
    pub user_oauth_id: D::Id,
    pub user_id: D::Id,
    pub oauth_provider: String,
    pub oauth_provider_user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: D::Time,
    pub date_created: D::Time,
}

impl<D: Dialect> Record<D> for UserOauthRow<D> {
    type Column = FolioUserOauth;
    type Id = UserOauthId;
    type Entity = UserOauth;
    type Create = CreateUserOauthParams;
    type Update = UpdateUserOauthParams;

    const TABLE: TableKind = TableKind::UserOauth;
    const TABLE_IDEN: FolioUserOauth = FolioUserOauth::Table;
    const ID_COLUMN: FolioUserOauth = FolioUserOauth::UserOauthId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            user_oauth_id: get(row, FolioUserOauth::UserOauthId)?,
            user_id: get(row, FolioUserOauth::UserId)?,
            oauth_provider: get(row, FolioUserOauth::OauthProvider)?,
            oauth_provider_user_id: get(row, FolioUserOauth::OauthProviderUserId)?,
            access_token: get(row, FolioUserOauth::AccessToken)?,
            refresh_token: get(row, FolioUserOauth::RefreshToken)?,
            token_expires_at: get(row, FolioUserOauth::TokenExpiresAt)?,
            date_created: get(row, FolioUserOauth::DateCreated)?,
        })
    }

    fn id(&self) -> StoreResult<UserOauthId> {
        entity_id::<D, _>(self.user_oauth_id.clone())
    }

    fn into_entity(self) -> StoreResult<UserOauth> {
        Ok(UserOauth {
            user_oauth_id: entity_id::<D, _>(self.user_oauth_id)?,
            user_id: entity_id::<D, _>(self.user_id)?,
            oauth_provider: self.oauth_provider,
            oauth_provider_user_id: self.oauth_provider_user_id,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_expires_at: D::time_from_native(self.token_expires_at)?,
            date_created: D::time_from_native(self.date_created)?,
        })
    }

    fn insert_values(
        id: UserOauthId,
        params: &CreateUserOauthParams,
    ) -> ColumnValues<FolioUserOauth> {
        vec![
            (FolioUserOauth::UserOauthId, id_value::<D>(id)),
            (FolioUserOauth::UserId, id_value::<D>(params.user_id)),
            (FolioUserOauth::OauthProvider, params.oauth_provider.clone().into()),
            (
                FolioUserOauth::OauthProviderUserId,
                params.oauth_provider_user_id.clone().into(),
            ),
            (FolioUserOauth::AccessToken, params.access_token.clone().into()),
            (FolioUserOauth::RefreshToken, params.refresh_token.clone().into()),
            (
                FolioUserOauth::TokenExpiresAt,
                time_value::<D>(params.token_expires_at),
            ),
            (FolioUserOauth::DateCreated, time_value::<D>(params.date_created)),
        ]
    }

    fn update_id(params: &UpdateUserOauthParams) -> UserOauthId {
        params.user_oauth_id
    }

    fn update_values(params: &UpdateUserOauthParams) -> ColumnValues<FolioUserOauth> {
        vec![
            (FolioUserOauth::AccessToken, params.access_token.clone().into()),
            (FolioUserOauth::RefreshToken, params.refresh_token.clone().into()),
            (
                FolioUserOauth::TokenExpiresAt,
                time_value::<D>(params.token_expires_at),
            ),
        ]
    }
}

// routes

pub struct RouteRow<D: Dialect> {
    pub route_id: D::Id,
    pub slug: String,
    pub title: String,
    pub status: i64,
    pub author_id: Option<D::Id>,
    pub date_created: D::Time,
    pub date_modified: D::Time,
}

impl<D: Dialect> Record<D> for RouteRow<D> {
    type Column = FolioRoutes;
    type Id = RouteId;
    type Entity = Route;
    type Create = CreateRouteParams;
    type Update = UpdateRouteParams;

    const TABLE: TableKind = TableKind::Routes;
    const TABLE_IDEN: FolioRoutes = FolioRoutes::Table;
    const ID_COLUMN: FolioRoutes = FolioRoutes::RouteId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            route_id: get(row, FolioRoutes::RouteId)?,
            slug: get(row, FolioRoutes::Slug)?,
            title: get(row, FolioRoutes::Title)?,
            status: get(row, FolioRoutes::Status)?,
            author_id: get(row, FolioRoutes::AuthorId)?,
            date_created: get(row, FolioRoutes::DateCreated)?,
            date_modified: get(row, FolioRoutes::DateModified)?,
        })
    }

    fn id(&self) -> StoreResult<RouteId> {
        entity_id::<D, _>(self.route_id.clone())
    }

    fn into_entity(self) -> StoreResult<Route> {
        Ok(Route {
            route_id: entity_id::<D, _>(self.route_id)?,
            slug: self.slug,
            title: self.title,
            status: self.status,
            author_id: optional_id::<D, _>(self.author_id)?,
            date_created: D::time_from_native(self.date_created)?,
            date_modified: D::time_from_native(self.date_modified)?,
        })
    }

    fn insert_values(id: RouteId, params: &CreateRouteParams) -> ColumnValues<FolioRoutes> {
        vec![
            (FolioRoutes::RouteId, id_value::<D>(id)),
            (FolioRoutes::Slug, params.slug.clone().into()),
            (FolioRoutes::Title, params.title.clone().into()),
            (FolioRoutes::Status, params.status.into()),
            (FolioRoutes::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioRoutes::DateCreated, time_value::<D>(params.date_created)),
            (FolioRoutes::DateModified, time_value::<D>(params.date_modified)),
        ]
    }

    fn update_id(params: &UpdateRouteParams) -> RouteId {
        params.route_id
    }

    fn update_values(params: &UpdateRouteParams) -> ColumnValues<FolioRoutes> {
        vec![
            (FolioRoutes::Slug, params.slug.clone().into()),
            (FolioRoutes::Title, params.title.clone().into()),
            (FolioRoutes::Status, params.status.into()),
            (FolioRoutes::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioRoutes::DateModified, time_value::<D>(params.date_modified)),
        ]
    }
}

// datatypes

pub struct DatatypeRow<D: Dialect> {
    pub datatype_id: D::Id,
    pub parent_id: Option<D::Id>,
    pub label: String,
    pub datatype_type: String,
    pub author_id: Option<D::Id>,
    pub date_created: D::Time,
    pub date_modified: D::Time,
}

impl<D: Dialect> Record<D> for DatatypeRow<D> {
    type Column = FolioDatatypes;
    type Id = DatatypeId;
    type Entity = Datatype;
    type Create = CreateDatatypeParams;
    type Update = UpdateDatatypeParams;

    const TABLE: TableKind = TableKind::Datatypes;
    const TABLE_IDEN: FolioDatatypes = FolioDatatypes::Table;
    const ID_COLUMN: FolioDatatypes = FolioDatatypes::DatatypeId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            datatype_id: get(row, FolioDatatypes::DatatypeId)?,
            parent_id: get(row, FolioDatatypes::ParentId)?,
            label: get(row, FolioDatatypes::Label)?,
            datatype_type: get(row, FolioDatatypes::Type)?,
            author_id: get(row, FolioDatatypes::AuthorId)?,
            date_created: get(row, FolioDatatypes::DateCreated)?,
            date_modified: get(row, FolioDatatypes::DateModified)?,
        })
    }

    fn id(&self) -> StoreResult<DatatypeId> {
        entity_id::<D, _>(self.datatype_id.clone())
    }

    fn into_entity(self) -> StoreResult<Datatype> {
        Ok(Datatype {
            datatype_id: entity_id::<D, _>(self.datatype_id)?,
            parent_id: optional_id::<D, _>(self.parent_id)?,
            label: self.label,
            datatype_type: self.datatype_type,
            author_id: optional_id::<D, _>(self.author_id)?,
            date_created: D::time_from_native(self.date_created)?,
            date_modified: D::time_from_native(self.date_modified)?,
        })
    }

    fn insert_values(id: DatatypeId, params: &CreateDatatypeParams) -> ColumnValues<FolioDatatypes> {
        vec![
            (FolioDatatypes::DatatypeId, id_value::<D>(id)),
            (FolioDatatypes::ParentId, optional_id_value::<D, _>(params.parent_id)),
            (FolioDatatypes::Label, params.label.clone().into()),
            (FolioDatatypes::Type, params.datatype_type.clone().into()),
            (FolioDatatypes::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioDatatypes::DateCreated, time_value::<D>(params.date_created)),
            (FolioDatatypes::DateModified, time_value::<D>(params.date_modified)),
        ]
    }

    fn update_id(params: &UpdateDatatypeParams) -> DatatypeId {
        params.datatype_id
    }

    fn update_values(params: &UpdateDatatypeParams) -> ColumnValues<FolioDatatypes> {
        vec![
            (FolioDatatypes::ParentId, optional_id_value::<D, _>(params.parent_id)),
            (FolioDatatypes::Label, params.label.clone().into()),
            (FolioDatatypes::Type, params.datatype_type.clone().into()),
            (FolioDatatypes::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioDatatypes::DateModified, time_value::<D>(params.date_modified)),
        ]
    }
}

// fields

pub struct FieldRow<D: Dialect> {
    pub field_id: D::Id,
    pub parent_id: Option<D::Id>,
    pub label: String,
    pub data: String,
    pub field_type: String,
    pub author_id: Option<D::Id>,
    pub date_created: D::Time,
    pub date_modified: D::Time,
}

impl<D: Dialect> Record<D> for FieldRow<D> {
    type Column = FolioFields;
    type Id = FieldId;
    type Entity = Field;
    type Create = CreateFieldParams;
    type Update = UpdateFieldParams;

    const TABLE: TableKind = TableKind::Fields;
    const TABLE_IDEN: FolioFields = FolioFields::Table;
    const ID_COLUMN: FolioFields = FolioFields::FieldId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            field_id: get(row, FolioFields::FieldId)?,
            parent_id: get(row, FolioFields::ParentId)?,
            label: get(row, FolioFields::Label)?,
            data: get(row, FolioFields::Data)?,
            field_type: get(row, FolioFields::Type)?,
            author_id: get(row, FolioFields::AuthorId)?,
            date_created: get(row, FolioFields::DateCreated)?,
            date_modified: get(row, FolioFields::DateModified)?,
        })
    }

    fn id(&self) -> StoreResult<FieldId> {
        entity_id::<D, _>(self.field_id.clone())
    }

    fn into_entity(self) -> StoreResult<Field> {
        Ok(Field {
            field_id: entity_id::<D, _>(self.field_id)?,
            parent_id: optional_id::<D, _>(self.parent_id)?,
            label: self.label,
            data: self.data,
            field_type: self.field_type,
            author_id: optional_id::<D, _>(self.author_id)?,
            date_created: D::time_from_native(self.date_created)?,
            date_modified: D::time_from_native(self.date_modified)?,
        })
    }

    fn insert_values(id: FieldId, params: &CreateFieldParams) -> ColumnValues<FolioFields> {
        vec![
            (FolioFields::FieldId, id_value::<D>(id)),
            (FolioFields::ParentId, optional_id_value::<D, _>(params.parent_id)),
            (FolioFields::Label, params.label.clone().into()),
            (FolioFields::Data, params.data.clone().into()),
            (FolioFields::Type, params.field_type.clone().into()),
            (FolioFields::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioFields::DateCreated, time_value::<D>(params.date_created)),
            (FolioFields::DateModified, time_value::<D>(params.date_modified)),
        ]
    }

    fn update_id(params: &UpdateFieldParams) -> FieldId {
        params.field_id
    }

    fn update_values(params: &UpdateFieldParams) -> ColumnValues<FolioFields> {
        vec![
            (FolioFields::ParentId, optional_id_value::<D, _>(params.parent_id)),
            (FolioFields::Label, params.label.clone().into()),
            (FolioFields::Data, params.data.clone().into()),
            (FolioFields::Type, params.field_type.clone().into()),
            (FolioFields::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioFields::DateModified, time_value::<D>(params.date_modified)),
        ]
    }
}

// content_data

pub struct ContentDataRow<D: Dialect> {
    pub content_data_id: D::Id,
    pub route_id: Option<D::Id>,
    pub parent_id: Option<D::Id>,
    pub datatype_id: Option<D::Id>,
    pub author_id: Option<D::Id>,
    pub status: String,
    pub date_created: D::Time,
    pub date_modified: D::Time,
}

impl<D: Dialect> Record<D> for ContentDataRow<D> {
    type Column = FolioContentData;
    type Id = ContentDataId;
    type Entity = ContentData;
    type Create = CreateContentDataParams;
    type Update = UpdateContentDataParams;

    const TABLE: TableKind = TableKind::ContentData;
    const TABLE_IDEN: FolioContentData = FolioContentData::Table;
    const ID_COLUMN: FolioContentData = FolioContentData::ContentDataId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            content_data_id: get(row, FolioContentData::ContentDataId)?,
            route_id: get(row, FolioContentData::RouteId)?,
            parent_id: get(row, FolioContentData::ParentId)?,
            datatype_id: get(row, FolioContentData::DatatypeId)?,
            author_id: get(row, FolioContentData::AuthorId)?,
            status: get(row, FolioContentData::Status)?,
            date_created: get(row, FolioContentData::DateCreated)?,
            date_modified: get(row, FolioContentData::DateModified)?,
        })
    }

    fn id(&self) -> StoreResult<ContentDataId> {
        entity_id::<D, _>(self.content_data_id.clone())
    }

    fn into_entity(self) -> StoreResult<ContentData> {
        Ok(ContentData {
            content_data_id: entity_id::<D, _>(self.content_data_id)?,
            route_id: optional_id::<D, _>(self.route_id)?,
            parent_id: optional_id::<D, _>(self.parent_id)?,
            datatype_id: optional_id::<D, _>(self.datatype_id)?,
            author_id: optional_id::<D, _>(self.author_id)?,
            status: self.status,
            date_created: D::time_from_native(self.date_created)?,
            date_modified: D::time_from_native(self.date_modified)?,
        })
    }

    fn insert_values(
        id: ContentDataId,
        params: &CreateContentDataParams,
    ) -> ColumnValues<FolioContentData> {
        vec![
            (FolioContentData::ContentDataId, id_value::<D>(id)),
            (FolioContentData::RouteId, optional_id_value::<D, _>(params.route_id)),
            (FolioContentData::ParentId, optional_id_value::<D, _>(params.parent_id)),
            (FolioContentData::DatatypeId, optional_id_value::<D, _>(params.datatype_id)),
            (FolioContentData::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioContentData::Status, params.status.clone().into()),
            (FolioContentData::DateCreated, time_value::<D>(params.date_created)),
            (FolioContentData::DateModified, time_value::<D>(params.date_modified)),
        ]
    }

    fn update_id(params: &UpdateContentDataParams) -> ContentDataId {
        params.content_data_id
    }

    fn update_values(params: &UpdateContentDataParams) -> ColumnValues<FolioContentData> {
        vec![
            (FolioContentData::RouteId, optional_id_value::<D, _>(params.route_id)),
            (FolioContentData::ParentId, optional_id_value::<D, _>(params.parent_id)),
            (FolioContentData::DatatypeId, optional_id_value::<D, _>(params.datatype_id)),
            (FolioContentData::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioContentData::Status, params.status.clone().into()),
            (FolioContentData::DateModified, time_value::<D>(params.date_modified)),
        ]
    }
}

// content_fields

pub struct ContentFieldRow<D: Dialect> {
    pub content_field_id: D::Id,
    pub route_id: Option<D::Id>,
    pub content_data_id: D::Id,
    pub field_id: D::Id,
    pub field_value: String,
    pub author_id: Option<D::Id>,
    pub date_created: D::Time,
    pub date_modified: D::Time,
}

impl<D: Dialect> Record<D> for ContentFieldRow<D> {
    type Column = FolioContentFields;
    type Id = ContentFieldId;
    type Entity = ContentField;
    type Create = CreateContentFieldParams;
    type Update = UpdateContentFieldParams;

    const TABLE: TableKind = TableKind::ContentFields;
    const TABLE_IDEN: FolioContentFields = FolioContentFields::Table;
    const ID_COLUMN: FolioContentFields = FolioContentFields::ContentFieldId;

    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            content_field_id: get(row, FolioContentFields::ContentFieldId)?,
            route_id: get(row, FolioContentFields::RouteId)?,
            content_data_id: get(row, FolioContentFields::ContentDataId)?,
            field_id: get(row, FolioContentFields::FieldId)?,
            field_value: get(row, FolioContentFields::FieldValue)?,
            author_id: get(row, FolioContentFields::AuthorId)?,
            date_created: get(row, FolioContentFields::DateCreated)?,
            date_modified: get(row, FolioContentFields::DateModified)?,
        })
    }

    fn id(&self) -> StoreResult<ContentFieldId> {
        entity_id::<D, _>(self.content_field_id.clone())
    }

    fn into_entity(self) -> StoreResult<ContentField> {
        Ok(ContentField {
            content_field_id: entity_id::<D, _>(self.content_field_id)?,
            route_id: optional_id::<D, _>(self.route_id)?,
            content_data_id: entity_id::<D, _>(self.content_data_id)?,
            field_id: entity_id::<D, _>(self.field_id)?,
            field_value: self.field_value,
            author_id: optional_id::<D, _>(self.author_id)?,
            date_created: D::time_from_native(self.date_created)?,
            date_modified: D::time_from_native(self.date_modified)?,
        })
    }

    fn insert_values(
        id: ContentFieldId,
        params: &CreateContentFieldParams,
    ) -> ColumnValues<FolioContentFields> {
        vec![
            (FolioContentFields::ContentFieldId, id_value::<D>(id)),
            (FolioContentFields::RouteId, optional_id_value::<D, _>(params.route_id)),
            (FolioContentFields::ContentDataId, id_value::<D>(params.content_data_id)),
            (FolioContentFields::FieldId, id_value::<D>(params.field_id)),
            (FolioContentFields::FieldValue, params.field_value.clone().into()),
            (FolioContentFields::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioContentFields::DateCreated, time_value::<D>(params.date_created)),
            (FolioContentFields::DateModified, time_value::<D>(params.date_modified)),
        ]
    }

    fn update_id(params: &UpdateContentFieldParams) -> ContentFieldId {
        params.content_field_id
    }

    fn update_values(params: &UpdateContentFieldParams) -> ColumnValues<FolioContentFields> {
        vec![
            (FolioContentFields::FieldValue, params.field_value.clone().into()),
            (FolioContentFields::AuthorId, optional_id_value::<D, _>(params.author_id)),
            (FolioContentFields::DateModified, time_value::<D>(params.date_modified)),
        ]
    }
}
