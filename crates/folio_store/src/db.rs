use sea_orm::DeriveIden;

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioUsers {
    Table,
    UserId,
    Username,
    Name,
    Email,
    Hash,
    Role,
    DateCreated,
    DateModified,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioUserSshKeys {
    Table,
    SshKeyId,
    UserId,
    PublicKey,
    KeyType,
    Fingerprint,
    Label,
    DateCreated,
    LastUsed,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioSessions {
    Table,
    SessionId,
    UserId,
    CreatedAt,
    ExpiresAt,
    LastAccess,
    IpAddress,
    UserAgent,
    SessionData,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioTokens {
    Table,
    TokenId,
    UserId,
    TokenType,
    Token,
    IssuedAt,
    ExpiresAt,
    Revoked,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioUserOauth {
    Table,
    UserOauthId,
    UserId,
    OauthProvider,
    OauthProviderUserId,
    AccessToken,
    RefreshToken,
    TokenExpiresAt,
    DateCreated,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioRoutes {
    Table,
    RouteId,
    Slug,
    Title,
    Status,
    AuthorId,
    DateCreated,
    DateModified,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioDatatypes {
    Table,
    DatatypeId,
    ParentId,
    Label,
    Type,
    AuthorId,
    DateCreated,
    DateModified,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioFields {
    Table,
    FieldId,
    ParentId,
    Label,
    Data,
    Type,
    AuthorId,
    DateCreated,
    DateModified,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioContentData {
    Table,
    ContentDataId,
    RouteId,
    ParentId,
    DatatypeId,
    AuthorId,
    Status,
    DateCreated,
    DateModified,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioContentFields {
    Table,
    ContentFieldId,
    RouteId,
    ContentDataId,
    FieldId,
    FieldValue,
    AuthorId,
    DateCreated,
    DateModified,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum FolioChangeEvents {
    Table,
    EventId,
    TableName,
    Operation,
    EntityId,
    Actor,
    NodeId,
    RequestId,
    IpAddress,
    Payload,
    RecordedAt,
}
