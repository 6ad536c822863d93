use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

use crate::db::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(FolioUsers::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioUsers::UserId, false).primary_key())
                    .col(ColumnDef::new(FolioUsers::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(FolioUsers::Name).string().not_null())
                    .col(ColumnDef::new(FolioUsers::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(FolioUsers::Hash).string().not_null())
                    .col(ColumnDef::new(FolioUsers::Role).string().not_null())
                    .col(time_col(backend, FolioUsers::DateCreated, false))
                    .col(time_col(backend, FolioUsers::DateModified, false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioUserSshKeys::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioUserSshKeys::SshKeyId, false).primary_key())
                    .col(id_col(backend, FolioUserSshKeys::UserId, false))
                    .col(ColumnDef::new(FolioUserSshKeys::PublicKey).text().not_null())
                    .col(ColumnDef::new(FolioUserSshKeys::KeyType).string().not_null())
                    .col(
                        ColumnDef::new(FolioUserSshKeys::Fingerprint)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FolioUserSshKeys::Label).string().not_null())
                    .col(time_col(backend, FolioUserSshKeys::DateCreated, false))
                    .col(time_col(backend, FolioUserSshKeys::LastUsed, true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folio_user_ssh_keys_user")
                            .from(FolioUserSshKeys::Table, FolioUserSshKeys::UserId)
                            .to(FolioUsers::Table, FolioUsers::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioSessions::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioSessions::SessionId, false).primary_key())
                    .col(id_col(backend, FolioSessions::UserId, false))
                    .col(time_col(backend, FolioSessions::CreatedAt, false))
                    .col(time_col(backend, FolioSessions::ExpiresAt, false))
                    .col(time_col(backend, FolioSessions::LastAccess, true))
                    .col(ColumnDef::new(FolioSessions::IpAddress).string().null())
                    .col(ColumnDef::new(FolioSessions::UserAgent).text().null())
                    .col(ColumnDef::new(FolioSessions::SessionData).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folio_sessions_user")
                            .from(FolioSessions::Table, FolioSessions::UserId)
                            .to(FolioUsers::Table, FolioUsers::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioTokens::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioTokens::TokenId, false).primary_key())
                    .col(id_col(backend, FolioTokens::UserId, false))
                    .col(ColumnDef::new(FolioTokens::TokenType).string().not_null())
                    .col(ColumnDef::new(FolioTokens::Token).text().not_null())
                    .col(time_col(backend, FolioTokens::IssuedAt, false))
                    .col(time_col(backend, FolioTokens::ExpiresAt, false))
                    .col(flag_col(backend, FolioTokens::Revoked))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folio_tokens_user")
                            .from(FolioTokens::Table, FolioTokens::UserId)
                            .to(FolioUsers::Table, FolioUsers::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioUserOauth::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioUserOauth::UserOauthId, false).primary_key())
                    .col(id_col(backend, FolioUserOauth::UserId, false))
                    .col(ColumnDef::new(FolioUserOauth::OauthProvider).string().not_null())
                    .col(
                        ColumnDef::new(FolioUserOauth::OauthProviderUserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FolioUserOauth::AccessToken).text().not_null())
                    .col(ColumnDef::new(FolioUserOauth::RefreshToken).text().not_null())
                    .col(time_col(backend, FolioUserOauth::TokenExpiresAt, false))
                    .col(time_col(backend, FolioUserOauth::DateCreated, false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folio_user_oauth_user")
                            .from(FolioUserOauth::Table, FolioUserOauth::UserId)
                            .to(FolioUsers::Table, FolioUsers::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioRoutes::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioRoutes::RouteId, false).primary_key())
                    .col(ColumnDef::new(FolioRoutes::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(FolioRoutes::Title).string().not_null())
                    .col(ColumnDef::new(FolioRoutes::Status).big_integer().not_null())
                    .col(id_col(backend, FolioRoutes::AuthorId, true))
                    .col(time_col(backend, FolioRoutes::DateCreated, false))
                    .col(time_col(backend, FolioRoutes::DateModified, false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioDatatypes::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioDatatypes::DatatypeId, false).primary_key())
                    .col(id_col(backend, FolioDatatypes::ParentId, true))
                    .col(ColumnDef::new(FolioDatatypes::Label).string().not_null())
                    .col(ColumnDef::new(FolioDatatypes::Type).string().not_null())
                    .col(id_col(backend, FolioDatatypes::AuthorId, true))
                    .col(time_col(backend, FolioDatatypes::DateCreated, false))
                    .col(time_col(backend, FolioDatatypes::DateModified, false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioFields::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioFields::FieldId, false).primary_key())
                    .col(id_col(backend, FolioFields::ParentId, true))
                    .col(ColumnDef::new(FolioFields::Label).string().not_null())
                    .col(ColumnDef::new(FolioFields::Data).text().not_null())
                    .col(ColumnDef::new(FolioFields::Type).string().not_null())
                    .col(id_col(backend, FolioFields::AuthorId, true))
                    .col(time_col(backend, FolioFields::DateCreated, false))
                    .col(time_col(backend, FolioFields::DateModified, false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioContentData::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioContentData::ContentDataId, false).primary_key())
                    .col(id_col(backend, FolioContentData::RouteId, true))
                    .col(id_col(backend, FolioContentData::ParentId, true))
                    .col(id_col(backend, FolioContentData::DatatypeId, true))
                    .col(id_col(backend, FolioContentData::AuthorId, true))
                    .col(ColumnDef::new(FolioContentData::Status).string().not_null())
                    .col(time_col(backend, FolioContentData::DateCreated, false))
                    .col(time_col(backend, FolioContentData::DateModified, false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioContentFields::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioContentFields::ContentFieldId, false).primary_key())
                    .col(id_col(backend, FolioContentFields::RouteId, true))
                    .col(id_col(backend, FolioContentFields::ContentDataId, false))
                    .col(id_col(backend, FolioContentFields::FieldId, false))
                    .col(ColumnDef::new(FolioContentFields::FieldValue).text().not_null())
                    .col(id_col(backend, FolioContentFields::AuthorId, true))
                    .col(time_col(backend, FolioContentFields::DateCreated, false))
                    .col(time_col(backend, FolioContentFields::DateModified, false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folio_content_fields_content")
                            .from(FolioContentFields::Table, FolioContentFields::ContentDataId)
                            .to(FolioContentData::Table, FolioContentData::ContentDataId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folio_content_fields_field")
                            .from(FolioContentFields::Table, FolioContentFields::FieldId)
                            .to(FolioFields::Table, FolioFields::FieldId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FolioChangeEvents::Table)
                    .if_not_exists()
                    .col(id_col(backend, FolioChangeEvents::EventId, false).primary_key())
                    .col(ColumnDef::new(FolioChangeEvents::TableName).string_len(64).not_null())
                    .col(ColumnDef::new(FolioChangeEvents::Operation).string_len(16).not_null())
                    .col(id_col(backend, FolioChangeEvents::EntityId, false))
                    .col(id_col(backend, FolioChangeEvents::Actor, true))
                    .col(id_col(backend, FolioChangeEvents::NodeId, true))
                    .col(ColumnDef::new(FolioChangeEvents::RequestId).string().null())
                    .col(ColumnDef::new(FolioChangeEvents::IpAddress).string_len(64).null())
                    .col(ColumnDef::new(FolioChangeEvents::Payload).text().null())
                    .col(time_col(backend, FolioChangeEvents::RecordedAt, false))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FolioChangeEvents::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioContentFields::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioContentData::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioFields::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioDatatypes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioRoutes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioUserOauth::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioTokens::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioSessions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioUserSshKeys::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FolioUsers::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn nullability(col_def: &mut ColumnDef, nullable: bool) {
    if nullable {
        col_def.null();
    } else {
        col_def.not_null();
    }
}

fn id_col(backend: DatabaseBackend, col: impl IntoIden, nullable: bool) -> ColumnDef {
    let mut col_def = ColumnDef::new(col);
    match backend {
        DatabaseBackend::Postgres => {
            col_def.uuid();
        }
        DatabaseBackend::MySql => {
            col_def.binary_len(16);
        }
        _ => {
            col_def.string_len(26);
        }
    }
    nullability(&mut col_def, nullable);
    col_def
}

fn time_col(backend: DatabaseBackend, col: impl IntoIden, nullable: bool) -> ColumnDef {
    let mut col_def = ColumnDef::new(col);
    match backend {
        DatabaseBackend::Postgres => {
            col_def.timestamp_with_time_zone();
        }
        DatabaseBackend::MySql => {
            col_def.date_time();
        }
        _ => {
            col_def.string_len(32);
        }
    }
    nullability(&mut col_def, nullable);
    col_def
}

fn flag_col(backend: DatabaseBackend, col: impl IntoIden) -> ColumnDef {
    let mut col_def = ColumnDef::new(col);
    match backend {
        DatabaseBackend::Postgres => {
            col_def.boolean();
        }
        DatabaseBackend::MySql => {
            col_def.tiny_integer();
        }
        _ => {
            col_def.integer();
        }
    }
    col_def.not_null();
    col_def
}
