use sea_orm_migration::prelude::*;

use crate::db::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for index in indexes() {
            manager.create_index(index).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_folio_user_ssh_keys_user", FolioUserSshKeys::Table.into_iden()),
            ("idx_folio_sessions_user", FolioSessions::Table.into_iden()),
            ("idx_folio_tokens_user", FolioTokens::Table.into_iden()),
            ("idx_folio_user_oauth_user", FolioUserOauth::Table.into_iden()),
            ("idx_folio_datatypes_parent", FolioDatatypes::Table.into_iden()),
            ("idx_folio_fields_parent", FolioFields::Table.into_iden()),
            ("idx_folio_content_data_route", FolioContentData::Table.into_iden()),
            ("idx_folio_content_fields_content", FolioContentFields::Table.into_iden()),
            ("idx_folio_change_events_entity", FolioChangeEvents::Table.into_iden()),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

fn index(name: &str, table: impl IntoIden + 'static, col: impl IntoIden) -> IndexCreateStatement {
    Index::create().name(name).table(table).col(col).to_owned()
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        index(
            "idx_folio_user_ssh_keys_user",
            FolioUserSshKeys::Table,
            FolioUserSshKeys::UserId,
        ),
        index("idx_folio_sessions_user", FolioSessions::Table, FolioSessions::UserId),
        index("idx_folio_tokens_user", FolioTokens::Table, FolioTokens::UserId),
        index("idx_folio_user_oauth_user", FolioUserOauth::Table, FolioUserOauth::UserId),
        index("idx_folio_datatypes_parent", FolioDatatypes::Table, FolioDatatypes::ParentId),
        index("idx_folio_fields_parent", FolioFields::Table, FolioFields::ParentId),
        index("idx_folio_content_data_route", FolioContentData::Table, FolioContentData::RouteId),
        index(
            "idx_folio_content_fields_content",
            FolioContentFields::Table,
            FolioContentFields::ContentDataId,
        ),
        index(
            "idx_folio_change_events_entity",
            FolioChangeEvents::Table,
            FolioChangeEvents::EntityId,
        ),
    ]
}
