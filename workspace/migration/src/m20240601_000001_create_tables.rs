use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string(Users::Username).primary_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::Role, 20))
                    .col(string(Users::Name))
                    .to_owned(),
            )
            .await?;

        // Create design_requests table
        manager
            .create_table(
                Table::create()
                    .table(DesignRequests::Table)
                    .if_not_exists()
                    .col(string(DesignRequests::Id).primary_key())
                    .col(string(DesignRequests::OutletName))
                    .col(string(DesignRequests::DesignType))
                    .col(string(DesignRequests::Dimensions))
                    .col(string(DesignRequests::Elements))
                    .col(text(DesignRequests::ReferenceUrl))
                    .col(string_len(DesignRequests::Status, 20))
                    .col(string_null(DesignRequests::DesignerName))
                    .col(string_null(DesignRequests::ResultFileName))
                    .col(text_null(DesignRequests::ResultFileUrl))
                    .col(timestamp_with_time_zone(DesignRequests::CreatedAt))
                    .col(string(DesignRequests::RequestorUsername))
                    .to_owned(),
            )
            .await?;

        // Listing is always newest-created first
        manager
            .create_index(
                Index::create()
                    .name("idx_design_requests_created_at")
                    .table(DesignRequests::Table)
                    .col(DesignRequests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DesignRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Username,
    PasswordHash,
    Role,
    Name,
}

#[derive(DeriveIden)]
enum DesignRequests {
    Table,
    Id,
    OutletName,
    DesignType,
    Dimensions,
    Elements,
    ReferenceUrl,
    Status,
    DesignerName,
    ResultFileName,
    ResultFileUrl,
    CreatedAt,
    RequestorUsername,
}
