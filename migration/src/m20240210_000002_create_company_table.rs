use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Company::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Company::LegalId)
                            .string()
                            .unique_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Company::Name).string().not_null())
                    .col(
                        ColumnDef::new(Company::Email)
                            .string()
                            .unique_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Company::Password).string().not_null())
                    .col(ColumnDef::new(Company::Sectors).string().not_null())
                    .col(ColumnDef::new(Company::Size).string())
                    .col(ColumnDef::new(Company::Location).string())
                    .col(ColumnDef::new(Company::Website).string())
                    .col(ColumnDef::new(Company::Phone).string())
                    .col(ColumnDef::new(Company::Description).text())
                    .col(ColumnDef::new(Company::Image).string())
                    .col(
                        ColumnDef::new(Company::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Company::VerificationToken).string())
                    .col(
                        ColumnDef::new(Company::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Company::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Company {
    Table,
    Id,
    LegalId,
    Name,
    Email,
    Password,
    Sectors,
    Size,
    Location,
    Website,
    Phone,
    Description,
    Image,
    Verified,
    VerificationToken,
    CreatedAt,
}
