use crate::m20240210_000001_create_user_table::User;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .primary_key(
                        Index::create()
                            .name("idx-follow")
                            .if_not_exists()
                            .table(Follow::Table)
                            .col(Follow::UserId)
                            .col(Follow::FollowedId),
                    )
                    .col(ColumnDef::new(Follow::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Follow::FollowedId)
                            .uuid()
                            .not_null()
                            .check(
                                Expr::col(Follow::UserId)
                                    .eq(Expr::col(Follow::FollowedId))
                                    .not(),
                            ),
                    )
                    .col(
                        ColumnDef::new(Follow::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("FK_follow-user")
                            .from(Follow::Table, Follow::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("FK_follow-followed")
                            .from(Follow::Table, Follow::FollowedId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Follow {
    Table,
    UserId,
    FollowedId,
    CreatedAt,
}
