use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Profiles are always loaded by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_user")
                    .table(Profile::Table)
                    .col(Profile::UserId)
                    .to_owned(),
            )
            .await?;

        // Users: name is the usual sort/search key
        manager
            .create_index(
                Index::create()
                    .name("idx_user_name")
                    .table(User::Table)
                    .col(User::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_profile_user").table(Profile::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_name").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Profile { Table, UserId }

#[derive(DeriveIden)]
enum User { Table, Name }
