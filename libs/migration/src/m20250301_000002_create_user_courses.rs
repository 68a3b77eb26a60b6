use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(create_table()).await?;
        manager.create_index(create_user_index()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserCourses::Table).to_owned())
            .await
    }
}

// subscribed_at has no zone; it is written and read as UTC.
fn create_table() -> TableCreateStatement {
    Table::create()
        .table(UserCourses::Table)
        .if_not_exists()
        .col(string_len(UserCourses::UserId, 36))
        .col(string_len(UserCourses::CourseId, 100))
        .col(
            timestamp_null(UserCourses::SubscribedAt)
                .default(Expr::cust("(now() AT TIME ZONE 'utc')")),
        )
        .primary_key(
            Index::create()
                .col(UserCourses::UserId)
                .col(UserCourses::CourseId),
        )
        .to_owned()
}

/// Enrollment history is read per user, newest first.
fn create_user_index() -> IndexCreateStatement {
    Index::create()
        .name("idx_user_courses_user_id_subscribed_at")
        .table(UserCourses::Table)
        .col(UserCourses::UserId)
        .col(UserCourses::SubscribedAt)
        .to_owned()
}

#[derive(DeriveIden)]
enum UserCourses {
    Table,
    UserId,
    CourseId,
    SubscribedAt,
}
