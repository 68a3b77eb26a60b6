use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Ids are catalog strings ("4576420", "4576420.0"), not generated keys.
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(string_len(Courses::Id, 100).primary_key())
                    .col(text(Courses::Title))
                    .col(boolean(Courses::IsPaid).default(false))
                    .col(double_null(Courses::Price))
                    .col(text_null(Courses::Headline))
                    .col(integer_null(Courses::NumSubscribers).default(0))
                    .col(double_null(Courses::AvgRating).default(0.0))
                    .col(integer_null(Courses::NumReviews).default(0))
                    .col(integer_null(Courses::NumComments).default(0))
                    .col(integer_null(Courses::NumLectures).default(0))
                    .col(integer_null(Courses::ContentLengthMin))
                    .col(timestamp_null(Courses::PublishedTime))
                    .col(timestamp_null(Courses::LastUpdateDate))
                    .col(string_len_null(Courses::Category, 100))
                    .col(string_len_null(Courses::Subcategory, 100))
                    .col(string_len_null(Courses::Topic, 100))
                    .col(string_len_null(Courses::Language, 50))
                    .col(text_null(Courses::CourseUrl))
                    .col(string_len_null(Courses::InstructorName, 200))
                    .col(text_null(Courses::InstructorUrl))
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_courses_category", Courses::Category),
            ("idx_courses_language", Courses::Language),
            ("idx_courses_avg_rating", Courses::AvgRating),
            ("idx_courses_num_subscribers", Courses::NumSubscribers),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Courses::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Courses {
    Table,
    Id,
    Title,
    IsPaid,
    Price,
    Headline,
    NumSubscribers,
    AvgRating,
    NumReviews,
    NumComments,
    NumLectures,
    ContentLengthMin,
    PublishedTime,
    LastUpdateDate,
    Category,
    Subcategory,
    Topic,
    Language,
    CourseUrl,
    InstructorName,
    InstructorUrl,
}
