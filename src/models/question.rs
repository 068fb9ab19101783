use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Diesel model representing the `questions` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::questions)]
pub struct Question {
    pub id: i32,
    pub created_by: i32,
    pub question_text: String,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`Question`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::questions)]
pub struct NewQuestion<'a> {
    pub created_by: i32,
    pub question_text: &'a str,
    pub created_at: NaiveDateTime,
}

/// Row of the `question_categories` link table.
#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::question_categories)]
pub struct QuestionCategory {
    pub question_id: i32,
    pub position: i32,
    pub category_id: i32,
}
