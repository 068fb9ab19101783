use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName, QuestionId, QuestionText, UserId};

/// A question owned by the user who created it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub created_by: UserId,
    pub question_text: QuestionText,
    /// Category references in the order they were supplied. May repeat.
    pub categories: Vec<CategoryId>,
    pub created_at: NaiveDateTime,
}

/// Information required to create a new [`Question`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewQuestion {
    pub created_by: UserId,
    pub question_text: QuestionText,
    pub categories: Vec<CategoryId>,
}

/// One (category, question) pair as returned by category-wise listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorizedQuestion {
    pub category_name: CategoryName,
    pub question_id: QuestionId,
    pub question_text: QuestionText,
}
