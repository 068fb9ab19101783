use std::collections::HashMap;

use crate::domain::category::NewCategory;
use crate::domain::question::{CategorizedQuestion, NewQuestion, Question};
use crate::domain::types::{CategoryId, CategoryName, UserId};
use crate::forms::questions::AddQuestionPayload;
use crate::repository::{
    CategorizedQuestionQuery, CategoryReader, CategoryWriter, QuestionReader, QuestionWriter,
};

use super::{ServiceError, ServiceResult};

/// Stores one question, creating any categories it names that do not exist.
///
/// Category ids are kept in the order the names were requested.
pub fn add_question<R>(
    user_id: UserId,
    payload: AddQuestionPayload,
    repo: &R,
) -> ServiceResult<Question>
where
    R: CategoryReader + CategoryWriter + QuestionWriter,
{
    let existing = match repo.list_categories_by_names(&payload.categories) {
        Ok(categories) => categories,
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            return Err(ServiceError::Internal(e.to_string()));
        }
    };

    let mut ids: HashMap<CategoryName, CategoryId> = existing
        .into_iter()
        .map(|category| (category.name, category.id))
        .collect();

    let missing = payload
        .categories
        .iter()
        .filter(|name| !ids.contains_key(*name))
        .map(|name| NewCategory::new(name.clone()))
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        match repo.create_categories(&missing) {
            Ok(created) => ids.extend(created.into_iter().map(|c| (c.name, c.id))),
            Err(e) => {
                log::error!("Failed to create categories: {e}");
                return Err(ServiceError::Internal(e.to_string()));
            }
        }
    }

    let categories = payload
        .categories
        .iter()
        .map(|name| {
            ids.get(name).copied().ok_or_else(|| {
                log::error!("Category {name} missing after insert");
                ServiceError::Internal(format!("category {name} was not resolved"))
            })
        })
        .collect::<ServiceResult<Vec<_>>>()?;

    let question = NewQuestion {
        created_by: user_id,
        question_text: payload.question_text,
        categories,
    };

    repo.create_question(&question).map_err(|e| {
        log::error!("Failed to create question: {e}");
        ServiceError::Internal(e.to_string())
    })
}

/// Lists the user's questions as category-ordered pairs, optionally for a
/// single category.
pub fn category_wise_questions<R>(
    user_id: UserId,
    category: Option<CategoryName>,
    repo: &R,
) -> ServiceResult<Vec<CategorizedQuestion>>
where
    R: QuestionReader,
{
    let mut query = CategorizedQuestionQuery::new(user_id);
    if let Some(name) = category {
        query = query.category(name);
    }

    repo.list_categorized_questions(query).map_err(|e| {
        log::error!("Failed to list questions for user {user_id}: {e}");
        ServiceError::Internal(e.to_string())
    })
}
