use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::types::{CategoryName, QuestionText};

/// JSON body of the single-question endpoint.
///
/// `categories` stays untyped so that a non-array value is reported with the
/// same message as a missing one instead of a deserializer error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionForm {
    pub question_text: Option<String>,
    pub categories: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddQuestionPayload {
    pub question_text: QuestionText,
    /// Normalized, de-duplicated names in request order.
    pub categories: Vec<CategoryName>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddQuestionFormError {
    #[error("Question text and categories are required")]
    MissingFields,
}

impl TryFrom<AddQuestionForm> for AddQuestionPayload {
    type Error = AddQuestionFormError;

    fn try_from(form: AddQuestionForm) -> Result<Self, Self::Error> {
        let question_text = form
            .question_text
            .and_then(|text| QuestionText::new(text).ok())
            .ok_or(AddQuestionFormError::MissingFields)?;

        let Some(Value::Array(values)) = form.categories else {
            return Err(AddQuestionFormError::MissingFields);
        };

        let mut categories: Vec<CategoryName> = Vec::with_capacity(values.len());
        for value in values {
            let Value::String(raw) = value else {
                return Err(AddQuestionFormError::MissingFields);
            };
            let Ok(name) = CategoryName::new(raw) else {
                continue;
            };
            if !categories.contains(&name) {
                categories.push(name);
            }
        }

        if categories.is_empty() {
            return Err(AddQuestionFormError::MissingFields);
        }

        Ok(Self {
            question_text,
            categories,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWiseQuery {
    pub category_name: Option<String>,
}

impl CategoryWiseQuery {
    /// The normalized filter; a blank value means no filter.
    pub fn category(&self) -> Option<CategoryName> {
        self.category_name
            .as_deref()
            .and_then(|name| CategoryName::new(name).ok())
    }
}
