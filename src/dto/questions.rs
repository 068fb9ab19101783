use serde::Serialize;

use crate::domain::question::{CategorizedQuestion, Question};
use crate::services::import_export::UploadReport;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: i32,
    pub created_by: i32,
    pub question_text: String,
    pub categories: Vec<i32>,
}

impl From<Question> for QuestionDto {
    fn from(value: Question) -> Self {
        Self {
            id: value.id.get(),
            created_by: value.created_by.get(),
            question_text: value.question_text.into_inner(),
            categories: value.categories.into_iter().map(i32::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionCreatedResponse {
    pub message: String,
    pub question: QuestionDto,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionSummaryDto {
    pub id: i32,
    pub text: String,
}

/// Questions sharing one category.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroupDto {
    pub category_name: String,
    pub questions: Vec<QuestionSummaryDto>,
}

impl CategoryGroupDto {
    /// Folds category-ordered pairs into groups, keeping input order.
    pub fn group(items: Vec<CategorizedQuestion>) -> Vec<Self> {
        let mut groups: Vec<Self> = Vec::new();
        for item in items {
            let summary = QuestionSummaryDto {
                id: item.question_id.get(),
                text: item.question_text.into_inner(),
            };
            match groups.last_mut() {
                Some(group) if group.category_name == item.category_name.as_str() => {
                    group.questions.push(summary);
                }
                _ => groups.push(Self {
                    category_name: item.category_name.into_inner(),
                    questions: vec![summary],
                }),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryWiseResponse {
    pub message: String,
    pub data: Vec<CategoryGroupDto>,
}

/// Per-row reason a bulk upload row was ignored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRowDto {
    pub row_number: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadResponse {
    pub message: String,
    /// Raw number of rows in the uploaded file.
    pub total_questions: usize,
    pub inserted_questions: usize,
    pub skipped_rows: usize,
    pub errors: Vec<SkippedRowDto>,
}

impl From<UploadReport> for BulkUploadResponse {
    fn from(report: UploadReport) -> Self {
        Self {
            message: "Questions added successfully".to_string(),
            total_questions: report.total_rows,
            inserted_questions: report.created,
            skipped_rows: report.skipped,
            errors: report
                .errors
                .into_iter()
                .map(|e| SkippedRowDto {
                    row_number: e.row_number,
                    message: e.message,
                })
                .collect(),
        }
    }
}
