use std::collections::HashMap;

use serde::Serialize;

use crate::domain::category::NewCategory;
use crate::domain::question::NewQuestion;
use crate::domain::types::{CategoryId, CategoryName, QuestionText, UserId};
use crate::forms::import_export::{
    BulkUploadForm, CATEGORIES_FIELD, ParsedUploadRow, QUESTION_TEXT_FIELD, UploadParseError,
};
use crate::repository::{
    CategoryReader, CategoryWriter, QuestionWriter, RepositoryError, RepositoryResult,
};
use crate::services::{ServiceError, ServiceResult};

/// Row-level upload error reported back to the uploader.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadRowError {
    pub row_number: usize,
    pub message: String,
}

/// Aggregated upload outcome report.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UploadReport {
    /// Every data row found in the file, including skipped ones.
    pub total_rows: usize,
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<UploadRowError>,
}

impl UploadReport {
    pub fn with_total(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    pub fn push_error(&mut self, row_number: usize, message: impl Into<String>) {
        self.skipped += 1;
        self.errors.push(UploadRowError {
            row_number,
            message: message.into(),
        });
    }
}

/// Batch-scoped category name to id cache.
///
/// A resolver lives for one upload; each distinct name is looked up (and
/// created when missing) at most once per batch.
#[derive(Debug, Default)]
pub struct CategoryResolver {
    cache: HashMap<CategoryName, CategoryId>,
}

impl CategoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, creating the category on first sight.
    pub fn resolve<R>(&mut self, repo: &R, name: &CategoryName) -> RepositoryResult<CategoryId>
    where
        R: CategoryReader + CategoryWriter,
    {
        if let Some(id) = self.cache.get(name) {
            return Ok(*id);
        }

        let id = match repo.get_category_by_name(name)? {
            Some(category) => category.id,
            None => match repo.create_category(&NewCategory::new(name.clone())) {
                Ok(category) => category.id,
                // Another writer created it between our lookup and insert.
                Err(RepositoryError::ConstraintViolation(_)) => repo
                    .get_category_by_name(name)?
                    .ok_or(RepositoryError::NotFound)?
                    .id,
                Err(e) => return Err(e),
            },
        };

        self.cache.insert(name.clone(), id);
        Ok(id)
    }

    /// Resolves every name in order, keeping duplicates.
    pub fn resolve_all<R>(
        &mut self,
        repo: &R,
        names: &[CategoryName],
    ) -> RepositoryResult<Vec<CategoryId>>
    where
        R: CategoryReader + CategoryWriter,
    {
        names.iter().map(|name| self.resolve(repo, name)).collect()
    }
}

/// Persists every valid row of an upload as a question owned by `user_id`.
///
/// Rows are processed in file order. Rows without question text or without
/// any category name are skipped and reported. A repository failure aborts
/// the batch; rows stored before it stay stored.
pub fn ingest_questions<R>(
    user_id: UserId,
    rows: Vec<ParsedUploadRow>,
    repo: &R,
) -> ServiceResult<UploadReport>
where
    R: CategoryReader + CategoryWriter + QuestionWriter,
{
    let mut report = UploadReport::with_total(rows.len());
    let mut resolver = CategoryResolver::new();

    for row in rows {
        let Some(question_text) = row
            .field(QUESTION_TEXT_FIELD)
            .and_then(|text| QuestionText::new(text).ok())
        else {
            report.push_error(row.row_number, format!("{QUESTION_TEXT_FIELD} is empty"));
            continue;
        };

        let names = row
            .field(CATEGORIES_FIELD)
            .map(CategoryName::parse_list)
            .unwrap_or_default();
        if names.is_empty() {
            report.push_error(row.row_number, format!("{CATEGORIES_FIELD} is empty"));
            continue;
        }

        let categories = resolver.resolve_all(repo, &names).map_err(|e| {
            log::error!(
                "Failed to resolve categories for upload row {}: {e}",
                row.row_number
            );
            ServiceError::Internal(e.to_string())
        })?;

        let question = NewQuestion {
            created_by: user_id,
            question_text,
            categories,
        };

        repo.create_question(&question).map_err(|e| {
            log::error!(
                "Failed to store question from upload row {}: {e}",
                row.row_number
            );
            ServiceError::Internal(e.to_string())
        })?;
        report.created += 1;
    }

    Ok(report)
}

/// Decodes an uploaded question file and ingests its rows.
pub fn upload_questions<R>(
    user_id: UserId,
    form: &mut BulkUploadForm,
    repo: &R,
) -> ServiceResult<UploadReport>
where
    R: CategoryReader + CategoryWriter + QuestionWriter,
{
    let rows = form.decode().map_err(|e| {
        if matches!(e, UploadParseError::ReadFailed) {
            log::error!("Failed to read uploaded file: {e}");
        }
        ServiceError::from(e)
    })?;

    ingest_questions(user_id, rows, repo)
}
