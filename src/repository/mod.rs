use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory};
use crate::domain::question::{CategorizedQuestion, NewQuestion, Question};
use crate::domain::types::{CategoryName, Email, UserId, Username};
use crate::domain::user::{NewUser, UpdateUser, User};

pub mod category;
pub mod errors;
pub mod question;
pub mod user;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters for the category-wise question listing.
#[derive(Debug, Clone)]
pub struct CategorizedQuestionQuery {
    /// Owner of the questions.
    pub user_id: UserId,
    /// Restrict the listing to a single category.
    pub category_name: Option<CategoryName>,
}

impl CategorizedQuestionQuery {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            category_name: None,
        }
    }

    pub fn category(mut self, name: CategoryName) -> Self {
        self.category_name = Some(name);
        self
    }
}

/// Read-only operations for user accounts.
pub trait UserReader {
    /// Retrieve a user by identifier.
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    /// Retrieve a user by email address.
    fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;
    /// Retrieve a user by username.
    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;
}

/// Write operations for user accounts.
pub trait UserWriter {
    /// Persist a new user and return the stored record.
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    /// Apply profile changes and return the updated record.
    fn update_user(&self, id: UserId, changes: &UpdateUser) -> RepositoryResult<User>;
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// Retrieve a category by its exact normalized name.
    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>>;
    /// Retrieve every category whose name is in `names`.
    fn list_categories_by_names(&self, names: &[CategoryName]) -> RepositoryResult<Vec<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Persist several categories in one transaction.
    fn create_categories(&self, categories: &[NewCategory]) -> RepositoryResult<Vec<Category>>;
}

/// Read-only operations for questions.
pub trait QuestionReader {
    /// List a user's questions as (category, question) pairs ordered by
    /// category name, then question id.
    fn list_categorized_questions(
        &self,
        query: CategorizedQuestionQuery,
    ) -> RepositoryResult<Vec<CategorizedQuestion>>;
}

/// Write operations for questions.
pub trait QuestionWriter {
    /// Persist a question together with its ordered category references.
    fn create_question(&self, question: &NewQuestion) -> RepositoryResult<Question>;
}
