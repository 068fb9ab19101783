use diesel::prelude::*;

use crate::domain::question::{CategorizedQuestion, NewQuestion, Question};
use crate::domain::types::{CategoryName, QuestionText};
use crate::models::question::{
    NewQuestion as DbNewQuestion, Question as DbQuestion, QuestionCategory,
};
use crate::repository::{
    CategorizedQuestionQuery, DieselRepository, QuestionReader, QuestionWriter, RepositoryResult,
};

impl QuestionReader for DieselRepository {
    fn list_categorized_questions(
        &self,
        query: CategorizedQuestionQuery,
    ) -> RepositoryResult<Vec<CategorizedQuestion>> {
        use crate::schema::{categories, question_categories, questions};

        let mut conn = self.conn()?;

        let mut items = questions::table
            .inner_join(question_categories::table.inner_join(categories::table))
            .filter(questions::created_by.eq(query.user_id.get()))
            .select((categories::name, questions::id, questions::question_text))
            .distinct()
            .order((categories::name.asc(), questions::id.asc()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(name) = &query.category_name {
            items = items.filter(categories::name.eq(name.as_str()));
        }

        let rows = items.load::<(String, i32, String)>(&mut conn)?;

        let items = rows
            .into_iter()
            .map(
                |(category_name, question_id, question_text)| -> RepositoryResult<_> {
                    Ok(CategorizedQuestion {
                        category_name: CategoryName::new(category_name)?,
                        question_id: question_id.try_into()?,
                        question_text: QuestionText::new(question_text)?,
                    })
                },
            )
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(items)
    }
}

impl QuestionWriter for DieselRepository {
    fn create_question(&self, question: &NewQuestion) -> RepositoryResult<Question> {
        use crate::schema::{question_categories, questions};

        let mut conn = self.conn()?;

        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let row = diesel::insert_into(questions::table)
                .values(DbNewQuestion {
                    created_by: question.created_by.get(),
                    question_text: question.question_text.as_str(),
                    created_at: chrono::Utc::now().naive_utc(),
                })
                .returning(DbQuestion::as_returning())
                .get_result::<DbQuestion>(conn)?;

            let links = question
                .categories
                .iter()
                .enumerate()
                .map(|(position, category_id)| QuestionCategory {
                    question_id: row.id,
                    position: position as i32,
                    category_id: category_id.get(),
                })
                .collect::<Vec<_>>();

            if !links.is_empty() {
                diesel::insert_into(question_categories::table)
                    .values(&links)
                    .execute(conn)?;
            }

            Ok(row)
        })?;

        Ok(Question {
            id: created.id.try_into()?,
            created_by: created.created_by.try_into()?,
            question_text: QuestionText::new(created.question_text)?,
            categories: question.categories.clone(),
            created_at: created.created_at,
        })
    }
}
