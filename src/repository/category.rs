use diesel::prelude::*;

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::CategoryName;
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository, RepositoryResult};

impl CategoryReader for DieselRepository {
    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::name.eq(name.as_str()))
            .select(DbCategory::as_select())
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(TryInto::try_into).transpose()?)
    }

    fn list_categories_by_names(&self, names: &[CategoryName]) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        if names.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn()?;

        let items = categories::table
            .filter(categories::name.eq_any(names.iter().map(CategoryName::as_str)))
            .order(categories::name.asc())
            .select(DbCategory::as_select())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let db_category: DbNewCategory = category.clone().into();

        let created = diesel::insert_into(categories::table)
            .values(&db_category)
            .returning(DbCategory::as_returning())
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn create_categories(&self, new_categories: &[NewCategory]) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let mut created = Vec::with_capacity(new_categories.len());
            for category in new_categories {
                let db_category: DbNewCategory = category.clone().into();
                let row = diesel::insert_into(categories::table)
                    .values(&db_category)
                    .returning(DbCategory::as_returning())
                    .get_result::<DbCategory>(conn)?;
                created.push(row);
            }
            Ok(created)
        })?;

        Ok(created
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?)
    }
}
