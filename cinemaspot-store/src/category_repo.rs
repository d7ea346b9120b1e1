use async_trait::async_trait;
use cinemaspot_core::catalog::{Category, CategoryInput};
use cinemaspot_core::repository::CategoryRepository;
use cinemaspot_core::CoreResult;
use sqlx::PgPool;

use crate::error::{expect_rows, DbResultExt};

pub struct StoreCategoryRepository {
    pool: PgPool,
}

impl StoreCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category { id: row.id, name: row.name }
    }
}

#[async_trait]
impl CategoryRepository for StoreCategoryRepository {
    async fn list(&self) -> CoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .or_db("Category")?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("Category")?;
        Ok(row.map(Category::from))
    }

    async fn create(&self, category: &CategoryInput) -> CoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(category.name.trim())
        .fetch_one(&self.pool)
        .await
        .or_db("Category")?;
        Ok(row.into())
    }

    async fn update(&self, id: i32, category: &CategoryInput) -> CoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(category.name.trim())
        .fetch_one(&self.pool)
        .await
        .or_db("Category")?;
        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Category")?;
        expect_rows(result.rows_affected(), "Category")
    }
}
