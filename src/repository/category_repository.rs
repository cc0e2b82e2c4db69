use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Category, CreateCategoryRequest},
    error::{AppError, Result},
    repository::CategoryRepository,
};

#[derive(FromRow)]
struct CategoryRow {
    id: String,
    name: String,
}

pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_category(row: CategoryRow) -> Result<Category> {
        Ok(Category {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
        })
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn create(&self, request: CreateCategoryRequest) -> Result<Category> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO categories (id, name) VALUES (?, ?)")
            .bind(id.to_string())
            .bind(&request.name)
            .execute(&self.pool)
            .await?;

        Ok(Category { id, name: request.name })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_category).transpose()
    }
}
