use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{entities::movie, error::AppResult, models::MovieListQuery};

/// Read-only access to the movie catalog. Movies are immutable after
/// seeding, so there are no write paths here.
#[derive(Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: &MovieListQuery) -> AppResult<Vec<movie::Model>> {
        let mut find = movie::Entity::find();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            find = find.filter(
                Condition::any()
                    .add(movie::Column::Title.contains(search))
                    .add(movie::Column::Director.contains(search))
                    .add(movie::Column::Description.contains(search)),
            );
        }
        if let Some(genre) = query.genre.as_deref().filter(|s| !s.is_empty()) {
            find = find.filter(movie::Column::Genre.eq(genre));
        }
        if let Some(year) = query.year {
            find = find.filter(movie::Column::Year.eq(year));
        }

        if let Some((column, order)) = query.ordering() {
            find = find.order_by(column, order);
        }

        Ok(find.all(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn genres(&self) -> AppResult<Vec<String>> {
        Ok(movie::Entity::find()
            .select_only()
            .column(movie::Column::Genre)
            .filter(movie::Column::Genre.is_not_null())
            .distinct()
            .order_by_asc(movie::Column::Genre)
            .into_tuple::<String>()
            .all(&self.db)
            .await?)
    }

    pub async fn years(&self) -> AppResult<Vec<i32>> {
        Ok(movie::Entity::find()
            .select_only()
            .column(movie::Column::Year)
            .filter(movie::Column::Year.is_not_null())
            .distinct()
            .order_by_desc(movie::Column::Year)
            .into_tuple::<i32>()
            .all(&self.db)
            .await?)
    }
}
