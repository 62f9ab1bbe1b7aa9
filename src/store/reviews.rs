use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, Statement,
    sea_query::Expr,
};

use super::now_sec;
use crate::{
    entities::{movie, review, user},
    error::{ApiError, AppResult},
    models::{
        PageParams, Pagination, RatingSummary, ReviewPage, ReviewWithAuthor, ReviewWithMovie,
        ReviewWrite,
    },
};

#[derive(Clone)]
pub struct ReviewStore {
    db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct RatingRow {
    average_rating: Option<f64>,
    review_count: i64,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the caller's review for a movie, or replace it in place if one
    /// already exists. The insert goes first and the unique index on
    /// (movie_id, user_id) arbitrates: a uniqueness violation means the row
    /// exists and flips this into the update branch. No check-then-act read,
    /// so concurrent submissions by the same user cannot produce two rows.
    pub async fn upsert(
        &self,
        movie_id: i32,
        user_id: i32,
        rating: i32,
        review_text: Option<String>,
    ) -> AppResult<ReviewWrite> {
        let now = now_sec();
        let model = review::ActiveModel {
            movie_id: Set(movie_id),
            user_id: Set(user_id),
            rating: Set(rating),
            review_text: Set(review_text.clone()),
            created_at: Set(now),
            ..Default::default()
        };

        match review::Entity::insert(model).exec(&self.db).await {
            Ok(_) => Ok(ReviewWrite::Created),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                review::Entity::update_many()
                    .col_expr(review::Column::Rating, Expr::value(rating))
                    .col_expr(review::Column::ReviewText, Expr::value(review_text))
                    .col_expr(review::Column::CreatedAt, Expr::value(now))
                    .filter(review::Column::MovieId.eq(movie_id))
                    .filter(review::Column::UserId.eq(user_id))
                    .exec(&self.db)
                    .await?;
                Ok(ReviewWrite::Updated)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete(&self, movie_id: i32, user_id: i32) -> AppResult<()> {
        let result = review::Entity::delete_many()
            .filter(review::Column::MovieId.eq(movie_id))
            .filter(review::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::NotFound("review"));
        }
        Ok(())
    }

    pub async fn find(&self, movie_id: i32, user_id: i32) -> AppResult<ReviewWithAuthor> {
        let row = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .filter(review::Column::UserId.eq(user_id))
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;

        let (review, author) = row.ok_or(ApiError::NotFound("review"))?;
        Ok(ReviewWithAuthor {
            username: author.map(|u| u.username).unwrap_or_default(),
            review,
        })
    }

    pub async fn for_movie(
        &self,
        movie_id: i32,
        page: &PageParams,
    ) -> AppResult<ReviewPage<ReviewWithAuthor>> {
        let (page_no, limit) = (page.page(), page.limit());

        let total = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .count(&self.db)
            .await?;

        let rows = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .find_also_related(user::Entity)
            .order_by_desc(review::Column::CreatedAt)
            .offset(page_no.saturating_sub(1).saturating_mul(limit))
            .limit(limit)
            .all(&self.db)
            .await?;

        let reviews = rows
            .into_iter()
            .map(|(review, author)| ReviewWithAuthor {
                username: author.map(|u| u.username).unwrap_or_default(),
                review,
            })
            .collect();

        Ok(ReviewPage { reviews, pagination: Pagination::new(page_no, limit, total) })
    }

    pub async fn for_user(
        &self,
        user_id: i32,
        page: &PageParams,
    ) -> AppResult<ReviewPage<ReviewWithMovie>> {
        let (page_no, limit) = (page.page(), page.limit());

        let total = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        let rows = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .find_also_related(movie::Entity)
            .order_by_desc(review::Column::CreatedAt)
            .offset(page_no.saturating_sub(1).saturating_mul(limit))
            .limit(limit)
            .all(&self.db)
            .await?;

        let reviews = rows
            .into_iter()
            .map(|(review, movie)| {
                let (title, poster_url) =
                    movie.map(|m| (m.title, m.poster_url)).unwrap_or_default();
                ReviewWithMovie { review, title, poster_url }
            })
            .collect();

        Ok(ReviewPage { reviews, pagination: Pagination::new(page_no, limit, total) })
    }

    /// Mean rating and review count for a movie, recomputed from the review
    /// rows on every call. Zero reviews yields an average of 0.0, not null.
    pub async fn rating_summary(&self, movie_id: i32) -> AppResult<RatingSummary> {
        let row = RatingRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            "SELECT AVG(rating) AS average_rating, COUNT(*) AS review_count \
             FROM reviews WHERE movie_id = ?",
            [movie_id.into()],
        ))
        .one(&self.db)
        .await?;

        Ok(match row {
            Some(row) => RatingSummary {
                average_rating: row.average_rating.unwrap_or(0.0),
                review_count: row.review_count as u64,
            },
            None => RatingSummary { average_rating: 0.0, review_count: 0 },
        })
    }
}
