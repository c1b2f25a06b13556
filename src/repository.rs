use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    sea_query::{Expr, LikeExpr},
};
use tracing::{error, info, warn};
use validator::Validate;

use crate::entities::blog::{self, RelatedPost, RelatedPosts, Review, Reviews, STATUS_DELETED};
use crate::error::RepoError;

/// Caps applied to a title search.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub limit: u64,
    pub time_budget: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 25,
            time_budget: Duration::from_millis(1000),
        }
    }
}

/// Full initial document of a blog. Reviews are written together with the blog.
#[derive(Clone, Debug, Default, Validate)]
pub struct NewBlog {
    #[validate(length(min = 1, message = "missing title"))]
    pub title: String,
    #[validate(length(min = 1, message = "missing content"))]
    pub content: String,
    #[validate(length(min = 1, message = "missing author"))]
    pub author: String,
    #[validate(length(min = 1, message = "missing source"))]
    pub content_source: String,
    /// Defaults to the time of insertion.
    pub timestamp: Option<DateTime<Utc>>,
    /// Defaults to the mean of `reviews`.
    #[validate(range(min = 0.0, max = 5.0, message = "overall rating must be between 0 and 5"))]
    pub overall_rating: Option<f64>,
    pub tags: String,
    pub related_posts: Vec<RelatedPost>,
    #[validate(nested)]
    pub reviews: Vec<Review>,
}

#[derive(Clone)]
pub struct BlogRepository {
    db: DatabaseConnection,
}

impl BlogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewBlog) -> Result<blog::Model, RepoError> {
        if let Err(errors) = new.validate() {
            warn!(title = %new.title, "rejected blog: {errors}");
            return Err(errors.into());
        }

        let reviews = Reviews(new.reviews);
        let overall_rating = new.overall_rating.unwrap_or_else(|| reviews.mean_rating());
        let am = blog::ActiveModel {
            title_key: Set(blog::title_key(&new.title)),
            title: Set(new.title),
            content: Set(new.content),
            author: Set(new.author),
            content_source: Set(new.content_source),
            timestamp: Set(new.timestamp.unwrap_or_else(Utc::now)),
            overall_rating: Set(overall_rating),
            tags: Set(new.tags),
            related_posts: Set(RelatedPosts(new.related_posts)),
            reviews: Set(reviews),
            status: Set(None),
            ..Default::default()
        };
        let created = am.insert(&self.db).await.inspect_err(log_store_error)?;
        info!(id = created.id, title = %created.title, "blog created");
        Ok(created)
    }

    pub async fn list_visible(&self, newest_first: bool) -> Result<Vec<blog::Model>, RepoError> {
        let query = blog::Entity::find().filter(visible());
        let query = if newest_first {
            query.order_by_desc(blog::Column::Timestamp)
        } else {
            query.order_by_asc(blog::Column::Id)
        };
        let blogs = query.all(&self.db).await.inspect_err(log_store_error)?;
        info!("{} blog(s) found", blogs.len());
        Ok(blogs)
    }

    /// `None` for unknown ids and for soft-deleted blogs.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<blog::Model>, RepoError> {
        let found = blog::Entity::find_by_id(id)
            .filter(visible())
            .one(&self.db)
            .await
            .inspect_err(log_store_error)?;
        Ok(found)
    }

    /// Case-insensitive substring match on the title, newest first.
    pub async fn search_by_title(
        &self,
        text: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<blog::Model>, RepoError> {
        let pattern = format!("%{}%", escape_like(&blog::title_key(text)));
        let query = blog::Entity::find()
            .filter(visible())
            .filter(
                Expr::col(blog::Column::TitleKey).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            )
            .order_by_desc(blog::Column::Timestamp)
            .limit(opts.limit)
            .all(&self.db);

        let blogs = within_budget(opts.time_budget, query)
            .await
            .inspect_err(|e| error!("search for {text:?} failed: {e}"))?;
        info!("{} blog(s) matching {text:?}", blogs.len());
        Ok(blogs)
    }

    /// Hides the blog from every read. Unknown ids are a no-op.
    pub async fn soft_delete(&self, id: i32) -> Result<(), RepoError> {
        let res = blog::Entity::update_many()
            .col_expr(blog::Column::Status, Expr::value(STATUS_DELETED))
            .filter(blog::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .inspect_err(log_store_error)?;
        if res.rows_affected == 0 {
            warn!(id, "soft delete matched no blog");
        } else {
            info!(id, "blog soft-deleted");
        }
        Ok(())
    }

    /// Appends a review and refreshes the overall rating. `None` if the blog is not visible.
    pub async fn add_review(
        &self,
        id: i32,
        review: Review,
    ) -> Result<Option<blog::Model>, RepoError> {
        review.validate()?;

        let txn = self.db.begin().await.inspect_err(log_store_error)?;
        let Some(found) = locked_for_update(id)
            .one(&txn)
            .await
            .inspect_err(log_store_error)?
        else {
            warn!(id, "review for unknown blog dropped");
            return Ok(None);
        };

        let mut reviews = found.reviews.clone();
        reviews.0.push(review);
        let mut am: blog::ActiveModel = found.into();
        am.overall_rating = Set(reviews.mean_rating());
        am.reviews = Set(reviews);
        let updated = am.update(&txn).await.inspect_err(log_store_error)?;
        txn.commit().await.inspect_err(log_store_error)?;

        info!(id, rating = updated.overall_rating, "review added");
        Ok(Some(updated))
    }
}

/// Visible blog by id, row-locked until the surrounding transaction ends so
/// concurrent reviews append one after another. SQLite has no row locks and
/// serializes writers on the database lock instead.
fn locked_for_update(id: i32) -> Select<blog::Entity> {
    blog::Entity::find_by_id(id).filter(visible()).lock_exclusive()
}

fn visible() -> Condition {
    Condition::any()
        .add(blog::Column::Status.is_null())
        .add(blog::Column::Status.ne(STATUS_DELETED))
}

const LIKE_ESCAPE: char = '!';

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

async fn within_budget<T, F>(budget: Duration, query: F) -> Result<T, RepoError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(budget, query).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(RepoError::Timeout {
            budget_ms: budget.as_millis() as u64,
        }),
    }
}

fn log_store_error(e: &DbErr) {
    error!("blog store error: {e}");
}
