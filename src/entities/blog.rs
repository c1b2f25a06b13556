// entities/blog.rs
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status value that hides a blog from every read path.
pub const STATUS_DELETED: &str = "deleted";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blogs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    /// Unicode-lowercased title, the column title search matches against.
    pub title_key: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: String,
    pub content_source: String,
    pub timestamp: DateTimeUtc,
    /// 0 means no ratings yet.
    pub overall_rating: f64,
    pub tags: String,
    #[sea_orm(column_type = "Json")]
    pub related_posts: RelatedPosts,
    #[sea_orm(column_type = "Json")]
    pub reviews: Reviews,
    pub status: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}
impl ActiveModelBehavior for ActiveModel {}

/// Search key for a title. Folding happens here rather than in SQL, where
/// SQLite's `LOWER` only folds ASCII.
pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.status.as_deref() == Some(STATUS_DELETED)
    }

    /// First paragraph-sized slice of the content, cut on a char boundary.
    pub fn excerpt(&self) -> &str {
        const MAX: usize = 100;
        match self.content.char_indices().nth(MAX) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews.0
    }

    pub fn related(&self) -> &[RelatedPost] {
        &self.related_posts.0
    }

    pub fn published(&self) -> String {
        self.timestamp.format("%a, %b %e, %Y %l:%M %p").to_string()
    }
}

/// Embedded review. Only lives inside its parent blog document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Review {
    pub author: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: String,
    pub approval: Approval,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approval {
    #[default]
    Pending,
    Approved,
}

impl Approval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Approval::Pending => "pending",
            Approval::Approved => "approved",
        }
    }
}

impl std::fmt::Display for Approval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelatedPost {
    #[serde(rename = "relationId")]
    pub relation_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Reviews(pub Vec<Review>);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RelatedPosts(pub Vec<RelatedPost>);

impl Reviews {
    /// Mean rating rounded to one decimal, 0 when there are no reviews.
    pub fn mean_rating(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        let total: i32 = self.0.iter().map(|r| r.rating).sum();
        let mean = f64::from(total) / self.0.len() as f64;
        (mean * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32) -> Review {
        Review {
            author: "Rahul".into(),
            rating,
            comment: "Great article".into(),
            approval: Approval::Pending,
        }
    }

    #[test]
    fn mean_rating_is_zero_without_reviews() {
        assert_eq!(Reviews::default().mean_rating(), 0.0);
    }

    #[test]
    fn mean_rating_rounds_to_one_decimal() {
        let reviews = Reviews(vec![review(4), review(4), review(5)]);
        assert_eq!(reviews.mean_rating(), 4.3);
    }

    #[test]
    fn review_rating_out_of_range_is_rejected() {
        assert!(review(0).validate().is_err());
        assert!(review(6).validate().is_err());
        assert!(review(1).validate().is_ok());
    }

    #[test]
    fn title_key_folds_non_ascii_capitals() {
        assert_eq!(title_key("Über RUST"), "über rust");
    }

    #[test]
    fn approval_serializes_lowercase() {
        let json = serde_json::to_string(&review(3)).unwrap();
        assert!(json.contains("\"approval\":\"pending\""));
    }
}
