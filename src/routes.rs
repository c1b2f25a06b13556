use std::sync::Arc;

use askama::Template;
use poem::http::StatusCode;
use poem_openapi::{
    ApiResponse, Object, OpenApi,
    param::Path,
    payload::{Form, Html, PlainText},
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::entities::blog::{Approval, RelatedPost, Review};
use crate::error::RepoError;
use crate::repository::{BlogRepository, NewBlog, SearchOptions};
use crate::views::{AboutPage, ComposeDraft, ComposePage, ContactPage, HomePage, PostPage};

const ABOUT_CONTENT: &str = "This web portal is about Blog posts";

pub struct AppState {
    pub repo: BlogRepository,
    pub search: SearchOptions,
    pub contact_content: String,
}

#[derive(ApiResponse)]
pub enum Page {
    #[oai(status = 200)]
    Ok(Html<String>),
    #[oai(status = 303)]
    SeeOther(PlainText<String>, #[oai(header = "Location")] String),
    #[oai(status = 422)]
    Invalid(Html<String>),
}

#[derive(Debug, Deserialize, Object)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ComposeForm {
    pub post_title: Option<String>,
    pub post_data: Option<String>,
    pub author: Option<String>,
    pub content_source: Option<String>,
    pub tags: Option<String>,
    /// Comma separated relation ids.
    pub related_posts: Option<String>,
}

#[derive(Debug, Deserialize, Object)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    pub search_text: Option<String>,
}

#[derive(Debug, Deserialize, Object)]
pub struct RemoveForm {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Object)]
pub struct ReviewForm {
    pub author: Option<String>,
    pub rating: Option<String>,
    pub comment: Option<String>,
}

pub struct BlogApi {
    state: Arc<AppState>,
}

#[OpenApi]
impl BlogApi {
    /// Landing page, same content as the listing
    #[oai(path = "/", method = "get")]
    async fn index(&self) -> poem::Result<Page> {
        self.listing().await
    }

    /// Visible posts, newest first
    #[oai(path = "/blogs", method = "get")]
    async fn list_blogs(&self) -> poem::Result<Page> {
        self.listing().await
    }

    #[oai(path = "/blog/compose", method = "get")]
    async fn compose_form(&self) -> poem::Result<Page> {
        let page = ComposePage {
            message: None,
            draft: ComposeDraft::default(),
        };
        Ok(Page::Ok(render(page)?))
    }

    /// Create a post from the compose form
    #[oai(path = "/blog/compose", method = "post")]
    async fn compose(&self, Form(form): Form<ComposeForm>) -> poem::Result<Page> {
        let err = match self.state.repo.create(form.to_new_blog()).await {
            Ok(_) => return Ok(see_other("/blogs")),
            Err(e) => e,
        };

        let message = err.user_message();
        let page = render(ComposePage {
            message: Some(message.as_str()),
            draft: form.draft(),
        })?;
        match err {
            RepoError::Validation(_) => Ok(Page::Invalid(page)),
            _ => Ok(Page::Ok(page)),
        }
    }

    /// Single post, or an empty result when it does not exist
    #[oai(path = "/blog/:id", method = "get")]
    async fn show_blog(&self, Path(id): Path<String>) -> poem::Result<Page> {
        let Some(id) = parse_id(&id) else {
            return Ok(Page::Ok(render(PostPage { post: None, message: None })?));
        };
        let page = match self.state.repo.find_by_id(id).await {
            Ok(post) => render(PostPage { post: post.as_ref(), message: None })?,
            Err(e) => {
                let message = e.user_message();
                render(PostPage { post: None, message: Some(message.as_str()) })?
            }
        };
        Ok(Page::Ok(page))
    }

    /// Append a reader review to a post
    #[oai(path = "/blog/:id/reviews", method = "post")]
    async fn add_review(
        &self,
        Path(id): Path<String>,
        Form(form): Form<ReviewForm>,
    ) -> poem::Result<Page> {
        let Some(id) = parse_id(&id) else {
            return Ok(Page::Ok(render(PostPage { post: None, message: None })?));
        };
        let Some(review) = form.into_review() else {
            let page = self.post_with_message(id, "Please pick a rating between 1 and 5.").await?;
            return Ok(Page::Invalid(page));
        };

        match self.state.repo.add_review(id, review).await {
            Ok(Some(_)) => Ok(see_other(format!("/blog/{id}"))),
            Ok(None) => Ok(Page::Ok(render(PostPage { post: None, message: None })?)),
            Err(e) => {
                let page = self.post_with_message(id, &e.user_message()).await?;
                match e {
                    RepoError::Validation(_) => Ok(Page::Invalid(page)),
                    _ => Ok(Page::Ok(page)),
                }
            }
        }
    }

    /// Title search, empty text goes back to the listing
    #[oai(path = "/blogs/search", method = "post")]
    async fn search(&self, Form(form): Form<SearchForm>) -> poem::Result<Page> {
        let text = form.search_text.as_deref().unwrap_or_default().trim();
        if text.is_empty() {
            return Ok(see_other("/blogs"));
        }

        let heading = format!("Results for \"{text}\"");
        let (posts, message) = match self.state.repo.search_by_title(text, &self.state.search).await {
            Ok(posts) => (posts, None),
            Err(e) => (Vec::new(), Some(e.user_message())),
        };
        let page = render(HomePage {
            heading: &heading,
            posts: &posts,
            message: message.as_deref(),
        })?;
        Ok(Page::Ok(page))
    }

    /// Soft-delete a post
    #[oai(path = "/remove", method = "post")]
    async fn remove(&self, Form(form): Form<RemoveForm>) -> poem::Result<Page> {
        let Some(id) = form.id.as_deref().and_then(parse_id) else {
            warn!(id = ?form.id, "remove called without a usable id");
            return Ok(see_other("/blogs"));
        };
        match self.state.repo.soft_delete(id).await {
            Ok(()) => Ok(see_other("/blogs")),
            Err(e) => {
                let message = e.user_message();
                let page = render(HomePage {
                    heading: "Latest posts",
                    posts: &[],
                    message: Some(message.as_str()),
                })?;
                Ok(Page::Ok(page))
            }
        }
    }

    #[oai(path = "/about", method = "get")]
    async fn about(&self) -> poem::Result<Page> {
        Ok(Page::Ok(render(AboutPage { about_content: ABOUT_CONTENT })?))
    }

    #[oai(path = "/contact", method = "get")]
    async fn contact(&self) -> poem::Result<Page> {
        let page = ContactPage {
            contact_content: &self.state.contact_content,
        };
        Ok(Page::Ok(render(page)?))
    }
}

impl BlogApi {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Post page with `message` shown above its review form. The post itself is
    /// left out when it cannot be read.
    async fn post_with_message(&self, id: i32, message: &str) -> poem::Result<Html<String>> {
        let post = self.state.repo.find_by_id(id).await.ok().flatten();
        render(PostPage {
            post: post.as_ref(),
            message: Some(message),
        })
    }

    async fn listing(&self) -> poem::Result<Page> {
        let (posts, message) = match self.state.repo.list_visible(true).await {
            Ok(posts) => (posts, None),
            Err(e) => (Vec::new(), Some(e.user_message())),
        };
        let page = render(HomePage {
            heading: "Latest posts",
            posts: &posts,
            message: message.as_deref(),
        })?;
        Ok(Page::Ok(page))
    }
}

impl ComposeForm {
    fn draft(&self) -> ComposeDraft<'_> {
        ComposeDraft {
            title: self.post_title.as_deref().unwrap_or_default(),
            content: self.post_data.as_deref().unwrap_or_default(),
            author: self.author.as_deref().unwrap_or_default(),
            content_source: self.content_source.as_deref().unwrap_or_default(),
            tags: self.tags.as_deref().unwrap_or_default(),
            related_posts: self.related_posts.as_deref().unwrap_or_default(),
        }
    }

    fn to_new_blog(&self) -> NewBlog {
        let related_posts = self
            .related_posts
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| RelatedPost {
                relation_id: id.to_string(),
            })
            .collect();

        NewBlog {
            title: trimmed(self.post_title.as_deref()),
            content: trimmed(self.post_data.as_deref()),
            author: trimmed(self.author.as_deref()),
            content_source: trimmed(self.content_source.as_deref()),
            tags: trimmed(self.tags.as_deref()),
            related_posts,
            ..Default::default()
        }
    }
}

impl ReviewForm {
    /// `None` when the rating is missing or not a number.
    fn into_review(self) -> Option<Review> {
        let rating = self.rating.as_deref()?.trim().parse().ok()?;
        let author = trimmed(self.author.as_deref());
        Some(Review {
            author: if author.is_empty() { "Anonymous".to_string() } else { author },
            rating,
            comment: trimmed(self.comment.as_deref()),
            approval: Approval::Pending,
        })
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn see_other(location: impl Into<String>) -> Page {
    let location = location.into();
    Page::SeeOther(PlainText(format!("Redirecting to {location}")), location)
}

fn render(page: impl Template) -> poem::Result<Html<String>> {
    page.render().map(Html).map_err(internal_error)
}

fn internal_error(e: impl std::fmt::Display) -> poem::Error {
    error!("failed to render page: {e}");
    poem::Error::from_string("internal error", StatusCode::INTERNAL_SERVER_ERROR)
}
