use askama::Template;

use crate::entities::blog;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage<'a> {
    pub heading: &'a str,
    pub posts: &'a [blog::Model],
    pub message: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostPage<'a> {
    pub post: Option<&'a blog::Model>,
    pub message: Option<&'a str>,
}

/// Composition form. A rejected submit comes back with its message and the
/// values the author already typed.
#[derive(Template)]
#[template(path = "compose.html")]
pub struct ComposePage<'a> {
    pub message: Option<&'a str>,
    pub draft: ComposeDraft<'a>,
}

#[derive(Debug, Default)]
pub struct ComposeDraft<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author: &'a str,
    pub content_source: &'a str,
    pub tags: &'a str,
    pub related_posts: &'a str,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutPage<'a> {
    pub about_content: &'a str,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactPage<'a> {
    pub contact_content: &'a str,
}
