use std::{sync::Arc, time::Duration};

use blog_portal::{
    build_app, db,
    repository::{BlogRepository, SearchOptions},
    routes::AppState,
};
use poem::{Endpoint, http::StatusCode, test::TestClient, test::TestResponse};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

const UNAVAILABLE: &str = "Blog posts are unavailable right now";

async fn setup() -> (TestClient<impl Endpoint>, BlogRepository) {
    let (cli, repo, _conn) = setup_with(SearchOptions::default()).await;
    (cli, repo)
}

async fn setup_with(
    search: SearchOptions,
) -> (TestClient<impl Endpoint>, BlogRepository, DatabaseConnection) {
    let conn = db::connect("sqlite::memory:").await.unwrap();
    let repo = BlogRepository::new(conn.clone());
    let state = Arc::new(AppState {
        repo: repo.clone(),
        search,
        contact_content: "Write to editors@example.com".to_string(),
    });
    let app = build_app(state, "http://localhost:3000".into(), "public".into());
    (TestClient::new(app), repo, conn)
}

async fn body(resp: TestResponse) -> String {
    resp.0.into_body().into_string().await.unwrap()
}

const HELLO: [(&str, &str); 4] = [
    ("postTitle", "Hello"),
    ("postData", "World"),
    ("author", "A"),
    ("contentSource", "S"),
];

#[tokio::test]
async fn compose_list_remove_round_trip() {
    let (cli, repo) = setup().await;

    let resp = cli.post("/blog/compose").form(&HELLO).send().await;
    resp.assert_status(StatusCode::SEE_OTHER);
    resp.assert_header("location", "/blogs");

    let listing = body(cli.get("/blogs").send().await).await;
    assert_eq!(listing.matches(">Hello</a>").count(), 1);

    let id = repo.list_visible(true).await.unwrap()[0].id.to_string();
    let resp = cli.post("/remove").form(&[("id", id.as_str())]).send().await;
    resp.assert_status(StatusCode::SEE_OTHER);

    let listing = body(cli.get("/blogs").send().await).await;
    assert!(!listing.contains(">Hello</a>"));
    assert!(listing.contains("No posts to show."));
}

#[tokio::test]
async fn root_renders_the_listing() {
    let (cli, _repo) = setup().await;
    cli.post("/blog/compose").form(&HELLO).send().await;

    let resp = cli.get("/").send().await;
    resp.assert_status_is_ok();
    assert!(body(resp).await.contains(">Hello</a>"));
}

#[tokio::test]
async fn compose_without_title_rerenders_the_form() {
    let (cli, repo) = setup().await;

    let resp = cli
        .post("/blog/compose")
        .form(&[("postTitle", "   "), ("postData", "World"), ("author", "A"), ("contentSource", "S")])
        .send()
        .await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body(resp).await.contains("missing title"));
    assert!(repo.list_visible(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_compose_keeps_what_was_typed() {
    let (cli, _repo) = setup().await;

    let resp = cli
        .post("/blog/compose")
        .form(&[
            ("postTitle", ""),
            ("postData", "A long draft"),
            ("author", "Ann"),
            ("contentSource", "notes"),
            ("tags", "rust,web"),
            ("relatedPosts", "3,4"),
        ])
        .send()
        .await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let page = body(resp).await;
    assert!(page.contains(">A long draft</textarea>"));
    assert!(page.contains("value=\"Ann\""));
    assert!(page.contains("value=\"notes\""));
    assert!(page.contains("value=\"rust,web\""));
    assert!(page.contains("value=\"3,4\""));
}

#[tokio::test]
async fn compose_form_renders() {
    let (cli, _repo) = setup().await;
    let resp = cli.get("/blog/compose").send().await;
    resp.assert_status_is_ok();
    assert!(body(resp).await.contains("name=\"postTitle\""));
}

#[tokio::test]
async fn empty_search_redirects_to_listing() {
    let (cli, _repo) = setup().await;

    let resp = cli
        .post("/blogs/search")
        .form(&[("searchText", "   ")])
        .send()
        .await;
    resp.assert_status(StatusCode::SEE_OTHER);
    resp.assert_header("location", "/blogs");
}

#[tokio::test]
async fn search_renders_matching_titles() {
    let (cli, _repo) = setup().await;
    cli.post("/blog/compose").form(&HELLO).send().await;

    let resp = cli
        .post("/blogs/search")
        .form(&[("searchText", "hel")])
        .send()
        .await;
    resp.assert_status_is_ok();
    assert!(body(resp).await.contains(">Hello</a>"));

    let resp = cli
        .post("/blogs/search")
        .form(&[("searchText", "nothing like it")])
        .send()
        .await;
    assert!(body(resp).await.contains("No posts to show."));
}

#[tokio::test]
async fn unknown_post_renders_empty_result() {
    let (cli, _repo) = setup().await;

    for path in ["/blog/99", "/blog/not-an-id"] {
        let resp = cli.get(path).send().await;
        resp.assert_status_is_ok();
        assert!(body(resp).await.contains("No post found."));
    }
}

#[tokio::test]
async fn review_is_shown_on_the_post() {
    let (cli, repo) = setup().await;
    cli.post("/blog/compose").form(&HELLO).send().await;
    let id = repo.list_visible(true).await.unwrap()[0].id;

    let resp = cli
        .post(format!("/blog/{id}/reviews"))
        .form(&[("author", "Rahul"), ("rating", "4"), ("comment", "Great article")])
        .send()
        .await;
    resp.assert_status(StatusCode::SEE_OTHER);
    resp.assert_header("location", format!("/blog/{id}"));

    let page = body(cli.get(format!("/blog/{id}")).send().await).await;
    assert!(page.contains("Great article"));
    assert!(page.contains("rated 4/5 (pending)"));
}

#[tokio::test]
async fn review_with_bad_rating_is_rejected() {
    let (cli, repo) = setup().await;
    cli.post("/blog/compose").form(&HELLO).send().await;
    let id = repo.list_visible(true).await.unwrap()[0].id;

    let resp = cli
        .post(format!("/blog/{id}/reviews"))
        .form(&[("author", "Rahul"), ("rating", "9"), ("comment", "")])
        .send()
        .await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let page = body(resp).await;
    assert!(page.contains("<h1>Hello</h1>"));
    assert!(page.contains("between 1 and 5"));
    assert!(repo.find_by_id(id).await.unwrap().unwrap().reviews().is_empty());
}

#[tokio::test]
async fn unparsable_rating_still_shows_the_post() {
    let (cli, repo) = setup().await;
    cli.post("/blog/compose").form(&HELLO).send().await;
    let id = repo.list_visible(true).await.unwrap()[0].id;

    let resp = cli
        .post(format!("/blog/{id}/reviews"))
        .form(&[("author", "Rahul"), ("rating", "five"), ("comment", "")])
        .send()
        .await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let page = body(resp).await;
    assert!(page.contains("<h1>Hello</h1>"));
    assert!(page.contains("Please pick a rating between 1 and 5."));
}

#[tokio::test]
async fn failing_store_renders_pages_with_a_message() {
    let (cli, _repo, conn) = setup_with(SearchOptions::default()).await;
    cli.post("/blog/compose").form(&HELLO).send().await;
    conn.execute_unprepared("DROP TABLE blogs").await.unwrap();

    let resp = cli.get("/blogs").send().await;
    resp.assert_status_is_ok();
    let page = body(resp).await;
    assert!(page.contains(UNAVAILABLE));
    assert!(page.contains("No posts to show."));
    assert!(!page.contains("no such table"));

    let resp = cli
        .post("/blogs/search")
        .form(&[("searchText", "Hello")])
        .send()
        .await;
    resp.assert_status_is_ok();
    let page = body(resp).await;
    assert!(page.contains(UNAVAILABLE));
    assert!(!page.contains(">Hello</a>"));
    assert!(!page.contains("no such table"));

    let resp = cli.get("/blog/1").send().await;
    resp.assert_status_is_ok();
    let page = body(resp).await;
    assert!(page.contains(UNAVAILABLE));
    assert!(!page.contains("no such table"));
}

#[tokio::test]
async fn slow_search_shows_a_timeout_message() {
    let search = SearchOptions {
        limit: 25,
        time_budget: Duration::from_millis(50),
    };
    let (cli, _repo, conn) = setup_with(search).await;
    cli.post("/blog/compose").form(&HELLO).send().await;

    // the in-memory pool has a single connection; holding it stalls the search
    let txn = conn.begin().await.unwrap();
    let resp = cli
        .post("/blogs/search")
        .form(&[("searchText", "Hello")])
        .send()
        .await;
    resp.assert_status_is_ok();
    let page = body(resp).await;
    assert!(page.contains("The search took too long"));
    assert!(!page.contains(">Hello</a>"));
    txn.rollback().await.unwrap();
}

#[tokio::test]
async fn contact_page_uses_configured_text() {
    let (cli, _repo) = setup().await;
    let resp = cli.get("/contact").send().await;
    resp.assert_status_is_ok();
    assert!(body(resp).await.contains("editors@example.com"));

    cli.get("/about").send().await.assert_status_is_ok();
}
