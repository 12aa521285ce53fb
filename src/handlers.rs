//! Page handlers: home, about, post view, and the create flow.

use axum::Form;
use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::AppError;
use crate::posts::{self, NewPost};

pub async fn home(State(app): State<AppState>) -> Result<Html<String>, AppError> {
    let data = json!({
        "title": "Welcome to my blog!",
        "content": "This is the home page of my awesome blog.",
    });
    Ok(Html(app.templates.render("index", &data)?))
}

pub async fn about() -> &'static str {
    "About my blog"
}

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    id: i64,
}

/// Render a post: metadata row from the database, body bytes from the
/// object store under the stored key.
pub async fn view_post(
    State(app): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<Html<String>, AppError> {
    let mut post = posts::find_post(&app.db, query.id).await?;

    let body = app.store.get_object(&post.object_key).await?;
    post.content = String::from_utf8_lossy(&body).into_owned();

    Ok(Html(app.templates.render("post", &post)?))
}

pub async fn create_form(State(app): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(app.templates.render("create", &json!({}))?))
}

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    pub title: String,
    pub content: String,
    pub code: String,
}

/// Create a post: upload the body to the object store under a key derived
/// from the title, then insert the metadata row. A duplicate title reuses
/// the same key and silently overwrites the stored object. No rollback if
/// the insert fails after the upload.
pub async fn create_post(
    State(app): State<AppState>,
    Form(form): Form<CreateForm>,
) -> Result<Redirect, AppError> {
    let object_key = format!("{}.txt", form.title);

    app.store
        .put_object(&object_key, form.content.as_bytes(), "text/plain")
        .await?;

    posts::insert_post(
        &app.db,
        &NewPost {
            title: form.title,
            content: form.content,
            code: form.code,
            object_key,
        },
    )
    .await?;

    Ok(Redirect::to("/"))
}
