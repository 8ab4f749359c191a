//! Page rendering
//!
//! Pages are JSON documents naming the template a front-end renders them
//! with, plus the template context. The 404 page is the only HTML produced
//! here.

use actix_web::http::header::ContentType;
use actix_web::{http::StatusCode, HttpResponse};
use serde_json::{json, Map, Value};
use validator::ValidationErrors;

use crate::error::Result;
use crate::middleware::Viewer;
use crate::models::{CommentView, Group, PostView};
use crate::services::{
    CommentForm, FollowCounts, GroupFeed, Page, PostDetail, PostForm, ProfileFeed,
};

pub mod templates {
    pub const INDEX: &str = "posts/index.html";
    pub const GROUP_LIST: &str = "posts/group_list.html";
    pub const PROFILE: &str = "posts/profile.html";
    pub const POST_DETAIL: &str = "posts/post_detail.html";
    pub const CREATE_POST: &str = "posts/create_post.html";
    pub const FOLLOW: &str = "posts/follow.html";
    pub const NOT_FOUND: &str = "core/404.html";
}

fn post_json(post: &PostView) -> Value {
    let group = match (&post.group_slug, &post.group_title) {
        (Some(slug), Some(title)) => json!({ "slug": slug, "title": title }),
        _ => Value::Null,
    };
    json!({
        "id": post.id,
        "text": post.text,
        "pub_date": post.pub_date,
        "author": post.author_username,
        "group": group,
        "image": post.image,
    })
}

fn comment_json(comment: &CommentView) -> Value {
    json!({
        "id": comment.id,
        "text": comment.text,
        "created": comment.created,
        "author": comment.author_username,
    })
}

fn page_obj(page: &Page<PostView>) -> Value {
    json!({
        "object_list": page.items.iter().map(post_json).collect::<Vec<_>>(),
        "number": page.number,
        "num_pages": page.num_pages,
        "count": page.total,
        "per_page": page.per_page,
        "has_next": page.has_next,
        "has_previous": page.has_previous,
        "next_page_number": page.next_page_number(),
        "previous_page_number": page.previous_page_number(),
    })
}

fn document(template: &str, viewer: Option<&Viewer>, context: Value) -> Result<String> {
    let mut body = Map::new();
    body.insert("template".into(), Value::from(template));
    if let Some(viewer) = viewer {
        body.insert("viewer".into(), serde_json::to_value(viewer)?);
    }
    if let Value::Object(fields) = context {
        body.extend(fields);
    }
    Ok(serde_json::to_string(&Value::Object(body))?)
}

/// Index body. It is cached and shared between viewers, so it carries no
/// viewer-specific data.
pub fn index(page: &Page<PostView>) -> Result<String> {
    document(templates::INDEX, None, json!({ "page_obj": page_obj(page) }))
}

pub fn group_list(feed: &GroupFeed, viewer: Option<&Viewer>) -> Result<String> {
    document(
        templates::GROUP_LIST,
        viewer,
        json!({
            "group": feed.group,
            "page_obj": page_obj(&feed.page),
        }),
    )
}

pub fn profile(feed: &ProfileFeed, counts: FollowCounts, viewer: Option<&Viewer>) -> Result<String> {
    document(
        templates::PROFILE,
        viewer,
        json!({
            "author": {
                "id": feed.author.id,
                "username": feed.author.username,
                "date_joined": feed.author.date_joined,
            },
            "following": feed.following,
            "followers_count": counts.followers,
            "following_count": counts.following,
            "page_obj": page_obj(&feed.page),
        }),
    )
}

pub fn post_detail(detail: &PostDetail, form: &CommentForm, viewer: Option<&Viewer>) -> Result<String> {
    document(
        templates::POST_DETAIL,
        viewer,
        json!({
            "post": post_json(&detail.post),
            "comments": detail.comments.iter().map(comment_json).collect::<Vec<_>>(),
            "comment_count": detail.comment_count,
            "form": { "fields": form, "errors": {} },
        }),
    )
}

/// Post form, for both create and edit (`editing` is the post id)
pub fn post_form(
    form: &PostForm,
    errors: Option<&ValidationErrors>,
    groups: &[Group],
    editing: Option<i64>,
    viewer: Option<&Viewer>,
) -> Result<String> {
    let choices: Vec<Value> = groups
        .iter()
        .map(|g| json!({ "id": g.id, "title": g.title }))
        .collect();
    let errors = errors.map(field_errors).unwrap_or_else(|| json!({}));

    let mut context = json!({
        "form": { "fields": form, "errors": errors, "group_choices": choices },
        "is_edit": editing.is_some(),
    });
    if let (Some(post_id), Value::Object(fields)) = (editing, &mut context) {
        fields.insert("post_id".into(), Value::from(post_id));
    }
    document(templates::CREATE_POST, viewer, context)
}

pub fn follow(page: &Page<PostView>, viewer: Option<&Viewer>) -> Result<String> {
    document(templates::FOLLOW, viewer, json!({ "page_obj": page_obj(page) }))
}

/// `{field: [message, ...]}`, falling back to the error code when a
/// validator sets no message
pub fn field_errors(errors: &ValidationErrors) -> Value {
    let mut out = Map::new();
    for (field, errs) in errors.field_errors() {
        let messages: Vec<Value> = errs
            .iter()
            .map(|e| {
                let text = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                Value::from(text)
            })
            .collect();
        out.insert(field.to_string(), Value::Array(messages));
    }
    Value::Object(out)
}

pub fn json_page(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::json())
        .body(body)
}

const NOT_FOUND_HTML: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
  <meta charset="utf-8">
  <title>Custom 404</title>
</head>
<body data-template="core/404.html">
  <main class="container py-5">
    <h1>Custom 404</h1>
    <p>Страницы с адресом не существует</p>
    <a href="/">Идите на главную</a>
  </main>
</body>
</html>
"#;

/// Themed 404 page
pub fn not_found_page() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::html())
        .body(NOT_FOUND_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Paginator;
    use chrono::Utc;

    fn post_view(group: Option<(&str, &str)>) -> PostView {
        PostView {
            id: 1,
            text: "Hello".into(),
            pub_date: Utc::now(),
            author_id: 1,
            author_username: "ivan".into(),
            group_id: group.map(|_| 1),
            group_slug: group.map(|(slug, _)| slug.to_string()),
            group_title: group.map(|(_, title)| title.to_string()),
            image: None,
        }
    }

    #[test]
    fn test_index_names_template_and_page() {
        let page = Paginator::new(10).paginate(vec![post_view(None)], None);
        let body: Value = serde_json::from_str(&index(&page).unwrap()).unwrap();

        assert_eq!(body["template"], "posts/index.html");
        assert_eq!(body["page_obj"]["object_list"][0]["text"], "Hello");
        assert_eq!(body["page_obj"]["object_list"][0]["group"], Value::Null);
        assert!(body.get("viewer").is_none());
    }

    #[test]
    fn test_group_is_embedded() {
        let page = Paginator::new(10).paginate(vec![post_view(Some(("cats", "Cats")))], None);
        let body: Value = serde_json::from_str(&follow(&page, None).unwrap()).unwrap();
        assert_eq!(body["page_obj"]["object_list"][0]["group"]["slug"], "cats");
    }

    #[test]
    fn test_form_errors_are_listed_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("text", validator::ValidationError::new("required"));

        let body = post_form(&PostForm::default(), Some(&errors), &[], Some(5), None).unwrap();
        let body: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(body["form"]["errors"]["text"][0], "required");
        assert_eq!(body["is_edit"], true);
        assert_eq!(body["post_id"], 5);
    }

    #[test]
    fn test_not_found_page_is_html() {
        let response = not_found_page();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(NOT_FOUND_HTML.contains(templates::NOT_FOUND));
    }
}
