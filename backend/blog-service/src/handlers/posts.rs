use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};

use super::{post_url, profile_url, redirect};
use crate::error::{AppError, Result};
use crate::middleware::RequestContext;
use crate::services::{CommentForm, PostForm};
use crate::{render, AppState};

/// Submitted form body. Extraction failures (no body, wrong content type)
/// surface as `None` so the viewer check runs first.
fn submitted<T: Default>(form: Option<web::Form<T>>) -> T {
    form.map(web::Form::into_inner).unwrap_or_default()
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    ctx: RequestContext,
    post_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let detail = state.posts.detail(*post_id).await?;

    let body = render::post_detail(&detail, &CommentForm::default(), ctx.viewer.as_ref())?;
    Ok(render::json_page(StatusCode::OK, body))
}

/// GET /create/
pub async fn post_create_form(
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let groups = state.posts.form_choices().await?;

    let body = render::post_form(&PostForm::default(), None, &groups, None, Some(viewer))?;
    Ok(render::json_page(StatusCode::OK, body))
}

/// POST /create/
pub async fn post_create(
    ctx: RequestContext,
    form: Option<web::Form<PostForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let form = submitted(form);

    match state.posts.create(viewer.id, &form).await {
        Ok(_) => Ok(redirect(&profile_url(&viewer.username))),
        Err(AppError::Validation(errors)) => {
            let groups = state.posts.form_choices().await?;
            let body = render::post_form(&form, Some(&errors), &groups, None, Some(viewer))?;
            Ok(render::json_page(StatusCode::BAD_REQUEST, body))
        }
        Err(e) => Err(e),
    }
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    ctx: RequestContext,
    post_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let post = state.posts.owned_post(*post_id, viewer.id).await?;
    let groups = state.posts.form_choices().await?;

    let form = PostForm::from_post(&post);
    let body = render::post_form(&form, None, &groups, Some(post.id), Some(viewer))?;
    Ok(render::json_page(StatusCode::OK, body))
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    ctx: RequestContext,
    post_id: web::Path<i64>,
    form: Option<web::Form<PostForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let post_id = post_id.into_inner();
    let form = submitted(form);

    match state.posts.edit(post_id, viewer.id, &form).await {
        Ok(post) => Ok(redirect(&post_url(post.id))),
        Err(AppError::Validation(errors)) => {
            let groups = state.posts.form_choices().await?;
            let body =
                render::post_form(&form, Some(&errors), &groups, Some(post_id), Some(viewer))?;
            Ok(render::json_page(StatusCode::BAD_REQUEST, body))
        }
        Err(e) => Err(e),
    }
}

/// POST /posts/{post_id}/comment/
pub async fn add_comment(
    ctx: RequestContext,
    post_id: web::Path<i64>,
    form: Option<web::Form<CommentForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let post_id = post_id.into_inner();
    let form = submitted(form);

    state.comments.add(post_id, viewer.id, &form).await?;
    Ok(redirect(&post_url(post_id)))
}
