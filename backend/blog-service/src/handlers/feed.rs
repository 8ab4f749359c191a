use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use tracing::debug;

use crate::error::Result;
use crate::metrics::feed::PAGE_RENDER_DURATION_SECONDS;
use crate::middleware::RequestContext;
use crate::{render, AppState};

/// GET / - global feed, served from the timeline cache
pub async fn index(ctx: RequestContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    let feed = state.feed.clone();
    let raw_page = ctx.page.clone();

    let body = state
        .timeline
        .index_page(ctx.page(), || async move {
            let _timer = PAGE_RENDER_DURATION_SECONDS
                .with_label_values(&["index"])
                .start_timer();
            let page = feed.global(raw_page.as_deref()).await?;
            render::index(&page)
        })
        .await?;

    Ok(render::json_page(StatusCode::OK, body))
}

/// GET /group/{slug}/
pub async fn group_posts(
    ctx: RequestContext,
    slug: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let feed = state.feed.group(&slug, ctx.page()).await?;
    debug!(slug = %slug, posts = feed.page.len(), "Group page");

    let body = render::group_list(&feed, ctx.viewer.as_ref())?;
    Ok(render::json_page(StatusCode::OK, body))
}

/// GET /profile/{username}/
pub async fn profile(
    ctx: RequestContext,
    username: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let feed = state
        .feed
        .profile(&username, ctx.viewer_id(), ctx.page())
        .await?;
    let counts = state.follows.counts(feed.author.id).await?;

    let body = render::profile(&feed, counts, ctx.viewer.as_ref())?;
    Ok(render::json_page(StatusCode::OK, body))
}

/// GET /follow/ - posts by followed authors
pub async fn follow_index(ctx: RequestContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let page = state.feed.following(viewer.id, ctx.page()).await?;

    let body = render::follow(&page, Some(viewer))?;
    Ok(render::json_page(StatusCode::OK, body))
}
