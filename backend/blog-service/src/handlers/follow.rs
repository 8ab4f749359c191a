use actix_web::{web, HttpResponse};
use tracing::debug;

use super::{profile_url, redirect};
use crate::error::Result;
use crate::middleware::RequestContext;
use crate::AppState;

/// GET /profile/{username}/follow/
pub async fn profile_follow(
    ctx: RequestContext,
    username: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let outcome = state.follows.follow(viewer.id, &username).await?;
    debug!(follower = %viewer.username, author = %username, ?outcome, "Follow request");

    Ok(redirect(&profile_url(&username)))
}

/// GET /profile/{username}/unfollow/
pub async fn profile_unfollow(
    ctx: RequestContext,
    username: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = ctx.require_viewer()?;
    let removed = state.follows.unfollow(viewer.id, &username).await?;
    debug!(follower = %viewer.username, author = %username, removed, "Unfollow request");

    Ok(redirect(&profile_url(&username)))
}
