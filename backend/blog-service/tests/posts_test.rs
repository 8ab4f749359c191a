//! Post authoring, comments, access control and deletion policies

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use blog_service::db::{comment_repo, follow_repo, group_repo, post_repo, user_repo};
use blog_service::db::post_repo::PostScope;
use chrono::Utc;
use common::{json_body, location, user};

// =============================================================================
// Anonymous access
// =============================================================================

#[actix_web::test]
async fn test_anonymous_is_redirected_to_login() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let post = post_repo::create_post(&state.pool, author.id(), "text", None, None, Utc::now())
        .await
        .unwrap();
    let app = test_app!(state);

    let edit = format!("/posts/{}/edit/", post.id);
    for uri in [
        "/create/",
        edit.as_str(),
        "/follow/",
        "/profile/author/follow/",
        "/profile/author/unfollow/",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&resp), format!("/auth/login/?next={uri}"));
    }

    let comment = format!("/posts/{}/comment/", post.id);
    let req = test::TestRequest::post()
        .uri(&comment)
        .set_form([("text", "hi")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/auth/login/?next={comment}"));
}

#[actix_web::test]
async fn test_anonymous_post_without_form_body_is_redirected() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let post = post_repo::create_post(&state.pool, author.id(), "text", None, None, Utc::now())
        .await
        .unwrap();
    let app = test_app!(state);

    let edit = format!("/posts/{}/edit/", post.id);
    let comment = format!("/posts/{}/comment/", post.id);
    for uri in ["/create/", edit.as_str(), comment.as_str()] {
        let req = test::TestRequest::post().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&resp), format!("/auth/login/?next={uri}"));

        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(("Content-Type", "multipart/form-data; boundary=xyz"))
            .set_payload("--xyz--\r\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri} multipart");
        assert_eq!(location(&resp), format!("/auth/login/?next={uri}"));
    }

    assert_eq!(
        comment_repo::count_for_post(&state.pool, post.id).await.unwrap(),
        0
    );
}

#[actix_web::test]
async fn test_token_of_deleted_account_is_anonymous() {
    let state = common::state().await;
    user(&state, "writer").await;
    let gone = user(&state, "gone").await;
    user_repo::delete_user(&state.pool, gone.id()).await.unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/writer/follow/")
        .insert_header(gone.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/profile/writer/follow/");

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(gone.auth())
        .set_form([("text", "orphan")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");

    assert_eq!(
        post_repo::count_posts(&state.pool, PostScope::All).await.unwrap(),
        0
    );
}

#[actix_web::test]
async fn test_signed_in_post_without_form_body_rerenders_form() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(author.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["form"]["errors"]["text"].is_array());
}

#[actix_web::test]
async fn test_login_url_is_configurable() {
    let state = common::state_with(|config| config.auth.login_url = "/accounts/login/".into()).await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/create/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(location(&resp), "/accounts/login/?next=/create/");
}

#[actix_web::test]
async fn test_invalid_token_is_anonymous() {
    let state = common::state().await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
}

// =============================================================================
// Create and edit
// =============================================================================

#[actix_web::test]
async fn test_create_form_lists_groups() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    group_repo::create_group(&state.pool, "Cats", "cats", "").await.unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header(author.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["template"], "posts/create_post.html");
    assert_eq!(body["is_edit"], false);
    assert_eq!(body["form"]["group_choices"][0]["title"], "Cats");
}

#[actix_web::test]
async fn test_create_with_group() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let cats = group_repo::create_group(&state.pool, "Cats", "cats", "").await.unwrap();
    let app = test_app!(state);

    let group = cats.id.to_string();
    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(author.auth())
        .set_form([("text", "cat post"), ("group", group.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/profile/author/");

    let posts = post_repo::list_posts(&state.pool, PostScope::Group(cats.id), 10, 0)
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "cat post");
}

#[actix_web::test]
async fn test_blank_text_rerenders_form() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(author.auth())
        .set_form([("text", "   ")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json_body(resp).await;
    assert_eq!(body["template"], "posts/create_post.html");
    assert!(body["form"]["errors"]["text"].is_array());
    assert_eq!(body["form"]["fields"]["text"], "   ");
    assert_eq!(
        post_repo::count_posts(&state.pool, PostScope::All).await.unwrap(),
        0
    );
}

#[actix_web::test]
async fn test_author_edits_post() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let post = post_repo::create_post(&state.pool, author.id(), "before", None, None, Utc::now())
        .await
        .unwrap();
    let app = test_app!(state);

    let uri = format!("/posts/{}/edit/", post.id);
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(author.auth())
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["is_edit"], true);
    assert_eq!(body["form"]["fields"]["text"], "before");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(author.auth())
        .set_form([("text", "after")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let updated = post_repo::find_post_by_id(&state.pool, post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.text, "after");
    assert_eq!(updated.pub_date, post.pub_date);
}

#[actix_web::test]
async fn test_non_author_is_redirected_to_detail() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let other = user(&state, "other").await;
    let post = post_repo::create_post(&state.pool, author.id(), "mine", None, None, Utc::now())
        .await
        .unwrap();
    let app = test_app!(state);

    let uri = format!("/posts/{}/edit/", post.id);
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(other.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(other.auth())
        .set_form([("text", "hijacked")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let unchanged = post_repo::find_post_by_id(&state.pool, post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.text, "mine");
}

// =============================================================================
// Detail and comments
// =============================================================================

#[actix_web::test]
async fn test_comment_appears_on_detail() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let reader = user(&state, "reader").await;
    let post = post_repo::create_post(&state.pool, author.id(), "text", None, None, Utc::now())
        .await
        .unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header(reader.auth())
        .set_form([("text", "Nice one")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["template"], "posts/post_detail.html");
    assert_eq!(body["comment_count"], 1);
    assert_eq!(body["comments"][0]["text"], "Nice one");
    assert_eq!(body["comments"][0]["author"], "reader");
}

#[actix_web::test]
async fn test_blank_comment_is_dropped() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let post = post_repo::create_post(&state.pool, author.id(), "text", None, None, Utc::now())
        .await
        .unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header(author.auth())
        .set_form([("text", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(comment_repo::count_for_post(&state.pool, post.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_unknown_route_renders_themed_404() {
    let state = common::state().await;
    let app = test_app!(state);

    for uri in ["/unexisting_page/", "/posts/abc/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(html.contains("core/404.html"));
    }
}

// =============================================================================
// Deletion policies
// =============================================================================

#[actix_web::test]
async fn test_group_delete_detaches_posts() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let group = group_repo::create_group(&state.pool, "Cats", "cats", "").await.unwrap();
    let post = post_repo::create_post(&state.pool, author.id(), "text", Some(group.id), None, Utc::now())
        .await
        .unwrap();

    group_repo::delete_group(&state.pool, group.id).await.unwrap();

    let post = post_repo::find_post_by_id(&state.pool, post.id)
        .await
        .unwrap()
        .expect("post survives group deletion");
    assert_eq!(post.group_id, None);
}

#[actix_web::test]
async fn test_author_delete_cascades() {
    let state = common::state().await;
    let author = user(&state, "author").await;
    let reader = user(&state, "reader").await;
    let post = post_repo::create_post(&state.pool, author.id(), "text", None, None, Utc::now())
        .await
        .unwrap();
    let reader_post = post_repo::create_post(&state.pool, reader.id(), "mine", None, None, Utc::now())
        .await
        .unwrap();
    comment_repo::create_comment(&state.pool, reader_post.id, author.id(), "hi", Utc::now())
        .await
        .unwrap();
    follow_repo::insert_follow(&state.pool, reader.id(), author.id())
        .await
        .unwrap();

    user_repo::delete_user(&state.pool, author.id()).await.unwrap();

    assert!(post_repo::find_post_by_id(&state.pool, post.id).await.unwrap().is_none());
    assert_eq!(
        comment_repo::count_for_post(&state.pool, reader_post.id).await.unwrap(),
        0
    );
    assert_eq!(
        follow_repo::count_following(&state.pool, reader.id()).await.unwrap(),
        0
    );
}
