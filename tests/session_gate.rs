mod common;

use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn protected_route_without_session_redirects_to_login() {
    let app = TestApp::new().await;

    let res = app.get("/dashboard", None).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/login?redirectTo=%2Fdashboard"));
    assert!(res.set_cookies().is_empty());

    let res = app.get("/settings/account", None).await;
    assert_eq!(res.location(), Some("/login?redirectTo=%2Fsettings%2Faccount"));
}

#[tokio::test]
async fn protected_route_with_session_passes_through() {
    let app = TestApp::new().await;

    let res = app.get("/profile", Some(&access_cookie(VALID_TOKEN))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "ada@example.com");
    assert_eq!(res.body["full_name"], "Ada Lovelace");
}

#[tokio::test]
async fn auth_route_with_session_redirects_home() {
    let app = TestApp::new().await;

    let res = app.get("/login", Some(&access_cookie(VALID_TOKEN))).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/dashboard"));

    let res = app.get("/signup", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["page"], "signup");
}

#[tokio::test]
async fn unrestricted_route_ignores_session_state() {
    let app = TestApp::new().await;

    let res = app.get("/", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["signed_in"], false);

    let res = app.get("/", Some(&access_cookie(VALID_TOKEN))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["signed_in"], true);

    let res = app.get("/", Some(&access_cookie(EXPIRED_TOKEN))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["signed_in"], false);
}

#[tokio::test]
async fn refreshed_session_cookies_ride_on_pass_through() {
    let app = TestApp::new().await;

    let res = app
        .get("/profile", Some(&session_cookie(EXPIRED_TOKEN, GOOD_REFRESH)))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let cookies = res.set_cookies();
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("sb-auth-access-token={};", FRESH_TOKEN))));
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("sb-auth-refresh-token={};", FRESH_REFRESH))));
}

#[tokio::test]
async fn refreshed_session_cookies_ride_on_home_redirect() {
    let app = TestApp::new().await;

    let res = app
        .get("/login", Some(&session_cookie(EXPIRED_TOKEN, GOOD_REFRESH)))
        .await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/dashboard"));
    assert!(res
        .set_cookies()
        .iter()
        .any(|c| c.starts_with(&format!("sb-auth-access-token={};", FRESH_TOKEN))));
}

#[tokio::test]
async fn rejected_refresh_clears_cookies_on_login_redirect() {
    let app = TestApp::new().await;

    let res = app
        .get("/history", Some(&session_cookie(EXPIRED_TOKEN, BAD_REFRESH)))
        .await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/login?redirectTo=%2Fhistory"));

    let cookies = res.set_cookies();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}

#[tokio::test]
async fn backend_failure_fails_closed_on_protected_routes() {
    let app = TestApp::new().await;

    let res = app.get("/dashboard", Some(&access_cookie(BROKEN_TOKEN))).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/login?redirectTo=%2Fdashboard"));

    // The login page stays reachable so the user is not bounced in a loop.
    let res = app.get("/login", Some(&access_cookie(BROKEN_TOKEN))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["page"], "login");
}

#[tokio::test]
async fn undecodable_user_response_fails_closed() {
    let app = TestApp::new().await;

    let res = app.get("/dashboard", Some(&access_cookie(GARBLED_TOKEN))).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/login?redirectTo=%2Fdashboard"));
    assert!(res.set_cookies().is_empty());

    let res = app.get("/", Some(&access_cookie(GARBLED_TOKEN))).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn unreachable_backend_fails_closed() {
    let app = TestApp::with_auth_url("http://127.0.0.1:1").await;

    let res = app.get("/profile", Some(&access_cookie(VALID_TOKEN))).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/login?redirectTo=%2Fprofile"));

    // Without cookies the backend is never contacted.
    let res = app.get("/", None).await;
    assert_eq!(res.status, StatusCode::OK);
}
