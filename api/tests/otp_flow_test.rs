//! End-to-end tests of the code endpoints on in-memory backends

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use dl_api::create_app;
use dl_core::AccountRepository;
use dl_shared::config::AppConfig;

use common::{TestContext, MEMBER_EMAIL, ORIGINAL_HASH};

#[actix_web::test]
async fn test_send_and_verify_email_code() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({ "email": "New.Member@DevLink.io", "purpose": "email_verification" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    let code = ctx.last_code_for("new.member@devlink.io").unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-email")
        .set_json(json!({ "email": "new.member@devlink.io", "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    // A code verifies at most once
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-email")
        .set_json(json!({ "email": "new.member@devlink.io", "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["reason"], "already used");
}

#[actix_web::test]
async fn test_verify_email_marks_account_verified() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({ "email": MEMBER_EMAIL, "purpose": "email_verification" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let code = ctx.last_code_for(MEMBER_EMAIL).unwrap();
    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .set_json(json!({ "email": MEMBER_EMAIL, "code": code, "purpose": "email_verification" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let account = ctx.accounts.find_by_email(MEMBER_EMAIL).await.unwrap().unwrap();
    assert!(account.email_verified);
}

#[actix_web::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({ "email": MEMBER_EMAIL, "purpose": "password_reset" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let code = ctx.last_code_for(MEMBER_EMAIL).unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({ "email": MEMBER_EMAIL, "code": wrong, "new_password": "correct horse" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["reason"], "invalid code");
    assert_eq!(body["data"]["remaining_attempts"], 2);

    let account = ctx.accounts.find_by_email(MEMBER_EMAIL).await.unwrap().unwrap();
    assert_eq!(account.password_hash, ORIGINAL_HASH);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({ "email": MEMBER_EMAIL, "code": code, "new_password": "correct horse" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let account = ctx.accounts.find_by_email(MEMBER_EMAIL).await.unwrap().unwrap();
    assert_ne!(account.password_hash, ORIGINAL_HASH);

    let confirmation = ctx.mailer.sent().pop().unwrap();
    assert_eq!(confirmation.message.subject, "Your DevLink password was changed");
}

#[actix_web::test]
async fn test_password_reset_for_unknown_account() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({ "email": "ghost@devlink.io", "purpose": "password_reset" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ACCOUNT_NOT_FOUND");
    assert!(ctx.mailer.sent().is_empty());
}

#[actix_web::test]
async fn test_attempts_exhausted_locks_out_correct_code() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({ "email": MEMBER_EMAIL, "purpose": "email_verification" }))
        .to_request();
    test::call_service(&app, req).await;
    let code = ctx.last_code_for(MEMBER_EMAIL).unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let mut reasons = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/verify-email")
            .set_json(json!({ "email": MEMBER_EMAIL, "code": wrong }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        reasons.push(body["data"]["reason"].as_str().unwrap_or_default().to_string());
    }
    assert_eq!(reasons, ["invalid code", "invalid code", "max attempts exceeded"]);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-email")
        .set_json(json!({ "email": MEMBER_EMAIL, "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["reason"], "max attempts exceeded");
}

#[actix_web::test]
async fn test_reissue_invalidates_previous_code() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/otp/send")
            .set_json(json!({ "email": MEMBER_EMAIL, "purpose": "email_verification" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let codes = ctx.codes_for(MEMBER_EMAIL);
    assert_eq!(codes.len(), 2);
    let (first, second) = (codes[0].clone(), codes[1].clone());

    // Two draws can collide; only a distinct old code is meaningful here
    if first != second {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/verify-email")
            .set_json(json!({ "email": MEMBER_EMAIL, "code": first }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-email")
        .set_json(json!({ "email": MEMBER_EMAIL, "code": second }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_verify_password_reset_requires_new_password() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .set_json(json!({ "email": MEMBER_EMAIL, "code": "123456", "purpose": "password_reset" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_malformed_requests() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({ "email": "not-an-email", "purpose": "password_reset" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({ "email": MEMBER_EMAIL, "purpose": "login" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_health_and_not_found() {
    let ctx = TestContext::new(AppConfig::development());
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/api/v1/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
