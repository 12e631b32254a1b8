// Handler tests driven through the full actix service
use crate::identity::IdentityError;
use crate::models::ActionResult;
use crate::pkce::code_challenge;
use crate::revalidation::RevalidateKind;
use crate::settings::RouteSettings;
use crate::testing::app::TestApp;
use crate::testing::constants::{TEST_EMAIL, TEST_OAUTH_URL};
use crate::testing::mock::{MockIdentityProvider, ProviderCall};
use crate::testing::TestFixtures;
use crate::utils::cookie_utils::{ACCESS_TOKEN_COOKIE, CODE_VERIFIER_COOKIE, REFRESH_TOKEN_COOKIE};
use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, App};

macro_rules! service {
    ($app:expr) => {{
        let services = $app.services.clone();
        test::init_service(App::new().configure(move |cfg| services.configure(cfg))).await
    }};
}

/// Value of the PKCE verifier cookie set on the response, if any
fn verifier_cookie<B>(response: &actix_web::dev::ServiceResponse<B>) -> Option<String> {
    response
        .response()
        .cookies()
        .find(|c| c.name() == CODE_VERIFIER_COOKIE)
        .map(|c| c.value().to_string())
}

fn location<B>(response: &actix_web::dev::ServiceResponse<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn test_callback_without_code_redirects_with_invalid_link() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::get().uri("/auth/callback").to_request();
    let response = test::call_service(&service, req).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "http://localhost:3000/login?error=authentication_failed&error_description=Invalid+or+expired+authentication+link."
    );
    assert!(app.provider.calls().is_empty());
    assert!(app.revalidator.signals().is_empty());
}

#[actix_web::test]
async fn test_callback_with_empty_code_is_treated_as_missing() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::get().uri("/auth/callback?code=").to_request();
    let response = test::call_service(&service, req).await;

    assert!(location(&response).contains("error_description=Invalid+or+expired+authentication+link."));
    assert!(app.provider.calls().is_empty());
}

#[actix_web::test]
async fn test_callback_exchange_failure_carries_details() {
    let app = TestApp::new(MockIdentityProvider::new().fail_exchange("Exchange failed"));
    let service = service!(app);

    let req = test::TestRequest::get().uri("/auth/callback?code=bad").to_request();
    let response = test::call_service(&service, req).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "http://localhost:3000/login?error=authentication_failed&error_description=Could+not+exchange+code+for+session.&details=Exchange+failed"
    );
    assert!(app.revalidator.signals().is_empty());
    assert_eq!(verifier_cookie(&response).as_deref(), Some(""));
    assert!(response
        .response()
        .cookies()
        .all(|c| c.name() != ACCESS_TOKEN_COOKIE));
}

#[actix_web::test]
async fn test_callback_success_sets_cookies_and_revalidates() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::get()
        .uri("/auth/callback?code=abc&next=/test")
        .cookie(Cookie::new(CODE_VERIFIER_COOKIE, "verifier-1"))
        .to_request();
    let response = test::call_service(&service, req).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/test");
    assert_eq!(
        app.provider.calls(),
        vec![ProviderCall::Exchange {
            code: "abc".to_string(),
            code_verifier: Some("verifier-1".to_string()),
        }]
    );
    assert_eq!(verifier_cookie(&response).as_deref(), Some(""));
    assert_eq!(
        app.revalidator.signals(),
        vec![("/".to_string(), RevalidateKind::Layout)]
    );

    let names: Vec<String> = response
        .response()
        .cookies()
        .map(|c| c.name().to_string())
        .collect();
    assert!(names.contains(&ACCESS_TOKEN_COOKIE.to_string()));
    assert!(names.contains(&REFRESH_TOKEN_COOKIE.to_string()));
}

#[actix_web::test]
async fn test_callback_rejects_offsite_next() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    for next in ["https%3A%2F%2Fevil.example", "%2F%2Fevil.example", "dashboard"] {
        let req = test::TestRequest::get()
            .uri(&format!("/auth/callback?code=abc&next={next}"))
            .to_request();
        let response = test::call_service(&service, req).await;
        assert_eq!(location(&response), "http://localhost:3000/dashboard", "next={next}");
    }
}

#[actix_web::test]
async fn test_magic_link_action_accepts_form_body() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::post()
        .uri("/auth/actions/magic-link")
        .set_form([("email", TEST_EMAIL), ("authActionType", "signup")])
        .to_request();
    let response = test::call_service(&service, req).await;
    let verifier = verifier_cookie(&response).unwrap();
    let result: ActionResult = test::read_body_json(response).await;

    assert!(result.success);
    assert_eq!(
        result.message.as_deref(),
        Some("Login link sent to test@example.com. Please check your inbox.")
    );
    assert_eq!(
        app.provider.calls(),
        vec![ProviderCall::EmailLink {
            email: TEST_EMAIL.to_string(),
            redirect_url: "http://localhost:3000/auth/callback".to_string(),
            create_if_missing: true,
            code_challenge: code_challenge(&verifier),
        }]
    );
}

#[actix_web::test]
async fn test_magic_link_action_accepts_json_and_reports_validation() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::post()
        .uri("/auth/actions/magic-link")
        .set_json(serde_json::json!({ "email": TEST_EMAIL }))
        .to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(verifier_cookie(&response).is_none());

    let result: ActionResult = test::read_body_json(response).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Auth action type is required."));
    assert!(app.provider.calls().is_empty());
}

#[actix_web::test]
async fn test_google_action_returns_url() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::post().uri("/auth/actions/google").to_request();
    let response = test::call_service(&service, req).await;
    let verifier = verifier_cookie(&response).unwrap();
    let result: ActionResult = test::read_body_json(response).await;

    assert!(result.success);
    assert_eq!(result.url.as_deref(), Some(TEST_OAUTH_URL));
    assert!(matches!(
        app.provider.calls().as_slice(),
        [ProviderCall::OAuthUrl { code_challenge: challenge, .. }] if *challenge == code_challenge(&verifier)
    ));
}

#[actix_web::test]
async fn test_login_page_shows_annotations_escaped() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::get()
        .uri("/login?error=authentication_failed&error_description=%3Cb%3Ebad%3C%2Fb%3E&details=boom")
        .to_request();
    let body = test::call_and_read_body(&service, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
    assert!(html.contains("boom"));
    assert!(html.contains("Login with Email"));
}

#[actix_web::test]
async fn test_signup_email_post_renders_success() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::post()
        .uri("/signup/email")
        .set_form([("email", TEST_EMAIL)])
        .to_request();
    let response = test::call_service(&service, req).await;
    assert!(verifier_cookie(&response).is_some());
    let body = test::read_body(response).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("Please check your inbox."));
    assert!(html.contains("Sign up with Email"));
    assert!(html.contains(r#"value="""#));
    assert!(matches!(
        app.provider.calls().as_slice(),
        [ProviderCall::EmailLink {
            create_if_missing: true,
            ..
        }]
    ));
}

#[actix_web::test]
async fn test_login_email_failure_keeps_email() {
    let app = TestApp::new(MockIdentityProvider::new().fail_email_link("Rate limit exceeded"));
    let service = service!(app);

    let req = test::TestRequest::post()
        .uri("/login/email")
        .set_form([("email", TEST_EMAIL)])
        .to_request();
    let response = test::call_service(&service, req).await;
    assert!(verifier_cookie(&response).is_none());
    let body = test::read_body(response).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("Failed to send login link: Rate limit exceeded"));
    assert!(html.contains(r#"value="test@example.com""#));
}

#[actix_web::test]
async fn test_google_post_redirects_to_provider() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::post().uri("/login/google").to_request();
    let response = test::call_service(&service, req).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), TEST_OAUTH_URL);
    assert!(verifier_cookie(&response).is_some());
}

#[actix_web::test]
async fn test_verifier_from_action_reaches_exchange() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::post()
        .uri("/auth/actions/magic-link")
        .set_json(serde_json::json!({ "email": TEST_EMAIL, "authActionType": "login" }))
        .to_request();
    let response = test::call_service(&service, req).await;
    let verifier = verifier_cookie(&response).unwrap();

    let req = test::TestRequest::get()
        .uri("/auth/callback?code=abc")
        .cookie(Cookie::new(CODE_VERIFIER_COOKIE, verifier.clone()))
        .to_request();
    test::call_service(&service, req).await;

    let calls = app.provider.calls();
    let ProviderCall::EmailLink { code_challenge: sent, .. } = &calls[0] else {
        panic!("expected an email link call, got {calls:?}");
    };
    assert_eq!(*sent, code_challenge(&verifier));
    assert_eq!(
        calls[1],
        ProviderCall::Exchange {
            code: "abc".to_string(),
            code_verifier: Some(verifier),
        }
    );
}

#[actix_web::test]
async fn test_google_post_without_url_renders_error() {
    let app = TestApp::new(
        MockIdentityProvider::new().with_oauth_error(IdentityError::Transport("offline".to_string())),
    );
    let service = service!(app);

    let req = test::TestRequest::post().uri("/signup/google").to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = test::read_body(response).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Failed to initiate google sign-in: offline"));
}

#[actix_web::test]
async fn test_dashboard_requires_session() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::get().uri("/dashboard").to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/login");

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, "token-1"))
        .to_request();
    let body = test::call_and_read_body(&service, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Signed in as test@example.com"));
}

#[actix_web::test]
async fn test_current_user_json() {
    let app = TestApp::new(MockIdentityProvider::new().with_user(None));
    let service = service!(app);

    let req = test::TestRequest::get()
        .uri("/auth/user")
        .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, "expired"))
        .to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_sign_out_clears_cookies() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::post().uri("/auth/sign_out").to_request();
    let response = test::call_service(&service, req).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/login");
    let cleared: Vec<String> = response
        .response()
        .cookies()
        .filter(|c| c.value().is_empty())
        .map(|c| c.name().to_string())
        .collect();
    assert!(cleared.contains(&ACCESS_TOKEN_COOKIE.to_string()));
    assert!(cleared.contains(&REFRESH_TOKEN_COOKIE.to_string()));
}

#[actix_web::test]
async fn test_routes_follow_configured_paths() {
    let mut settings = TestFixtures::settings();
    settings.routes = RouteSettings {
        login_path: "/sign-in".to_string(),
        signup_path: "/register".to_string(),
        callback_path: "/auth/confirm".to_string(),
        ..RouteSettings::default()
    };
    let app = TestApp::with_settings(MockIdentityProvider::new(), settings);
    let service = service!(app);

    let req = test::TestRequest::get().uri("/auth/confirm").to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("http://localhost:3000/sign-in?error=authentication_failed"));

    let req = test::TestRequest::get().uri("/auth/confirm?code=abc").to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(location(&response), "http://localhost:3000/dashboard");

    let req = test::TestRequest::get().uri("/auth/callback?code=abc").to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/sign-in").to_request();
    let body = test::call_and_read_body(&service, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains(r#"action="/sign-in/email""#));
    assert!(html.contains(r#"action="/sign-in/google""#));
    assert!(html.contains(r#"href="/register""#));
    assert!(!html.contains("authActionType"));

    let req = test::TestRequest::post()
        .uri("/sign-in/email")
        .set_form([("email", TEST_EMAIL)])
        .to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(matches!(
        app.provider.calls().last(),
        Some(ProviderCall::EmailLink { redirect_url, create_if_missing: false, .. })
            if redirect_url == "http://localhost:3000/auth/confirm"
    ));

    let req = test::TestRequest::get().uri("/register").to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(response.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/dashboard").to_request();
    let response = test::call_service(&service, req).await;
    assert_eq!(location(&response), "http://localhost:3000/sign-in");
}

#[actix_web::test]
async fn test_health() {
    let app = TestApp::new(MockIdentityProvider::new());
    let service = service!(app);

    let req = test::TestRequest::get().uri("/ping").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["status"], "ok");
}
