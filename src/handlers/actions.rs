// JSON action endpoints used by script-driven sign-in forms
use crate::actions::AuthActions;
use crate::models::{ActionResult, AuthFormData};
use crate::pkce::PkcePair;
use crate::settings::AuthLinkSettings;
use crate::utils::cookie_utils::code_verifier_cookie;
use crate::utils::response_builder::ResponseBuilder;
use actix_web::{web, Either, HttpResponse, Result};

/// Request a magic link; accepts a JSON or url-encoded body
///
/// # Errors
///
/// Never returns an error; the outcome travels in the `success` field
pub async fn magic_link_action(
    body: Either<web::Json<AuthFormData>, web::Form<AuthFormData>>,
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    let form = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let pkce = PkcePair::generate();
    let result = actions.send_magic_link(&form, &pkce).await;
    Ok(respond(&result, &pkce, &settings))
}

/// Request the Google authorization URL
///
/// # Errors
///
/// Never returns an error; the outcome travels in the `success` field
pub async fn google_action(
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    let pkce = PkcePair::generate();
    let result = actions.sign_in_with_google(&pkce).await;
    Ok(respond(&result, &pkce, &settings))
}

/// The verifier only travels with a request the provider accepted
fn respond(result: &ActionResult, pkce: &PkcePair, settings: &AuthLinkSettings) -> HttpResponse {
    let cookies = result
        .success
        .then(|| vec![code_verifier_cookie(pkce.verifier(), settings.cookies.secure)]);
    ResponseBuilder::action_result(result, cookies)
}
