// Auth callback handler: code exchange and session handoff
use crate::identity::IdentityProvider;
use crate::models::CallbackQuery;
use crate::revalidation::{RevalidateKind, Revalidator};
use crate::settings::AuthLinkSettings;
use crate::utils::cookie_utils::{
    code_verifier_from_request, create_expired_cookie, session_cookies, CODE_VERIFIER_COOKIE,
};
use crate::utils::logging::LoggingHelper;
use crate::utils::redirect::{validate_next_path, RedirectTarget};
use crate::utils::response_builder::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse, Result};

const AUTHENTICATION_FAILED: &str = "authentication_failed";
const INVALID_LINK: &str = "Invalid or expired authentication link.";
const EXCHANGE_FAILED: &str = "Could not exchange code for session.";

/// Exchange the authorization code for a session and send the browser on
///
/// Every outcome is a redirect: the validated `next` path after a successful
/// exchange, the login page with an annotated error otherwise. The PKCE
/// verifier cookie set when the flow started is presented with the code and
/// expired once an exchange has been attempted.
///
/// # Errors
///
/// Never returns an error; failures are reported through the redirect
pub async fn auth_callback(
    query: web::Query<CallbackQuery>,
    req: HttpRequest,
    settings: web::Data<AuthLinkSettings>,
    provider: web::Data<dyn IdentityProvider>,
    revalidator: web::Data<dyn Revalidator>,
) -> Result<HttpResponse> {
    let base_url = settings.base_url();
    let login_path = settings.routes.login_path.as_str();
    LoggingHelper::log_callback_debug(&req, query.code().is_some(), query.next());

    let Some(code) = query.code() else {
        LoggingHelper::log_missing_code();
        let target = RedirectTarget::to(login_path)
            .with_error(AUTHENTICATION_FAILED)
            .with_description(INVALID_LINK);
        return Ok(ResponseBuilder::redirect(&target.resolve(&base_url), None));
    };

    let code_verifier = code_verifier_from_request(&req);
    if code_verifier.is_none() {
        LoggingHelper::log_missing_verifier();
    }
    let spent_verifier = create_expired_cookie(CODE_VERIFIER_COOKIE, settings.cookies.secure);

    let session = match provider
        .exchange_code_for_session(code, code_verifier.as_deref())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            LoggingHelper::log_exchange_failed(&e);
            let target = RedirectTarget::to(login_path)
                .with_error(AUTHENTICATION_FAILED)
                .with_description(EXCHANGE_FAILED)
                .with_details(e.message());
            return Ok(ResponseBuilder::redirect(
                &target.resolve(&base_url),
                Some(vec![spent_verifier]),
            ));
        }
    };

    // Cached renders of the whole tree may show the signed-out state
    revalidator.revalidate("/", RevalidateKind::Layout).await;

    let next = query
        .next()
        .and_then(validate_next_path)
        .unwrap_or(settings.routes.default_next.as_str());
    let destination = RedirectTarget::to(next).resolve(&base_url);

    LoggingHelper::log_session_created(
        session.user.as_ref().and_then(|u| u.email.as_deref()),
        &destination,
    );

    let mut cookies = session_cookies(&session, settings.cookies.secure);
    cookies.push(spent_verifier);
    Ok(ResponseBuilder::success_redirect_with_cookies(
        &destination,
        cookies,
    ))
}
