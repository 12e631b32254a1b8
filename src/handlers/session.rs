// Session handlers: current user, protected dashboard and sign-out
use crate::guard::SessionGuard;
use crate::settings::AuthLinkSettings;
use crate::utils::cookie_utils::clear_session_cookies;
use crate::utils::html::html_escape;
use crate::utils::logging::LoggingHelper;
use crate::utils::redirect::RedirectTarget;
use crate::utils::response_builder::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::info;

/// Return the signed-in user as JSON
///
/// # Errors
///
/// Never returns an error; a failed lookup is answered with 502
pub async fn current_user(req: HttpRequest, guard: web::Data<SessionGuard>) -> Result<HttpResponse> {
    match guard.current_user(&req).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(user)),
        Ok(None) => Ok(ResponseBuilder::unauthorized_json("No active session")),
        Err(e) => {
            LoggingHelper::log_session_lookup_failed(&e);
            Ok(HttpResponse::BadGateway().json(serde_json::json!({
                "error": "session_retrieval_failed",
                "message": e.message()
            })))
        }
    }
}

/// Protected landing page
///
/// # Errors
///
/// Never returns an error; visitors without a session are redirected
pub async fn dashboard(req: HttpRequest, guard: web::Data<SessionGuard>) -> Result<HttpResponse> {
    let user = match guard.require_user(&req).await {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let name = user.email.as_deref().unwrap_or(user.id.as_str());
    Ok(ResponseBuilder::html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Dashboard</title>
</head>
<body>
    <h1>Dashboard</h1>
    <p>Signed in as {}</p>
    <form method="post" action="/auth/sign_out"><button type="submit">Sign out</button></form>
</body>
</html>"#,
        html_escape(name)
    )))
}

/// Drop the session cookies and return to the login page
///
/// # Errors
///
/// Never returns an error
pub async fn sign_out(settings: web::Data<AuthLinkSettings>) -> Result<HttpResponse> {
    info!("Signing out: clearing session cookies");
    let target = RedirectTarget::to(settings.routes.login_path.as_str()).resolve(&settings.base_url());
    Ok(ResponseBuilder::redirect(
        &target,
        Some(clear_session_cookies(settings.cookies.secure)),
    ))
}
