use actix_web::{cookie::Cookie, http::header, HttpResponse};

use crate::models::ActionResult;

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Create a 302 redirect response with optional cookies
    #[must_use]
    pub fn redirect(location: &str, cookies: Option<Vec<Cookie<'static>>>) -> HttpResponse {
        let mut builder = HttpResponse::Found();

        if let Some(cookies_vec) = cookies {
            for cookie in cookies_vec {
                builder.cookie(cookie);
            }
        }

        builder
            .append_header((header::LOCATION, location))
            .finish()
    }

    /// Create a success redirect response with multiple cookies
    #[must_use]
    pub fn success_redirect_with_cookies(
        location: &str,
        cookies: Vec<Cookie<'static>>,
    ) -> HttpResponse {
        Self::redirect(location, Some(cookies))
    }

    /// Full-page navigation after a form POST
    #[must_use]
    pub fn see_other(location: &str, cookies: Option<Vec<Cookie<'static>>>) -> HttpResponse {
        let mut builder = HttpResponse::SeeOther();
        for cookie in cookies.unwrap_or_default() {
            builder.cookie(cookie);
        }
        builder
            .append_header((header::LOCATION, location))
            .finish()
    }

    /// Serialize an action result; the outcome travels in `success`
    #[must_use]
    pub fn action_result(
        result: &ActionResult,
        cookies: Option<Vec<Cookie<'static>>>,
    ) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        for cookie in cookies.unwrap_or_default() {
            builder.cookie(cookie);
        }
        builder.json(result)
    }

    #[must_use]
    pub fn html(body: String) -> HttpResponse {
        Self::html_with_cookies(body, None)
    }

    #[must_use]
    pub fn html_with_cookies(body: String, cookies: Option<Vec<Cookie<'static>>>) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        for cookie in cookies.unwrap_or_default() {
            builder.cookie(cookie);
        }
        builder.content_type("text/html; charset=utf-8").body(body)
    }

    #[must_use]
    pub fn unauthorized_json(message: &str) -> HttpResponse {
        HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "unauthorized",
            "message": message
        }))
    }
}
