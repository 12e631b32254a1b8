// Server-rendered sign-in pages driving the form controller
use crate::actions::{AuthActions, AuthApi, SignInFlow};
use crate::form::{AuthForm, Feedback, Navigator};
use crate::models::{AuthActionType, LoginPageQuery};
use crate::settings::{AuthLinkSettings, RouteSettings};
use crate::utils::cookie_utils::code_verifier_cookie;
use crate::utils::html::html_escape;
use crate::utils::response_builder::ResponseBuilder;
use actix_web::cookie::Cookie;
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

/// Email field posted by the page's form
#[derive(Debug, Default, Deserialize)]
pub struct EmailField {
    #[serde(default)]
    pub email: String,
}

/// Navigator for the HTTP surface: the last requested URL becomes a 303
#[derive(Debug, Default)]
pub struct RedirectNavigator {
    location: Option<String>,
}

impl RedirectNavigator {
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl Navigator for RedirectNavigator {
    fn navigate(&mut self, url: &str) {
        self.location = Some(url.to_string());
    }
}

type PageForm = AuthForm<SignInFlow, RedirectNavigator>;

fn new_form(mode: AuthActionType, actions: &AuthActions) -> PageForm {
    AuthForm::new(mode, actions.begin_flow(), RedirectNavigator::default())
}

/// Cookie carrying the verifier of the flow the provider just accepted
fn verifier_cookies(form: &PageForm, settings: &AuthLinkSettings) -> Vec<Cookie<'static>> {
    vec![code_verifier_cookie(
        form.api().pkce().verifier(),
        settings.cookies.secure,
    )]
}

/// # Errors
/// Never returns an error
pub async fn login_page(
    query: web::Query<LoginPageQuery>,
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    show_page(AuthActionType::Login, &query, &actions, &settings)
}

/// # Errors
/// Never returns an error
pub async fn signup_page(
    query: web::Query<LoginPageQuery>,
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    show_page(AuthActionType::Signup, &query, &actions, &settings)
}

/// # Errors
/// Never returns an error
pub async fn login_email(
    form: web::Form<EmailField>,
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    submit_email(AuthActionType::Login, form.into_inner(), &actions, &settings).await
}

/// # Errors
/// Never returns an error
pub async fn signup_email(
    form: web::Form<EmailField>,
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    submit_email(AuthActionType::Signup, form.into_inner(), &actions, &settings).await
}

/// # Errors
/// Never returns an error
pub async fn login_google(
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    click_google(AuthActionType::Login, &actions, &settings).await
}

/// # Errors
/// Never returns an error
pub async fn signup_google(
    actions: web::Data<AuthActions>,
    settings: web::Data<AuthLinkSettings>,
) -> Result<HttpResponse> {
    click_google(AuthActionType::Signup, &actions, &settings).await
}

fn show_page(
    mode: AuthActionType,
    query: &LoginPageQuery,
    actions: &AuthActions,
    settings: &AuthLinkSettings,
) -> Result<HttpResponse> {
    let form = new_form(mode, actions);
    Ok(ResponseBuilder::html(render_auth_page(
        &form,
        &settings.routes,
        Some(query),
    )))
}

async fn submit_email(
    mode: AuthActionType,
    field: EmailField,
    actions: &AuthActions,
    settings: &AuthLinkSettings,
) -> Result<HttpResponse> {
    let mut form = new_form(mode, actions);
    form.set_email(field.email);
    form.submit_email().await;
    let cookies = form
        .email_feedback()
        .message
        .is_some()
        .then(|| verifier_cookies(&form, settings));
    Ok(ResponseBuilder::html_with_cookies(
        render_auth_page(&form, &settings.routes, None),
        cookies,
    ))
}

async fn click_google(
    mode: AuthActionType,
    actions: &AuthActions,
    settings: &AuthLinkSettings,
) -> Result<HttpResponse> {
    let mut form = new_form(mode, actions);
    form.click_google().await;
    if let Some(location) = form.navigator().location() {
        return Ok(ResponseBuilder::see_other(
            location,
            Some(verifier_cookies(&form, settings)),
        ));
    }
    Ok(ResponseBuilder::html(render_auth_page(
        &form,
        &settings.routes,
        None,
    )))
}

fn title(mode: AuthActionType) -> &'static str {
    match mode {
        AuthActionType::Login => "Log in",
        AuthActionType::Signup => "Sign up",
    }
}

fn render_feedback(out: &mut String, feedback: &Feedback) {
    if let Some(message) = &feedback.message {
        out.push_str(&format!(r#"<p class="message">{}</p>"#, html_escape(message)));
    }
    if let Some(error) = &feedback.error {
        out.push_str(&format!(
            r#"<p class="error" role="alert">{}</p>"#,
            html_escape(error)
        ));
    }
}

fn render_annotations(out: &mut String, query: &LoginPageQuery) {
    if query.error.is_none() && query.error_description.is_none() {
        return;
    }
    out.push_str(r#"<div class="error" role="alert">"#);
    let heading = query
        .error_description
        .as_deref()
        .or(query.error.as_deref())
        .unwrap_or_default();
    out.push_str(&format!("<p>{}</p>", html_escape(heading)));
    if let Some(details) = &query.details {
        out.push_str(&format!("<p><small>{}</small></p>", html_escape(details)));
    }
    out.push_str("</div>");
}

/// Render the sign-in page for the form's current state
#[must_use]
pub fn render_auth_page<A: AuthApi, N: Navigator>(
    form: &AuthForm<A, N>,
    routes: &RouteSettings,
    annotations: Option<&LoginPageQuery>,
) -> String {
    let mode = form.mode();
    let (other_mode, other_label) = match mode {
        AuthActionType::Login => (AuthActionType::Signup, "Need an account? Sign up"),
        AuthActionType::Signup => (AuthActionType::Login, "Already have an account? Log in"),
    };

    let mut banner = String::new();
    if let Some(query) = annotations {
        render_annotations(&mut banner, query);
    }
    let mut email_feedback = String::new();
    render_feedback(&mut email_feedback, form.email_feedback());
    let mut oauth_feedback = String::new();
    render_feedback(&mut oauth_feedback, form.oauth_feedback());

    let email_disabled = if form.email_submit_enabled() { "" } else { " disabled" };
    let oauth_disabled = if form.oauth_enabled() { "" } else { " disabled" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body>
    <main>
        <h1>{title}</h1>
        {banner}
        <form method="post" action="{email_action}">
            <label for="email">Email</label>
            <input id="email" name="email" type="email" value="{email}" required>
            <button type="submit"{email_disabled}>{label}</button>
            {email_feedback}
        </form>
        <form method="post" action="{google_action}">
            <button type="submit"{oauth_disabled}>Continue with Google</button>
            {oauth_feedback}
        </form>
        <p><a href="{other_path}">{other_label}</a></p>
    </main>
</body>
</html>"#,
        title = title(mode),
        email_action = html_escape(&routes.email_form_path(mode)),
        google_action = html_escape(&routes.google_form_path(mode)),
        other_path = html_escape(routes.page_path(other_mode)),
        email = html_escape(form.email()),
        label = form.submit_label(),
    )
}
