use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Multipart, Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Utc;
use maud::Markup;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::{info, warn};

use blogcms_render::{pages, Notice, PageContext};
use blogcms_sdk::{BlogError, HexColor, PostDraft, PostId, SettingsUpdate};
use blogcms_types::TypeError;

use crate::auth::LOGIN_PATH;
use crate::error::{ServerError, ServerResult};
use crate::flash;
use crate::router::AppState;

const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Per-request view state: the pending flash notice and whether the
/// visitor holds an admin session.
#[derive(Debug, Default)]
pub struct View {
    notice: Option<Notice>,
    is_admin: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for View {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        Ok(Self {
            notice: flash::take(&parts.headers),
            is_admin: state.sessions.is_authenticated(&parts.headers, Utc::now()),
        })
    }
}

/// Render a page through the shared layout. A shown notice is cleared.
async fn render<F>(state: &AppState, view: &View, page: F) -> ServerResult<Response>
where
    F: FnOnce(&PageContext<'_>) -> Markup,
{
    let settings = state.blog.get_settings().await?;
    let ctx = PageContext {
        settings: &settings,
        notice: view.notice.as_ref(),
        is_admin: view.is_admin,
    };
    let html = Html(page(&ctx).into_string());
    if view.notice.is_some() {
        let clear = flash::clear_cookie(state.sessions.secure());
        Ok((AppendHeaders([(SET_COOKIE, clear)]), html).into_response())
    } else {
        Ok(html.into_response())
    }
}

async fn not_found_page(state: &AppState, view: &View) -> ServerResult<Response> {
    let mut response = render(state, view, pages::not_found_page).await?;
    *response.status_mut() = StatusCode::NOT_FOUND;
    Ok(response)
}

fn redirect_with(state: &AppState, notice: Notice, to: &str) -> Response {
    let cookie = flash::set_cookie(&notice, state.sessions.secure());
    (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(to)).into_response()
}

/// Turn a user-correctable error into a notice on the form it came from.
fn form_failure(state: &AppState, err: BlogError, back: &str) -> ServerResult<Response> {
    match err {
        BlogError::Validation(msg) | BlogError::InvalidFormat(msg) => {
            Ok(redirect_with(state, Notice::error(msg), back))
        }
        other => Err(other.into()),
    }
}

fn parse_id(raw: &str) -> Option<PostId> {
    raw.parse::<i64>().ok().map(PostId::new)
}

// ---- Public pages ----

pub async fn index(State(state): State<AppState>, view: View) -> ServerResult<Response> {
    let posts = state.blog.list_posts().await?;
    render(&state, &view, |ctx| pages::index_page(ctx, &posts)).await
}

pub async fn show_post(
    State(state): State<AppState>,
    view: View,
    Path(id): Path<String>,
) -> ServerResult<Response> {
    let Some(id) = parse_id(&id) else {
        return not_found_page(&state, &view).await;
    };
    match state.blog.get_post(id).await {
        Ok(post) => render(&state, &view, |ctx| pages::post_page(ctx, &post)).await,
        Err(BlogError::NotFound { .. }) => not_found_page(&state, &view).await,
        Err(e) => Err(e.into()),
    }
}

pub async fn not_found(State(state): State<AppState>, view: View) -> ServerResult<Response> {
    not_found_page(&state, &view).await
}

// ---- Authentication ----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_form(State(state): State<AppState>, view: View) -> ServerResult<Response> {
    render(&state, &view, pages::login_page).await
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ServerResult<Response> {
    if !state.auth.check(&form.username, &form.password) {
        warn!(username = %form.username, "failed admin login");
        return Ok(redirect_with(&state, Notice::error("Invalid credentials!"), LOGIN_PATH));
    }
    let token = state.sessions.issue(Utc::now())?;
    info!(username = %form.username, "admin logged in");
    let notice = Notice::success("Logged in successfully!");
    Ok((
        AppendHeaders([
            (SET_COOKIE, state.sessions.session_cookie(token)),
            (SET_COOKIE, flash::set_cookie(&notice, state.sessions.secure())),
        ]),
        Redirect::to(DASHBOARD_PATH),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>) -> Response {
    let notice = Notice::success("Logged out successfully!");
    (
        AppendHeaders([
            (SET_COOKIE, state.sessions.clear_cookie()),
            (SET_COOKIE, flash::set_cookie(&notice, state.sessions.secure())),
        ]),
        Redirect::to("/"),
    )
        .into_response()
}

// ---- Admin: posts ----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub featured_image: String,
}

impl From<PostForm> for PostDraft {
    fn from(form: PostForm) -> Self {
        PostDraft::new(form.title, form.content, Some(form.featured_image))
    }
}

pub async fn dashboard(State(state): State<AppState>, view: View) -> ServerResult<Response> {
    let posts = state.blog.list_posts().await?;
    render(&state, &view, |ctx| pages::dashboard_page(ctx, &posts)).await
}

pub async fn new_post_form(State(state): State<AppState>, view: View) -> ServerResult<Response> {
    render(&state, &view, |ctx| pages::post_form_page(ctx, None)).await
}

pub async fn create_post(
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> ServerResult<Response> {
    match state.blog.create_post(form.into()).await {
        Ok(_) => Ok(redirect_with(
            &state,
            Notice::success("Post created successfully!"),
            DASHBOARD_PATH,
        )),
        Err(e) => form_failure(&state, e, "/admin/new"),
    }
}

pub async fn edit_post_form(
    State(state): State<AppState>,
    view: View,
    Path(id): Path<String>,
) -> ServerResult<Response> {
    let Some(id) = parse_id(&id) else {
        return not_found_page(&state, &view).await;
    };
    match state.blog.get_post(id).await {
        Ok(post) => render(&state, &view, |ctx| pages::post_form_page(ctx, Some(&post))).await,
        Err(BlogError::NotFound { .. }) => not_found_page(&state, &view).await,
        Err(e) => Err(e.into()),
    }
}

pub async fn update_post(
    State(state): State<AppState>,
    view: View,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> ServerResult<Response> {
    let Some(id) = parse_id(&id) else {
        return not_found_page(&state, &view).await;
    };
    match state.blog.update_post(id, form.into()).await {
        Ok(_) => Ok(redirect_with(
            &state,
            Notice::success("Post updated successfully!"),
            DASHBOARD_PATH,
        )),
        Err(BlogError::NotFound { .. }) => not_found_page(&state, &view).await,
        Err(e) => form_failure(&state, e, &format!("/admin/edit/{id}")),
    }
}

pub async fn delete_post(
    State(state): State<AppState>,
    view: View,
    Path(id): Path<String>,
) -> ServerResult<Response> {
    let Some(id) = parse_id(&id) else {
        return not_found_page(&state, &view).await;
    };
    match state.blog.delete_post(id).await {
        Ok(()) => Ok(redirect_with(
            &state,
            Notice::success("Post deleted successfully!"),
            DASHBOARD_PATH,
        )),
        Err(BlogError::NotFound { .. }) => not_found_page(&state, &view).await,
        Err(e) => Err(e.into()),
    }
}

// ---- Admin: settings ----

/// The settings form. Blank color fields leave the stored color alone.
/// Keys missing from the submitted form leave the stored value unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub blog_title: Option<String>,
    pub blog_description: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_color: Option<String>,
    pub overall_background: Option<String>,
    pub card_background: Option<String>,
    pub text_color: Option<String>,
    pub navbar_color: Option<String>,
}

impl TryFrom<SettingsForm> for SettingsUpdate {
    type Error = TypeError;

    fn try_from(form: SettingsForm) -> Result<Self, TypeError> {
        let text = |raw: Option<String>| raw.map(|s| s.trim().to_string());
        let color = |raw: Option<String>| -> Result<Option<HexColor>, TypeError> {
            match raw {
                Some(raw) if !raw.trim().is_empty() => HexColor::parse(&raw).map(Some),
                _ => Ok(None),
            }
        };
        Ok(Self {
            blog_title: text(form.blog_title),
            blog_description: text(form.blog_description),
            primary_color: color(form.primary_color)?,
            secondary_color: color(form.secondary_color)?,
            background_color: color(form.background_color)?,
            overall_background: color(form.overall_background)?,
            card_background: color(form.card_background)?,
            text_color: color(form.text_color)?,
            navbar_color: color(form.navbar_color)?,
        })
    }
}

pub async fn settings_form(State(state): State<AppState>, view: View) -> ServerResult<Response> {
    render(&state, &view, pages::settings_page).await
}

pub async fn update_settings(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> ServerResult<Response> {
    let result = match SettingsUpdate::try_from(form) {
        Ok(update) => state.blog.update_settings(update).await,
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(_) => Ok(redirect_with(
            &state,
            Notice::success("Settings updated successfully!"),
            "/admin/settings",
        )),
        Err(e) => form_failure(&state, e, "/admin/settings"),
    }
}

// ---- Admin: export / import ----

pub async fn export_posts(State(state): State<AppState>) -> ServerResult<Response> {
    let doc = state.blog.export_posts().await?;
    let body =
        serde_json::to_string_pretty(&doc).map_err(|e| ServerError::Internal(e.to_string()))?;
    let filename = format!("blog_export_{}.json", doc.export_date.format("%Y%m%d_%H%M%S"));
    info!(posts = doc.total_posts, "posts exported");
    Ok((
        [
            (CONTENT_TYPE, "application/json".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}

pub async fn import_form(State(state): State<AppState>, view: View) -> ServerResult<Response> {
    render(&state, &view, pages::import_page).await
}

pub async fn import_posts(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Response> {
    const BACK: &str = "/admin/import";

    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "import upload rejected");
                return Ok(redirect_with(&state, Notice::error(format!("Upload failed: {e}")), BACK));
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((filename, bytes)),
            Err(e) => {
                warn!(error = %e, "import upload rejected");
                return Ok(redirect_with(&state, Notice::error(format!("Upload failed: {e}")), BACK));
            }
        }
    }

    let Some((filename, bytes)) = upload.filter(|(name, _)| !name.is_empty()) else {
        return Ok(redirect_with(&state, Notice::error("No file selected"), BACK));
    };
    if !filename.to_ascii_lowercase().ends_with(".json") {
        return Ok(redirect_with(&state, Notice::error("Please upload a JSON file"), BACK));
    }

    match state.blog.import_posts(&bytes).await {
        Ok(report) => Ok(redirect_with(
            &state,
            Notice::success(format!(
                "Successfully imported {} posts. Skipped {} duplicates or invalid entries.",
                report.imported, report.skipped
            )),
            DASHBOARD_PATH,
        )),
        Err(e) => form_failure(&state, e, BACK),
    }
}

// ---- Certificates ----

#[derive(Debug, Default, Deserialize)]
pub struct CertificateQuery {
    pub post_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CertificateForm {
    pub student_name: String,
    pub post_id: String,
}

pub async fn certificate_form(
    State(state): State<AppState>,
    view: View,
    Query(query): Query<CertificateQuery>,
) -> ServerResult<Response> {
    let posts = state.blog.list_posts().await?;
    render(&state, &view, |ctx| {
        pages::certificate_form_page(ctx, &posts, query.post_id)
    })
    .await
}

pub async fn generate_certificate(
    State(state): State<AppState>,
    Form(form): Form<CertificateForm>,
) -> ServerResult<Response> {
    const BACK: &str = "/certificate";

    let name = form.student_name.trim();
    if name.is_empty() {
        return Ok(redirect_with(&state, Notice::error("Please enter your name"), BACK));
    }
    let Some(id) = parse_id(form.post_id.trim()) else {
        return Ok(redirect_with(&state, Notice::error("Please choose a post"), BACK));
    };
    match state.blog.get_post(id).await {
        Ok(_) => {}
        Err(BlogError::NotFound { .. }) => {
            return Ok(redirect_with(&state, Notice::error("Post not found"), BACK));
        }
        Err(e) => return Err(e.into()),
    }
    let encoded = utf8_percent_encode(name, NON_ALPHANUMERIC);
    Ok(Redirect::to(&format!("/certificate/{id}/{encoded}")).into_response())
}

/// ASCII-only stem for the download file name.
fn filename_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    stem.trim_matches('_').to_string()
}

pub async fn download_certificate(
    State(state): State<AppState>,
    view: View,
    Path((post_id, student_name)): Path<(String, String)>,
) -> ServerResult<Response> {
    let Some(id) = parse_id(&post_id) else {
        return not_found_page(&state, &view).await;
    };
    let name = student_name.trim();
    if name.is_empty() {
        return Ok(redirect_with(&state, Notice::error("Please enter your name"), "/certificate"));
    }
    let post = match state.blog.get_post(id).await {
        Ok(post) => post,
        Err(BlogError::NotFound { .. }) => return not_found_page(&state, &view).await,
        Err(e) => return Err(e.into()),
    };
    let settings = state.blog.get_settings().await?;
    let html = blogcms_render::render_certificate(&settings, &post, name, Utc::now().date_naive());
    let filename = format!("certificate_{}_{}.html", filename_stem(name), id);
    info!(post = %id, "certificate generated");
    Ok((
        [
            (CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        html,
    )
        .into_response())
}

// ---- Generated assets ----

pub async fn dynamic_styles(State(state): State<AppState>) -> ServerResult<Response> {
    let settings = state.blog.get_settings().await?;
    let css = blogcms_render::render_stylesheet(&settings);
    Ok(([(CONTENT_TYPE, blogcms_render::STYLESHEET_CONTENT_TYPE)], css).into_response())
}

pub async fn manifest() -> ServerResult<Response> {
    let body = serde_json::to_string_pretty(&blogcms_render::web_manifest())
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, blogcms_render::MANIFEST_CONTENT_TYPE)], body).into_response())
}

pub async fn service_worker() -> Response {
    (
        [(CONTENT_TYPE, blogcms_render::SERVICE_WORKER_CONTENT_TYPE)],
        blogcms_render::SERVICE_WORKER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_form_skips_blank_colors() {
        let update = SettingsUpdate::try_from(SettingsForm {
            blog_title: Some(" My Blog ".into()),
            primary_color: Some("#ABCDEF".into()),
            navbar_color: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(update.blog_title.as_deref(), Some("My Blog"));
        assert_eq!(update.primary_color.unwrap().as_str(), "#abcdef");
        assert!(update.navbar_color.is_none());
        assert!(update.blog_description.is_none());
    }

    #[test]
    fn settings_form_rejects_bad_color() {
        let err = SettingsUpdate::try_from(SettingsForm {
            blog_title: Some("Blog".into()),
            text_color: Some("blue".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, TypeError::InvalidColor { .. }));
    }

    #[test]
    fn certificate_filename_is_ascii() {
        assert_eq!(filename_stem("Ada Lovelace"), "Ada_Lovelace");
        assert_eq!(filename_stem("José!"), "Jos");
        assert_eq!(filename_stem("../etc"), "etc");
    }

    #[test]
    fn post_ids_must_be_numeric() {
        assert_eq!(parse_id("12"), Some(PostId::new(12)));
        assert_eq!(parse_id("abc"), None);
    }
}
