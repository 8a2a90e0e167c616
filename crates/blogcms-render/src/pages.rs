//! HTML pages.
//!
//! Every page goes through [`layout`], which receives the current
//! [`SiteSettings`] so the blog title, description and theme stylesheet are
//! present everywhere. Post content is trusted author markup and is the
//! only value emitted without escaping.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::{Deserialize, Serialize};

use blogcms_types::{Post, SiteSettings};

/// Severity of a one-shot notice shown at the top of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-shot message carried across a redirect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Per-request values every page needs.
#[derive(Clone, Copy, Debug)]
pub struct PageContext<'a> {
    pub settings: &'a SiteSettings,
    pub notice: Option<&'a Notice>,
    pub is_admin: bool,
}

fn post_date(post: &Post) -> String {
    post.created_at.format("%B %d, %Y").to_string()
}

fn layout(ctx: &PageContext<'_>, title: &str, content: Markup) -> Markup {
    let settings = ctx.settings;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="theme-color" content=(settings.colors.primary_color.as_str());
                title { (title) " | " (settings.blog_title) }
                link rel="manifest" href="/manifest.json";
                link rel="stylesheet" href="/static/css/style.css";
                link rel="stylesheet" href="/dynamic-styles.css";
            }
            body {
                nav.navbar {
                    a.brand href="/" { (settings.blog_title) }
                    div {
                        a href="/" { "Home" }
                        a href="/certificate" { "Certificate" }
                        @if ctx.is_admin {
                            a href="/admin/dashboard" { "Dashboard" }
                            a href="/admin/settings" { "Settings" }
                            a href="/admin/logout" { "Logout" }
                        } @else {
                            a href="/admin/login" { "Admin" }
                        }
                    }
                }
                main.container {
                    @if let Some(notice) = ctx.notice {
                        @let class = match notice.kind {
                            NoticeKind::Success => "notice notice-success",
                            NoticeKind::Error => "notice notice-error",
                        };
                        div class=(class) role="status" { (notice.message) }
                    }
                    (content)
                }
                script {
                    (PreEscaped("if ('serviceWorker' in navigator) { navigator.serviceWorker.register('/service-worker.js'); }"))
                }
            }
        }
    }
}

/// Public post list.
pub fn index_page(ctx: &PageContext<'_>, posts: &[Post]) -> Markup {
    let settings = ctx.settings;
    let content = html! {
        header.hero {
            h1 { (settings.blog_title) }
            p { (settings.blog_description) }
        }
        @if posts.is_empty() {
            div.card { p { "No posts yet. Check back soon!" } }
        }
        @for post in posts {
            article.card {
                @if let Some(image) = &post.featured_image {
                    img.featured src=(image) alt=(post.title);
                }
                h2 { a href={ "/post/" (post.id.get()) } { (post.title) } }
                p.meta { (post_date(post)) }
                a.btn href={ "/post/" (post.id.get()) } { "Read more" }
            }
        }
    };
    layout(ctx, "Home", content)
}

/// A single post.
pub fn post_page(ctx: &PageContext<'_>, post: &Post) -> Markup {
    let content = html! {
        article.card {
            @if let Some(image) = &post.featured_image {
                img.featured src=(image) alt=(post.title);
            }
            h1 { (post.title) }
            p.meta { (post_date(post)) }
            div.content { (PreEscaped(post.content.as_str())) }
        }
        a.btn href={ "/certificate?post_id=" (post.id.get()) } { "Get a certificate" }
    };
    layout(ctx, &post.title, content)
}

/// Admin login form.
pub fn login_page(ctx: &PageContext<'_>) -> Markup {
    let content = html! {
        div.card {
            h1 { "Admin Login" }
            form method="post" action="/admin/login" {
                label for="username" { "Username" }
                input type="text" id="username" name="username" required autocomplete="username";
                label for="password" { "Password" }
                input type="password" id="password" name="password" required autocomplete="current-password";
                p { button.btn type="submit" { "Log in" } }
            }
        }
    };
    layout(ctx, "Login", content)
}

/// Admin post overview with edit/delete actions.
pub fn dashboard_page(ctx: &PageContext<'_>, posts: &[Post]) -> Markup {
    let content = html! {
        div.card {
            h1 { "Dashboard" }
            p {
                a.btn href="/admin/new" { "New post" }
                " "
                a.btn href="/admin/settings" { "Settings" }
                " "
                a.btn href="/admin/export" { "Export posts" }
                " "
                a.btn href="/admin/import" { "Import posts" }
            }
            @if posts.is_empty() {
                p { "No posts yet." }
            } @else {
                table.posts {
                    thead { tr { th { "Title" } th { "Created" } th { "Actions" } } }
                    tbody {
                        @for post in posts {
                            tr {
                                td { a href={ "/post/" (post.id.get()) } { (post.title) } }
                                td { (post_date(post)) }
                                td {
                                    a.btn href={ "/admin/edit/" (post.id.get()) } { "Edit" }
                                    " "
                                    form style="display:inline" method="post" action={ "/admin/delete/" (post.id.get()) } {
                                        button.btn.btn-danger type="submit" { "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    layout(ctx, "Dashboard", content)
}

/// Create form when `post` is `None`, edit form otherwise.
pub fn post_form_page(ctx: &PageContext<'_>, post: Option<&Post>) -> Markup {
    let (heading, action) = match post {
        Some(p) => ("Edit Post", format!("/admin/edit/{}", p.id.get())),
        None => ("New Post", "/admin/new".to_string()),
    };
    let content = html! {
        div.card {
            h1 { (heading) }
            form method="post" action=(action) {
                label for="title" { "Title" }
                input type="text" id="title" name="title" maxlength="200" required
                    value=[post.map(|p| p.title.as_str())];
                label for="featured_image" { "Featured image URL (optional)" }
                input type="text" id="featured_image" name="featured_image" maxlength="500"
                    value=[post.and_then(|p| p.featured_image.as_deref())];
                label for="content" { "Content (HTML allowed)" }
                textarea id="content" name="content" rows="16" required {
                    @if let Some(p) = post { (p.content) }
                }
                p {
                    button.btn type="submit" { "Save" }
                    " "
                    a href="/admin/dashboard" { "Cancel" }
                }
            }
        }
    };
    layout(ctx, heading, content)
}

/// Site settings form.
pub fn settings_page(ctx: &PageContext<'_>) -> Markup {
    let s = ctx.settings;
    let c = &s.colors;
    let colors = [
        ("primary_color", "Primary color", c.primary_color.as_str()),
        ("secondary_color", "Secondary color", c.secondary_color.as_str()),
        ("background_color", "Header background", c.background_color.as_str()),
        ("overall_background", "Page background", c.overall_background.as_str()),
        ("card_background", "Card background", c.card_background.as_str()),
        ("text_color", "Text color", c.text_color.as_str()),
        ("navbar_color", "Navbar color", c.navbar_color.as_str()),
    ];
    let content = html! {
        div.card {
            h1 { "Site Settings" }
            form method="post" action="/admin/settings" {
                label for="blog_title" { "Blog title" }
                input type="text" id="blog_title" name="blog_title" maxlength="100" required
                    value=(s.blog_title);
                label for="blog_description" { "Blog description" }
                textarea id="blog_description" name="blog_description" rows="3" {
                    (s.blog_description)
                }
                @for (name, label, value) in colors {
                    label for=(name) { (label) }
                    input type="color" id=(name) name=(name) value=(value);
                }
                p { button.btn type="submit" { "Save settings" } }
            }
        }
    };
    layout(ctx, "Settings", content)
}

/// JSON upload form for bulk import.
pub fn import_page(ctx: &PageContext<'_>) -> Markup {
    let content = html! {
        div.card {
            h1 { "Import Posts" }
            p {
                "Upload a JSON export. Posts whose title already exists are skipped."
            }
            form method="post" action="/admin/import" enctype="multipart/form-data" {
                label for="file" { "Export file (.json)" }
                input type="file" id="file" name="file" accept=".json,application/json" required;
                p { button.btn type="submit" { "Import" } }
            }
        }
    };
    layout(ctx, "Import", content)
}

/// Certificate request form.
pub fn certificate_form_page(
    ctx: &PageContext<'_>,
    posts: &[Post],
    selected: Option<i64>,
) -> Markup {
    let content = html! {
        div.card {
            h1 { "Get Your Certificate" }
            @if posts.is_empty() {
                p { "There are no posts to certify yet." }
            } @else {
                form method="post" action="/generate_certificate" {
                    label for="student_name" { "Your name" }
                    input type="text" id="student_name" name="student_name" required;
                    label for="post_id" { "Completed post" }
                    select id="post_id" name="post_id" {
                        @for post in posts {
                            option value=(post.id.get()) selected[selected == Some(post.id.get())] {
                                (post.title)
                            }
                        }
                    }
                    p { button.btn type="submit" { "Generate certificate" } }
                }
            }
        }
    };
    layout(ctx, "Certificate", content)
}

/// 404 page.
pub fn not_found_page(ctx: &PageContext<'_>) -> Markup {
    let content = html! {
        div.card {
            h1 { "Page not found" }
            p { "The page you were looking for does not exist." }
            a.btn href="/" { "Back to home" }
        }
    };
    layout(ctx, "Not Found", content)
}
