//! Completion certificates.

use chrono::NaiveDate;
use maud::{html, PreEscaped, DOCTYPE};

use blogcms_types::{Post, SiteSettings};

/// Format a date as "Month Day, Year", e.g. "March 07, 2025".
pub fn certificate_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Render a standalone, themed certificate confirming that `student_name`
/// completed `post`.
///
/// The name comes straight from the request path, so it is escaped like
/// every other interpolated value.
pub fn render_certificate(
    settings: &SiteSettings,
    post: &Post,
    student_name: &str,
    date: NaiveDate,
) -> String {
    let colors = &settings.colors;
    let style = format!(
        "body {{ margin: 0; padding: 40px; font-family: Georgia, 'Times New Roman', serif; \
         background: linear-gradient(135deg, {bg} 0%, {secondary} 100%); }}\n\
         .certificate {{ max-width: 900px; margin: 0 auto; padding: 60px; text-align: center; \
         background: {card}; color: {text}; border: 12px solid {primary}; \
         border-radius: 16px; box-shadow: 0 20px 60px rgba({shadow}, 0.35); }}\n\
         .certificate h1 {{ font-size: 3rem; margin: 0 0 0.5rem; color: {primary}; letter-spacing: 2px; }}\n\
         .certificate .subtitle {{ font-size: 1.2rem; color: {secondary}; text-transform: uppercase; }}\n\
         .certificate .name {{ font-size: 2.5rem; margin: 2rem 0; padding-bottom: 0.5rem; \
         border-bottom: 2px solid rgba({primary_rgb}, 0.4); display: inline-block; }}\n\
         .certificate .course {{ font-size: 1.6rem; font-style: italic; color: {secondary}; }}\n\
         .certificate .footer {{ margin-top: 3rem; display: flex; justify-content: space-between; \
         color: rgba({text_rgb}, 0.7); }}",
        bg = colors.background_color,
        secondary = colors.secondary_color,
        card = colors.card_background,
        text = colors.text_color,
        primary = colors.primary_color,
        primary_rgb = colors.primary_color.rgb(),
        text_rgb = colors.text_color.rgb(),
        shadow = colors.navbar_color.rgb(),
    );

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Certificate of Completion - " (student_name) }
                style { (PreEscaped(style)) }
            }
            body {
                div.certificate {
                    h1 { "Certificate of Completion" }
                    p.subtitle { "This certifies that" }
                    div.name { (student_name) }
                    p { "has successfully completed" }
                    p.course { (post.title) }
                    div.footer {
                        span { "Date: " (certificate_date(date)) }
                        span { (settings.blog_title) }
                    }
                }
            }
        }
    };
    markup.into_string()
}
