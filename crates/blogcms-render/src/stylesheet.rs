//! Theme stylesheet served at `/dynamic-styles.css`.
//!
//! Every color in [`ThemeColors`] is emitted as a custom property, and the
//! ones used with translucency also as an `r, g, b` triple so rules can
//! write `rgba(var(--primary-rgb), 0.1)`.

use blogcms_types::{SiteSettings, ThemeColors};

/// Render the stylesheet for the given settings.
pub fn render_stylesheet(settings: &SiteSettings) -> String {
    format!("{}\n\n{}", color_properties(&settings.colors), THEME_RULES)
}

fn color_properties(colors: &ThemeColors) -> String {
    format!(
        r#":root {{
    --primary-color: {primary};
    --primary-rgb: {primary_rgb};
    --secondary-color: {secondary};
    --secondary-rgb: {secondary_rgb};
    --background-color: {background};
    --background-rgb: {background_rgb};
    --overall-background: {overall};
    --card-background: {card};
    --card-rgb: {card_rgb};
    --text-color: {text};
    --text-rgb: {text_rgb};
    --navbar-color: {navbar};
    --navbar-rgb: {navbar_rgb};
}}"#,
        primary = colors.primary_color,
        primary_rgb = colors.primary_color.rgb(),
        secondary = colors.secondary_color,
        secondary_rgb = colors.secondary_color.rgb(),
        background = colors.background_color,
        background_rgb = colors.background_color.rgb(),
        overall = colors.overall_background,
        card = colors.card_background,
        card_rgb = colors.card_background.rgb(),
        text = colors.text_color,
        text_rgb = colors.text_color.rgb(),
        navbar = colors.navbar_color,
        navbar_rgb = colors.navbar_color.rgb(),
    )
}

const THEME_RULES: &str = r#"body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    color: var(--text-color);
    background-color: var(--overall-background);
    line-height: 1.6;
}

a { color: var(--primary-color); }

.navbar {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.75rem 1.5rem;
    background-color: rgba(var(--navbar-rgb), 0.92);
    box-shadow: 0 2px 10px rgba(var(--navbar-rgb), 0.3);
}

.navbar a { color: #ffffff; text-decoration: none; margin-left: 1rem; }
.navbar .brand { font-weight: 700; font-size: 1.25rem; margin-left: 0; }

.hero {
    padding: 3rem 1.5rem;
    text-align: center;
    color: #ffffff;
    background: linear-gradient(135deg, var(--background-color) 0%, var(--secondary-color) 100%);
}

.container { max-width: 960px; margin: 0 auto; padding: 1.5rem; }

.card {
    background-color: var(--card-background);
    border: 1px solid rgba(var(--primary-rgb), 0.15);
    border-radius: 12px;
    padding: 1.5rem;
    margin-bottom: 1.5rem;
    box-shadow: 0 4px 16px rgba(var(--text-rgb), 0.08);
}

.card:hover { box-shadow: 0 8px 24px rgba(var(--primary-rgb), 0.2); }

.card img.featured { max-width: 100%; border-radius: 8px; }

.meta { color: rgba(var(--text-rgb), 0.6); font-size: 0.9rem; }

.btn {
    display: inline-block;
    padding: 0.5rem 1.25rem;
    border: none;
    border-radius: 6px;
    color: #ffffff;
    cursor: pointer;
    text-decoration: none;
    background: linear-gradient(135deg, var(--primary-color), var(--secondary-color));
}

.btn:hover { box-shadow: 0 4px 12px rgba(var(--secondary-rgb), 0.4); }
.btn-danger { background: #dc3545; }

.notice { padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.notice-success { background-color: rgba(40, 167, 69, 0.15); color: #1e7e34; }
.notice-error { background-color: rgba(220, 53, 69, 0.15); color: #a71d2a; }

form label { display: block; margin-top: 1rem; font-weight: 600; }
form input[type=text], form input[type=password], form input[type=url], form textarea, form select {
    width: 100%;
    padding: 0.5rem;
    border: 1px solid rgba(var(--text-rgb), 0.25);
    border-radius: 6px;
    background-color: rgba(var(--card-rgb), 0.95);
    color: var(--text-color);
    box-sizing: border-box;
}

table.posts { width: 100%; border-collapse: collapse; }
table.posts td, table.posts th { padding: 0.5rem; border-bottom: 1px solid rgba(var(--primary-rgb), 0.15); }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use blogcms_types::{HexColor, SettingsUpdate};
    use chrono::Utc;

    #[test]
    fn default_theme_colors_and_triples() {
        let css = render_stylesheet(&SiteSettings::defaults(Utc::now()));
        assert!(css.contains("--primary-color: #667eea;"));
        assert!(css.contains("--primary-rgb: 102, 126, 234;"));
        assert!(css.contains("--navbar-rgb: 0, 0, 0;"));
        assert!(css.contains("--overall-background: #f5f7fa;"));
        assert!(css.contains("rgba(var(--primary-rgb), 0.15)"));
    }

    #[test]
    fn reflects_updated_settings() {
        let now = Utc::now();
        let mut settings = SiteSettings::defaults(now);
        settings.apply(
            &SettingsUpdate {
                primary_color: Some(HexColor::parse("#ff8000").unwrap()),
                ..Default::default()
            },
            now,
        );
        let css = render_stylesheet(&settings);
        assert!(css.contains("--primary-color: #ff8000;"));
        assert!(css.contains("--primary-rgb: 255, 128, 0;"));
        assert!(!css.contains("#667eea;\n    --primary-rgb"));
    }
}
