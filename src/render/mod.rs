//! Template rendering.
//!
//! Pages and email bodies are Tera templates loaded once at startup from the
//! configured directory. `.html` templates are autoescaped.

use serde::Serialize;
use tera::{Context, Tera};

/// URL prefix assets are served under.
pub const STATIC_URL: &str = "/static/";

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load every `**/*.html` template below `templates_dir`.
    pub fn from_dir(templates_dir: &str) -> Result<Self, tera::Error> {
        let pattern = format!("{}/**/*.html", templates_dir.trim_end_matches('/'));
        let tera = Tera::new(&pattern)?;
        tracing::debug!(
            dir = %templates_dir,
            templates = tera.get_template_names().count(),
            "Templates loaded"
        );
        Ok(Self { tera })
    }

    /// Build from in-memory templates.
    pub fn from_templates<'a, I>(templates: I) -> Result<Self, tera::Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;
        Ok(Self { tera })
    }

    /// Render `template` with `context`.
    pub fn render(&self, template: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(template, context)
    }

    /// Render a page: `title`, `nonce` and `static_url` are always present.
    pub fn render_page(&self, template: &str, title: &str, nonce: &str) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("nonce", nonce);
        context.insert("static_url", STATIC_URL);
        self.render(template, &context)
    }

    /// Render with any serializable value as the context.
    pub fn render_with<T: Serialize>(&self, template: &str, value: &T) -> Result<String, tera::Error> {
        let context = Context::from_serialize(value)?;
        self.render(template, &context)
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }
}
