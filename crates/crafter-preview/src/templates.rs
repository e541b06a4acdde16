//! Template engine for preview pages.

use minijinja::{context, Environment};

/// Sandbox flags for every preview iframe.
pub const SANDBOX: &str = "allow-scripts";

/// Context for a page that embeds one sandboxed document.
#[derive(Debug, Clone)]
pub struct FrameContext<'a> {
    /// Page title
    pub title: &'a str,
    /// Document placed in the iframe's srcdoc
    pub srcdoc: &'a str,
    /// Refresh token, rendered as a data attribute
    pub epoch: u64,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the preview templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Templates are compile-time constants
        env.add_template("base.html", BASE_TEMPLATE)
            .expect("Failed to add base template");
        env.add_template("frame.html", FRAME_TEMPLATE)
            .expect("Failed to add frame template");
        env.add_template("overlay.html", OVERLAY_TEMPLATE)
            .expect("Failed to add overlay template");
        env.add_template("message.html", MESSAGE_TEMPLATE)
            .expect("Failed to add message template");

        Self { env }
    }

    /// Render a page embedding a sandboxed document.
    pub fn render_frame(&self, frame: &FrameContext<'_>) -> Result<String, minijinja::Error> {
        self.render_with("frame.html", frame)
    }

    /// Render the fullscreen overlay page.
    pub fn render_overlay(&self, frame: &FrameContext<'_>) -> Result<String, minijinja::Error> {
        self.render_with("overlay.html", frame)
    }

    /// Render a page showing a plain message instead of a preview.
    pub fn render_message(&self, title: &str, message: &str) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("message.html")?;
        tmpl.render(context! {
            title => title,
            message => message,
        })
    }

    fn render_with(&self, template: &str, frame: &FrameContext<'_>) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context! {
            title => frame.title,
            srcdoc => frame.srcdoc,
            epoch => frame.epoch,
            sandbox => SANDBOX,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  <style>
    html, body { margin: 0; height: 100%; background: #fff; font-family: system-ui, sans-serif; }
    iframe { display: block; width: 100%; border: 0; }
    .fill { height: 100%; }
    .bar { height: 60px; display: flex; align-items: center; justify-content: space-between; padding: 0 20px; background: #f3f4f6; color: #000; }
    .bar-frame { height: calc(100vh - 60px); }
    .message { height: 100%; display: flex; align-items: center; justify-content: center; color: #6b7280; }
  </style>
</head>
<body>
  {% block body %}{% endblock %}
</body>
</html>"##;

const FRAME_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block body %}
<iframe class="fill" data-epoch="{{ epoch }}" sandbox="{{ sandbox }}" title="{{ title }}" srcdoc="{{ srcdoc }}"></iframe>
{% endblock %}"##;

const OVERLAY_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block body %}
<div class="bar">
  <strong>Preview</strong>
  <button type="button" onclick="fetch('/api/fullscreen', { method: 'POST', headers: { 'content-type': 'application/json' }, body: JSON.stringify({ open: false }) }).then(() => window.close())">Close</button>
</div>
<iframe class="bar-frame" sandbox="{{ sandbox }}" title="{{ title }}" srcdoc="{{ srcdoc }}"></iframe>
{% endblock %}"##;

const MESSAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block body %}
<div class="message"><p>{{ message }}</p></div>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_srcdoc() {
        let engine = TemplateEngine::new();

        let html = engine
            .render_frame(&FrameContext {
                title: "Preview",
                srcdoc: r#"<div class="x">a & b</div>"#,
                epoch: 4,
            })
            .unwrap();

        assert!(html.contains(r#"sandbox="allow-scripts""#));
        assert!(html.contains(r#"data-epoch="4""#));
        assert!(html.contains("&lt;div class=&quot;x&quot;&gt;a &amp; b"));
        assert!(!html.contains(r#"<div class="x">"#));
    }

    #[test]
    fn overlay_has_close_bar() {
        let engine = TemplateEngine::new();

        let html = engine
            .render_overlay(&FrameContext {
                title: "Preview",
                srcdoc: "<p>hi</p>",
                epoch: 0,
            })
            .unwrap();

        assert!(html.contains("<strong>Preview</strong>"));
        assert!(html.contains("Close"));
        assert!(html.contains(r#"sandbox="allow-scripts""#));
    }

    #[test]
    fn renders_message() {
        let engine = TemplateEngine::new();
        let html = engine.render_message("Preview", "Nothing yet").unwrap();
        assert!(html.contains("<p>Nothing yet</p>"));
    }
}
