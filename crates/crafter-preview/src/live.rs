//! Live component previews.
//!
//! Component frameworks need their source compiled before it can render.
//! That work belongs to a [`LiveRenderer`]. The router only hands it
//! `(code, framework, epoch)` and disposes the returned surface when done.

use std::sync::atomic::{AtomicU64, Ordering};

use crafter_core::Framework;

/// Input for mounting a live preview.
#[derive(Debug, Clone, Copy)]
pub struct LiveMount<'a> {
    pub code: &'a str,
    pub framework: Framework,
    pub epoch: u64,
}

/// A mounted live preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSurface {
    /// Unique mount id
    pub id: u64,

    /// Framework the surface was mounted for
    pub framework: Framework,

    /// Epoch the surface was mounted at
    pub epoch: u64,

    /// Self-contained document that performs the mount
    pub document: String,
}

/// Errors raised while mounting or rendering a preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Live preview is not available for {0}")]
    Unsupported(Framework),

    #[error("Mount failed: {0}")]
    Mount(String),

    #[error("Template error: {0}")]
    Template(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(e: minijinja::Error) -> Self {
        Self::Template(e.to_string())
    }
}

/// Trait for live-render backends.
pub trait LiveRenderer: Send + Sync {
    /// Renderer identifier for logs
    fn name(&self) -> &'static str;

    /// Mount `mount.code` as a fresh surface.
    fn mount(&self, mount: &LiveMount<'_>) -> Result<LiveSurface, RenderError>;

    /// Tear down a surface previously returned by [`LiveRenderer::mount`].
    fn unmount(&self, surface: &LiveSurface);
}

/// Renderer that compiles components in the browser.
///
/// Each surface is a standalone document loading React and Babel from a CDN.
/// Render and evaluation errors are caught inside the document and shown in
/// place of the component.
#[derive(Debug, Default)]
pub struct BrowserLiveRenderer {
    next_id: AtomicU64,
}

impl BrowserLiveRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mount document for `code`.
    pub fn document(code: &str, framework: Framework) -> Result<String, RenderError> {
        let styles = match framework {
            Framework::ReactJs => "",
            Framework::ReactTailwind | Framework::NextJs => TAILWIND_CDN,
            Framework::ReactBootstrap => BOOTSTRAP_CDN,
            other => return Err(RenderError::Unsupported(other)),
        };

        Ok(LIVE_DOCUMENT
            .replace("__STYLES__", styles)
            .replace("__SOURCE__", &script_string(code)))
    }
}

impl LiveRenderer for BrowserLiveRenderer {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn mount(&self, mount: &LiveMount<'_>) -> Result<LiveSurface, RenderError> {
        let document = Self::document(mount.code, mount.framework)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        Ok(LiveSurface {
            id,
            framework: mount.framework,
            epoch: mount.epoch,
            document,
        })
    }

    fn unmount(&self, surface: &LiveSurface) {
        // The document lives in the iframe and goes away with it.
        tracing::debug!(id = surface.id, epoch = surface.epoch, "Released live surface");
    }
}

/// Encode `code` as a JavaScript string literal safe inside a `<script>` tag.
fn script_string(code: &str) -> String {
    let mut out = String::with_capacity(code.len() + 2);
    out.push('"');
    for c in code.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003c"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

const TAILWIND_CDN: &str = r#"<script src="https://cdn.tailwindcss.com"></script>"#;

const BOOTSTRAP_CDN: &str = r#"<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">"#;

const LIVE_DOCUMENT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  __STYLES__
  <script crossorigin src="https://unpkg.com/react@18/umd/react.development.js"></script>
  <script crossorigin src="https://unpkg.com/react-dom@18/umd/react-dom.development.js"></script>
  <script src="https://unpkg.com/@babel/standalone/babel.min.js"></script>
</head>
<body>
  <div id="root"></div>
  <pre id="preview-error" style="display:none;color:#b91c1c;padding:1rem;white-space:pre-wrap"></pre>
  <script>
(function() {
  'use strict';

  const source = __SOURCE__;

  function showError(err) {
    const el = document.getElementById('preview-error');
    el.textContent = String((err && err.message) || err);
    el.style.display = 'block';
  }

  window.addEventListener('error', function(e) {
    showError(e.error || e.message);
    e.preventDefault();
  });

  class Boundary extends React.Component {
    constructor(props) {
      super(props);
      this.state = { error: null };
    }
    static getDerivedStateFromError(error) {
      return { error: error };
    }
    componentDidCatch(error) {
      showError(error);
    }
    render() {
      return this.state.error ? null : this.props.children;
    }
  }

  const Link = function(props) { return React.createElement('a', props); };
  const Image = function(props) { return React.createElement('img', props); };
  const Head = function() { return null; };

  try {
    let name = null;
    let body = source
      .replace(/^\s*['"]use client['"];?\s*$/gm, '')
      .replace(/^\s*import[\s\S]*?from\s*['"][^'"]+['"];?\s*$/gm, '')
      .replace(/^\s*import\s*['"][^'"]+['"];?\s*$/gm, '')
      .replace(/export\s+default\s+function\s+([A-Za-z_$][\w$]*)/, function(_, n) { name = n; return 'function ' + n; })
      .replace(/export\s+default\s+([A-Za-z_$][\w$]*)\s*;?/, function(_, n) { name = n; return ''; })
      .replace(/export\s+(const|function|class)\s/g, '$1 ');

    if (!name) {
      const found = body.match(/(?:function|const|let|class)\s+([A-Z][\w$]*)/);
      name = found ? found[1] : null;
    }
    if (!name) {
      throw new Error('No component found to render');
    }

    const compiled = Babel.transform(body, { presets: ['react'] }).code;
    const factory = new Function(
      'React', 'Link', 'Image', 'Head',
      'const { useState, useEffect, useRef, useMemo, useCallback, useReducer, Fragment } = React;\n' +
        compiled + '\nreturn ' + name + ';'
    );
    const Component = factory(React, Link, Image, Head);

    ReactDOM.createRoot(document.getElementById('root')).render(
      React.createElement(Boundary, null, React.createElement(Component))
    );
  } catch (err) {
    showError(err);
  }
})();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mounts_react_component() {
        let renderer = BrowserLiveRenderer::new();
        let surface = renderer
            .mount(&LiveMount {
                code: "export default function Card() { return <div>Card</div>; }",
                framework: Framework::ReactJs,
                epoch: 3,
            })
            .unwrap();

        assert_eq!(surface.epoch, 3);
        assert_eq!(surface.framework, Framework::ReactJs);
        assert!(surface.document.contains("Babel.transform"));
        assert!(surface.document.contains("export default function Card()"));
        assert!(!surface.document.contains("__SOURCE__"));
        assert!(!surface.document.contains("cdn.tailwindcss.com"));
    }

    #[test]
    fn assigns_fresh_ids() {
        let renderer = BrowserLiveRenderer::new();
        let mount = LiveMount {
            code: "const A = () => null;",
            framework: Framework::ReactJs,
            epoch: 0,
        };

        let a = renderer.mount(&mount).unwrap();
        let b = renderer.mount(&mount).unwrap();

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn includes_framework_styles() {
        let tailwind = BrowserLiveRenderer::document("const A = 1;", Framework::ReactTailwind).unwrap();
        assert!(tailwind.contains("cdn.tailwindcss.com"));

        let bootstrap = BrowserLiveRenderer::document("const A = 1;", Framework::ReactBootstrap).unwrap();
        assert!(bootstrap.contains("bootstrap.min.css"));
    }

    #[test]
    fn angular_is_unsupported() {
        assert_eq!(
            BrowserLiveRenderer::document("@Component({})", Framework::Angular),
            Err(RenderError::Unsupported(Framework::Angular))
        );
    }

    #[test]
    fn source_cannot_close_script_tag() {
        let doc = BrowserLiveRenderer::document(
            "const A = () => <div>{'</script><script>alert(1)</script>'}</div>;",
            Framework::ReactJs,
        )
        .unwrap();

        assert_eq!(doc.matches("</script>").count(), LIVE_DOCUMENT.matches("</script>").count());
    }

    #[test]
    fn script_string_escapes() {
        assert_eq!(script_string("a\"b\\c\n<"), r#""a\"b\\c\n\u003c""#);
    }
}
