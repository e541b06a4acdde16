//! The main application page.

use minijinja::{context, Environment};

use crafter_core::{FrameworkEntry, SessionSnapshot, PRODUCT_NAME};

use crate::events::EVENTS_CLIENT_SCRIPT;

/// Renders the single-page UI.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Compile-time constant
        env.add_template("index.html", INDEX_TEMPLATE)
            .expect("Failed to add index template");

        Self { env }
    }

    /// Render the index page for `session`.
    pub fn index(
        &self,
        frameworks: &[FrameworkEntry],
        session: &SessionSnapshot,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("index.html")?;
        tmpl.render(context! {
            product => PRODUCT_NAME,
            frameworks => frameworks,
            session => session,
            events_script => EVENTS_CLIENT_SCRIPT,
        })
    }
}

impl Default for Pages {
    fn default() -> Self {
        Self::new()
    }
}

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ product }}</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #111827; }
    textarea { width: 100%; min-height: 6rem; font: inherit; }
    .row { display: flex; gap: 0.5rem; align-items: center; margin: 0.75rem 0; }
    .tabs button[aria-selected="true"] { font-weight: bold; }
    pre { background: #f5f5f5; padding: 1rem; border-radius: 0.5rem; overflow-x: auto; min-height: 12rem; }
    iframe { width: 100%; height: 480px; border: 1px solid #e5e7eb; border-radius: 0.5rem; }
    #notice { position: fixed; right: 1rem; bottom: 1rem; padding: 0.75rem 1rem; border-radius: 0.5rem; display: none; }
    #notice.info { display: block; background: #ecfdf5; color: #065f46; }
    #notice.error { display: block; background: #fef2f2; color: #991b1b; }
  </style>
</head>
<body>
  <h1>{{ product }}</h1>

  <textarea id="prompt" placeholder="Describe your component...">{{ session.prompt }}</textarea>
  <div class="row">
    <select id="framework">
      {% for f in frameworks %}
      <option value="{{ f.id }}"{% if f.id == session.framework %} selected{% endif %}>{{ f.label }}</option>
      {% endfor %}
    </select>
    <button id="generate" type="button">Generate</button>
  </div>

  <section id="output"{% if not session.view.output_visible %} hidden{% endif %}>
    <div class="row tabs">
      <button type="button" data-tab="code">Code</button>
      <button type="button" data-tab="preview">Preview</button>
      <span style="flex:1"></span>
      <button id="copy" type="button">Copy</button>
      <button id="download" type="button">Download</button>
      <button id="refresh" type="button">Refresh</button>
      <button id="fullscreen" type="button">Fullscreen</button>
    </div>
    <pre id="code"></pre>
    <iframe id="preview" title="Preview" hidden></iframe>
  </section>

  <div id="notice" role="status"></div>

  <script>
(function() {
  'use strict';

  let session = {{ session|tojson }};
  const $ = function(id) { return document.getElementById(id); };

  function post(path, body) {
    return fetch(path, {
      method: 'POST',
      headers: { 'content-type': 'application/json' },
      body: JSON.stringify(body || {})
    }).then(function(res) {
      return res.json().then(function(data) {
        if (!res.ok) { notice('error', data.error); }
        return data;
      });
    });
  }

  function notice(severity, message) {
    const el = $('notice');
    el.className = severity;
    el.textContent = message;
    clearTimeout(el.timer);
    el.timer = setTimeout(function() { el.className = ''; }, 4000);
  }

  function remount(epoch) {
    if (session.view.active_tab === 'preview') {
      $('preview').src = '/preview?epoch=' + epoch + '&t=' + Date.now();
    }
  }

  function apply(next) {
    const previous = session;
    session = next;
    $('output').hidden = !next.view.output_visible;
    $('generate').disabled = next.view.loading;
    $('generate').textContent = next.view.loading ? 'Generating...' : 'Generate';
    $('code').textContent = next.code;
    $('code').dataset.language = next.language;
    const preview = next.view.active_tab === 'preview';
    $('code').hidden = preview;
    $('preview').hidden = !preview;
    document.querySelectorAll('[data-tab]').forEach(function(b) {
      b.setAttribute('aria-selected', String(b.dataset.tab === next.view.active_tab));
    });
    if (preview && (previous.view.active_tab !== 'preview' || previous.code !== next.code)) {
      remount(next.view.preview_epoch);
    }
    if (!preview) {
      $('preview').removeAttribute('src');
    }
  }

  $('generate').onclick = function() {
    post('/api/generate', { prompt: $('prompt').value, framework: $('framework').value });
  };
  $('framework').onchange = function() {
    post('/api/framework', { framework: $('framework').value });
  };
  document.querySelectorAll('[data-tab]').forEach(function(b) {
    b.onclick = function() { post('/api/tab', { tab: b.dataset.tab }); };
  });
  $('refresh').onclick = function() { post('/api/refresh'); };
  $('fullscreen').onclick = function() {
    post('/api/fullscreen', { open: true }).then(function() {
      window.open('/preview/fullscreen', '_blank');
    });
  };
  $('copy').onclick = function() {
    fetch('/api/copy').then(function(res) {
      if (!res.ok) { return res.json().then(function(d) { notice('error', d.error); }); }
      return res.text().then(function(code) {
        return navigator.clipboard.writeText(code).then(function() {
          notice('info', 'Code copied to clipboard');
        });
      });
    });
  };
  $('download').onclick = function() {
    fetch('/api/export').then(function(res) {
      if (!res.ok) { return res.json().then(function(d) { notice('error', d.error); }); }
      const name = (res.headers.get('content-disposition') || '').split('filename="')[1];
      return res.blob().then(function(blob) {
        const a = document.createElement('a');
        a.href = URL.createObjectURL(blob);
        a.download = name ? name.replace('"', '') : 'download';
        a.click();
        URL.revokeObjectURL(a.href);
        notice('info', 'File downloaded');
      });
    });
  };

  window.crafter = { remount: remount, notice: notice, apply: apply };
  apply(session);
})();
  </script>
  <script>{{ events_script|safe }}</script>
</body>
</html>"##;
