//! Preview strategy selection and surface lifecycle.

use serde::Serialize;

use crafter_core::Framework;

use crate::live::{LiveMount, LiveRenderer, LiveSurface, RenderError};
use crate::templates::{FrameContext, TemplateEngine, SANDBOX};

/// How a framework's code is previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Code is the document of a sandboxed iframe
    Static,
    /// Code is compiled and mounted by a live renderer
    Dynamic,
}

impl RenderStrategy {
    /// Strategy for `framework`.
    pub fn for_framework(framework: Framework) -> Self {
        if framework.is_markup() {
            Self::Static
        } else {
            Self::Dynamic
        }
    }
}

/// A markup document shown in a sandboxed iframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxedDocument {
    /// Document placed in `srcdoc`
    pub srcdoc: String,

    /// iframe sandbox flags
    pub sandbox: &'static str,

    /// Epoch the document was created at
    pub epoch: u64,
}

impl SandboxedDocument {
    pub fn new(code: &str, epoch: u64) -> Self {
        Self {
            srcdoc: code.to_string(),
            sandbox: SANDBOX,
            epoch,
        }
    }
}

/// What the preview currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewArtifact {
    /// No code yet
    Pending,
    /// Static markup preview
    Sandboxed(SandboxedDocument),
    /// Live component preview
    Live(LiveSurface),
    /// The renderer failed; shown as a blank surface
    Inert { reason: String },
}

impl PreviewArtifact {
    pub fn is_inert(&self) -> bool {
        matches!(self, Self::Inert { .. })
    }
}

static PENDING: PreviewArtifact = PreviewArtifact::Pending;

/// Identity of a surface. Any change forces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SurfaceKey {
    strategy: RenderStrategy,
    framework: Framework,
    epoch: u64,
    code: String,
}

#[derive(Debug)]
struct ActiveSurface {
    key: SurfaceKey,
    artifact: PreviewArtifact,
}

/// Routes code to a preview strategy and owns the resulting surface.
///
/// Only one surface exists at a time. It is disposed before the next one is
/// created.
pub struct PreviewRouter<R: LiveRenderer> {
    renderer: R,
    templates: TemplateEngine,
    active: Option<ActiveSurface>,
}

impl<R: LiveRenderer> PreviewRouter<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            templates: TemplateEngine::new(),
            active: None,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The artifact currently shown, if any.
    pub fn current(&self) -> Option<&PreviewArtifact> {
        self.active.as_ref().map(|a| &a.artifact)
    }

    /// Render `code` for `framework` at `epoch`.
    ///
    /// Reuses the current surface when nothing changed. Renderer failures are
    /// contained and produce [`PreviewArtifact::Inert`].
    pub fn render(&mut self, code: &str, framework: Framework, epoch: u64) -> &PreviewArtifact {
        let strategy = RenderStrategy::for_framework(framework);
        let key = SurfaceKey {
            strategy,
            framework,
            epoch,
            code: code.to_string(),
        };

        let reuse = self.active.as_ref().is_some_and(|a| a.key == key);
        if !reuse {
            self.dispose();
            let artifact = self.create(&key);
            self.active = Some(ActiveSurface { key, artifact });
        }

        match &self.active {
            Some(active) => &active.artifact,
            None => &PENDING,
        }
    }

    /// Tear down the current surface.
    pub fn dispose(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        if let PreviewArtifact::Live(surface) = &active.artifact {
            self.renderer.unmount(surface);
        }

        tracing::debug!(
            strategy = ?active.key.strategy,
            framework = %active.key.framework,
            epoch = active.key.epoch,
            "Disposed preview surface"
        );
    }

    /// Static view of `code` for the fullscreen overlay.
    ///
    /// Independent of the current surface and of the framework.
    pub fn fullscreen(&self, code: &str, epoch: u64) -> SandboxedDocument {
        SandboxedDocument::new(code, epoch)
    }

    /// HTML page for the current surface.
    pub fn page(&self) -> Result<String, RenderError> {
        let html = match self.current() {
            None | Some(PreviewArtifact::Pending) => self
                .templates
                .render_message("Preview", "Your component will appear here.")?,
            Some(PreviewArtifact::Sandboxed(doc)) => self.templates.render_frame(&FrameContext {
                title: "Preview",
                srcdoc: &doc.srcdoc,
                epoch: doc.epoch,
            })?,
            Some(PreviewArtifact::Live(surface)) => self.templates.render_frame(&FrameContext {
                title: "Live preview",
                srcdoc: &surface.document,
                epoch: surface.epoch,
            })?,
            // Blank surface; the reason stays in the logs
            Some(PreviewArtifact::Inert { .. }) => self.templates.render_message("Preview", "")?,
        };
        Ok(html)
    }

    /// HTML page for the fullscreen overlay.
    pub fn fullscreen_page(&self, code: &str, epoch: u64) -> Result<String, RenderError> {
        let doc = self.fullscreen(code, epoch);
        Ok(self.templates.render_overlay(&FrameContext {
            title: "Preview",
            srcdoc: &doc.srcdoc,
            epoch: doc.epoch,
        })?)
    }

    fn create(&self, key: &SurfaceKey) -> PreviewArtifact {
        if key.code.trim().is_empty() {
            return PreviewArtifact::Pending;
        }

        tracing::debug!(
            strategy = ?key.strategy,
            framework = %key.framework,
            epoch = key.epoch,
            "Creating preview surface"
        );

        match key.strategy {
            RenderStrategy::Static => {
                PreviewArtifact::Sandboxed(SandboxedDocument::new(&key.code, key.epoch))
            }
            RenderStrategy::Dynamic => {
                let mount = LiveMount {
                    code: &key.code,
                    framework: key.framework,
                    epoch: key.epoch,
                };
                match self.renderer.mount(&mount) {
                    Ok(surface) => PreviewArtifact::Live(surface),
                    Err(e) => {
                        tracing::warn!(
                            renderer = self.renderer.name(),
                            "Live preview failed: {}",
                            e
                        );
                        PreviewArtifact::Inert {
                            reason: e.to_string(),
                        }
                    }
                }
            }
        }
    }
}

impl<R: LiveRenderer> Drop for PreviewRouter<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::live::BrowserLiveRenderer;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Mount { epoch: u64, code: String },
        Unmount { id: u64 },
    }

    /// Renderer that records calls and can be told to fail.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<Call>>,
        fail: bool,
    }

    impl RecordingRenderer {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LiveRenderer for RecordingRenderer {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn mount(&self, mount: &LiveMount<'_>) -> Result<LiveSurface, RenderError> {
            if self.fail {
                return Err(RenderError::Mount("component threw".to_string()));
            }
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Mount {
                epoch: mount.epoch,
                code: mount.code.to_string(),
            });
            Ok(LiveSurface {
                id: calls.len() as u64,
                framework: mount.framework,
                epoch: mount.epoch,
                document: mount.code.to_string(),
            })
        }

        fn unmount(&self, surface: &LiveSurface) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Unmount { id: surface.id });
        }
    }

    #[test]
    fn picks_strategy_per_framework() {
        assert_eq!(RenderStrategy::for_framework(Framework::HtmlCss), RenderStrategy::Static);
        assert_eq!(
            RenderStrategy::for_framework(Framework::HtmlTailwind),
            RenderStrategy::Static
        );
        assert_eq!(RenderStrategy::for_framework(Framework::ReactJs), RenderStrategy::Dynamic);
        assert_eq!(RenderStrategy::for_framework(Framework::Angular), RenderStrategy::Dynamic);
    }

    #[test]
    fn markup_renders_in_sandbox() {
        let mut router = PreviewRouter::new(RecordingRenderer::default());

        let artifact = router.render("<h1>Hi</h1>", Framework::HtmlBootstrap, 0).clone();

        assert_eq!(
            artifact,
            PreviewArtifact::Sandboxed(SandboxedDocument {
                srcdoc: "<h1>Hi</h1>".to_string(),
                sandbox: "allow-scripts",
                epoch: 0,
            })
        );
        assert!(router.renderer().calls().is_empty());
    }

    #[test]
    fn same_inputs_reuse_surface() {
        let mut router = PreviewRouter::new(RecordingRenderer::default());

        router.render("const A = 1;", Framework::ReactJs, 0);
        router.render("const A = 1;", Framework::ReactJs, 0);

        assert_eq!(router.renderer().calls().len(), 1);
    }

    #[test]
    fn epoch_bump_remounts() {
        let mut router = PreviewRouter::new(RecordingRenderer::default());

        router.render("const A = 1;", Framework::ReactJs, 0);
        router.render("const A = 1;", Framework::ReactJs, 1);

        assert_eq!(
            router.renderer().calls(),
            vec![
                Call::Mount {
                    epoch: 0,
                    code: "const A = 1;".to_string()
                },
                Call::Unmount { id: 1 },
                Call::Mount {
                    epoch: 1,
                    code: "const A = 1;".to_string()
                },
            ]
        );
    }

    #[test]
    fn switching_to_static_disposes_live_surface() {
        let mut router = PreviewRouter::new(RecordingRenderer::default());

        router.render("const A = 1;", Framework::ReactTailwind, 0);
        let artifact = router.render("<p>x</p>", Framework::HtmlCss, 0).clone();

        assert!(matches!(artifact, PreviewArtifact::Sandboxed(_)));
        assert_eq!(router.renderer().calls().last(), Some(&Call::Unmount { id: 1 }));
    }

    #[test]
    fn mount_failure_is_contained() {
        let mut router = PreviewRouter::new(RecordingRenderer::failing());

        let artifact = router.render("throw new Error()", Framework::NextJs, 0);

        assert!(artifact.is_inert());
        assert!(router.page().is_ok());
    }

    #[test]
    fn empty_code_is_pending() {
        let mut router = PreviewRouter::new(RecordingRenderer::default());

        router.render("const A = 1;", Framework::ReactJs, 0);
        let artifact = router.render("", Framework::ReactJs, 0).clone();

        assert_eq!(artifact, PreviewArtifact::Pending);
        assert_eq!(router.renderer().calls().last(), Some(&Call::Unmount { id: 1 }));
    }

    #[test]
    fn dispose_unmounts_once() {
        let mut router = PreviewRouter::new(RecordingRenderer::default());

        router.render("const A = 1;", Framework::ReactJs, 0);
        router.dispose();
        router.dispose();

        assert_eq!(router.renderer().calls().len(), 2);
        assert!(router.current().is_none());
    }

    #[test]
    fn fullscreen_is_static_and_leaves_surface_alone() {
        let mut router = PreviewRouter::new(RecordingRenderer::default());
        router.render("const A = 1;", Framework::ReactJs, 2);

        let doc = router.fullscreen("const A = 1;", 2);

        assert_eq!(doc.sandbox, "allow-scripts");
        assert_eq!(doc.srcdoc, "const A = 1;");
        assert!(matches!(router.current(), Some(PreviewArtifact::Live(_))));
        assert_eq!(router.renderer().calls().len(), 1);
    }

    #[test]
    fn angular_in_browser_renderer_is_inert() {
        let mut router = PreviewRouter::new(BrowserLiveRenderer::new());

        let artifact = router.render("@Component({})", Framework::Angular, 0);

        assert!(artifact.is_inert());
    }

    #[test]
    fn page_embeds_live_document_in_sandbox() {
        let mut router = PreviewRouter::new(BrowserLiveRenderer::new());
        router.render("export default function A() { return null; }", Framework::ReactJs, 5);

        let html = router.page().unwrap();

        assert!(html.contains(r#"sandbox="allow-scripts""#));
        assert!(html.contains(r#"data-epoch="5""#));
    }

    #[test]
    fn page_without_code_shows_placeholder() {
        let router = PreviewRouter::new(BrowserLiveRenderer::new());
        assert!(router.page().unwrap().contains("Your component will appear here."));
    }
}
