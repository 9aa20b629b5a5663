use std::sync::Arc;

use qrgen_core::Config;
use qrgen_services::{CodeRenderer, GenerationWorkflow, RenderOptions};

/// Shared by every handler. Each request gets its own workflow and surface;
/// only the renderer is shared.
pub struct AppState {
    pub config: Config,
    pub renderer: Arc<CodeRenderer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let renderer = Arc::new(CodeRenderer::new(RenderOptions::from(&config)));
        Self { config, renderer }
    }

    pub fn workflow(&self) -> GenerationWorkflow {
        GenerationWorkflow::new(self.renderer.clone())
    }
}
