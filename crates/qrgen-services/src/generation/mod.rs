//! Generation workflow
//!
//! `Idle -> Validating -> Rendering -> Succeeded | Failed`. Every call to
//! [`GenerationWorkflow::generate`] is numbered; only the most recent attempt
//! may publish to the displayed state, so a slow older attempt never
//! overwrites a newer one.

pub mod download;
pub mod share;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use qrgen_core::{CodeError, CodeResult, GeneratedCode, Symbology};
use qrgen_render::{render, RasterSurface, RenderSurface, SymbolRenderer};
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Validating,
    Rendering,
    Succeeded(GeneratedCode),
    Failed { error: CodeError, message: String },
}

impl GenerationState {
    fn failed(error: CodeError) -> Self {
        let message = error.to_string();
        GenerationState::Failed { error, message }
    }

    pub fn code(&self) -> Option<&GeneratedCode> {
        match self {
            GenerationState::Succeeded(code) => Some(code),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CodeError> {
        match self {
            GenerationState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationState::Succeeded(_) | GenerationState::Failed { .. }
        )
    }
}

pub struct GenerationWorkflow {
    renderer: Arc<dyn SymbolRenderer>,
    surface: Mutex<Box<dyn RenderSurface>>,
    attempts: AtomicU64,
    state: watch::Sender<GenerationState>,
}

impl GenerationWorkflow {
    pub fn new(renderer: Arc<dyn SymbolRenderer>) -> Self {
        Self::with_surface(renderer, Box::new(RasterSurface::default()))
    }

    pub fn with_surface(renderer: Arc<dyn SymbolRenderer>, surface: Box<dyn RenderSurface>) -> Self {
        let (state, _) = watch::channel(GenerationState::Idle);
        Self {
            renderer,
            surface: Mutex::new(surface),
            attempts: AtomicU64::new(0),
            state,
        }
    }

    /// The displayed state
    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    /// Run one attempt and return its own terminal state. Failures are
    /// reported as [`GenerationState::Failed`], never as an error.
    pub async fn generate(&self, text: &str, symbology: Symbology) -> GenerationState {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let start = Instant::now();
        self.publish(attempt, GenerationState::Validating);

        if text.trim().is_empty() {
            let state = GenerationState::failed(CodeError::EmptyInput);
            self.publish(attempt, state.clone());
            return state;
        }

        self.publish(attempt, GenerationState::Rendering);
        let state = match self.render_code(text, symbology).await {
            Ok(code) => GenerationState::Succeeded(code),
            Err(error) => GenerationState::failed(error),
        };

        match &state {
            GenerationState::Failed { error, message } => tracing::info!(
                attempt,
                %symbology,
                error_code = error.error_type(),
                %message,
                "Generation failed"
            ),
            _ => tracing::info!(
                attempt,
                %symbology,
                duration_ms = start.elapsed().as_millis() as u64,
                "Code generated"
            ),
        }

        self.publish(attempt, state.clone());
        state
    }

    async fn render_code(&self, text: &str, symbology: Symbology) -> CodeResult<GeneratedCode> {
        let mut surface = self.surface.lock().await;
        let outcome = render(self.renderer.as_ref(), surface.as_mut(), text, symbology).await?;
        let png = surface.to_encoded_image()?;
        Ok(GeneratedCode::from_png(
            text,
            symbology,
            png,
            outcome.width,
            outcome.height,
        ))
    }

    fn publish(&self, attempt: u64, state: GenerationState) {
        let latest = self.attempts.load(Ordering::SeqCst);
        if attempt == latest {
            self.state.send_replace(state);
        } else {
            tracing::debug!(attempt, latest, "Superseded attempt, state not published");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use qrgen_core::PNG_DATA_URL_PREFIX;
    use qrgen_render::{CodeRenderer, RenderOptions, BLACK};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Paints a fixed square unless told to draw nothing
    struct FakeRenderer {
        draws: AtomicUsize,
        delay: Duration,
        paint: bool,
    }

    impl FakeRenderer {
        fn new(delay: Duration, paint: bool) -> Self {
            Self {
                draws: AtomicUsize::new(0),
                delay,
                paint,
            }
        }
    }

    #[async_trait]
    impl SymbolRenderer for FakeRenderer {
        async fn draw(
            &self,
            surface: &mut dyn RenderSurface,
            _text: &str,
            _symbology: Symbology,
        ) -> CodeResult<()> {
            self.draws.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.paint {
                surface.resize(8, 8);
                surface.fill_rect(0, 0, 8, 8, BLACK);
            }
            Ok(())
        }
    }

    fn real_workflow() -> GenerationWorkflow {
        let renderer = CodeRenderer::new(RenderOptions::default().with_settle_delay(Duration::ZERO));
        GenerationWorkflow::new(Arc::new(renderer))
    }

    #[tokio::test]
    async fn test_qr_generation_succeeds_with_data_url() {
        let workflow = real_workflow();
        assert_eq!(workflow.state(), GenerationState::Idle);

        let state = workflow.generate("https://example.com", Symbology::Qr).await;
        let code = state.code().expect("succeeded");
        assert!(code.image_data.starts_with(PNG_DATA_URL_PREFIX));
        assert!(code.image_data.len() > PNG_DATA_URL_PREFIX.len());
        assert_eq!(code.source_text, "https://example.com");
        assert_eq!(workflow.state(), state);
    }

    #[tokio::test]
    async fn test_empty_input_never_reaches_renderer() {
        let renderer = Arc::new(FakeRenderer::new(Duration::ZERO, true));
        let workflow = GenerationWorkflow::new(renderer.clone());

        for text in ["", "   "] {
            let state = workflow.generate(text, Symbology::Qr).await;
            assert_eq!(state.error(), Some(&CodeError::EmptyInput));
        }
        assert_eq!(renderer.draws.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_surface_fails_never_succeeds() {
        let renderer = Arc::new(FakeRenderer::new(Duration::ZERO, false));
        let workflow = GenerationWorkflow::new(renderer);
        let state = workflow.generate("12345", Symbology::Code128).await;
        assert_eq!(
            state.error(),
            Some(&CodeError::BlankOutput {
                symbology: Symbology::Code128
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_ean13_fails_with_blank_output_message() {
        let workflow = real_workflow();
        let state = workflow.generate("ABC!!", Symbology::Ean13).await;
        match state {
            GenerationState::Failed { error, message } => {
                assert!(matches!(error, CodeError::BlankOutput { .. }));
                assert!(message.contains("EAN13"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_render_failure_message_names_symbology() {
        let workflow = real_workflow();
        let state = workflow.generate(&"x".repeat(5000), Symbology::Qr).await;
        match state {
            GenerationState::Failed { message, .. } => {
                assert!(message.starts_with("Failed to generate QR Code"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_attempt_does_not_overwrite_newer_state() {
        let renderer = Arc::new(FakeRenderer::new(Duration::from_millis(200), true));
        let workflow = GenerationWorkflow::new(renderer);

        let (first, second) = tokio::join!(
            workflow.generate("first", Symbology::Qr),
            workflow.generate("", Symbology::Qr),
        );

        // the slow first attempt succeeded on its own terms...
        assert_eq!(first.code().map(|c| c.source_text.as_str()), Some("first"));
        // ...but the newer attempt owns the displayed state
        assert_eq!(second.error(), Some(&CodeError::EmptyInput));
        assert_eq!(workflow.state(), second);
    }

    #[tokio::test]
    async fn test_subscribers_see_terminal_state() {
        let workflow = real_workflow();
        let mut rx = workflow.subscribe();
        workflow.generate("hello", Symbology::Code39).await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_terminal());
    }
}
