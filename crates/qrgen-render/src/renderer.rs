//! Symbol renderer
//!
//! [`SymbolRenderer::draw`] paints a symbol; [`render`] wraps it with the
//! input check, the settle step and the blank-check, and is what callers use.

use std::time::Instant;

use async_trait::async_trait;
use qrgen_core::{CodeError, CodeResult, Symbology};

use crate::engine::{encode_linear, encode_qr, QrMatrix};
use crate::options::RenderOptions;
use crate::surface::{is_blank, RenderSurface, BLACK, WHITE};

/// Quiet zone around a QR symbol, in modules
const QR_QUIET_ZONE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait SymbolRenderer: Send + Sync {
    /// Draw `text` as `symbology` onto `surface`.
    ///
    /// Content a linear encoder rejects is not an error here: nothing is
    /// drawn and the blank-check in [`render`] reports it.
    async fn draw(
        &self,
        surface: &mut dyn RenderSurface,
        text: &str,
        symbology: Symbology,
    ) -> CodeResult<()>;

    /// How long to wait after a barcode draw before inspecting the surface
    fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::ZERO
    }
}

/// Render through `renderer`: validate, clear, draw, settle, blank-check.
pub async fn render(
    renderer: &dyn SymbolRenderer,
    surface: &mut dyn RenderSurface,
    text: &str,
    symbology: Symbology,
) -> CodeResult<RenderOutcome> {
    if text.trim().is_empty() {
        return Err(CodeError::EmptyInput);
    }

    let start = Instant::now();
    surface.clear();
    renderer.draw(surface, text, symbology).await?;

    if !symbology.is_qr() {
        let delay = renderer.settle_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    if is_blank(surface) {
        tracing::debug!(%symbology, "Render produced a blank surface");
        return Err(CodeError::BlankOutput { symbology });
    }

    let outcome = RenderOutcome {
        width: surface.width(),
        height: surface.height(),
    };
    tracing::debug!(
        %symbology,
        width = outcome.width,
        height = outcome.height,
        duration_ms = start.elapsed().as_millis() as u64,
        "Symbol rendered"
    );
    Ok(outcome)
}

/// Renderer backed by the `qrcode` and `barcoders` encoders
#[derive(Debug, Clone, Default)]
pub struct CodeRenderer {
    options: RenderOptions,
}

impl CodeRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    async fn draw_qr(&self, surface: &mut dyn RenderSurface, text: &str) -> CodeResult<()> {
        let owned = text.to_string();
        let level = self.options.error_correction;
        let matrix = tokio::task::spawn_blocking(move || encode_qr(&owned, level))
            .await
            .map_err(|e| CodeError::Internal(format!("QR encode task failed: {}", e)))?
            .map_err(|cause| CodeError::Render {
                symbology: Symbology::Qr,
                cause,
            })?;

        paint_qr(surface, &matrix, self.options.qr_size)
    }

    fn draw_linear(
        &self,
        surface: &mut dyn RenderSurface,
        text: &str,
        symbology: Symbology,
    ) -> CodeResult<()> {
        let modules = match encode_linear(text, symbology) {
            Ok(modules) => modules,
            Err(reason) => {
                tracing::debug!(%symbology, %reason, "Encoder rejected input, nothing drawn");
                return Ok(());
            }
        };

        let opts = &self.options;
        let width = modules.len() as u64 * opts.module_width as u64 + 2 * opts.margin as u64;
        if width > opts.max_width as u64 {
            return Err(CodeError::Render {
                symbology,
                cause: format!(
                    "barcode is {}px wide, more than the {}px limit",
                    width, opts.max_width
                ),
            });
        }
        let width = width as u32;
        let height = opts.bar_height + 2 * opts.margin;

        surface.resize(width, height);
        surface.fill_rect(0, 0, width, height, WHITE);
        for (i, module) in modules.iter().enumerate() {
            if *module == 1 {
                let x = opts.margin + i as u32 * opts.module_width;
                surface.fill_rect(x, opts.margin, opts.module_width, opts.bar_height, BLACK);
            }
        }
        Ok(())
    }
}

/// Scale the matrix by the largest integer factor that fits, centred on a
/// white square of side `size`.
fn paint_qr(surface: &mut dyn RenderSurface, matrix: &QrMatrix, size: u32) -> CodeResult<()> {
    let modules = matrix.width as u32 + 2 * QR_QUIET_ZONE;
    let scale = size / modules;
    if scale == 0 {
        return Err(CodeError::Render {
            symbology: Symbology::Qr,
            cause: format!(
                "{} modules do not fit in a {}px surface",
                modules, size
            ),
        });
    }
    let offset = (size - modules * scale) / 2 + QR_QUIET_ZONE * scale;

    surface.resize(size, size);
    surface.fill_rect(0, 0, size, size, WHITE);
    for y in 0..matrix.width {
        for x in 0..matrix.width {
            if matrix.is_dark(x, y) {
                surface.fill_rect(
                    offset + x as u32 * scale,
                    offset + y as u32 * scale,
                    scale,
                    scale,
                    BLACK,
                );
            }
        }
    }
    Ok(())
}

#[async_trait]
impl SymbolRenderer for CodeRenderer {
    async fn draw(
        &self,
        surface: &mut dyn RenderSurface,
        text: &str,
        symbology: Symbology,
    ) -> CodeResult<()> {
        if symbology.is_qr() {
            self.draw_qr(surface, text).await
        } else {
            self.draw_linear(surface, text, symbology)
        }
    }

    fn settle_delay(&self) -> std::time::Duration {
        self.options.settle_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;
    use std::time::Duration;

    fn renderer() -> CodeRenderer {
        CodeRenderer::new(RenderOptions::default().with_settle_delay(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_qr_fills_configured_square() {
        let mut surface = RasterSurface::new(1, 1);
        let outcome = render(&renderer(), &mut surface, "https://example.com", Symbology::Qr)
            .await
            .unwrap();
        assert_eq!(outcome, RenderOutcome { width: 256, height: 256 });
        // quiet zone corner stays white
        assert_eq!(surface.image().get_pixel(0, 0), &WHITE);
        assert!(surface.image().pixels().any(|p| *p == BLACK));
    }

    #[tokio::test]
    async fn test_barcode_surface_fits_symbol() {
        let mut surface = RasterSurface::default();
        let outcome = render(&renderer(), &mut surface, "4006381333931", Symbology::Ean13)
            .await
            .unwrap();
        assert_eq!(outcome.width, 95 * 2 + 20);
        assert_eq!(outcome.height, 120);
        // margin is white, first guard bar is black
        assert_eq!(surface.image().get_pixel(5, 50), &WHITE);
        assert_eq!(surface.image().get_pixel(10, 50), &BLACK);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_draw() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(0, 0, 4, 4, WHITE);
        let err = render(&renderer(), &mut surface, "   ", Symbology::Qr)
            .await
            .unwrap_err();
        assert_eq!(err, CodeError::EmptyInput);
        // untouched
        assert!(!is_blank(&surface));
    }

    #[tokio::test]
    async fn test_rejected_barcode_content_is_blank_output() {
        let mut surface = RasterSurface::default();
        let err = render(&renderer(), &mut surface, "ABC!!", Symbology::Ean13)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CodeError::BlankOutput {
                symbology: Symbology::Ean13
            }
        );
        assert!(err.to_string().contains("EAN13"));
    }

    #[tokio::test]
    async fn test_stale_pixels_cleared_between_attempts() {
        let r = renderer();
        let mut surface = RasterSurface::default();
        render(&r, &mut surface, "12345678", Symbology::Code128)
            .await
            .unwrap();
        let err = render(&r, &mut surface, "not digits", Symbology::Itf)
            .await
            .unwrap_err();
        assert!(matches!(err, CodeError::BlankOutput { .. }));
    }

    #[tokio::test]
    async fn test_qr_data_too_long_is_render_error() {
        let mut surface = RasterSurface::default();
        let text = "x".repeat(5000);
        let err = render(&renderer(), &mut surface, &text, Symbology::Qr)
            .await
            .unwrap_err();
        match err {
            CodeError::Render { symbology, .. } => assert_eq!(symbology, Symbology::Qr),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_barcode_wider_than_limit_is_render_error() {
        let options = RenderOptions {
            max_width: 100,
            settle_delay: Duration::ZERO,
            ..RenderOptions::default()
        };
        let mut surface = RasterSurface::default();
        let err = render(
            &CodeRenderer::new(options),
            &mut surface,
            "a long code 128 payload",
            Symbology::Code128,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CodeError::Render { .. }));
    }

    #[tokio::test]
    async fn test_every_barcode_renders_valid_sample() {
        let samples = [
            (Symbology::Code128, "Example 128"),
            (Symbology::Code39, "CODE-39"),
            (Symbology::Ean13, "590123412345"),
            (Symbology::Ean8, "9638507"),
            (Symbology::Upc, "03600029145"),
            (Symbology::Itf, "123456"),
            (Symbology::Msi, "1234"),
            (Symbology::Pharmacode, "1234"),
            (Symbology::Codabar, "1234-5678"),
        ];
        let r = renderer();
        for (symbology, text) in samples {
            let mut surface = RasterSurface::default();
            let result = render(&r, &mut surface, text, symbology).await;
            assert!(result.is_ok(), "{symbology} failed: {result:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_elapses_for_barcodes() {
        let r = CodeRenderer::new(RenderOptions::default());
        let mut surface = RasterSurface::default();
        let before = tokio::time::Instant::now();
        render(&r, &mut surface, "1234", Symbology::Msi).await.unwrap();
        assert!(before.elapsed() >= Duration::from_millis(50));
    }
}
