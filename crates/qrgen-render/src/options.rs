use std::time::Duration;

use qrgen_core::{Config, ErrorCorrectionLevel, RenderConfig};

/// Sizes and timings used while drawing symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Side of the square QR surface in pixels
    pub qr_size: u32,
    pub error_correction: ErrorCorrectionLevel,
    /// Width of the narrowest bar in pixels
    pub module_width: u32,
    pub bar_height: u32,
    /// Quiet zone around barcodes, on every side
    pub margin: u32,
    /// Widest barcode surface that will be allocated
    pub max_width: u32,
    /// Wait before trusting the blank-check after a barcode draw
    pub settle_delay: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderConfig::default().into()
    }
}

impl From<RenderConfig> for RenderOptions {
    fn from(config: RenderConfig) -> Self {
        Self {
            qr_size: config.qr_size,
            error_correction: config.error_correction,
            module_width: config.module_width,
            bar_height: config.bar_height,
            margin: config.margin,
            max_width: config.max_width,
            settle_delay: config.settle_delay,
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        config.render().clone().into()
    }
}

impl RenderOptions {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}
