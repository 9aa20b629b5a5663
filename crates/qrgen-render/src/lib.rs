//! Symbol rendering
//!
//! Draws QR codes and linear barcodes onto a pixel [`RenderSurface`] and
//! decides whether the result is usable. Encoding is delegated to the
//! `qrcode` and `barcoders` crates, with MSI and pharmacode encoded here.

pub mod engine;
pub mod options;
pub mod renderer;
pub mod surface;

pub use options::RenderOptions;
pub use renderer::{render, CodeRenderer, RenderOutcome, SymbolRenderer};
pub use surface::{is_blank, RasterSurface, RenderSurface, BLACK, WHITE};
