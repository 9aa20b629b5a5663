//! Symbol encoders
//!
//! Each encoder turns text into a module pattern only; drawing happens in the
//! renderer. Linear encoders yield one `u8` per module (1 = bar, 0 = space).

pub mod linear;
pub mod msi;
pub mod pharmacode;
pub mod qr;

pub use linear::encode_linear;
pub use qr::{encode_qr, QrMatrix};
