use qrcode::{Color, EcLevel, QrCode};
use qrgen_core::ErrorCorrectionLevel;

/// Modules of an encoded QR symbol, without quiet zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    pub width: usize,
    pub dark: Vec<bool>,
}

impl QrMatrix {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }
}

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::Low => EcLevel::L,
        ErrorCorrectionLevel::Medium => EcLevel::M,
        ErrorCorrectionLevel::Quartile => EcLevel::Q,
        ErrorCorrectionLevel::High => EcLevel::H,
    }
}

/// Encode `text` as a QR symbol. CPU-bound; callers run it off the async runtime.
pub fn encode_qr(text: &str, level: ErrorCorrectionLevel) -> Result<QrMatrix, String> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), ec_level(level))
        .map_err(|e| e.to_string())?;
    let dark = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();
    Ok(QrMatrix {
        width: code.width(),
        dark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_short_url_is_version_2() {
        let matrix = encode_qr("https://example.com", ErrorCorrectionLevel::Medium).unwrap();
        assert_eq!(matrix.width, 25);
        assert_eq!(matrix.dark.len(), 25 * 25);
        // finder pattern corner
        assert!(matrix.is_dark(0, 0));
    }

    #[test]
    fn test_data_too_long_fails() {
        let text = "x".repeat(5000);
        assert!(encode_qr(&text, ErrorCorrectionLevel::High).is_err());
    }
}
