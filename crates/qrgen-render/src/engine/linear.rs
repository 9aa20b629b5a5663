//! Linear barcode encoders

use barcoders::sym::codabar::Codabar;
use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::tf::TF;
use qrgen_core::Symbology;

use super::{msi, pharmacode};

/// Code 128 character-set B selector understood by `barcoders`
const CODE128_CHARSET_B: char = 'Ɓ';

/// Encode `text` for a linear symbology.
///
/// An `Err` means the content is not valid for the format; the renderer
/// draws nothing in that case.
pub fn encode_linear(text: &str, symbology: Symbology) -> Result<Vec<u8>, String> {
    match symbology {
        Symbology::Code128 => code128(text),
        Symbology::Code39 => Code39::new(&text.to_uppercase())
            .map(|c| c.encode())
            .map_err(|e| e.to_string()),
        Symbology::Ean13 => {
            let payload = gtin_payload(text, 12)?;
            EAN13::new(&payload)
                .map(|c| c.encode())
                .map_err(|e| e.to_string())
        }
        Symbology::Ean8 => {
            let payload = gtin_payload(text, 7)?;
            EAN8::new(&payload)
                .map(|c| c.encode())
                .map_err(|e| e.to_string())
        }
        Symbology::Upc => {
            // UPC-A is EAN-13 with a leading zero
            let payload = format!("0{}", gtin_payload(text, 11)?);
            EAN13::new(&payload)
                .map(|c| c.encode())
                .map_err(|e| e.to_string())
        }
        Symbology::Itf => {
            if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
                return Err("ITF accepts digits only".to_string());
            }
            if text.len() % 2 != 0 {
                return Err("ITF requires an even number of digits".to_string());
            }
            TF::interleaved(text)
                .map(|c| c.encode())
                .map_err(|e| e.to_string())
        }
        Symbology::Msi => msi::encode(text),
        Symbology::Pharmacode => pharmacode::encode(text),
        Symbology::Codabar => Codabar::new(&with_codabar_guards(text))
            .map(|c| c.encode())
            .map_err(|e| e.to_string()),
        Symbology::Qr => Err("QR is not a linear symbology".to_string()),
    }
}

fn code128(text: &str) -> Result<Vec<u8>, String> {
    if text.is_empty() || !text.chars().all(|c| (' '..='~').contains(&c)) {
        return Err("CODE128 accepts printable ASCII only".to_string());
    }
    let mut data = String::with_capacity(text.len() + 2);
    data.push(CODE128_CHARSET_B);
    data.push_str(text);
    Code128::new(&data)
        .map(|c| c.encode())
        .map_err(|e| e.to_string())
}

/// GTIN check digit over the payload digits (weights 3,1 from the right)
pub fn gtin_check_digit(digits: &str) -> u8 {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 {
                d * 3
            } else {
                d
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Accept `len` digits, or `len + 1` digits with a valid check digit, and
/// return the `len` payload digits.
fn gtin_payload(text: &str, len: usize) -> Result<String, String> {
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err("digits only".to_string());
    }
    if text.len() == len {
        return Ok(text.to_string());
    }
    if text.len() == len + 1 {
        let (payload, check) = text.split_at(len);
        let expected = gtin_check_digit(payload);
        if check.as_bytes()[0] - b'0' == expected {
            return Ok(payload.to_string());
        }
        return Err(format!("invalid check digit, expected {}", expected));
    }
    Err(format!("expected {} or {} digits", len, len + 1))
}

fn with_codabar_guards(text: &str) -> String {
    let upper = text.to_uppercase();
    let is_guard = |c: char| matches!(c, 'A'..='D');
    let starts = upper.chars().next().is_some_and(is_guard);
    let ends = upper.chars().last().is_some_and(is_guard);
    if starts && ends && upper.len() > 1 {
        upper
    } else {
        format!("A{}A", upper)
    }
}
