use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::CodeError;

/// Supported symbologies.
///
/// Wire names match the ones stored alongside saved codes: `qrcode` for QR
/// and the barcode format names as written. Parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Symbology {
    Qr,
    Code128,
    Code39,
    Ean13,
    Ean8,
    Upc,
    Itf,
    Msi,
    Pharmacode,
    Codabar,
}

impl Symbology {
    pub const ALL: [Symbology; 10] = [
        Symbology::Qr,
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Upc,
        Symbology::Itf,
        Symbology::Msi,
        Symbology::Pharmacode,
        Symbology::Codabar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Qr => "qrcode",
            Symbology::Code128 => "CODE128",
            Symbology::Code39 => "CODE39",
            Symbology::Ean13 => "EAN13",
            Symbology::Ean8 => "EAN8",
            Symbology::Upc => "UPC",
            Symbology::Itf => "ITF",
            Symbology::Msi => "MSI",
            Symbology::Pharmacode => "pharmacode",
            Symbology::Codabar => "codabar",
        }
    }

    /// Human-facing label used in messages ("QR Code", "EAN13", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Symbology::Qr => "QR Code",
            other => other.as_str(),
        }
    }

    pub fn is_qr(&self) -> bool {
        matches!(self, Symbology::Qr)
    }

    /// Linear (one-dimensional) barcode formats
    pub fn barcodes() -> impl Iterator<Item = Symbology> {
        Self::ALL.into_iter().filter(|s| !s.is_qr())
    }
}

impl FromStr for Symbology {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qrcode" | "qr" | "qr_code" => Ok(Symbology::Qr),
            "code128" => Ok(Symbology::Code128),
            "code39" => Ok(Symbology::Code39),
            "ean13" => Ok(Symbology::Ean13),
            "ean8" => Ok(Symbology::Ean8),
            "upc" => Ok(Symbology::Upc),
            "itf" => Ok(Symbology::Itf),
            "msi" => Ok(Symbology::Msi),
            "pharmacode" => Ok(Symbology::Pharmacode),
            "codabar" => Ok(Symbology::Codabar),
            _ => Err(CodeError::UnsupportedSymbology(s.to_string())),
        }
    }
}

impl TryFrom<String> for Symbology {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbology> for String {
    fn from(value: Symbology) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Symbology {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// QR error-correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl FromStr for ErrorCorrectionLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L" | "LOW" => Ok(ErrorCorrectionLevel::Low),
            "M" | "MEDIUM" => Ok(ErrorCorrectionLevel::Medium),
            "Q" | "QUARTILE" => Ok(ErrorCorrectionLevel::Quartile),
            "H" | "HIGH" => Ok(ErrorCorrectionLevel::High),
            _ => Err(anyhow::anyhow!("Invalid error correction level: {}", s)),
        }
    }
}

impl Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let c = match self {
            ErrorCorrectionLevel::Low => "L",
            ErrorCorrectionLevel::Medium => "M",
            ErrorCorrectionLevel::Quartile => "Q",
            ErrorCorrectionLevel::High => "H",
        };
        write!(f, "{}", c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip_through_parse() {
        for symbology in Symbology::ALL {
            assert_eq!(symbology.as_str().parse::<Symbology>().unwrap(), symbology);
        }
    }

    #[test]
    fn test_qr_aliases() {
        assert_eq!("qr".parse::<Symbology>().unwrap(), Symbology::Qr);
        assert_eq!("QR".parse::<Symbology>().unwrap(), Symbology::Qr);
        assert_eq!("QRCode".parse::<Symbology>().unwrap(), Symbology::Qr);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!("ean13".parse::<Symbology>().unwrap(), Symbology::Ean13);
        assert_eq!("Pharmacode".parse::<Symbology>().unwrap(), Symbology::Pharmacode);
        assert_eq!("CODABAR".parse::<Symbology>().unwrap(), Symbology::Codabar);
    }

    #[test]
    fn test_unknown_symbology() {
        let err = "datamatrix".parse::<Symbology>().unwrap_err();
        assert_eq!(err, CodeError::UnsupportedSymbology("datamatrix".to_string()));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Symbology::Qr).unwrap();
        assert_eq!(json, "\"qrcode\"");
        let parsed: Symbology = serde_json::from_str("\"upc\"").unwrap();
        assert_eq!(parsed, Symbology::Upc);
        assert!(serde_json::from_str::<Symbology>("\"aztec\"").is_err());
    }

    #[test]
    fn test_barcodes_excludes_qr() {
        assert_eq!(Symbology::barcodes().count(), 9);
        assert!(Symbology::barcodes().all(|s| !s.is_qr()));
    }

    #[test]
    fn test_error_correction_parse() {
        assert_eq!("m".parse::<ErrorCorrectionLevel>().unwrap(), ErrorCorrectionLevel::Medium);
        assert_eq!("High".parse::<ErrorCorrectionLevel>().unwrap(), ErrorCorrectionLevel::High);
        assert!("X".parse::<ErrorCorrectionLevel>().is_err());
        assert_eq!(ErrorCorrectionLevel::default().to_string(), "M");
    }
}
