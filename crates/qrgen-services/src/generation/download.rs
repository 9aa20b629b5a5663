use qrgen_core::{decode_png_data_url, CodeResult, GeneratedCode, SavedCodeRecord, Symbology};

/// A file ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `{symbology}_{sanitized}.png`: the first 20 characters of the text with
/// everything outside `[A-Za-z0-9]` removed.
pub fn download_file_name(text: &str, symbology: Symbology) -> String {
    let sanitized: String = text
        .chars()
        .take(20)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("{}_{}.png", symbology, sanitized)
}

pub fn download(code: &GeneratedCode) -> DownloadArtifact {
    DownloadArtifact {
        file_name: download_file_name(&code.source_text, code.symbology),
        content_type: "image/png",
        bytes: code.png.clone(),
    }
}

/// Download a saved code from its stored data URL
pub fn download_record(record: &SavedCodeRecord) -> CodeResult<DownloadArtifact> {
    Ok(DownloadArtifact {
        file_name: download_file_name(&record.source_text, record.symbology),
        content_type: "image/png",
        bytes: decode_png_data_url(&record.image_data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qrgen_core::png_data_url;

    #[test]
    fn test_file_name_strips_and_truncates() {
        assert_eq!(
            download_file_name("https://example.com/path?q=1", Symbology::Qr),
            "qrcode_httpsexamplecom.png"
        );
        assert_eq!(
            download_file_name("4006381333931", Symbology::Ean13),
            "EAN13_4006381333931.png"
        );
        assert_eq!(download_file_name("!!!", Symbology::Code128), "CODE128_.png");
    }

    #[test]
    fn test_truncation_counts_characters_before_stripping() {
        // 20 chars: "a-b-c-d-e-f-g-h-i-j-" -> "abcdefghij"
        assert_eq!(
            download_file_name("a-b-c-d-e-f-g-h-i-j-k-l", Symbology::Code39),
            "CODE39_abcdefghij.png"
        );
    }

    #[test]
    fn test_download_uses_generated_png() {
        let code = GeneratedCode::from_png("hi", Symbology::Qr, vec![1, 2, 3], 1, 1);
        let artifact = download(&code);
        assert_eq!(artifact.file_name, "qrcode_hi.png");
        assert_eq!(artifact.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_download_record_decodes_data_url() {
        let record = SavedCodeRecord {
            id: "1".to_string(),
            owner: None,
            source_text: "hi".to_string(),
            symbology: Symbology::Msi,
            image_data: png_data_url(&[9, 9]),
            created_at: Utc::now(),
        };
        let artifact = download_record(&record).unwrap();
        assert_eq!(artifact.file_name, "MSI_hi.png");
        assert_eq!(artifact.bytes, vec![9, 9]);
    }
}
