//! MSI Plessey, plain variant (no check digit)

const START: &str = "110";
const STOP: &str = "1001";

pub fn encode(text: &str) -> Result<Vec<u8>, String> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err("MSI accepts digits only".to_string());
    }

    let mut pattern = String::from(START);
    for digit in text.bytes().map(|b| b - b'0') {
        for bit in (0..4).rev() {
            pattern.push_str(if (digit >> bit) & 1 == 1 { "110" } else { "100" });
        }
    }
    pattern.push_str(STOP);

    Ok(pattern.bytes().map(|b| b - b'0').collect())
}
