//! Pharmacode (one-track). Narrow bar = 1 unit, wide bar = 3 units,
//! gaps = 2 units.

pub const MIN: u32 = 3;
pub const MAX: u32 = 131070;

pub fn encode(text: &str) -> Result<Vec<u8>, String> {
    let value: u32 = text
        .trim()
        .parse()
        .map_err(|_| "Pharmacode accepts a whole number".to_string())?;
    if !(MIN..=MAX).contains(&value) {
        return Err(format!("Pharmacode value must be between {} and {}", MIN, MAX));
    }

    let mut z = value;
    let mut pattern = String::new();
    while z != 0 {
        if z % 2 == 0 {
            pattern.insert_str(0, "11100");
            z = (z - 2) / 2;
        } else {
            pattern.insert_str(0, "100");
            z = (z - 1) / 2;
        }
    }
    // trailing gap
    pattern.truncate(pattern.len() - 2);

    Ok(pattern.bytes().map(|b| b - b'0').collect())
}
