//! Marker vocabulary shared by the filter and the scanner.

/// Sentinel byte that either introduces a segment or, followed by
/// [`STUFFED`], encodes a literal `0xFF` in payload data.
pub const ESCAPE: u8 = 0xFF;

/// Second byte of a stuffed pair.
pub const STUFFED: u8 = 0x00;

pub const SOF0: u8 = 0xC0;
pub const DHT: u8 = 0xC4;
pub const RST0: u8 = 0xD0;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DQT: u8 = 0xDB;
pub const DNL: u8 = 0xDC;
pub const DRI: u8 = 0xDD;
pub const APP0: u8 = 0xE0;
pub const COM: u8 = 0xFE;

/// Resolves a marker mnemonic such as `APP1` or `com` to its type byte.
#[must_use]
pub fn marker_from_name(name: &str) -> Option<u8> {
    let upper = name.to_ascii_uppercase();

    let fixed = match upper.as_str() {
        "SOI" => Some(SOI),
        "EOI" => Some(EOI),
        "SOS" => Some(SOS),
        "DQT" => Some(DQT),
        "DHT" => Some(DHT),
        "DNL" => Some(DNL),
        "DRI" => Some(DRI),
        "COM" => Some(COM),
        _ => None,
    };
    if fixed.is_some() {
        return fixed;
    }

    numbered(&upper, "APP", APP0, 15)
        .or_else(|| numbered(&upper, "RST", RST0, 7))
        .or_else(|| numbered(&upper, "SOF", SOF0, 3))
}

fn numbered(name: &str, prefix: &str, base: u8, max: u8) -> Option<u8> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (n <= max).then(|| base + n)
}

/// Short human name for a type byte, used in diagnostics.
#[must_use]
pub fn marker_name(marker: u8) -> Option<String> {
    match marker {
        SOI => Some("SOI".into()),
        EOI => Some("EOI".into()),
        SOS => Some("SOS".into()),
        DQT => Some("DQT".into()),
        DHT => Some("DHT".into()),
        DNL => Some("DNL".into()),
        DRI => Some("DRI".into()),
        COM => Some("COM".into()),
        0xC0..=0xC3 => Some(format!("SOF{}", marker - SOF0)),
        0xD0..=0xD7 => Some(format!("RST{}", marker - RST0)),
        0xE0..=0xEF => Some(format!("APP{}", marker - APP0)),
        _ => None,
    }
}
