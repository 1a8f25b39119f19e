use crate::error::Result;
use hex_literal::hex;
use std::fmt::Write;

/// Widevine DRM system ID: `edef8ba9-79d6-4ace-a3c8-27dcd51d21ed`
pub const WIDEVINE_SYSTEM_ID: [u8; 16] = hex!("edef8ba979d64acea3c827dcd51d21ed");

/// [`WIDEVINE_SYSTEM_ID`] as lowercase hex without separators.
pub const WIDEVINE_SYSTEM_ID_HEX: &str = "edef8ba979d64acea3c827dcd51d21ed";

/// Decodes key IDs given as text, e.g. `"DE-AD BE-EF"` or a dashed UUID.
///
/// Hyphens and spaces are dropped, the rest must be an even number of hex
/// digits (either case).
pub fn hex_to_bytes(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| *c != '-' && *c != ' ').collect();
    Ok(hex::decode(cleaned)?)
}

pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offs = start_offset + (i as u64) * 16;
        let hexs = chunk.iter().fold(String::new(), |mut s, b| {
            let _ = write!(s, "{b:02x} ");
            s
        });
        let ascii: String = chunk
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{offs:08x}  {hexs:<48}  |{ascii}|");
    }
    out
}
