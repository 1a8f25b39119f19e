use std::fmt;

/// Type tag of the Protection System Specific Header box.
pub const PSSH: FourCC = FourCC(*b"pssh");

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else { None }
    }
    pub fn from_u32(v: u32) -> Self { FourCC(v.to_be_bytes()) }
    pub fn to_u32(self) -> u32 { u32::from_be_bytes(self.0) }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

/// Header of an ISOBMFF full box: size, type, version and 24-bit flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullBoxHeader {
    pub size: u64,          // total size including header
    pub typ: FourCC,
    pub header_size: u64,   // 12, or 20 with a 64-bit largesize
    pub version: u8,
    pub flags: u32,         // low 24 bits only
}

impl FullBoxHeader {
    /// Builds the header for a box whose body (everything after flags) is
    /// `body_len` bytes, picking the 64-bit size form only when needed.
    pub fn for_body(typ: FourCC, version: u8, flags: u32, body_len: u64) -> Self {
        let compact = 8 + 4;
        let header_size = if body_len + compact > u32::MAX as u64 { compact + 8 } else { compact };
        FullBoxHeader { size: header_size + body_len, typ, header_size, version, flags }
    }

    pub fn body_len(&self) -> u64 {
        self.size - self.header_size
    }

    pub fn is_large(&self) -> bool {
        self.header_size > 12
    }
}
