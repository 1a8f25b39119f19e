use crate::boxes::{FullBoxHeader, PSSH};
use crate::error::{PsshError, Result, truncated, write_failed};
use crate::parser::{FullBoxCodec, IsoFullBox};
use crate::util::WIDEVINE_SYSTEM_ID;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};
use tracing::debug;

/// size + type + version + flags + system ID
pub const PSSH_HEADER_LEN: usize = 4 + 4 + 1 + 3 + 16;

/// One decoded `pssh` box.
///
/// Layout after the full box header:
///
/// ```text
/// [16]  system_id
/// if version == 1:
///   u32   kid_count
///   [16]  kid * kid_count
/// u32   data_size
/// [..]  data
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxEnvelope {
    pub version: u8,
    /// 24-bit flags, top byte always zero.
    pub flags: u32,
    pub system_id: [u8; 16],
    /// Key IDs listed in a version 1 header. Empty for version 0.
    pub key_ids: Vec<[u8; 16]>,
    /// Opaque `Data` field; a serialized `WidevinePsshData` for Widevine.
    pub payload: Vec<u8>,
}

impl BoxEnvelope {
    /// Version 0 Widevine envelope around `payload`.
    pub fn new(payload: Vec<u8>) -> Self {
        BoxEnvelope { version: 0, flags: 0, system_id: WIDEVINE_SYSTEM_ID, key_ids: Vec::new(), payload }
    }

    /// Parses a Widevine `pssh` box from the start of `input`.
    ///
    /// The leading size field decides how many bytes make up the box; any
    /// bytes after it are left alone.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let env = Self::parse_with(&IsoFullBox, input)?;
        env.ensure_widevine()?;
        Ok(env)
    }

    /// Like [`BoxEnvelope::parse`] but accepts any system ID.
    pub fn parse_any(input: &[u8]) -> Result<Self> {
        Self::parse_with(&IsoFullBox, input)
    }

    /// Parses any system's `pssh` box, reading the header through `codec`.
    pub fn parse_with<C: FullBoxCodec>(codec: &C, input: &[u8]) -> Result<Self> {
        Self::parse_header_with(codec, input).map(|(_, env)| env)
    }

    /// Like [`BoxEnvelope::parse_with`] but also returns the header as read,
    /// which keeps the size form (compact or largesize) of the input.
    pub fn parse_header_with<C: FullBoxCodec>(codec: &C, input: &[u8]) -> Result<(FullBoxHeader, Self)> {
        if input.len() < PSSH_HEADER_LEN {
            return Err(PsshError::Structural(format!(
                "input too short for pssh box header: {} bytes",
                input.len()
            )));
        }

        let mut r = Cursor::new(input);
        let hdr = codec.decode_header(&mut r, input.len() as u64)?;
        if hdr.typ != PSSH {
            return Err(PsshError::Structural(format!("box is a {} instead of a pssh", hdr.typ)));
        }
        if hdr.size > input.len() as u64 {
            return Err(PsshError::Structural(format!(
                "box size {} exceeds input length {}",
                hdr.size,
                input.len()
            )));
        }
        if hdr.version > 1 {
            return Err(PsshError::Structural(format!("unsupported version {}", hdr.version)));
        }

        if hdr.size < r.position() {
            return Err(PsshError::Structural(format!(
                "box size {} smaller than the {} header bytes read",
                hdr.size,
                r.position()
            )));
        }

        let body = &input[r.position() as usize..hdr.size as usize];
        let mut r = Cursor::new(body);

        let mut system_id = [0u8; 16];
        r.read_exact(&mut system_id).map_err(truncated("system id"))?;

        let mut key_ids = Vec::new();
        if hdr.version == 1 {
            let count = r.read_u32::<BigEndian>().map_err(truncated("kid count"))? as u64;
            if count * 16 > remaining(&r) {
                return Err(PsshError::Structural(format!("truncated key ids: {count} declared")));
            }
            for _ in 0..count {
                let mut kid = [0u8; 16];
                r.read_exact(&mut kid).map_err(truncated("key id"))?;
                key_ids.push(kid);
            }
        }

        let data_size = r.read_u32::<BigEndian>().map_err(truncated("data size"))? as u64;
        if data_size > remaining(&r) {
            return Err(PsshError::Structural(format!(
                "data size {data_size} overruns box ({} bytes left)",
                remaining(&r)
            )));
        }
        let mut payload = vec![0u8; data_size as usize];
        r.read_exact(&mut payload).map_err(truncated("data"))?;

        if remaining(&r) != 0 {
            return Err(PsshError::Structural(format!(
                "{} trailing bytes inside box of size {}",
                remaining(&r),
                hdr.size
            )));
        }

        debug!(
            version = hdr.version,
            flags = hdr.flags,
            size = hdr.size,
            data_size,
            header_kids = key_ids.len(),
            "parsed pssh box"
        );

        let env = BoxEnvelope { version: hdr.version, flags: hdr.flags, system_id, key_ids, payload };
        Ok((hdr, env))
    }

    /// Errors with [`PsshError::SystemIdMismatch`] unless this is a Widevine box.
    pub fn ensure_widevine(&self) -> Result<()> {
        if self.system_id == WIDEVINE_SYSTEM_ID {
            Ok(())
        } else {
            Err(PsshError::SystemIdMismatch { found: self.system_id_hex() })
        }
    }

    pub fn system_id_hex(&self) -> String {
        hex::encode(self.system_id)
    }

    /// Serializes the box; the leading size equals the number of bytes returned.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&IsoFullBox)
    }

    /// Header this envelope serializes with: compact unless the box needs largesize.
    pub fn header(&self) -> FullBoxHeader {
        let mut body_len = 16 + 4 + self.payload.len() as u64;
        if self.version == 1 {
            body_len += 4 + 16 * self.key_ids.len() as u64;
        }
        FullBoxHeader::for_body(PSSH, self.version, self.flags, body_len)
    }

    /// Serializes the box, writing the header through `codec`.
    pub fn to_bytes_with<C: FullBoxCodec>(&self, codec: &C) -> Result<Vec<u8>> {
        if self.version > 1 {
            return Err(PsshError::Encoding(format!("unsupported version {}", self.version)));
        }
        if self.version == 0 && !self.key_ids.is_empty() {
            return Err(PsshError::Encoding("version 0 box cannot list key ids in its header".into()));
        }
        let data_size = u32::try_from(self.payload.len())
            .map_err(|_| PsshError::Encoding(format!("data of {} bytes too large", self.payload.len())))?;

        let hdr = self.header();

        let mut buf = Vec::with_capacity(hdr.size as usize);
        codec.encode_header(&mut buf, &hdr)?;
        buf.write_all(&self.system_id).map_err(write_failed)?;
        if self.version == 1 {
            let count = u32::try_from(self.key_ids.len())
                .map_err(|_| PsshError::Encoding("too many key ids".into()))?;
            buf.write_u32::<BigEndian>(count).map_err(write_failed)?;
            for kid in &self.key_ids {
                buf.write_all(kid).map_err(write_failed)?;
            }
        }
        buf.write_u32::<BigEndian>(data_size).map_err(write_failed)?;
        buf.write_all(&self.payload).map_err(write_failed)?;

        if buf.len() as u64 != hdr.size {
            return Err(PsshError::Encoding(format!(
                "wrote {} bytes for a box of size {}",
                buf.len(),
                hdr.size
            )));
        }
        Ok(buf)
    }
}

fn remaining(r: &Cursor<&[u8]>) -> u64 {
    (r.get_ref().len() as u64).saturating_sub(r.position())
}
