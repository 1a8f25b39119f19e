use crate::boxes::FullBoxHeader;
use crate::envelope::BoxEnvelope;
use crate::error::{PsshError, Result};
use crate::parser::IsoFullBox;
use crate::payload::{WidevinePsshData, decode_payload, encode_payload};
use tracing::debug;

/// Header fields for a newly built box. Defaults to version 0, flags 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PsshOptions {
    pub version: u8,
    pub flags: u32,
}

/// A Widevine PSSH box together with its decoded `WidevinePsshData`.
///
/// Only obtainable by parsing or by building from a payload, and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Pssh {
    header: FullBoxHeader,
    envelope: BoxEnvelope,
    data: WidevinePsshData,
}

impl Pssh {
    /// Parses a Widevine PSSH box and decodes its payload.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let (header, envelope) = BoxEnvelope::parse_header_with(&IsoFullBox, input)?;
        envelope.ensure_widevine()?;
        let data = decode_payload(&envelope.payload)?;
        debug!(key_ids = data.key_ids.len(), has_content_id = data.content_id.is_some(), "decoded widevine pssh");
        Ok(Pssh { header, envelope, data })
    }

    /// Parses a base64 PSSH box, as found in DASH manifests and `cenc:pssh` elements.
    pub fn from_base64(input: &str) -> Result<Self> {
        let bytes = data_encoding::BASE64
            .decode(input.trim().as_bytes())
            .map_err(|e| PsshError::InvalidBase64(e.to_string()))?;
        Self::parse(&bytes)
    }

    /// Builds a box around `data`.
    ///
    /// Version 1 boxes also list the payload key IDs in the box header,
    /// which then must all be 16 bytes long.
    pub fn new(data: WidevinePsshData, opts: PsshOptions) -> Result<Self> {
        if opts.version > 1 {
            return Err(PsshError::Encoding(format!("unsupported version {}", opts.version)));
        }
        if opts.flags > 0x00FF_FFFF {
            return Err(PsshError::Encoding(format!("flags {:#x} exceed 24 bits", opts.flags)));
        }
        let mut envelope = BoxEnvelope::new(encode_payload(&data));
        envelope.version = opts.version;
        envelope.flags = opts.flags;
        if opts.version == 1 {
            envelope.key_ids = data
                .key_ids
                .iter()
                .map(|kid| {
                    <[u8; 16]>::try_from(kid.as_slice()).map_err(|_| {
                        PsshError::Encoding(format!("key id of {} bytes cannot go in a v1 header", kid.len()))
                    })
                })
                .collect::<Result<_>>()?;
        }
        Ok(Pssh { header: envelope.header(), envelope, data })
    }

    /// Version 0 box listing `key_ids` in its payload.
    pub fn from_key_ids<I, K>(key_ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        Self::new(WidevinePsshData::from_key_ids(key_ids), PsshOptions::default())
    }

    pub fn version(&self) -> u8 {
        self.envelope.version
    }

    pub fn flags(&self) -> u32 {
        self.envelope.flags
    }

    pub fn system_id(&self) -> &[u8; 16] {
        &self.envelope.system_id
    }

    /// The undecoded `Data` field.
    pub fn raw_data(&self) -> &[u8] {
        &self.envelope.payload
    }

    pub fn data(&self) -> &WidevinePsshData {
        &self.data
    }

    /// Key IDs from the payload, or from a v1 box header when the payload
    /// lists none.
    pub fn key_ids(&self) -> Vec<&[u8]> {
        if self.data.key_ids.is_empty() {
            self.envelope.key_ids.iter().map(|k| k.as_slice()).collect()
        } else {
            self.data.key_ids.iter().map(Vec::as_slice).collect()
        }
    }

    pub fn content_id(&self) -> Option<&[u8]> {
        self.data.content_id.as_deref()
    }

    /// Box header as parsed, or as it will be written for a built box.
    pub fn header(&self) -> &FullBoxHeader {
        &self.header
    }

    pub fn envelope(&self) -> &BoxEnvelope {
        &self.envelope
    }

    pub fn into_parts(self) -> (BoxEnvelope, WidevinePsshData) {
        (self.envelope, self.data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.envelope.to_bytes()
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(data_encoding::BASE64.encode(&self.to_bytes()?))
    }
}

/// Builds a version 0, flags 0 Widevine PSSH box listing `key_ids`.
pub fn create<I, K>(key_ids: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = K>,
    K: Into<Vec<u8>>,
{
    Pssh::from_key_ids(key_ids)?.to_bytes()
}
