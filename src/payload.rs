//! Typed `WidevinePsshData`, the protobuf message stored in the `Data`
//! field of a Widevine PSSH box.

use crate::boxes::FourCC;
use crate::error::Result;
use prost::Message;
use tracing::trace;

/// Widevine PSSH data message.
///
/// Field tags follow Widevine's `widevine_pssh.proto`. Optional scalars are
/// `Option` so an absent field stays distinct from an empty one, and only
/// present fields are written back.
#[derive(Clone, PartialEq, Message)]
pub struct WidevinePsshData {
    /// Deprecated in favour of `protection_scheme`.
    #[prost(enumeration = "Algorithm", optional, tag = "1")]
    pub algorithm: Option<i32>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub key_ids: Vec<Vec<u8>>,
    #[prost(string, optional, tag = "3")]
    pub provider: Option<String>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub content_id: Option<Vec<u8>>,
    #[prost(string, optional, tag = "5")]
    pub track_type: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub policy: Option<String>,
    #[prost(uint32, optional, tag = "7")]
    pub crypto_period_index: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub grouped_license: Option<Vec<u8>>,
    /// Encryption scheme as a big-endian FourCC (`cenc`, `cbc1`, `cens`, `cbcs`).
    #[prost(uint32, optional, tag = "9")]
    pub protection_scheme: Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub crypto_period_seconds: Option<u32>,
    #[prost(enumeration = "PsshType", optional, tag = "11")]
    pub pssh_type: Option<i32>,
    #[prost(uint32, optional, tag = "12")]
    pub key_sequence: Option<u32>,
    #[prost(bytes = "vec", repeated, tag = "13")]
    pub group_ids: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "14")]
    pub entitled_keys: Vec<EntitledKey>,
    #[prost(string, optional, tag = "15")]
    pub video_feature: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EntitledKey {
    #[prost(bytes = "vec", tag = "1")]
    pub entitlement_key_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub key_id: Vec<u8>,
    /// Content key wrapped with the entitlement key.
    #[prost(bytes = "vec", tag = "3")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub iv: Vec<u8>,
    #[prost(uint32, optional, tag = "5")]
    pub entitlement_key_size_bytes: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Algorithm {
    Unencrypted = 0,
    Aesctr = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PsshType {
    Single = 0,
    Entitlement = 1,
    EntitledKey = 2,
}

impl WidevinePsshData {
    /// Payload carrying only the given key IDs, in order.
    pub fn from_key_ids<I, K>(key_ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        WidevinePsshData {
            key_ids: key_ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn protection_scheme_fourcc(&self) -> Option<FourCC> {
        self.protection_scheme.map(FourCC::from_u32)
    }

    pub fn set_protection_scheme_fourcc(&mut self, scheme: FourCC) {
        self.protection_scheme = Some(scheme.to_u32());
    }
}

/// Decodes a `WidevinePsshData` message. Unknown tags are skipped.
pub fn decode_payload(bytes: &[u8]) -> Result<WidevinePsshData> {
    let data = WidevinePsshData::decode(bytes)?;
    trace!(key_ids = data.key_ids.len(), len = bytes.len(), "decoded widevine pssh data");
    Ok(data)
}

pub fn encode_payload(data: &WidevinePsshData) -> Vec<u8> {
    data.encode_to_vec()
}
