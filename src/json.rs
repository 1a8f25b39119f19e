use crate::boxes::FullBoxHeader;
use crate::envelope::BoxEnvelope;
use crate::payload::{Algorithm, PsshType, WidevinePsshData};
use crate::pssh::Pssh;
use serde::Serialize;

/// A JSON-serializable view of a PSSH box, for the CLI and for callers
/// that want to log or display what a box carries.
///
/// Byte fields are lowercase hex strings.
#[derive(Debug, Serialize)]
pub struct PsshSummary {
    /// Total encoded size of the box
    pub size: u64,
    pub version: u8,
    pub flags: u32,
    /// 32 hex chars, no separators
    pub system_id: String,
    /// True when `system_id` is Widevine's
    pub widevine: bool,
    /// Key IDs listed in a version 1 box header
    pub header_key_ids: Vec<String>,
    /// Length of the opaque `Data` field
    pub data_size: usize,
    /// Decoded payload; absent for non-Widevine boxes
    pub data: Option<PsshDataSummary>,
}

#[derive(Debug, Serialize)]
pub struct PsshDataSummary {
    pub key_ids: Vec<String>,
    pub content_id: Option<String>,
    /// `content_id` as text when it is valid UTF-8
    pub content_id_text: Option<String>,
    pub algorithm: Option<String>,
    pub provider: Option<String>,
    pub track_type: Option<String>,
    pub policy: Option<String>,
    pub protection_scheme: Option<String>,
    pub crypto_period_index: Option<u32>,
    pub crypto_period_seconds: Option<u32>,
    pub pssh_type: Option<String>,
    pub key_sequence: Option<u32>,
    pub group_ids: Vec<String>,
    pub entitled_key_count: usize,
    pub video_feature: Option<String>,
}

impl PsshSummary {
    /// `header` is the header the box was parsed with, so `size` reflects
    /// the size form actually used.
    pub fn new(header: &FullBoxHeader, envelope: &BoxEnvelope, data: Option<&WidevinePsshData>) -> Self {
        PsshSummary {
            size: header.size,
            version: envelope.version,
            flags: envelope.flags,
            system_id: envelope.system_id_hex(),
            widevine: envelope.ensure_widevine().is_ok(),
            header_key_ids: envelope.key_ids.iter().map(hex::encode).collect(),
            data_size: envelope.payload.len(),
            data: data.map(PsshDataSummary::from),
        }
    }
}

impl From<&Pssh> for PsshSummary {
    fn from(p: &Pssh) -> Self {
        PsshSummary::new(p.header(), p.envelope(), Some(p.data()))
    }
}

impl From<&WidevinePsshData> for PsshDataSummary {
    fn from(d: &WidevinePsshData) -> Self {
        PsshDataSummary {
            key_ids: d.key_ids.iter().map(hex::encode).collect(),
            content_id: d.content_id.as_ref().map(hex::encode),
            content_id_text: d
                .content_id
                .as_ref()
                .and_then(|c| std::str::from_utf8(c).ok())
                .map(str::to_owned),
            algorithm: d.algorithm.map(|v| enum_name::<Algorithm>(v)),
            provider: d.provider.clone(),
            track_type: d.track_type.clone(),
            policy: d.policy.clone(),
            protection_scheme: d.protection_scheme_fourcc().map(|cc| cc.to_string()),
            crypto_period_index: d.crypto_period_index,
            crypto_period_seconds: d.crypto_period_seconds,
            pssh_type: d.pssh_type.map(|v| enum_name::<PsshType>(v)),
            key_sequence: d.key_sequence,
            group_ids: d.group_ids.iter().map(hex::encode).collect(),
            entitled_key_count: d.entitled_keys.len(),
            video_feature: d.video_feature.clone(),
        }
    }
}

/// Variant name, or the raw number for values the schema doesn't define.
fn enum_name<E: TryFrom<i32> + std::fmt::Debug>(v: i32) -> String {
    E::try_from(v).map_or_else(|_| v.to_string(), |e| format!("{e:?}"))
}
