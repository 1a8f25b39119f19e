/// Errors returned by the PSSH codec.
#[derive(thiserror::Error, Debug)]
pub enum PsshError {
    /// Truncated or malformed box, wrong type tag, unsupported version.
    #[error("malformed pssh box: {0}")]
    Structural(String),

    /// The box belongs to another DRM system. `found` is the lowercase hex system ID.
    #[error("system id is {found} instead of widevine")]
    SystemIdMismatch { found: String },

    #[error("unmarshal pssh data: {0}")]
    PayloadDecode(#[from] prost::DecodeError),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("encode pssh box: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, PsshError>;

/// Maps a short read on `field` to a structural error.
pub(crate) fn truncated(field: &'static str) -> impl FnOnce(std::io::Error) -> PsshError {
    move |e| PsshError::Structural(format!("truncated {field}: {e}"))
}

pub(crate) fn write_failed(e: std::io::Error) -> PsshError {
    PsshError::Encoding(e.to_string())
}
