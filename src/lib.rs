pub mod boxes;
pub mod envelope;
pub mod error;
pub mod json;
pub mod parser;
pub mod payload;
pub mod pssh;
pub mod util;

pub use boxes::{FourCC, FullBoxHeader, PSSH};
pub use envelope::BoxEnvelope;
pub use error::{PsshError, Result};
pub use json::PsshSummary;
pub use parser::{FullBoxCodec, IsoFullBox};
pub use payload::{Algorithm, EntitledKey, PsshType, WidevinePsshData, decode_payload, encode_payload};
pub use pssh::{Pssh, PsshOptions, create};
pub use util::{WIDEVINE_SYSTEM_ID, WIDEVINE_SYSTEM_ID_HEX, hex_to_bytes};
