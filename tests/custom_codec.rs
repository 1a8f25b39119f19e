use std::cell::Cell;
use std::io::{Read, Write};
use wvpssh::{
    BoxEnvelope, FullBoxCodec, FullBoxHeader, IsoFullBox, Pssh, PsshError, PsshSummary, Result,
    WIDEVINE_SYSTEM_ID, create,
};

/// Wraps the ISO codec and counts calls, standing in for an external
/// container library.
#[derive(Default)]
struct CountingCodec {
    decoded: Cell<usize>,
    encoded: Cell<usize>,
}

impl FullBoxCodec for CountingCodec {
    fn decode_header<R: Read>(&self, r: &mut R, available: u64) -> Result<FullBoxHeader> {
        self.decoded.set(self.decoded.get() + 1);
        IsoFullBox.decode_header(r, available)
    }

    fn encode_header<W: Write>(&self, w: &mut W, hdr: &FullBoxHeader) -> Result<()> {
        self.encoded.set(self.encoded.get() + 1);
        IsoFullBox.encode_header(w, hdr)
    }
}

/// Reports a box size smaller than the header it just read.
struct ShortSizeCodec;

impl FullBoxCodec for ShortSizeCodec {
    fn decode_header<R: Read>(&self, r: &mut R, available: u64) -> Result<FullBoxHeader> {
        let mut hdr = IsoFullBox.decode_header(r, available)?;
        hdr.size = 4;
        Ok(hdr)
    }

    fn encode_header<W: Write>(&self, w: &mut W, hdr: &FullBoxHeader) -> Result<()> {
        IsoFullBox.encode_header(w, hdr)
    }
}

fn to_largesize(compact: &[u8]) -> Vec<u8> {
    let mut large = Vec::new();
    large.extend_from_slice(&1u32.to_be_bytes());
    large.extend_from_slice(b"pssh");
    large.extend_from_slice(&((compact.len() + 8) as u64).to_be_bytes());
    large.extend_from_slice(&compact[8..]);
    large
}

#[test]
fn envelope_goes_through_supplied_codec() {
    let codec = CountingCodec::default();
    let env = BoxEnvelope {
        version: 1,
        flags: 0xABCDEF,
        system_id: WIDEVINE_SYSTEM_ID,
        key_ids: vec![[7u8; 16]],
        payload: b"opaque".to_vec(),
    };

    let raw = env.to_bytes_with(&codec).expect("encode failed");
    let back = BoxEnvelope::parse_with(&codec, &raw).expect("decode failed");

    assert_eq!(back, env);
    assert_eq!(codec.encoded.get(), 1);
    assert_eq!(codec.decoded.get(), 1);
    assert_eq!(raw, env.to_bytes().unwrap());
}

#[test]
fn largesize_header_is_accepted() {
    let compact = BoxEnvelope::new(b"data".to_vec()).to_bytes().unwrap();
    let large = to_largesize(&compact);

    let env = BoxEnvelope::parse(&large).expect("largesize box should parse");
    assert_eq!(env.payload, b"data");
}

#[test]
fn codec_size_below_header_is_structural() {
    let raw = create([[1u8; 16]]).unwrap();
    let err = BoxEnvelope::parse_with(&ShortSizeCodec, &raw).unwrap_err();
    assert!(matches!(err, PsshError::Structural(_)), "{err}");
}

#[test]
fn summary_size_follows_largesize_input() {
    let large = to_largesize(&create([[2u8; 16]]).unwrap());
    let pssh = Pssh::parse(&large).expect("largesize box should parse");

    assert!(pssh.header().is_large());
    assert_eq!(PsshSummary::from(&pssh).size, large.len() as u64);
}
