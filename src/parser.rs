use crate::boxes::{FourCC, FullBoxHeader};
use crate::error::{PsshError, Result, truncated, write_failed};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Reads and writes the leading header of an ISOBMFF full box.
///
/// The envelope code only talks to this trait, so any container library
/// (or a test double) can supply the header layer.
pub trait FullBoxCodec {
    /// Decodes size, type, version and flags. `available` is the number of
    /// bytes from the start of the box to the end of the input; it resolves
    /// the "box extends to end of input" size of zero.
    fn decode_header<R: Read>(&self, r: &mut R, available: u64) -> Result<FullBoxHeader>;

    fn encode_header<W: Write>(&self, w: &mut W, hdr: &FullBoxHeader) -> Result<()>;
}

/// Plain ISO/IEC 14496-12 full box header encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoFullBox;

impl FullBoxCodec for IsoFullBox {
    fn decode_header<R: Read>(&self, r: &mut R, available: u64) -> Result<FullBoxHeader> {
        let size32 = r.read_u32::<BigEndian>().map_err(truncated("box size"))?;
        let mut typ = [0u8; 4];
        r.read_exact(&mut typ).map_err(truncated("box type"))?;

        let mut size = size32 as u64;
        if size32 == 1 {
            size = r.read_u64::<BigEndian>().map_err(truncated("largesize"))?;
        } else if size32 == 0 {
            size = available;
        }

        let header_size: u64 = if size32 == 1 { 8 + 8 + 4 } else { 8 + 4 };
        if size < header_size {
            return Err(PsshError::Structural(format!(
                "box size {size} smaller than its {header_size} byte header"
            )));
        }

        let version = r.read_u8().map_err(truncated("version"))?;
        let flags = r.read_u24::<BigEndian>().map_err(truncated("flags"))?;

        Ok(FullBoxHeader { size, typ: FourCC(typ), header_size, version, flags })
    }

    fn encode_header<W: Write>(&self, w: &mut W, hdr: &FullBoxHeader) -> Result<()> {
        if hdr.flags > 0x00FF_FFFF {
            return Err(PsshError::Encoding(format!("flags {:#x} exceed 24 bits", hdr.flags)));
        }
        if hdr.is_large() {
            w.write_u32::<BigEndian>(1).map_err(write_failed)?;
            w.write_all(&hdr.typ.0).map_err(write_failed)?;
            w.write_u64::<BigEndian>(hdr.size).map_err(write_failed)?;
        } else {
            let size = u32::try_from(hdr.size)
                .map_err(|_| PsshError::Encoding(format!("box size {} needs largesize", hdr.size)))?;
            w.write_u32::<BigEndian>(size).map_err(write_failed)?;
            w.write_all(&hdr.typ.0).map_err(write_failed)?;
        }
        w.write_u8(hdr.version).map_err(write_failed)?;
        w.write_u24::<BigEndian>(hdr.flags).map_err(write_failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::PSSH;
    use std::io::Cursor;

    #[test]
    fn decodes_compact_header() {
        let raw = [0, 0, 0, 32, b'p', b's', b's', b'h', 1, 0, 0, 5];
        let hdr = IsoFullBox.decode_header(&mut Cursor::new(&raw[..]), 64).unwrap();
        assert_eq!(hdr.size, 32);
        assert_eq!(hdr.typ, PSSH);
        assert_eq!(hdr.header_size, 12);
        assert_eq!(hdr.version, 1);
        assert_eq!(hdr.flags, 5);
    }

    #[test]
    fn decodes_largesize_header() {
        let mut raw = vec![0, 0, 0, 1];
        raw.extend_from_slice(b"pssh");
        raw.extend_from_slice(&40u64.to_be_bytes());
        raw.extend_from_slice(&[0, 0x12, 0x34, 0x56]);
        let hdr = IsoFullBox.decode_header(&mut Cursor::new(raw), 40).unwrap();
        assert_eq!(hdr.size, 40);
        assert_eq!(hdr.header_size, 20);
        assert_eq!(hdr.flags, 0x12_3456);
    }

    #[test]
    fn size_zero_extends_to_available() {
        let raw = [0, 0, 0, 0, b'p', b's', b's', b'h', 0, 0, 0, 0];
        let hdr = IsoFullBox.decode_header(&mut Cursor::new(&raw[..]), 48).unwrap();
        assert_eq!(hdr.size, 48);
    }

    #[test]
    fn rejects_size_below_header() {
        let raw = [0, 0, 0, 8, b'p', b's', b's', b'h', 0, 0, 0, 0];
        let err = IsoFullBox.decode_header(&mut Cursor::new(&raw[..]), 12).unwrap_err();
        assert!(matches!(err, PsshError::Structural(_)));
    }

    #[test]
    fn truncated_flags_is_structural() {
        let raw = [0, 0, 0, 32, b'p', b's', b's', b'h', 0, 0];
        let err = IsoFullBox.decode_header(&mut Cursor::new(&raw[..]), 10).unwrap_err();
        assert!(matches!(err, PsshError::Structural(_)));
    }

    #[test]
    fn encode_matches_decode() {
        let hdr = FullBoxHeader::for_body(PSSH, 1, 0x00_0102, 100);
        let mut buf = Vec::new();
        IsoFullBox.encode_header(&mut buf, &hdr).unwrap();
        assert_eq!(buf.len(), 12);
        let back = IsoFullBox.decode_header(&mut Cursor::new(buf), 112).unwrap();
        assert_eq!(back, hdr);
    }

    #[test]
    fn encode_rejects_wide_flags() {
        let hdr = FullBoxHeader::for_body(PSSH, 0, 0x0100_0000, 0);
        let err = IsoFullBox.encode_header(&mut Vec::new(), &hdr).unwrap_err();
        assert!(matches!(err, PsshError::Encoding(_)));
    }
}
