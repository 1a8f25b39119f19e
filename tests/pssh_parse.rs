use hex_literal::hex;
use wvpssh::{Algorithm, Pssh, PsshError, WIDEVINE_SYSTEM_ID, create, encode_payload};

// Widevine test content box: provider "widevine_test", one key ID,
// content ID, track type "HD" and an empty policy.
const SAMPLE_B64: &str = "AAAAW3Bzc2gAAAAA7e+LqXnWSs6jyCfc1R0h7QAAADsIARIQ62dqu8s0Xpa7z2FmMPGj2hoNd2lkZXZpbmVfdGVzdCIQZmtqM2xqYXNkZmFsa3IzaioCSEQyAA==";

const KID_A: [u8; 16] = hex!("0a0b0c0d0e0f10111213141516171819");
const KID_B: [u8; 16] = hex!("f0e0d0c0b0a090807060504030201000");

#[test]
fn parse_real_widevine_box() {
    let pssh = Pssh::from_base64(SAMPLE_B64).expect("sample should parse");

    assert_eq!(pssh.version(), 0);
    assert_eq!(pssh.flags(), 0);
    assert_eq!(pssh.system_id(), &WIDEVINE_SYSTEM_ID);
    assert_eq!(pssh.raw_data().len(), 59);
    assert_eq!(pssh.key_ids(), vec![&hex!("eb676abbcb345e96bbcf616630f1a3da")[..]]);
    assert_eq!(pssh.content_id(), Some(&b"fkj3ljasdfalkr3j"[..]));

    let data = pssh.data();
    assert_eq!(data.algorithm(), Algorithm::Aesctr);
    assert_eq!(data.provider.as_deref(), Some("widevine_test"));
    assert_eq!(data.track_type.as_deref(), Some("HD"));
    assert_eq!(data.policy.as_deref(), Some(""));
    assert_eq!(data.protection_scheme, None);
}

#[test]
fn real_box_reencodes_byte_for_byte() {
    let pssh = Pssh::from_base64(SAMPLE_B64).unwrap();
    assert_eq!(pssh.to_base64().unwrap(), SAMPLE_B64);
    // the payload encoder is canonical for this message too
    assert_eq!(encode_payload(pssh.data()), pssh.raw_data());
}

#[test]
fn create_then_parse_preserves_key_order() {
    let raw = create([KID_A, KID_B]).expect("create failed");
    let declared = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
    assert_eq!(declared, raw.len());

    let pssh = Pssh::parse(&raw).expect("parse failed");
    assert_eq!(pssh.key_ids(), vec![&KID_A[..], &KID_B[..]]);

    let reversed = Pssh::parse(&create([KID_B, KID_A]).unwrap()).unwrap();
    assert_eq!(reversed.key_ids(), vec![&KID_B[..], &KID_A[..]]);
}

#[test]
fn create_from_text_key_ids() {
    let kids = ["0a0b0c0d-0e0f-1011-1213-141516171819", "F0E0 D0C0 B0A0 9080 7060 5040 3020 1000"]
        .iter()
        .map(|k| wvpssh::hex_to_bytes(k).unwrap())
        .collect::<Vec<_>>();
    let pssh = Pssh::parse(&create(kids).unwrap()).unwrap();
    assert_eq!(pssh.key_ids(), vec![&KID_A[..], &KID_B[..]]);
}

#[test]
fn other_drm_systems_are_rejected() {
    let mut raw = create([KID_A]).unwrap();
    raw[12..28].copy_from_slice(&hex!("9a04f07998404286ab92e65be0885f95"));

    match Pssh::parse(&raw) {
        Err(PsshError::SystemIdMismatch { found }) => {
            assert_eq!(found, "9a04f07998404286ab92e65be0885f95")
        }
        other => panic!("expected system id mismatch, got {other:?}"),
    }
}

#[test]
fn truncated_box_is_structural() {
    let raw = create([KID_A]).unwrap();
    for cut in [10, 27, 30, raw.len() - 1] {
        let err = Pssh::parse(&raw[..cut]).unwrap_err();
        assert!(matches!(err, PsshError::Structural(_)), "cut at {cut}: {err}");
    }
}
