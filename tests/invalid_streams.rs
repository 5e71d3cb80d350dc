//! Malformed wrapper and trailer handling.

use std::io::Write;

use undeflate::{DeflateDecoder, DeflateFormat};

fn crc32(data: &[u8]) -> u32
{
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Stored-block encoding of "hello", used as a minimal valid payload
const HELLO_DEFLATE: [u8; 10] = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'h', b'e', b'l', b'l', b'o'];

fn gzip_container(deflate: &[u8], original: &[u8]) -> Vec<u8>
{
    let mut out = vec![0x1F, 0x8B, 8, 0, 0, 0, 0, 0, 0, 0xFF];

    out.extend_from_slice(deflate);
    out.extend_from_slice(&crc32(original).to_le_bytes());
    out.extend_from_slice(&(original.len() as u32).to_le_bytes());

    out
}

fn zlib_compress(data: &[u8]) -> Vec<u8>
{
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::new(6));

    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn zlib_fcheck_flip_is_rejected()
{
    let mut data = zlib_compress(b"hello world");

    // any single bit change to FLG breaks divisibility by 31
    data[1] ^= 1;

    let mut decoder = DeflateDecoder::new(&data);
    let err = decoder.decode().unwrap_err();

    assert!(!err.is_checksum_mismatch());
    assert!(format!("{err:?}").contains("ERR12"));
}

#[test]
fn zlib_fdict_is_rejected()
{
    // CMF 0x78, FLG 0x20: FCHECK passes, FDICT set
    let data = [0x78, 0x20, 0, 0, 0, 0];

    let mut decoder = DeflateDecoder::new(&data);
    let err = decoder.decode().unwrap_err();

    assert!(format!("{err:?}").contains("ERR14"));
}

#[test]
fn zlib_cinfo_above_seven_is_rejected()
{
    // CMF 0x88 declares a 64 KB window, FLG 0x1C keeps FCHECK valid
    let data = [0x88, 0x1C, 0, 0, 0, 0];

    let mut decoder = DeflateDecoder::new(&data);
    let err = decoder.decode().unwrap_err();

    assert!(format!("{err:?}").contains("ERR13"));
}

#[test]
fn zlib_trailer_corruption_is_a_checksum_error()
{
    let mut data = zlib_compress(b"hello world");
    let last = data.len() - 1;

    data[last] ^= 0xFF;

    let mut decoder = DeflateDecoder::new(&data);
    let err = decoder.decode().unwrap_err();

    assert!(err.is_checksum_mismatch());
}

#[test]
fn gzip_unknown_flags_are_rejected()
{
    let mut data = vec![0x1F, 0x8B, 8, 0x20];

    data.resize(18, 0);

    let mut decoder = DeflateDecoder::new(&data);
    let err = decoder.decode().unwrap_err();

    assert!(format!("{err:?}").contains("ERR10"));
}

#[test]
fn gzip_with_all_optional_fields_decodes()
{
    let mut header = vec![0x1F, 0x8B, 8, 0x1E, 0, 0, 0, 0, 0, 0xFF];

    // FEXTRA: length prefixed payload
    header.extend_from_slice(&4_u16.to_le_bytes());
    header.extend_from_slice(b"ex\x01\x02");
    // FNAME and FCOMMENT: NUL terminated
    header.extend_from_slice(b"file.txt\x00");
    header.extend_from_slice(b"a comment\x00");
    // FHCRC: low half of the CRC-32 over everything so far
    let crc16 = (crc32(&header) & 0xFFFF) as u16;
    header.extend_from_slice(&crc16.to_le_bytes());

    header.extend_from_slice(&HELLO_DEFLATE);
    header.extend_from_slice(&crc32(b"hello").to_le_bytes());
    header.extend_from_slice(&5_u32.to_le_bytes());

    let mut decoder = DeflateDecoder::new(&header);
    let decoded = decoder.decode().unwrap();

    assert_eq!(decoded, b"hello");
    assert_eq!(decoder.format(), Some(DeflateFormat::Gzip));
}

#[test]
fn gzip_bad_header_crc_is_rejected()
{
    let mut header = vec![0x1F, 0x8B, 8, 0x02, 0, 0, 0, 0, 0, 0xFF];

    let crc16 = (crc32(&header) & 0xFFFF) as u16;
    header.extend_from_slice(&(crc16 ^ 0x5555).to_le_bytes());

    header.extend_from_slice(&HELLO_DEFLATE);
    header.extend_from_slice(&crc32(b"hello").to_le_bytes());
    header.extend_from_slice(&5_u32.to_le_bytes());

    let mut decoder = DeflateDecoder::new(&header);
    let err = decoder.decode().unwrap_err();

    assert!(format!("{err:?}").contains("ERR11"));
}

#[test]
fn gzip_stored_nlen_corruption_is_rejected()
{
    let mut corrupted = HELLO_DEFLATE;
    corrupted[3] ^= 1;

    let data = gzip_container(&corrupted, b"hello");

    let mut decoder = DeflateDecoder::new(&data);
    let err = decoder.decode().unwrap_err();

    assert!(!err.is_checksum_mismatch());
    assert!(format!("{err:?}").contains("ERR03"));
}

#[test]
fn gzip_trailer_crc_corruption_is_a_checksum_error()
{
    let mut data = gzip_container(&HELLO_DEFLATE, b"hello");
    let crc_pos = data.len() - 8;

    data[crc_pos] ^= 0xFF;

    let mut decoder = DeflateDecoder::new(&data);
    let err = decoder.decode().unwrap_err();

    assert!(err.is_checksum_mismatch());
}

#[test]
fn gzip_isize_is_only_a_hint()
{
    let mut data = gzip_container(&HELLO_DEFLATE, b"hello");
    let isize_pos = data.len() - 4;

    // a nonsense size word must not fail the decode
    data[isize_pos..].copy_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());

    let mut decoder = DeflateDecoder::new(&data);
    let decoded = decoder.decode().unwrap();

    assert_eq!(decoded, b"hello");
}

#[test]
fn decode_gzip_rejects_other_framings()
{
    let data = zlib_compress(b"hello");

    let mut decoder = DeflateDecoder::new(&data);

    assert!(decoder.decode_gzip().is_err());
}

#[test]
fn decode_zlib_rejects_other_framings()
{
    let data = gzip_container(&HELLO_DEFLATE, b"hello");

    let mut decoder = DeflateDecoder::new(&data);

    assert!(decoder.decode_zlib().is_err());
}

#[test]
fn empty_input_is_invalid_not_a_panic()
{
    let mut decoder = DeflateDecoder::new(&[]);
    let err = decoder.decode().unwrap_err();

    assert!(!err.is_checksum_mismatch());
}

#[test]
fn checksum_confirmation_can_be_disabled()
{
    use undeflate::DeflateOptions;

    let mut data = zlib_compress(b"hello world");
    let last = data.len() - 1;

    data[last] ^= 0xFF;

    let options = DeflateOptions::default().set_confirm_checksum(false);
    let mut decoder = DeflateDecoder::new_with_options(&data, options);

    assert_eq!(decoder.decode().unwrap(), b"hello world");
}

#[test]
fn output_limit_is_enforced()
{
    use undeflate::{errors::DecodeErrorStatus, DeflateOptions};

    let options = DeflateOptions::default().set_limit(2);
    let mut decoder = DeflateDecoder::new_with_options(&HELLO_DEFLATE, options);

    let err = decoder.decode_deflate().unwrap_err();

    assert!(matches!(err.error, DecodeErrorStatus::OutputLimitExceeded(2, _)));
}
