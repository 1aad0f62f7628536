use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use log::debug;

use super::error::LoadError;

// ---------------------------------------------------------------------------
// Encoding fallback chain
// ---------------------------------------------------------------------------

/// Text encodings tried, in order, when decoding an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8Sig,
    Utf16Bom,
    Utf8,
    Utf16,
    Latin1,
    Windows1252,
}

const CHAIN: [(TextEncoding, fn(&[u8]) -> Option<String>); 6] = [
    (TextEncoding::Utf8Sig, decode_utf8_sig),
    (TextEncoding::Utf16Bom, decode_utf16_bom),
    (TextEncoding::Utf8, decode_utf8),
    (TextEncoding::Utf16, decode_utf16_guess),
    (TextEncoding::Latin1, decode_latin1),
    (TextEncoding::Windows1252, decode_windows_1252),
];

/// Decode raw bytes with the first encoding that accepts them.
pub fn decode(bytes: &[u8]) -> Result<(String, TextEncoding), LoadError> {
    for (encoding, attempt) in CHAIN {
        if let Some(text) = attempt(bytes) {
            debug!("decoded {} bytes as {encoding:?}", bytes.len());
            return Ok((text, encoding));
        }
    }
    Err(LoadError::Decode)
}

fn decode_utf8_sig(bytes: &[u8]) -> Option<String> {
    let (encoding, bom_len) = Encoding::for_bom(bytes)?;
    if encoding != UTF_8 {
        return None;
    }
    decode_utf8(&bytes[bom_len..])
}

fn decode_utf16_bom(bytes: &[u8]) -> Option<String> {
    let (encoding, bom_len) = Encoding::for_bom(bytes)?;
    if encoding == UTF_8 {
        return None;
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(|text| text.into_owned())
}

/// Strict UTF-8. Text with embedded NULs is almost certainly UTF-16 that
/// happens to be valid UTF-8, so it is refused here.
fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    if text.contains('\0') {
        return None;
    }
    Some(text.to_owned())
}

/// BOM-less UTF-16. Only attempted when the data carries NUL bytes; the
/// byte lane holding most of them decides the endianness.
fn decode_utf16_guess(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 || !bytes.contains(&0) {
        return None;
    }
    let even_nuls = bytes.iter().step_by(2).filter(|&&b| b == 0).count();
    let odd_nuls = bytes.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let encoding = if odd_nuls >= even_nuls { UTF_16LE } else { UTF_16BE };

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// ISO-8859-1. Refuses C1 control bytes, which never occur in text exports
/// and signal Windows-1252 punctuation instead.
fn decode_latin1(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return None;
    }
    Some(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Windows-1252, refusing the five byte values the code page leaves undefined.
fn decode_windows_1252(bytes: &[u8]) -> Option<String> {
    const UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];
    if bytes.iter().any(|b| UNDEFINED.contains(b)) {
        return None;
    }
    WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str, bom: bool) -> Vec<u8> {
        let mut out = if bom { vec![0xFF, 0xFE] } else { Vec::new() };
        for unit in text.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_utf8_with_signature() {
        let bytes = b"\xEF\xBB\xBF100,-30\n";
        let (text, enc) = decode(bytes).unwrap();
        assert_eq!(text, "100,-30\n");
        assert_eq!(enc, TextEncoding::Utf8Sig);
    }

    #[test]
    fn test_plain_utf8() {
        let (text, enc) = decode("Frequência;S21\n".as_bytes()).unwrap();
        assert_eq!(text, "Frequência;S21\n");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_utf16_with_bom() {
        let (text, enc) = decode(&utf16le("1e8 0 -30\n", true)).unwrap();
        assert_eq!(text, "1e8 0 -30\n");
        assert_eq!(enc, TextEncoding::Utf16Bom);
    }

    #[test]
    fn test_utf16_without_bom() {
        let (text, enc) = decode(&utf16le("1e8 0 -30\n", false)).unwrap();
        assert_eq!(text, "1e8 0 -30\n");
        assert_eq!(enc, TextEncoding::Utf16);
    }

    #[test]
    fn test_latin1() {
        // "Fréq" in ISO-8859-1
        let (text, enc) = decode(b"Fr\xE9q\n").unwrap();
        assert_eq!(text, "Fréq\n");
        assert_eq!(enc, TextEncoding::Latin1);
    }

    #[test]
    fn test_windows_1252() {
        // 0x96 is an en dash in Windows-1252 and a C1 control in Latin-1.
        let (text, enc) = decode(b"S21 \x96 dB\n").unwrap();
        assert_eq!(text, "S21 \u{2013} dB\n");
        assert_eq!(enc, TextEncoding::Windows1252);
    }

    #[test]
    fn test_undecodable() {
        // Odd length, invalid UTF-8, C1 byte, and an undefined Windows-1252 byte.
        assert!(matches!(decode(b"\x81\xFF\x00"), Err(LoadError::Decode)));
    }
}
