//! Envelope text encodings: URL-safe base64 for transport, standard base64
//! for at-rest storage. Both padded.

use base64ct::{Base64, Base64Url, Encoding};

/// Base64url encode bytes (padded), for the transport envelope.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64Url::encode_string(data)
}

/// Base64url decode a string to bytes.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64Url::decode_vec(s)
}

/// Standard base64 encode bytes (padded), for the at-rest envelope.
pub fn base64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Standard base64 decode a string to bytes.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_round_trip() {
        let data = b"Hello, World!";
        let encoded = base64url_encode(data);
        assert_eq!(base64url_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn standard_round_trip() {
        let data = b"Hello, World!";
        let encoded = base64_encode(data);
        assert_eq!(base64_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn url_safe_chars() {
        // Bytes that would produce + and / in standard base64
        let data = vec![0xfb, 0xff, 0xfe];
        let encoded = base64url_encode(&data);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        let standard = base64_encode(&data);
        assert_ne!(encoded, standard);
    }

    #[test]
    fn padded() {
        assert!(base64url_encode(b"ab").ends_with('='));
        assert!(base64_encode(b"ab").ends_with('='));
    }

    #[test]
    fn empty_input() {
        assert_eq!(base64url_encode(b""), "");
        assert_eq!(base64url_decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn alphabets_not_interchangeable() {
        let data = vec![0xfb, 0xff, 0xfe];
        assert!(base64_decode(&base64url_encode(&data)).is_err());
    }
}
