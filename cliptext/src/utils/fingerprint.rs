//! Content fingerprinting for clipboard text.
//!
//! A fingerprint is the lowercase hex MD5 digest of the text's UTF-8 bytes.
//! It only needs to detect repeated content, not resist tampering.
//!
//! # Example
//!
//! ```
//! use cliptext::utils::fingerprint::fingerprint;
//!
//! assert_eq!(fingerprint(""), "d41d8cd98f00b204e9800998ecf8427e");
//! assert_eq!(fingerprint("hello"), fingerprint("hello"));
//! assert_ne!(fingerprint("hello"), fingerprint("Hello"));
//! ```

/// Returns the fingerprint of `text`.
#[must_use]
pub fn fingerprint(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(fingerprint(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(fingerprint("hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn is_32_lowercase_hex_chars() {
        let fp = fingerprint("some clipboard contents\nwith a newline");
        assert_eq!(fp.len(), 32);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn whitespace_is_significant() {
        assert_ne!(fingerprint("text"), fingerprint("text "));
        assert_ne!(fingerprint("text"), fingerprint("text\n"));
    }

    #[test]
    fn unicode_text_is_hashed_by_bytes() {
        assert_eq!(fingerprint("héllo 👋"), fingerprint("héllo 👋"));
        assert_ne!(fingerprint("héllo"), fingerprint("hello"));
    }
}
