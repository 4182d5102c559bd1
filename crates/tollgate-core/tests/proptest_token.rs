//! Property-based tests for the identity cipher and token codec
//!
//! These tests verify:
//! - Cipher round-trips for arbitrary identities and passphrases
//! - Ciphertext is deterministic (no hidden randomness)
//! - Hex encoding round-trips for all byte sequences
//! - Malformed tokens never cause panics
//! - Tampering with any token segment is always detected

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;
use std::collections::BTreeMap;
use tollgate_core::{from_hex, to_hex, GateConfig, IdentityCipher, TokenCodec};

// ============================================================================
// Strategies
// ============================================================================

/// Non-blank identity strings (the cipher rejects blank input by contract)
fn arb_identity() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,40}"
}

/// Arbitrary passphrases, including unicode
fn arb_passphrase() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9!-/]{1,64}",
        "\\PC{1,20}",
    ]
}

/// Malformed token strings
fn arb_malformed_token() -> impl Strategy<Value = String> {
    prop_oneof![
        // No dots
        "[a-zA-Z0-9_-]{10,50}",
        // Too many segments
        "[a-zA-Z0-9_-]{5,15}(\\.[a-zA-Z0-9_-]{5,15}){3,5}",
        // Empty segments
        Just("..".to_string()),
        Just(".".to_string()),
        Just("a..c".to_string()),
        // Non-base64url characters
        "[!@#$%^&*()]{5,20}\\.[a-zA-Z0-9_-]{10,20}\\.[a-zA-Z0-9_-]{10,20}",
        // Valid base64url but not JWT content
        any::<[u8; 24]>().prop_map(|bytes| {
            let seg = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
            format!("{seg}.{seg}.{seg}")
        }),
    ]
}

fn codec() -> TokenCodec {
    let secret = STANDARD.encode("0123456789abcdef0123456789abcdef");
    TokenCodec::new(&GateConfig::new("proptest-passphrase", secret)).unwrap()
}

// ============================================================================
// Cipher properties
// ============================================================================

proptest! {
    /// Property: encrypt then decrypt recovers the identity for any
    /// (identity, passphrase) pair
    #[test]
    fn prop_cipher_roundtrip(identity in arb_identity(), passphrase in arb_passphrase()) {
        let cipher = IdentityCipher::new(&passphrase);
        let hex = cipher.encrypt_to_hex(&identity).unwrap();
        prop_assert_eq!(cipher.decrypt_from_hex(&hex).unwrap(), identity);
    }

    /// Property: ciphertext is deterministic - two independent encryptions
    /// of the same input agree, including across cipher instances
    #[test]
    fn prop_cipher_deterministic(identity in arb_identity(), passphrase in arb_passphrase()) {
        let first = IdentityCipher::new(&passphrase);
        let second = IdentityCipher::new(&passphrase);
        prop_assert_eq!(first.encrypt(&identity), second.encrypt(&identity));
    }

    /// Property: hex round-trips for every byte sequence, including empty
    #[test]
    fn prop_hex_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assert_eq!(from_hex(&to_hex(&bytes)).unwrap(), bytes);
    }

    /// Property: odd-length hex never decodes
    #[test]
    fn prop_odd_hex_rejected(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut odd = to_hex(&bytes);
        odd.push('A');
        prop_assert_eq!(from_hex(&odd), None);
    }

    /// Property: decrypting arbitrary bytes never panics
    #[test]
    fn prop_decrypt_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..128),
        passphrase in arb_passphrase(),
    ) {
        let cipher = IdentityCipher::new(&passphrase);
        let _ = cipher.decrypt(&data);
    }
}

// ============================================================================
// Codec properties
// ============================================================================

proptest! {
    /// Property: a freshly issued token always parses and yields the inputs
    #[test]
    fn prop_issue_parse_fidelity(
        identity in arb_identity(),
        name in "[a-zA-Z ]{1,30}",
        fingerprint in "[ -~]{1,80}",
    ) {
        let codec = codec();
        let token = codec.issue(&identity, &name, &fingerprint, &BTreeMap::new()).unwrap();
        let claims = codec.parse(&token).unwrap();
        prop_assert_eq!(&claims.user_name, &name);
        prop_assert_eq!(&claims.user_agent, &fingerprint);

        let session = codec.validate_and_refresh(&token).unwrap();
        prop_assert_eq!(session.identity, identity);
        prop_assert_eq!(session.fingerprint, fingerprint);
    }

    /// Property: malformed tokens are rejected without panicking
    #[test]
    fn prop_malformed_tokens_rejected(token in arb_malformed_token()) {
        let codec = codec();
        prop_assert!(codec.parse(&token).is_err());
    }

    /// Property: flipping any character of the claims or signature segment
    /// invalidates the token
    #[test]
    fn prop_tampered_token_rejected(identity in arb_identity(), pos in any::<prop::sample::Index>()) {
        let codec = codec();
        let token = codec.issue(&identity, "Judy", "UA-X", &BTreeMap::new()).unwrap();

        // Only touch the claims and signature segments; pick a position there
        let header_len = token.find('.').unwrap() + 1;
        let tail_len = token.len() - header_len;
        let idx = header_len + pos.index(tail_len);

        let mut bytes = token.clone().into_bytes();
        if bytes[idx] == b'.' {
            // Separator itself: replace it to break the three-part structure
            bytes[idx] = b'x';
        } else {
            bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        }
        let tampered = String::from_utf8(bytes).unwrap();
        prop_assert_ne!(&tampered, &token);

        prop_assert!(codec.parse(&tampered).is_err());
    }
}
