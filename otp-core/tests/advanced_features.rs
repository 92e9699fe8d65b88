#![allow(missing_docs)]
use std::fs;

use otp_core::protocol::{self, Truncation};
use otp_core::{Buffer, Error};
use tempfile::tempdir;

fn message(bytes: &[u8]) -> Buffer {
    Buffer::copy_from(bytes).expect("Failed to allocate message")
}

#[test]
fn test_otp_round_trip_with_same_key() {
    // 1. Setup: a key file used in dry-run mode so both sides see the same bytes
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let key_path = temp_dir.path().join("shared.pad");
    let key: Vec<u8> = (0..64u8).map(|i| i.wrapping_mul(37) ^ 0xA5).collect();
    fs::write(&key_path, &key).expect("Failed to write key file");

    // 2. Encrypt
    let plaintext = b"Attack at dawn, bring snacks.";
    let ciphertext = protocol::apply(&key_path, message(plaintext), Truncation::Keep)
        .expect("Encryption failed")
        .into_output();
    assert_ne!(ciphertext.as_bytes(), plaintext);

    // 3. Decrypt with the very same key bytes
    let decrypted = protocol::apply(&key_path, ciphertext, Truncation::Keep)
        .expect("Decryption failed")
        .into_output();
    assert_eq!(decrypted.as_bytes(), plaintext);
}

#[test]
fn test_truncation_shrinks_key_and_never_reuses_bytes() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let key_path = temp_dir.path().join("one-time.pad");
    let key: Vec<u8> = (0..100u8).collect();
    fs::write(&key_path, &key).expect("Failed to write key file");

    let plaintext = [0u8; 30];
    let first = protocol::apply(&key_path, message(&plaintext), Truncation::Destroy)
        .expect("First encryption failed");
    assert_eq!(first.key_bytes_remaining(), 70);
    assert_eq!(fs::metadata(&key_path).expect("metadata").len(), 70);
    // XOR with zeros exposes the key bytes that were drawn.
    assert_eq!(first.output().as_bytes(), &key[70..]);

    let second = protocol::apply(&key_path, message(&plaintext), Truncation::Destroy)
        .expect("Second encryption failed");
    assert_eq!(second.output().as_bytes(), &key[40..70]);
    assert_ne!(first.output(), second.output());
    assert_eq!(fs::metadata(&key_path).expect("metadata").len(), 40);
}

#[test]
fn test_key_file_can_be_used_up_exactly() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let key_path = temp_dir.path().join("exact.pad");
    fs::write(&key_path, b"0123456789").expect("Failed to write key file");

    let consumed = protocol::apply(&key_path, message(b"ten bytes!"), Truncation::Destroy)
        .expect("Encryption failed");
    assert_eq!(consumed.key_bytes_remaining(), 0);
    assert!(fs::read(&key_path).expect("read").is_empty());

    let result = protocol::apply(&key_path, message(b"x"), Truncation::Destroy);
    assert!(matches!(
        result,
        Err(Error::KeyTooShort {
            needed: 1,
            available: 0
        })
    ));
}

#[test]
fn test_short_key_leaves_key_file_byte_for_byte() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let key_path = temp_dir.path().join("short.pad");
    let key = b"tiny key".to_vec();
    fs::write(&key_path, &key).expect("Failed to write key file");

    let result = protocol::apply(
        &key_path,
        message(b"a message that is clearly longer than the key"),
        Truncation::Destroy,
    );
    assert!(matches!(result, Err(Error::KeyTooShort { .. })));
    assert_eq!(fs::read(&key_path).expect("read"), key);
}
