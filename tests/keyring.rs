use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use binauthz_voucher::{Attestation, KeyRing, Result, Signer, SigningKey, VoucherError};
use p256::ecdsa::signature::Verifier;
use p256::pkcs8::{EncodePrivateKey, LineEnding};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

fn p256_key(seed: u8) -> p256::ecdsa::SigningKey {
    p256::ecdsa::SigningKey::from_slice(&[seed; 32]).unwrap()
}

#[test]
fn test_empty_keyring_cannot_sign() {
    let keyring = KeyRing::new();
    assert!(!keyring.can_sign());
    assert!(keyring.is_empty());

    let err = keyring.sign("diy", "body").unwrap_err();
    assert!(matches!(err, VoucherError::NoSigningKey(ref name) if name == "diy"));
}

#[test]
fn test_p256_signature_verifies() -> Result<()> {
    let key = p256_key(0x42);
    let verifying_key = *key.verifying_key();
    let keyring = KeyRing::new().with_key("diy", SigningKey::P256(key));
    assert!(keyring.can_sign());

    let body = r#"{"critical":{}}"#;
    let (signature, key_id) = keyring.sign("diy", body)?;

    let der = BASE64.decode(signature).unwrap();
    let signature = p256::ecdsa::Signature::from_der(&der).unwrap();
    assert!(verifying_key.verify(body.as_bytes(), &signature).is_ok());

    let expected_id = hex::encode(Sha256::digest(
        verifying_key.to_encoded_point(true).as_bytes(),
    ));
    assert_eq!(key_id, expected_id);
    Ok(())
}

#[test]
fn test_ed25519_signature_verifies() -> Result<()> {
    let key = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
    let verifying_key = key.verifying_key();
    let keyring = KeyRing::new().with_key("provenance", SigningKey::Ed25519(key));

    let signed = keyring.sign_attestation(Attestation::new("provenance", "payload"))?;
    assert_eq!(signed.check_name(), "provenance");
    assert_eq!(signed.body(), "payload");

    let bytes: [u8; 64] = BASE64
        .decode(signed.signature())
        .unwrap()
        .try_into()
        .unwrap();
    let signature = ed25519_dalek::Signature::from_bytes(&bytes);
    assert!(verifying_key.verify_strict(b"payload", &signature).is_ok());
    Ok(())
}

#[test]
fn test_keys_are_per_check() -> Result<()> {
    let keyring = KeyRing::new()
        .with_key("diy", SigningKey::P256(p256_key(1)))
        .with_key("snakeoil", SigningKey::P256(p256_key(2)));

    let (_, diy_id) = keyring.sign("diy", "body")?;
    let (_, snakeoil_id) = keyring.sign("snakeoil", "body")?;
    assert_ne!(diy_id, snakeoil_id);
    assert!(keyring.sign("provenance", "body").is_err());
    Ok(())
}

#[tokio::test]
async fn test_load_keys_from_pem_files() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();

    let p256_path = temp_dir.path().join("diy.pem");
    let pem = p256_key(3).to_pkcs8_pem(LineEnding::LF).unwrap();
    std::fs::write(&p256_path, pem.as_bytes())?;

    let keyring = KeyRing::from_pem_files([("diy", &p256_path)]).await?;
    assert!(matches!(keyring.get("diy"), Some(SigningKey::P256(_))));
    assert_eq!(
        keyring.get("diy").unwrap().key_id(),
        SigningKey::P256(p256_key(3)).key_id()
    );

    let missing = temp_dir.path().join("missing.pem");
    let err = KeyRing::from_pem_files([("diy", &missing)])
        .await
        .unwrap_err();
    assert!(matches!(err, VoucherError::Key(_)));
    Ok(())
}

#[test]
fn test_rejects_non_pkcs8_material() {
    let err = SigningKey::from_pem("-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----")
        .unwrap_err();
    assert!(matches!(err, VoucherError::Key(_)));
}
