pub mod keyring;

pub use keyring::{KeyRing, SigningKey};

use crate::Result;
use serde::{Deserialize, Serialize};

/// A statement that a named check ran against an image, ready to be signed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub check_name: String,
    pub body: String,
}

impl Attestation {
    pub fn new(check_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            body: body.into(),
        }
    }
}

/// An [`Attestation`] together with its signature.
///
/// Only a [`Signer`] (or the store conversion reading one back) produces
/// these, and the body cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedAttestation {
    attestation: Attestation,
    signature: String,
    key_id: String,
}

impl SignedAttestation {
    pub(crate) fn new(attestation: Attestation, signature: String, key_id: String) -> Self {
        Self {
            attestation,
            signature,
            key_id,
        }
    }

    pub fn check_name(&self) -> &str {
        &self.attestation.check_name
    }

    pub fn body(&self) -> &str {
        &self.attestation.body
    }

    /// Base64-encoded signature over the body
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn attestation(&self) -> &Attestation {
        &self.attestation
    }
}

/// Produces signatures for attestation bodies.
///
/// The body is opaque to the signer: it is signed byte for byte as given.
pub trait Signer: Send + Sync {
    /// Returns `(signature, key_id)` for `body` using the key bound to `check_name`
    fn sign(&self, check_name: &str, body: &str) -> Result<(String, String)>;

    /// Whether any key material is available at all
    fn can_sign(&self) -> bool;

    fn sign_attestation(&self, attestation: Attestation) -> Result<SignedAttestation> {
        let (signature, key_id) = self.sign(&attestation.check_name, &attestation.body)?;
        Ok(SignedAttestation::new(attestation, signature, key_id))
    }
}
