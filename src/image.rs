use crate::{Result, VoucherError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An image pinned to a content digest.
///
/// Tags are mutable, so an `ImageData` can only be built from a reference that
/// carries a digest (`name@algorithm:hex`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageData {
    name: String,
    digest: String,
}

impl ImageData {
    pub fn new(name: impl Into<String>, digest: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let digest = digest.into();

        validate_digest(&digest)?;

        // A tag before the digest ("repo:tag@sha256:...") is informational only
        let name = strip_tag(&name).to_string();
        if name.is_empty() {
            return Err(VoucherError::InvalidImage("empty image name".into()));
        }

        Ok(Self { name, digest })
    }

    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let (name, digest) = reference.split_once('@').ok_or_else(|| {
            VoucherError::InvalidImage(format!("reference has no digest: {:?}", reference))
        })?;
        Self::new(name, digest)
    }

    /// Repository part of the reference, without tag or digest
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Hex part of the digest, without the algorithm prefix
    pub fn digest_hex(&self) -> &str {
        self.digest
            .split_once(':')
            .map(|(_, hex)| hex)
            .unwrap_or(&self.digest)
    }

    /// Resource URL the metadata store keys occurrences by
    pub fn resource_url(&self) -> String {
        format!("https://{}", self)
    }
}

fn validate_digest(digest: &str) -> Result<()> {
    let (algorithm, encoded) = digest
        .split_once(':')
        .ok_or_else(|| VoucherError::InvalidImage(format!("malformed digest: {:?}", digest)))?;

    if algorithm.is_empty()
        || !algorithm
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+._-".contains(c))
    {
        return Err(VoucherError::InvalidImage(format!(
            "invalid digest algorithm: {:?}",
            algorithm
        )));
    }

    if encoded.is_empty() || hex::decode(encoded).is_err() {
        return Err(VoucherError::InvalidImage(format!(
            "digest is not hex encoded: {:?}",
            digest
        )));
    }

    Ok(())
}

fn strip_tag(name: &str) -> &str {
    // A colon after the last slash is a tag; one before it belongs to a registry port
    let last_segment = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    match name[last_segment..].find(':') {
        Some(idx) => &name[..last_segment + idx],
        None => name,
    }
}

impl fmt::Display for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.digest)
    }
}

impl FromStr for ImageData {
    type Err = VoucherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ImageData {
    type Error = VoucherError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ImageData> for String {
    fn from(image: ImageData) -> Self {
        image.to_string()
    }
}
