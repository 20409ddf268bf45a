//! Canonical attestation payload.
//!
//! Binary Authorization re-verifies signatures over the exact bytes produced
//! here, so field order and the literal `type` string must not change.
//! Field order follows struct declaration order under `serde_json`.

use crate::image::ImageData;
use crate::Result;
use serde::{Deserialize, Serialize};

pub const PAYLOAD_TYPE: &str = "Google cloud binauthz container signature";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub critical: Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critical {
    pub identity: Identity,
    pub image: Image,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "docker-reference")]
    pub docker_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "docker-manifest-digest")]
    pub docker_manifest_digest: String,
}

impl Payload {
    pub fn new(image: &ImageData) -> Self {
        Self {
            critical: Critical {
                identity: Identity {
                    docker_reference: image.name().to_string(),
                },
                image: Image {
                    docker_manifest_digest: image.digest().to_string(),
                },
                kind: PAYLOAD_TYPE.to_string(),
            },
        }
    }

    /// Serialize with two-space indentation
    pub fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_compact_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Whether this payload names exactly `image`
    pub fn matches(&self, image: &ImageData) -> bool {
        self.critical.identity.docker_reference == image.name()
            && self.critical.image.docker_manifest_digest == image.digest()
            && self.critical.kind == PAYLOAD_TYPE
    }
}

pub fn new_payload_body(image: &ImageData) -> Result<String> {
    Payload::new(image).to_string()
}
