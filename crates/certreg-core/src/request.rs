//! Mint requests and their issuer signatures.
//!
//! A registry only mints on behalf of a request signed by its issuer. The
//! signature covers the canonical encoding of every request field, so a
//! relayed request cannot be altered without invalidating it.

use serde::{Deserialize, Serialize};

use crate::canonical::mint_request_bytes;
use crate::certificate::CertificatePayload;
use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::CoreError;

/// Domain separation prefix for mint request signatures.
pub const MINT_SIGN_DOMAIN: &[u8] = b"certreg/mint-sig/v1";

/// A request to issue one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub recipient: PublicKey,
    pub payload: CertificatePayload,
    /// Caller-supplied metadata reference. Must be absent when the registry
    /// derives references itself.
    #[serde(default)]
    pub metadata_ref: Option<String>,
}

impl MintRequest {
    pub fn new(recipient: PublicKey, payload: CertificatePayload) -> Self {
        Self {
            recipient,
            payload,
            metadata_ref: None,
        }
    }

    pub fn with_metadata_ref(mut self, uri: impl Into<String>) -> Self {
        self.metadata_ref = Some(uri.into());
        self
    }

    /// The message a signer signs.
    pub fn signing_message(&self) -> Vec<u8> {
        let body = mint_request_bytes(self);
        let mut msg = Vec::with_capacity(MINT_SIGN_DOMAIN.len() + body.len());
        msg.extend_from_slice(MINT_SIGN_DOMAIN);
        msg.extend_from_slice(&body);
        msg
    }

    /// Sign the request with `keypair`.
    pub fn sign(self, keypair: &Keypair) -> SignedMintRequest {
        let signature = keypair.sign(&self.signing_message());
        SignedMintRequest {
            request: self,
            signer: keypair.public_key(),
            signature,
        }
    }
}

/// A mint request together with its signer and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMintRequest {
    pub request: MintRequest,
    pub signer: PublicKey,
    pub signature: Signature,
}

impl SignedMintRequest {
    /// Check the signature against the claimed signer.
    pub fn verify_signature(&self) -> Result<(), CoreError> {
        self.signer
            .verify(&self.request.signing_message(), &self.signature)
    }
}
