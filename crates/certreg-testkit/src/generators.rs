//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;

use certreg_core::{CertificatePayload, Keypair, MintRequest, PublicKey, MAX_ATTRIBUTES};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random recipient.
pub fn recipient() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a course code like `ICCS101`.
pub fn course_code() -> impl Strategy<Value = String> {
    "[A-Z]{2,4}[0-9]{3}".prop_map(String::from)
}

/// Generate an ISO date.
pub fn issued_on() -> impl Strategy<Value = String> {
    (2000u32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

/// Generate a valid attribute map. Values may contain any characters.
pub fn attributes() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z][a-z_]{0,15}", ".{0,40}", 0..8)
}

/// Generate an attribute map that exceeds the attribute limit.
pub fn oversized_attributes() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,12}", "[a-z]{0,4}", MAX_ATTRIBUTES + 1..MAX_ATTRIBUTES + 8)
}

/// Generate an IPFS-style metadata reference.
pub fn metadata_ref() -> impl Strategy<Value = String> {
    "Qm[1-9A-HJ-NP-Za-km-z]{44}".prop_map(|cid| format!("ipfs://{cid}"))
}

/// Parameters for generating a mint request.
#[derive(Debug, Clone)]
pub struct MintParams {
    pub recipient: Keypair,
    pub course_code: String,
    pub issued_on: String,
    pub attributes: BTreeMap<String, String>,
    pub metadata_ref: String,
}

impl Arbitrary for MintParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            keypair(),
            course_code(),
            issued_on(),
            attributes(),
            metadata_ref(),
        )
            .prop_map(
                |(recipient, course_code, issued_on, attributes, metadata_ref)| MintParams {
                    recipient,
                    course_code,
                    issued_on,
                    attributes,
                    metadata_ref,
                },
            )
            .boxed()
    }
}

impl MintParams {
    pub fn payload(&self) -> CertificatePayload {
        CertificatePayload::new(&self.course_code, &self.issued_on)
            .with_attributes(self.attributes.clone())
    }
}

/// Build an unsigned mint request from parameters.
pub fn request_from_params(params: &MintParams) -> MintRequest {
    MintRequest::new(params.recipient.public_key(), params.payload())
        .with_metadata_ref(params.metadata_ref.clone())
}
