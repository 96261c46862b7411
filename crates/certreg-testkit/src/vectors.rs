//! Golden test vectors for the checksum routine.
//!
//! A content hash is recorded at mint and recomputed on every verification,
//! possibly years later by another build. These vectors pin the exact
//! output of [`Blake3Checksum`] so an encoding change cannot slip through.

use std::collections::BTreeMap;

use serde::Serialize;

use certreg_core::{
    checksum_input_bytes, Blake3Checksum, CertificatePayload, ChecksumLib, ContentHash, Keypair,
    PublicKey,
};

/// Address of [`Blake3Checksum`] (hex).
pub const BLAKE3_LIBRARY_ADDRESS: &str =
    "4564346a825738afa761a0cdb92caee6890ac03759c6995bdca89630f1d27285";

/// A golden checksum vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    pub name: &'static str,
    /// Recipient keypair seed: 32 copies of this byte.
    pub seed_byte: u8,
    pub course_code: &'static str,
    pub issued_on: &'static str,
    pub attributes: &'static [(&'static str, &'static str)],
    /// Expected content hash (hex).
    pub expected_hash: &'static str,
}

impl GoldenVector {
    pub fn recipient(&self) -> PublicKey {
        Keypair::from_seed(&[self.seed_byte; 32]).public_key()
    }

    pub fn payload(&self) -> CertificatePayload {
        let attributes: BTreeMap<String, String> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CertificatePayload::new(self.course_code, self.issued_on).with_attributes(attributes)
    }

    pub fn compute(&self) -> ContentHash {
        Blake3Checksum.compute(&self.recipient(), &self.payload())
    }

    /// The canonical checksum input (hex).
    pub fn input_hex(&self) -> String {
        hex::encode(checksum_input_bytes(&self.recipient(), &self.payload()))
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "iccs101_minimal",
            seed_byte: 0x0a,
            course_code: "ICCS101",
            issued_on: "2024-01-01",
            attributes: &[],
            expected_hash: "06b1f746dd483360e9d8fdae346be7a736f5434f9f95ef87b893af1152cd04b8",
        },
        GoldenVector {
            name: "iccs101_second_recipient",
            seed_byte: 0x0b,
            course_code: "ICCS101",
            issued_on: "2024-01-01",
            attributes: &[],
            expected_hash: "235d77283470211740a944bc683a6e7b651d285ff46e81f6c8a99fb6ee0750f7",
        },
        GoldenVector {
            name: "iccs225_with_grade",
            seed_byte: 0x0a,
            course_code: "ICCS225",
            issued_on: "2024-06-30",
            attributes: &[("grade", "A")],
            expected_hash: "e8f079cbf8da9b29621f605d28d8e10674bb49c8be0c1bb6a7ea8a83668d3adc",
        },
        GoldenVector {
            name: "iccs312_many_attributes",
            seed_byte: 0x0c,
            course_code: "ICCS312",
            issued_on: "2025-03-15",
            // Deliberately unsorted; the encoding sorts keys.
            attributes: &[
                ("instructor", "Dr. Siri"),
                ("grade", "B+"),
                ("honours", "distinction"),
                ("credits", "3"),
            ],
            expected_hash: "339f0e111baa4ceb698d1a63987cffef47451146a21461d1c7c3f73e3ab6fe6a",
        },
        GoldenVector {
            name: "unicode_fields",
            seed_byte: 0x0d,
            course_code: "ICCS101",
            issued_on: "2024-01-01",
            attributes: &[("name", "Nguyễn Văn An"), ("remark", "修了")],
            expected_hash: "dab0abce9482266a5ec894e1315951b601aabfe7da9c0b51f1cd2102e586b1b4",
        },
    ]
}

/// Check every vector against its pinned hash.
///
/// Returns `(name, matches, computed_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = v.compute().to_hex();
            (v.name.to_string(), hex == v.expected_hash, hex)
        })
        .collect()
}

/// All vectors as pretty JSON, for other implementations to check against.
pub fn vectors_json() -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct VectorFile {
        library_address: &'static str,
        vectors: Vec<GoldenVector>,
    }

    serde_json::to_string_pretty(&VectorFile {
        library_address: BLAKE3_LIBRARY_ADDRESS,
        vectors: all_vectors(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use certreg_core::LibraryAddress;

    #[test]
    fn test_vectors_match_pinned_hashes() {
        for (name, matches, hex) in verify_all_vectors() {
            assert!(matches, "vector '{name}' computed {hex}");
        }
    }

    #[test]
    fn test_library_address_pinned() {
        assert_eq!(
            Blake3Checksum.address(),
            LibraryAddress::from_hex(BLAKE3_LIBRARY_ADDRESS).unwrap()
        );
    }

    #[test]
    fn test_recipient_derivation_pinned() {
        assert_eq!(
            all_vectors()[0].recipient().to_hex(),
            "43a72e714401762df66b68c26dfbdf2682aaec9f2474eca4613e424a0fbafd3c"
        );
    }

    #[test]
    fn test_checksum_input_bytes_pinned() {
        let vectors = all_vectors();
        // {0: 1, 1: recipient, 2: course, 3: issued_on, 4: attributes}
        assert_eq!(
            vectors[0].input_hex(),
            "a5000101582043a72e714401762df66b68c26dfbdf2682aaec9f2474eca4613e424a0fbafd3c\
             026749434353313031036a323032342d30312d303104a0"
        );
        assert_eq!(
            vectors[2].input_hex(),
            "a5000101582043a72e714401762df66b68c26dfbdf2682aaec9f2474eca4613e424a0fbafd3c\
             026749434353323235036a323032342d30362d333004a16567726164656141"
        );
    }

    #[test]
    fn test_vectors_differ_pairwise() {
        let hashes: Vec<_> = all_vectors().iter().map(|v| v.compute()).collect();
        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_vectors_json_lists_every_vector() {
        let json = vectors_json().unwrap();
        for v in all_vectors() {
            assert!(json.contains(v.name));
            assert!(json.contains(v.expected_hash));
        }
    }
}
