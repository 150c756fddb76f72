use super::block::Block;
use std::fmt;
use tracing::warn;

/// Rule a block broke during chain verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Stored hash differs from the hash recomputed from the block's fields.
    HashMismatch { stored: String, computed: String },
    /// The block's fields could not be serialized, so no hash can be computed.
    Unhashable { error: String },
    /// `previous_hash` does not name the preceding block.
    BrokenLink { expected: String, found: String },
    InsufficientCertificates { required: usize, found: usize },
}

/// Diagnostic for a chain that failed verification. Reported, never repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainCorrupt {
    pub index: usize,
    pub violation: Violation,
}

impl fmt::Display for ChainCorrupt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.violation {
            Violation::HashMismatch { stored, computed } => write!(
                f,
                "Invalid hash at block {}: stored {}, computed {}",
                self.index, stored, computed
            ),
            Violation::Unhashable { error } => write!(
                f,
                "Cannot hash block {}: {}",
                self.index, error
            ),
            Violation::BrokenLink { expected, found } => write!(
                f,
                "Chain broken at block {}: expected previous hash {}, found {}",
                self.index, expected, found
            ),
            Violation::InsufficientCertificates { required, found } => write!(
                f,
                "Insufficient task certificates at block {}: required {}, found {}",
                self.index, required, found
            ),
        }
    }
}

/// Check blocks `1..N` in order and report the first violation.
///
/// For each block: the stored hash must match the recomputed one, the block
/// must link to its predecessor's hash, and it must carry at least
/// `min_task_certificates` certificates. Genesis is never checked.
pub fn validate_chain(blocks: &[Block], min_task_certificates: usize) -> Result<(), ChainCorrupt> {
    for (index, pair) in blocks.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let index = index + 1;

        let computed = match current.compute_hash() {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Failed to hash block {} during validation: {}", index, e);
                return Err(ChainCorrupt {
                    index,
                    violation: Violation::Unhashable { error: e.to_string() },
                });
            }
        };
        if current.hash != computed {
            return Err(ChainCorrupt {
                index,
                violation: Violation::HashMismatch {
                    stored: current.hash.clone(),
                    computed,
                },
            });
        }

        if current.previous_hash != previous.hash {
            return Err(ChainCorrupt {
                index,
                violation: Violation::BrokenLink {
                    expected: previous.hash.clone(),
                    found: current.previous_hash.clone(),
                },
            });
        }

        if current.task_certificates.len() < min_task_certificates {
            return Err(ChainCorrupt {
                index,
                violation: Violation::InsufficientCertificates {
                    required: min_task_certificates,
                    found: current.task_certificates.len(),
                },
            });
        }
    }
    Ok(())
}
