//! Task-completion certificates
//!
//! A certificate attests that an off-chain unit of work was completed and
//! accepted. Blocks can only be sealed once enough certificates are pending.
//! Deciding whether the work is actually correct belongs to a
//! [`TaskValidator`]; the issuer only trusts its verdict.

use crate::crypto::{sha256_hex, Hash};
use crate::transaction::Address;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCertificate {
    pub task_id: String,
    pub user_address: Address,
    /// Issue time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub signature: Hash,
}

impl TaskCertificate {
    fn signature_for(task_id: &str, user_address: &str, timestamp: u64) -> Hash {
        sha256_hex(format!("{}{}{}", task_id, user_address, timestamp).as_bytes())
    }

    /// Recompute the signature from the certificate body and compare.
    pub fn verify_signature(&self) -> bool {
        Self::signature_for(&self.task_id, &self.user_address, self.timestamp) == self.signature
    }
}

/// External check deciding whether submitted task data is acceptable.
pub trait TaskValidator {
    fn validate(&self, task_data: &str) -> bool;
}

/// Validator that accepts a fixed fraction of submissions at random.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedValidator {
    pub success_rate: f64,
}

impl SimulatedValidator {
    pub fn new(success_rate: f64) -> Self {
        let success_rate = if success_rate.is_nan() { 0.0 } else { success_rate.clamp(0.0, 1.0) };
        Self { success_rate }
    }
}

impl Default for SimulatedValidator {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl TaskValidator for SimulatedValidator {
    fn validate(&self, _task_data: &str) -> bool {
        rand::thread_rng().gen_bool(self.success_rate)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateIssuer;

impl CertificateIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Issue a certificate for `task_id` if the external check passed.
    pub fn issue(
        &self,
        task_id: &str,
        user_address: &str,
        external_validity: bool,
    ) -> Option<TaskCertificate> {
        if !external_validity {
            debug!("Task {} failed validation, no certificate issued", task_id);
            return None;
        }

        let timestamp = chrono::Utc::now().timestamp_millis() as u64;
        let signature = TaskCertificate::signature_for(task_id, user_address, timestamp);
        debug!("Issued certificate for task {} to {}", task_id, user_address);

        Some(TaskCertificate {
            task_id: task_id.to_string(),
            user_address: user_address.to_string(),
            timestamp,
            signature,
        })
    }

    /// Run `validator` over `task_data` and issue a certificate on success.
    pub fn complete_task<V: TaskValidator + ?Sized>(
        &self,
        task_id: &str,
        user_address: &str,
        task_data: &str,
        validator: &V,
    ) -> Option<TaskCertificate> {
        self.issue(task_id, user_address, validator.validate(task_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(bool);

    impl TaskValidator for Always {
        fn validate(&self, _task_data: &str) -> bool {
            self.0
        }
    }

    #[test]
    fn test_issue_valid_task() {
        let cert = CertificateIssuer::new().issue("task_0", "Alice", true).unwrap();
        assert_eq!(cert.task_id, "task_0");
        assert_eq!(cert.user_address, "Alice");
        assert_eq!(cert.signature.len(), 64);
        assert!(cert.verify_signature());
    }

    #[test]
    fn test_invalid_task_yields_nothing() {
        assert!(CertificateIssuer::new().issue("task_0", "Alice", false).is_none());
    }

    #[test]
    fn test_signature_uses_certificate_timestamp() {
        let cert = CertificateIssuer::new().issue("task_1", "Bob", true).unwrap();
        let expected = sha256_hex(format!("task_1Bob{}", cert.timestamp).as_bytes());
        assert_eq!(cert.signature, expected);
    }

    #[test]
    fn test_tampered_certificate_fails_verification() {
        let mut cert = CertificateIssuer::new().issue("task_2", "Carol", true).unwrap();
        cert.user_address = "Mallory".to_string();
        assert!(!cert.verify_signature());
    }

    #[test]
    fn test_complete_task_consults_validator() {
        let issuer = CertificateIssuer::new();
        assert!(issuer.complete_task("t", "Dave", "data", &Always(true)).is_some());
        assert!(issuer.complete_task("t", "Dave", "data", &Always(false)).is_none());
        assert!(issuer
            .complete_task("t", "Dave", "data", &SimulatedValidator::new(1.0))
            .is_some());
        assert!(issuer
            .complete_task("t", "Dave", "data", &SimulatedValidator::new(0.0))
            .is_none());
    }
}
