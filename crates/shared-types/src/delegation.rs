//! # Heavyweight Delegation
//!
//! A stakeholder (the issuer) can hand its block-producing right to another
//! key (the delegate) for a range of epochs. The delegate then signs blocks
//! in the issuer's slots with a proxy signature that embeds the certificate.
//!
//! A certificate whose delegate equals its issuer revokes any earlier
//! delegation of that issuer.

use crate::entities::{Hash, StakeholderId};
use crate::slotting::EpochIndex;
use serde::{Deserialize, Serialize};
use shared_crypto::{Blake3Hasher, CryptoError, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Signed statement "issuer delegates to delegate for epochs
/// `valid_from..=valid_until`".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationCertificate {
    /// Key of the stakeholder granting the right.
    pub issuer_pk: Ed25519PublicKey,
    /// Key receiving the right.
    pub delegate_pk: Ed25519PublicKey,
    /// First epoch covered.
    pub valid_from: EpochIndex,
    /// Last epoch covered (inclusive).
    pub valid_until: EpochIndex,
    /// Issuer's signature over the fields above.
    pub signature: Ed25519Signature,
}

impl DelegationCertificate {
    /// Issue and sign a certificate.
    pub fn issue(
        issuer: &Ed25519KeyPair,
        delegate_pk: Ed25519PublicKey,
        valid_from: EpochIndex,
        valid_until: EpochIndex,
    ) -> Self {
        let issuer_pk = issuer.public_key();
        let signature = issuer.sign(&Self::signing_bytes(
            &issuer_pk,
            &delegate_pk,
            valid_from,
            valid_until,
        ));
        Self {
            issuer_pk,
            delegate_pk,
            valid_from,
            valid_until,
            signature,
        }
    }

    /// Revoke any delegation of `issuer` from `epoch` on.
    pub fn revocation(issuer: &Ed25519KeyPair, epoch: EpochIndex) -> Self {
        Self::issue(issuer, issuer.public_key(), epoch, EpochIndex::MAX)
    }

    fn signing_bytes(
        issuer_pk: &Ed25519PublicKey,
        delegate_pk: &Ed25519PublicKey,
        valid_from: EpochIndex,
        valid_until: EpochIndex,
    ) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 + 32 + 8 + 8 + 10);
        bytes.extend_from_slice(b"delegation");
        bytes.extend_from_slice(issuer_pk.as_bytes());
        bytes.extend_from_slice(delegate_pk.as_bytes());
        bytes.extend_from_slice(&valid_from.to_le_bytes());
        bytes.extend_from_slice(&valid_until.to_le_bytes());
        bytes
    }

    /// Check the issuer's signature.
    pub fn verify(&self) -> Result<(), CryptoError> {
        let bytes = Self::signing_bytes(
            &self.issuer_pk,
            &self.delegate_pk,
            self.valid_from,
            self.valid_until,
        );
        self.issuer_pk.verify(&bytes, &self.signature)
    }

    /// Identity of the issuer.
    pub fn issuer(&self) -> StakeholderId {
        StakeholderId::from_public_key(&self.issuer_pk)
    }

    /// Identity of the delegate.
    pub fn delegate(&self) -> StakeholderId {
        StakeholderId::from_public_key(&self.delegate_pk)
    }

    /// Whether this certificate cancels delegation instead of granting it.
    pub fn is_revocation(&self) -> bool {
        self.issuer_pk == self.delegate_pk
    }

    /// Whether the certificate is in force for `epoch`.
    pub fn covers(&self, epoch: EpochIndex) -> bool {
        !self.is_revocation() && self.valid_from <= epoch && epoch <= self.valid_until
    }

    /// Content hash.
    pub fn hash(&self) -> Hash {
        let mut hasher = Blake3Hasher::tagged("delegation-cert");
        hasher
            .update(self.issuer_pk.as_bytes())
            .update(self.delegate_pk.as_bytes())
            .update_u64(self.valid_from)
            .update_u64(self.valid_until)
            .update(self.signature.as_bytes());
        hasher.finalize()
    }
}
