//! Locally controlled signing keys

use shared_crypto::Ed25519KeyPair;
use shared_types::StakeholderId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Signing keys this node holds, by stakeholder
///
/// A missing entry is normal: it means the node does not control that
/// stakeholder.
#[derive(Clone, Debug, Default)]
pub struct SecretKeyRegistry {
    keys: BTreeMap<StakeholderId, Arc<Ed25519KeyPair>>,
}

impl SecretKeyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, returning the stakeholder it belongs to
    pub fn insert(&mut self, key: Ed25519KeyPair) -> StakeholderId {
        let id = StakeholderId::from_public_key(&key.public_key());
        self.keys.insert(id, Arc::new(key));
        id
    }

    /// Forget the key of `id`
    pub fn remove(&mut self, id: &StakeholderId) -> Option<Arc<Ed25519KeyPair>> {
        self.keys.remove(id)
    }

    /// Key of `id`, if held
    pub fn get(&self, id: &StakeholderId) -> Option<&Arc<Ed25519KeyPair>> {
        self.keys.get(id)
    }

    /// Whether the key of `id` is held
    pub fn contains(&self, id: &StakeholderId) -> bool {
        self.keys.contains_key(id)
    }

    /// Stakeholders with a held key, in id order
    pub fn stakeholders(&self) -> impl Iterator<Item = &StakeholderId> {
        self.keys.keys()
    }

    /// Number of held keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is held
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<Ed25519KeyPair> for SecretKeyRegistry {
    fn from_iter<I: IntoIterator<Item = Ed25519KeyPair>>(iter: I) -> Self {
        let mut registry = Self::new();
        for key in iter {
            registry.insert(key);
        }
        registry
    }
}
