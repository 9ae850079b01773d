//! The contact registry.

use crate::contact::Contact;
use crate::error::DuplicateContactError;
use parking_lot::RwLock;

/// In-memory, insertion-ordered contact store.
///
/// `insert` takes the write lock for both the duplicate scan and the append,
/// so the uniqueness of `(name, surname)` holds under concurrent writers.
/// Readers share the read lock and get a cloned snapshot.
///
/// The duplicate check is a linear scan, which makes `insert` O(n) in the
/// number of stored contacts. There is no secondary index.
#[derive(Debug, Default)]
pub struct ContactRegistry {
    contacts: RwLock<Vec<Contact>>,
}

impl ContactRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contacts: RwLock::new(Vec::new()),
        }
    }

    /// Appends `candidate` unless a contact with the same identity exists.
    ///
    /// On success the stored contact is returned. On failure nothing changes.
    pub fn insert(&self, candidate: Contact) -> Result<Contact, DuplicateContactError> {
        let mut contacts = self.contacts.write();

        if contacts.iter().any(|existing| existing.same_identity(&candidate)) {
            tracing::info!(
                name = candidate.name(),
                surname = candidate.surname(),
                "Rejected duplicate contact"
            );
            return Err(DuplicateContactError::new(candidate));
        }

        contacts.push(candidate.clone());
        tracing::debug!(
            name = candidate.name(),
            surname = candidate.surname(),
            total = contacts.len(),
            "Stored contact"
        );
        Ok(candidate)
    }

    /// Returns a snapshot of all contacts in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Contact> {
        self.contacts.read().clone()
    }

    /// Returns `true` if a contact with the same identity is stored.
    #[must_use]
    pub fn contains(&self, contact: &Contact) -> bool {
        self.contacts
            .read()
            .iter()
            .any(|existing| existing.same_identity(contact))
    }

    /// Returns the number of stored contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.read().len()
    }

    /// Returns `true` if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.read().is_empty()
    }
}
