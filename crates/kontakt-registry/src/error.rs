//! Registry errors.

use crate::contact::Contact;
use thiserror::Error;

/// Message reported when a contact already exists.
pub const DUPLICATE_CONTACT_MESSAGE: &str = "This user already exists!";

/// An insert found an existing contact with the same `(name, surname)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("This user already exists!")]
pub struct DuplicateContactError {
    contact: Contact,
}

impl DuplicateContactError {
    pub(crate) const fn new(contact: Contact) -> Self {
        Self { contact }
    }

    /// Returns the rejected candidate.
    #[must_use]
    pub const fn contact(&self) -> &Contact {
        &self.contact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_matches_constant() {
        let error = DuplicateContactError::new(Contact::new("Jan", "Kowalski"));
        assert_eq!(error.to_string(), DUPLICATE_CONTACT_MESSAGE);
        assert_eq!(error.contact().name(), "Jan");
    }
}
