//! The contact record.

use serde::{Deserialize, Serialize};

/// A contact.
///
/// Identity is the `(name, surname)` pair, compared exactly and
/// case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contact {
    name: String,
    surname: String,
}

impl Contact {
    /// Creates a contact.
    #[must_use]
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }

    /// Returns the first name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the surname.
    #[must_use]
    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// Returns `true` if both contacts have the same identity.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.name == other.name && self.surname == other.surname
    }
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.surname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_case_sensitive() {
        let a = Contact::new("Jan", "Kowalski");
        assert!(a.same_identity(&Contact::new("Jan", "Kowalski")));
        assert!(!a.same_identity(&Contact::new("jan", "Kowalski")));
        assert!(!a.same_identity(&Contact::new("Jan", "Kowalski ")));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Contact::new("Jan", "Kowalski")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Jan", "surname": "Kowalski" }));

        let back: Contact = serde_json::from_value(json).unwrap();
        assert_eq!(back.to_string(), "Jan Kowalski");
    }
}
