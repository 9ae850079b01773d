//! # Kontakt Registry
//!
//! The in-memory contact store.
//!
//! [`ContactRegistry`] owns an ordered sequence of [`Contact`]s. Inserting a
//! contact whose `(name, surname)` pair is already present fails with
//! [`DuplicateContactError`]; the check and the append happen under one
//! write lock, so concurrent inserts of the same pair cannot both succeed.
//!
//! ```
//! use kontakt_registry::{Contact, ContactRegistry};
//!
//! let registry = ContactRegistry::new();
//! registry.insert(Contact::new("Jan", "Kowalski")).unwrap();
//! assert!(registry.insert(Contact::new("Jan", "Kowalski")).is_err());
//! assert_eq!(registry.list().len(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/kontakt-registry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod contact;
mod error;
mod registry;

pub use contact::Contact;
pub use error::{DuplicateContactError, DUPLICATE_CONTACT_MESSAGE};
pub use registry::ContactRegistry;
