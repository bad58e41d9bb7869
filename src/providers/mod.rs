//! Resource providers.
//!
//! [`StandardResourceProvider`] combines a [`StorageProvider`] backend with
//! the PATCH engine and list shaping. It is generic over the resource type,
//! so one provider instance serves both Users and Groups.
//!
//! [`StorageProvider`]: crate::storage::StorageProvider

pub mod standard;

pub use standard::StandardResourceProvider;
