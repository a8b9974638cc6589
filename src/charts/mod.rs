//! Chart recipes. Each public function turns the dataset into a [`Figure`]
//! and is registered in the catalog under its own name.
//!
//! [`Figure`]: crate::figure::Figure

pub mod comparison;
pub mod composite;
pub mod correlation;
pub mod distribution;
pub mod palette;
pub mod profile;
pub mod relationship;
