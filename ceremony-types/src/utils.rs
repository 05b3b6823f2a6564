//! Internal and re-exported utilities.

pub(crate) mod bytes;
pub(crate) mod serde;

pub mod crypto;
pub mod encoding;
pub mod rand;
