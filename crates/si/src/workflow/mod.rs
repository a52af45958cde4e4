//! Schema workflows: credential detection, companion-file derivation, the
//! upload sequence, schema inspection and default-variant replacement.

pub mod companion;
pub mod credential;
pub mod inspect;
pub mod upload;
pub mod variant;
