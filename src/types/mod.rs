pub mod bundle;
pub mod recommendation;
pub mod wire;

pub use bundle::*;
pub use recommendation::*;
pub use wire::{decode_bundle, encode_bundle, WireBundle, WireIndicators, SCHEMA_VERSION};
