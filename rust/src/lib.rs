//! Hashlab: an educational sandbox for composing toy hash pipelines.
//! Steps are deliberately simple integer transforms so every intermediate value
//! can be traced and reasoned about; nothing here is cryptographically secure.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod reference;
pub mod strength;
