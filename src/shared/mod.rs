//! Modules with generic logic used by several modules.
pub mod bit_torrent;
pub mod crypto;
