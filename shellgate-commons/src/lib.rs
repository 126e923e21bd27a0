//! Shared helpers reused across the shellgate crates. The goal is to keep
//! the process runner and the engine decoupled from each other while still
//! agreeing on how paths are contained and how long output is clipped.

pub mod paths;
pub mod text;

pub use paths::{
    canonicalize_lenient, canonicalize_workspace, ensure_within, is_within, normalize_path,
    secure_path,
};
pub use text::{
    OUTPUT_TRUNCATION_MARKER, TAIL_TRUNCATION_MARKER, truncate_head, truncate_tail,
};
