//! Review storage for flashdeck.
//!
//! This module provides persistence for per-(card, user) scheduling state,
//! supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileReviewStore;
pub use memory::MemoryReviewStore;
pub use traits::ReviewStore;
