//! File providers: the only way the crate sees the filesystem.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  PathResolver / ContentHasher                    │
//! │           │                                      │
//! │           ▼                                      │
//! │  dyn FileProvider ──┬─► PhysicalFileProvider     │
//! │                     │   (std::fs under a root)   │
//! │                     └─► MemoryFileProvider       │
//! │                         (map of sub path → bytes)│
//! └──────────────────────────────────────────────────┘
//! ```

mod memory;
mod physical;
mod provider;

pub use memory::MemoryFileProvider;
pub use physical::PhysicalFileProvider;
pub use provider::{FileInfo, FileProvider};
