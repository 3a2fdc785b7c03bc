//! Virtual path handling.
//!
//! ```text
//!  "~/Js/app.js" ──parse──► VirtualPath
//!                               │ resolve (FileProvider::file_info)
//!                               ▼
//!                          FileDescriptor { physical_path, exists, .. }
//!                               │ reverse_map (strip web root once)
//!                               ▼
//!                          VirtualPath == original
//! ```

mod normalize;
mod resolver;
mod virtual_path;

pub use normalize::{physical_to_slashes, strip_root, to_forward_slashes};
pub use resolver::{FileDescriptor, PathResolver};
pub use virtual_path::VirtualPath;
