//! Prioritized virtual-filesystem resolver for game UI assets.
//!
//! A UI library loads markup, stylesheets, fonts and images by logical path
//! (`ui/menu/main.rml`). This crate maps such a path to a seekable,
//! read-only handle by searching several storage layers in a fixed order,
//! hiding whether the bytes come from a loose file, a byte range inside a pak
//! container, or an alternate root directory.
//!
//! # Search order
//!
//! Two deployment modes are supported, selected by [`ResolutionMode`]:
//!
//! - **Archive-aware** (default): ask the engine's layered filesystem
//!   ([`LayeredRoot`]) first, which handles mod overrides and pak-embedded
//!   assets itself, then fall back to `<basedir>/<path>` for loose UI files
//!   that live outside any game directory.
//! - **Direct**: `<mod_dir>/<path>`, then `<basedir>/<game>/<path>` for each
//!   active game, then `<basedir>/<path>`, then `<path>` as given.
//!
//! # Handles
//!
//! Every open asset is a [`FileHandle`] with its own position and length.
//! Handles opened from a container remember the offset at which the asset
//! starts, so seeks and tells are relative to the asset, never to the
//! container file.
//!
//! # Example
//!
//! ```rust,no_run
//! use pakfs::{LogicalPath, PathResolver, ResolutionMode, ResolverConfig, SeekOrigin};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResolverConfig::new(ResolutionMode::Direct)
//!     .with_mod_dir("/games/quake/mymod")
//!     .with_basedir("/games/quake")
//!     .with_games("id1");
//! config.validate()?;
//!
//! let resolver = PathResolver::new(config);
//! let path = LogicalPath::new("ui/menu/main.rml")?;
//!
//! if let Some(mut handle) = resolver.open(&path) {
//!     let mut header = [0u8; 16];
//!     let n = handle.read(&mut header);
//!     handle.seek(0, SeekOrigin::Start);
//!     println!("{n} of {} bytes read", handle.length());
//!     resolver.close(handle);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Configuration snapshot
pub mod config;

// Error types
pub mod error;

// Open asset handles
pub mod handle;

// Archive-aware layer seam
pub mod layer;

// Logical paths
pub mod path;

// Search order and handle lifecycle
pub mod resolver;

pub use config::{ResolutionMode, ResolverConfig};
pub use error::ResolverError;
pub use handle::{FileHandle, HandleInfo, HandleOrigin, SeekOrigin};
pub use layer::{DirectoryLayer, LayeredRoot, NoLayer, Probe};
pub use path::LogicalPath;
pub use resolver::{Candidate, PathResolver, SearchRoot};

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Version information for the resolver.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
