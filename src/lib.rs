//! bundle-unpack - fetch bundles from git into a pinned, read-only view
//!
//! A bundle descriptor names a source (today only git) and optionally a
//! branch, tag or commit and a subdirectory. Unpacking it:
//!
//! 1. validates the descriptor without touching the network,
//! 2. fetches just enough of the repository to check out the revision,
//! 3. pins the descriptor to the exact commit that was fetched,
//! 4. exposes the commit's tree, optionally scoped to the subdirectory,
//!    as an in-memory [`fs::FilesystemView`].
//!
//! ```no_run
//! use bundle_unpack::{Bundle, Context, Fetch, FilesystemView, GitSource, Unpacker};
//!
//! let bundle = Bundle::from_git(
//!     "web",
//!     GitSource::new("https://github.com/example/bundles.git")
//!         .with_tag("v1.2.0")
//!         .with_directory("web"),
//! );
//! let result = Unpacker::default().unpack(&Context::background(), &bundle)?;
//! let manifest = result.bundle.read_file("manifest.yaml")?;
//! println!("{} bytes at {}", manifest.len(), result.resolved_source.commit());
//! # Ok::<(), bundle_unpack::UnpackError>(())
//! ```

pub mod context;
pub mod error;
pub mod fs;
pub mod git;
pub mod hash;
pub mod pipeline;
pub mod source;
pub mod temp;
pub mod unpack;

pub use context::{CancellationReason, CancellationSource, CancellationToken, Context, Deadline};
pub use error::{ErrorKind, Result, UnpackError};
pub use fs::{BundleFs, DirEntry, FileKind, FilesystemView, Handle, MemoryTree, Metadata, Storage};
pub use pipeline::{Apply, BundleDeployment, Object, Pipeline, Process, TemplatePackage, Values};
pub use source::{Bundle, BundleSource, GitAuth, GitRef, GitSource, ResolvedSource, SourceType};
pub use unpack::{Fetch, FetchResult, GitUnpacker, GitUnpackerConfig, Unpacker};
