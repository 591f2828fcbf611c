//! Core library for `portable_fs`.
//!
//! An asynchronous file-system facade that behaves the same across operating
//! systems:
//! - [`FileSystem`] runs every operation on tokio's blocking pool and reports
//!   expected failures as `false`/`None` rather than errors.
//! - [`collision`] decides how an open request meets an existing file.
//! - [`rename`] picks `{stem}-{n}{ext}` siblings for RenameIfExists.
//! - [`sync::AsyncLock`] serializes multi-step work across async tasks.
//!
//! ```no_run
//! # async fn demo() -> Result<(), portable_fs::FsError> {
//! use portable_fs::{AccessMode, CollisionMethod, FileSystem, PlatformContext};
//!
//! let fs = FileSystem::new(PlatformContext::system()?);
//! if let Some(stream) = fs.open_file("report.txt", AccessMode::ReadWrite, CollisionMethod::FailIfExists).await? {
//!     println!("opened {}", stream.path());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod collision;
pub mod config;
pub mod errors;
pub mod facade;
pub mod helpers;
pub mod metadata;
pub mod output;
pub mod path;
pub mod platform;
pub mod rename;
pub mod stream;
pub mod sync;

pub use collision::{AccessMode, CollisionMethod, OpenAction, Resolution, can_open, resolve};
pub use config::{
    CONFIG_ENV_VAR, Config, LogLevel, default_config_path, load_config, load_config_from_xml_path,
    path_has_symlink_ancestor,
};
pub use errors::FsError;
pub use facade::FileSystem;
pub use metadata::{FileDetail, LocalProbe, MetadataProbe, Stat};
pub use path::FsPath;
pub use platform::PlatformContext;
pub use rename::unique_sibling;
pub use stream::FileStream;
pub use sync::{AsyncLock, PathLocks, Releaser};
