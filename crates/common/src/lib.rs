//! Common utilities and shared types for chirp.
//!
//! This crate provides foundational components used across all chirp crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Opaque feed cursors via [`FeedCursor`]
//!
//! # Example
//!
//! ```no_run
//! use chirp_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {id}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod id;

pub use config::Config;
pub use cursor::FeedCursor;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
