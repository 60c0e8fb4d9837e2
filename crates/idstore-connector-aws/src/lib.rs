//! AWS IAM Identity Store backend.
//!
//! Implements [`idstore_connector::DirectoryClient`] on top of the
//! `aws-sdk-identitystore` crate and provides the start-up [`Settings`]
//! (identity store id and authentication profile).
//!
//! # Usage
//!
//! ```rust,ignore
//! use idstore_connector_aws::{IdentityStoreDirectory, Settings};
//!
//! let settings = Settings::load("settings.yml")?;
//! let directory = IdentityStoreDirectory::connect(&settings).await?;
//! let user = directory.find_user_by_username("jdoe").await?;
//! ```

pub mod config;
pub mod directory;

pub use config::{Settings, SettingsError};
pub use directory::{ConnectError, IdentityStoreDirectory};
