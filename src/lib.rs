//! webpad: project editor core
//!
//! A project is a tree of files and folders kept in an arena. Edits go through a
//! [`session::Session`], which autosaves through a [`store::PersistenceGateway`] and
//! compiles the project into a single self-contained preview document whose console
//! output is relayed back over a one-way [`sandbox`] channel.

pub mod autosave;
pub mod config;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod preview;
pub mod sandbox;
pub mod session;
pub mod settings;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
