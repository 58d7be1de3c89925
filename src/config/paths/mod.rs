//! Filesystem locations for data and configuration.

pub mod xdg_root;
