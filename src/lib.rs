//! Tagtree: tags in file names, history for every file and folder.
//!
//! Tracks folders of images in memory, keeps each image's tags inside its
//! file name (`photo - @beach @sunset.jpg`), mirrors every change onto the
//! filesystem with rollback on failure, and records an append-only snapshot
//! history per file and folder that any entity can be reverted along.

pub mod accessor;
pub mod audit;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod logging;
pub mod observer;
pub mod registry;
pub mod tag;
pub mod tree;
pub mod types;
pub mod views;
