//! Subcommand handlers

pub mod draft;
pub mod feedback;
pub mod show;
