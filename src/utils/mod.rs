//! Utility modules shared by the pipeline and the dev server.

pub mod exec;
pub mod mime;
pub mod path;
pub mod vars;
