//! CLI command implementations

pub(crate) mod catalog;
pub(crate) mod classify;
pub(crate) mod common;
pub(crate) mod issues;
pub(crate) mod run;
pub(crate) mod status;
pub(crate) mod summary;
pub(crate) mod sync_list;
pub(crate) mod trip;
