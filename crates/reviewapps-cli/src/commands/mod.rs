//! Command handlers grouped by concern.

pub(crate) mod apps;
pub(crate) mod formation;
