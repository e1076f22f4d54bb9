//! CLI library components for `hubjson`.

#![allow(clippy::needless_pass_by_value)]

pub mod logging;
pub mod pipeline;
pub mod types;
