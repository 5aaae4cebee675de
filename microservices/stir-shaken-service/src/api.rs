//! HTTP surface (ambient, §6 "Service HTTP surface").

mod rest;

pub use rest::{router, AppState};
