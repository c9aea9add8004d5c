#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod handler;
pub mod middleware;
pub mod service;

/// Tracing target for the server crate.
pub const TRACING_TARGET: &str = "docqa_server";
