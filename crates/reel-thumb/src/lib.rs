#![forbid(unsafe_code)]

//! Poster thumbnail URLs derived from streaming video sources.
//!
//! Pure and deterministic: no I/O, no caching.

mod resolver;

pub use resolver::{ThumbnailRequest, ThumbnailResolver, extract_customer, extract_video_id};
