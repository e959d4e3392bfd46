//! Artifact I/O: resumable downloads and archive extraction.

pub mod download;
pub mod extract;
