//! Shared helpers: filesystem operations, content checksums, file locks and tool lookup.

pub mod checksum;
pub mod fs;
pub mod lock;
pub mod tool_detection;
