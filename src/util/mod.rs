//! Common utilities and data structures

pub mod buffer;
pub mod timestamp;

pub use buffer::Buffer;
pub use timestamp::Timestamp;
