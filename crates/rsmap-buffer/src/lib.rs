//! Wire codec primitives shared by the world-map binary formats.

pub mod codec;
pub mod error;

pub use codec::{WireDecode, WireEncode};
pub use error::BufferError;
