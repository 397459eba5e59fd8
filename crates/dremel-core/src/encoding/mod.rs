//! Level and value encodings used inside data pages.

pub mod plain;
pub mod rle;
pub mod uleb128;

pub use plain::{decode_plain, encode_plain};
pub use rle::{bit_width, decode_levels, encode_levels, RleEncoder};
