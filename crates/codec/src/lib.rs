//! # Codec
//!
//! Binary wire formats for maps of byte strings, used by the storage layer to
//! pack a whole bucket of records into one value.
//!
//! ## Layouts
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ FIXED                                                    │
//! │ count (u64 LE)                                           │
//! │ key_len (u32 LE) | key | val_len (u32 LE) | val   × count│
//! ├──────────────────────────────────────────────────────────┤
//! │ VARINT                                                   │
//! │ count (varint)                                           │
//! │ key_len (varint) | key | val_len (varint) | val   × count│
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Varints carry 7 payload bits per byte, low bits first, with the high bit
//! set on every byte but the last. The layouts are not self-identifying: the
//! caller picks the [`Encoding`] for both [`encode`] and [`decode`].
//!
//! ## Example
//! ```rust
//! use std::collections::HashMap;
//! use codec::{decode, encode, Encoding};
//!
//! let mut m = HashMap::new();
//! m.insert(b"a".to_vec(), b"bb".to_vec());
//!
//! let buf = encode(&m, Encoding::Fixed).unwrap();
//! assert_eq!(buf.len(), 19);
//! assert_eq!(decode(&buf, Encoding::Fixed).unwrap(), m);
//! ```

mod cursor;
mod entry;
mod error;
pub mod fixed;
mod format;
mod reader;
pub mod varint;
mod writer;

pub use cursor::ByteCursor;
pub use entry::{ByteMap, EntryBytes, EntrySink, ShareBytes};
pub use error::CodecError;
pub use format::Encoding;
pub use reader::{decode, decode_into, Records};
pub use writer::{encode, encode_shared, encoded_len, EncodePlan};

#[cfg(test)]
mod proptests;
