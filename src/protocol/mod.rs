//! Wire protocol core implementation
//!
//! Framing, field encoding and decoding for the eight database operation
//! messages. Everything here is stateless; the op-code and flag tables
//! are read-only constants, so encode/decode calls may run concurrently
//! without coordination.

mod codec;
mod document;
mod error;
mod header;
mod message;
mod primitives;
mod types;

pub use codec::{
    decode, encode, encode_delete, encode_getmore, encode_insert, encode_kill_cursors, encode_msg,
    encode_query, encode_reply, encode_update,
};
pub use document::{Document, decode_documents, encode_documents};
pub use error::{Error, Result};
pub use header::{MessageHeader, finish_message};
pub use message::{
    Body, Delete, GetMore, Insert, KillCursors, Message, Msg, Query, Reply, Update,
};
pub use primitives::{Reader, put_cstring, put_i32, put_i64, put_u32};
pub use types::{FlagMap, OpCode, decode_flags, encode_flags, flag_table};

/// Header size in bytes
pub const HEADER_SIZE: usize = 16;
