//! docwire - wire codec for document database operation messages
//!
//! A bidirectional codec for a length-prefixed, little-endian binary
//! protocol carrying database operations (update, insert, query, getmore,
//! delete, kill_cursors, msg, reply) between a client and a
//! document-oriented server. This crate owns message framing and field
//! encoding only: document contents are opaque blobs produced by an
//! external document codec, and transport is the caller's problem —
//! hand in a byte buffer, get one back.
//!
//! # Quick Start
//!
//! ```rust
//! use docwire::{Document, Message, Query};
//!
//! // A document already encoded by the external document codec
//! // (4-byte length prefix covering the whole buffer).
//! let query_doc = Document::from_encoded(vec![5, 0, 0, 0, 0])?;
//!
//! // Compose a query with wire defaults (skip 0, return 1).
//! let msg = Message::new(Query::new("db.collection", query_doc));
//!
//! // Encode to wire bytes.
//! let bytes = msg.encode()?;
//!
//! // Decode dispatches on the op code embedded in the header.
//! let decoded = Message::decode(&bytes)?;
//! assert_eq!(decoded.op_code(), msg.op_code());
//! # Ok::<(), docwire::Error>(())
//! ```
//!
//! # Wire format
//!
//! Every message is a 16-byte header followed by an op-specific body, all
//! integers little-endian two's complement:
//!
//! ```text
//! [message_length:i32][request_id:i32][response_to:i32][op_code:i32][body...]
//! ```
//!
//! Decoding is all-or-nothing: a structurally invalid buffer fails with a
//! diagnostic [`Error`] and never yields a partial message.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;

pub use protocol::{
    Body, Delete, Document, Error, FlagMap, GetMore, HEADER_SIZE, Insert, KillCursors, Message,
    MessageHeader, Msg, OpCode, Query, Reply, Result, Update, decode, decode_documents,
    decode_flags, encode, encode_documents, encode_flags, flag_table,
};
