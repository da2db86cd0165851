//! Message codec (encode/decode)
//!
//! One encoder per message kind, each assembling its body fields in wire
//! order and finishing through the shared apply-header step, and one
//! decode entry point that dispatches on the op code embedded in the
//! header. Decoding is all-or-nothing: a structurally invalid buffer
//! never produces a partial message.

use tracing::trace;

use super::document::{decode_documents, encode_documents};
use super::header::finish_message;
use super::primitives::{put_cstring, put_i32, put_i64, put_u32};
use super::types::{decode_flags, encode_flags};
use super::{
    Body, Delete, Document, Error, GetMore, HEADER_SIZE, Insert, KillCursors, Message,
    MessageHeader, Msg, OpCode, Query, Reader, Reply, Result, Update,
};

fn require_collection(collection: &str) -> Result<()> {
    if collection.is_empty() {
        return Err(Error::InvalidArgument {
            field: "collection",
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(Error::InvalidArgument {
            field,
            reason: format!("must be non-negative, got {value}"),
        });
    }
    Ok(())
}

/// Encode a message, routing to the encoder for its kind.
pub fn encode(message: &Message) -> Result<Vec<u8>> {
    trace!(op = %message.op_code(), "encoding message");
    let (request_id, response_to) = (message.request_id, message.response_to);
    match &message.body {
        Body::Update(update) => encode_update(update, request_id, response_to),
        Body::Insert(insert) => encode_insert(insert, request_id, response_to),
        Body::Query(query) => encode_query(query, request_id, response_to),
        Body::GetMore(getmore) => encode_getmore(getmore, request_id, response_to),
        Body::Delete(delete) => encode_delete(delete, request_id, response_to),
        Body::KillCursors(kill) => encode_kill_cursors(kill, request_id, response_to),
        Body::Msg(msg) => encode_msg(msg, request_id, response_to),
        Body::Reply(reply) => encode_reply(reply, request_id, response_to),
    }
}

/// Encode an update message.
pub fn encode_update(update: &Update, request_id: i32, response_to: i32) -> Result<Vec<u8>> {
    require_collection(&update.collection)?;

    let doc_len = update.selector.encoded_len() + update.update.encoded_len();
    let mut body = Vec::with_capacity(4 + update.collection.len() + 1 + 4 + doc_len);
    put_i32(&mut body, 0);
    put_cstring(&mut body, &update.collection);
    put_u32(&mut body, encode_flags(&update.flags, OpCode::Update));
    body.extend_from_slice(update.selector.as_bytes());
    body.extend_from_slice(update.update.as_bytes());

    finish_message(&body, request_id, response_to, OpCode::Update)
}

/// Encode an insert message.
pub fn encode_insert(insert: &Insert, request_id: i32, response_to: i32) -> Result<Vec<u8>> {
    require_collection(&insert.collection)?;

    let mut body = Vec::new();
    put_u32(&mut body, encode_flags(&insert.flags, OpCode::Insert));
    put_cstring(&mut body, &insert.collection);
    encode_documents(&insert.documents, &mut body);

    finish_message(&body, request_id, response_to, OpCode::Insert)
}

/// Encode a query message.
pub fn encode_query(query: &Query, request_id: i32, response_to: i32) -> Result<Vec<u8>> {
    require_collection(&query.collection)?;
    require_non_negative("number_to_skip", query.number_to_skip)?;
    require_non_negative("number_to_return", query.number_to_return)?;

    let mut body = Vec::new();
    put_u32(&mut body, encode_flags(&query.flags, OpCode::Query));
    put_cstring(&mut body, &query.collection);
    put_i32(&mut body, query.number_to_skip);
    put_i32(&mut body, query.number_to_return);
    body.extend_from_slice(query.query.as_bytes());
    // Absent projection is zero bytes, not an empty document.
    if let Some(selector) = &query.return_field_selector {
        body.extend_from_slice(selector.as_bytes());
    }

    finish_message(&body, request_id, response_to, OpCode::Query)
}

/// Encode a getmore message.
pub fn encode_getmore(getmore: &GetMore, request_id: i32, response_to: i32) -> Result<Vec<u8>> {
    require_collection(&getmore.collection)?;
    require_non_negative("number_to_return", getmore.number_to_return)?;

    let mut body = Vec::with_capacity(4 + getmore.collection.len() + 1 + 4 + 8);
    put_i32(&mut body, 0);
    put_cstring(&mut body, &getmore.collection);
    put_i32(&mut body, getmore.number_to_return);
    put_i64(&mut body, getmore.cursor_id);

    finish_message(&body, request_id, response_to, OpCode::GetMore)
}

/// Encode a delete message.
pub fn encode_delete(delete: &Delete, request_id: i32, response_to: i32) -> Result<Vec<u8>> {
    require_collection(&delete.collection)?;

    let mut body = Vec::with_capacity(4 + delete.collection.len() + 1 + 4 + delete.selector.encoded_len());
    put_i32(&mut body, 0);
    put_cstring(&mut body, &delete.collection);
    put_u32(&mut body, encode_flags(&delete.flags, OpCode::Delete));
    body.extend_from_slice(delete.selector.as_bytes());

    finish_message(&body, request_id, response_to, OpCode::Delete)
}

/// Encode a kill_cursors message.
///
/// Cursor ids may be any i64; negative sentinels such as `-1` are valid
/// on the wire.
pub fn encode_kill_cursors(
    kill: &KillCursors,
    request_id: i32,
    response_to: i32,
) -> Result<Vec<u8>> {
    let count = i32::try_from(kill.cursor_ids.len()).map_err(|_| Error::InvalidArgument {
        field: "cursor_ids",
        reason: format!("{} ids overflow the i32 count field", kill.cursor_ids.len()),
    })?;

    let mut body = Vec::with_capacity(8 + kill.cursor_ids.len() * 8);
    put_i32(&mut body, 0);
    put_i32(&mut body, count);
    for &cursor_id in &kill.cursor_ids {
        put_i64(&mut body, cursor_id);
    }

    finish_message(&body, request_id, response_to, OpCode::KillCursors)
}

/// Encode a generic msg message.
pub fn encode_msg(msg: &Msg, request_id: i32, response_to: i32) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(msg.message.len() + 1);
    put_cstring(&mut body, &msg.message);

    finish_message(&body, request_id, response_to, OpCode::Msg)
}

/// Encode a reply message.
pub fn encode_reply(reply: &Reply, request_id: i32, response_to: i32) -> Result<Vec<u8>> {
    require_non_negative("starting_from", reply.starting_from)?;
    require_non_negative("number_returned", reply.number_returned)?;

    let mut body = Vec::new();
    put_u32(&mut body, encode_flags(&reply.response_flags, OpCode::Reply));
    put_i64(&mut body, reply.cursor_id);
    put_i32(&mut body, reply.starting_from);
    put_i32(&mut body, reply.number_returned);
    encode_documents(&reply.documents, &mut body);

    finish_message(&body, request_id, response_to, OpCode::Reply)
}

/// Decode a received buffer into a structured message.
///
/// Parses the header, validates that the declared length matches the
/// buffer, then dispatches to the decoder for the embedded op code. Every
/// failure aborts the whole decode; no partial message is ever returned.
pub fn decode(buf: &[u8]) -> Result<Message> {
    if buf.len() < HEADER_SIZE {
        return Err(Error::BufferTooSmall {
            needed: HEADER_SIZE,
            got: buf.len(),
        });
    }
    let header = MessageHeader::from_bytes(buf)?;

    // Field boundaries below cannot be trusted unless the declared
    // length matches the bytes actually received.
    if usize::try_from(header.message_length) != Ok(buf.len()) {
        return Err(Error::LengthMismatch {
            declared: header.message_length,
            actual: buf.len(),
        });
    }
    trace!(op = %header.op_code, len = buf.len(), "decoding message");

    let mut r = Reader::new(&buf[HEADER_SIZE..], HEADER_SIZE);
    let body = match header.op_code {
        OpCode::Update => Body::Update(decode_update(&mut r)?),
        OpCode::Insert => Body::Insert(decode_insert(&mut r)?),
        OpCode::Query => Body::Query(decode_query(&mut r)?),
        OpCode::GetMore => Body::GetMore(decode_getmore(&mut r)?),
        OpCode::Delete => Body::Delete(decode_delete(&mut r)?),
        OpCode::KillCursors => Body::KillCursors(decode_kill_cursors(&mut r)?),
        OpCode::Msg => Body::Msg(decode_msg(&mut r)?),
        OpCode::Reply => Body::Reply(decode_reply(&mut r)?),
    };

    Ok(Message {
        request_id: header.request_id,
        response_to: header.response_to,
        body,
    })
}

fn require_zero(r: &mut Reader<'_>, field: &'static str) -> Result<()> {
    let value = r.read_i32()?;
    if value != 0 {
        return Err(Error::ReservedFieldViolation { field, value });
    }
    Ok(())
}

fn read_rest_documents(r: &mut Reader<'_>) -> Result<Vec<Document>> {
    let offset = r.offset();
    decode_documents(r.take_rest(), offset)
}

fn decode_update(r: &mut Reader<'_>) -> Result<Update> {
    require_zero(r, "update.zero")?;
    let collection = r.read_cstring()?;
    let flags = decode_flags(r.read_u32()?, OpCode::Update);
    let documents = read_rest_documents(r)?;

    let [selector, update] =
        <[Document; 2]>::try_from(documents).map_err(|documents| Error::WrongDocumentCount {
            op: OpCode::Update,
            expected: "exactly 2",
            got: documents.len(),
        })?;

    Ok(Update {
        collection,
        flags,
        selector,
        update,
    })
}

fn decode_insert(r: &mut Reader<'_>) -> Result<Insert> {
    let flags = decode_flags(r.read_u32()?, OpCode::Insert);
    let collection = r.read_cstring()?;
    let documents = read_rest_documents(r)?;

    Ok(Insert {
        collection,
        flags,
        documents,
    })
}

fn decode_query(r: &mut Reader<'_>) -> Result<Query> {
    let flags = decode_flags(r.read_u32()?, OpCode::Query);
    let collection = r.read_cstring()?;
    let number_to_skip = r.read_i32()?;
    let number_to_return = r.read_i32()?;
    let documents = read_rest_documents(r)?;

    let got = documents.len();
    let mut documents = documents.into_iter();
    let (query, return_field_selector) = match (documents.next(), documents.next(), documents.next())
    {
        (Some(query), selector, None) => (query, selector),
        _ => {
            return Err(Error::WrongDocumentCount {
                op: OpCode::Query,
                expected: "1 or 2",
                got,
            });
        }
    };

    Ok(Query {
        collection,
        flags,
        number_to_skip,
        number_to_return,
        query,
        return_field_selector,
    })
}

fn decode_getmore(r: &mut Reader<'_>) -> Result<GetMore> {
    require_zero(r, "getmore.zero")?;
    let collection = r.read_cstring()?;
    let number_to_return = r.read_i32()?;
    let cursor_id = r.read_i64()?;

    Ok(GetMore {
        collection,
        number_to_return,
        cursor_id,
    })
}

fn decode_delete(r: &mut Reader<'_>) -> Result<Delete> {
    require_zero(r, "delete.zero")?;
    let collection = r.read_cstring()?;
    let flags = decode_flags(r.read_u32()?, OpCode::Delete);
    let documents = read_rest_documents(r)?;

    let [selector] =
        <[Document; 1]>::try_from(documents).map_err(|documents| Error::WrongDocumentCount {
            op: OpCode::Delete,
            expected: "exactly 1",
            got: documents.len(),
        })?;

    Ok(Delete {
        collection,
        flags,
        selector,
    })
}

fn decode_kill_cursors(r: &mut Reader<'_>) -> Result<KillCursors> {
    require_zero(r, "kill_cursors.zero")?;
    let declared = r.read_i32()?;

    let remaining = r.remaining();
    let expected = usize::try_from(declared)
        .ok()
        .and_then(|count| count.checked_mul(8));
    if expected != Some(remaining) {
        return Err(Error::CursorCountMismatch {
            declared,
            remaining,
        });
    }

    let mut cursor_ids = Vec::with_capacity(remaining / 8);
    for _ in 0..remaining / 8 {
        cursor_ids.push(r.read_i64()?);
    }

    Ok(KillCursors { cursor_ids })
}

fn decode_msg(r: &mut Reader<'_>) -> Result<Msg> {
    let message = r.read_cstring()?;
    if r.remaining() != 0 {
        return Err(Error::TrailingBytes {
            op: OpCode::Msg,
            count: r.remaining(),
        });
    }

    Ok(Msg { message })
}

fn decode_reply(r: &mut Reader<'_>) -> Result<Reply> {
    let response_flags = decode_flags(r.read_u32()?, OpCode::Reply);
    let cursor_id = r.read_i64()?;
    let starting_from = r.read_i32()?;
    let number_returned = r.read_i32()?;
    let documents = read_rest_documents(r)?;

    Ok(Reply {
        response_flags,
        cursor_id,
        starting_from,
        number_returned,
        documents,
    })
}
