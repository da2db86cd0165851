//! Structured message model
//!
//! [`Body`] is a closed enum over the eight op-code variants, so adding
//! an op code forces every dispatch site to handle it. A message's wire
//! identity is the op code alone; there is no other discriminant.

use super::{Document, FlagMap, OpCode, Result};

/// Update documents matching a selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Fully qualified collection name, `"db.collection"`
    pub collection: String,
    /// Update flags: `Upsert`, `MultiUpdate`
    pub flags: FlagMap,
    /// Selector document choosing which documents to update
    pub selector: Document,
    /// Update document to apply
    pub update: Document,
}

impl Update {
    /// Update with no flags set.
    pub fn new(collection: impl Into<String>, selector: Document, update: Document) -> Self {
        Self {
            collection: collection.into(),
            flags: FlagMap::new(),
            selector,
            update,
        }
    }
}

/// Insert one or more documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Fully qualified collection name
    pub collection: String,
    /// Insert flags: `ContinueOnError`
    pub flags: FlagMap,
    /// Documents to insert, in order
    pub documents: Vec<Document>,
}

impl Insert {
    /// Insert with no flags set.
    pub fn new(collection: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            collection: collection.into(),
            flags: FlagMap::new(),
            documents,
        }
    }
}

/// Query a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Fully qualified collection name
    pub collection: String,
    /// Query flags: `TailableCursor`, `SlaveOk`, `OplogReplay`,
    /// `NoCursorTimeout`, `AwaitData`, `Exhaust`, `Partial`
    pub flags: FlagMap,
    /// Documents to skip before returning results
    pub number_to_skip: i32,
    /// Batch size to return, 0 for the server default
    pub number_to_return: i32,
    /// Query document
    pub query: Document,
    /// Optional projection; absent means zero bytes on the wire, not an
    /// empty document
    pub return_field_selector: Option<Document>,
}

impl Query {
    /// Query with wire defaults: skip 0, return 1, no flags, no
    /// projection.
    pub fn new(collection: impl Into<String>, query: Document) -> Self {
        Self {
            collection: collection.into(),
            flags: FlagMap::new(),
            number_to_skip: 0,
            number_to_return: 1,
            query,
            return_field_selector: None,
        }
    }
}

/// Fetch the next batch from an open cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct GetMore {
    /// Fully qualified collection name
    pub collection: String,
    /// Batch size to return
    pub number_to_return: i32,
    /// Cursor to continue; any i64, negative sentinels included
    pub cursor_id: i64,
}

/// Delete documents matching a selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Fully qualified collection name
    pub collection: String,
    /// Delete flags: `SingleRemove`
    pub flags: FlagMap,
    /// Selector document choosing which documents to delete
    pub selector: Document,
}

impl Delete {
    /// Delete with no flags set.
    pub fn new(collection: impl Into<String>, selector: Document) -> Self {
        Self {
            collection: collection.into(),
            flags: FlagMap::new(),
            selector,
        }
    }
}

/// Invalidate server-side cursors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillCursors {
    /// Cursors to invalidate; the wire count field is derived from the
    /// length of this list
    pub cursor_ids: Vec<i64>,
}

/// Generic diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msg {
    /// Message text
    pub message: String,
}

/// Server reply to a query or getmore.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Reply flags: `CursorNotFound`, `QueryFailure`, `ShardConfigStale`,
    /// `AwaitCapable`
    pub response_flags: FlagMap,
    /// Cursor the client may continue with, 0 when exhausted
    pub cursor_id: i64,
    /// Position of the first returned document in the cursor
    pub starting_from: i32,
    /// Number of documents in this reply
    pub number_returned: i32,
    /// Returned documents, in order
    pub documents: Vec<Document>,
}

impl Reply {
    /// Reply with `number_returned` derived from the document count.
    #[must_use]
    pub fn new(
        response_flags: FlagMap,
        cursor_id: i64,
        starting_from: i32,
        documents: Vec<Document>,
    ) -> Self {
        let number_returned = documents.len() as i32;
        Self {
            response_flags,
            cursor_id,
            starting_from,
            number_returned,
            documents,
        }
    }
}

/// The eight op-code message bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `OP_UPDATE` (2001)
    Update(Update),
    /// `OP_INSERT` (2002)
    Insert(Insert),
    /// `OP_QUERY` (2004)
    Query(Query),
    /// `OP_GETMORE` (2005)
    GetMore(GetMore),
    /// `OP_DELETE` (2006)
    Delete(Delete),
    /// `OP_KILL_CURSORS` (2007)
    KillCursors(KillCursors),
    /// `OP_MSG` (1000)
    Msg(Msg),
    /// `OP_REPLY` (1)
    Reply(Reply),
}

impl Body {
    /// Op code identifying this body on the wire.
    #[must_use]
    pub fn op_code(&self) -> OpCode {
        match self {
            Self::Update(_) => OpCode::Update,
            Self::Insert(_) => OpCode::Insert,
            Self::Query(_) => OpCode::Query,
            Self::GetMore(_) => OpCode::GetMore,
            Self::Delete(_) => OpCode::Delete,
            Self::KillCursors(_) => OpCode::KillCursors,
            Self::Msg(_) => OpCode::Msg,
            Self::Reply(_) => OpCode::Reply,
        }
    }
}

macro_rules! body_from {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Body {
                fn from(body: $variant) -> Self {
                    Self::$variant(body)
                }
            }
        )+
    };
}

body_from!(Update, Insert, Query, GetMore, Delete, KillCursors, Msg, Reply);

/// A complete message: header ids plus the op-specific body.
///
/// `message_length` is not carried here; it is computed on encode and
/// validated on decode, and the op code lives in the [`Body`] tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Client-assigned message id, 0 when the caller does not track ids
    pub request_id: i32,
    /// `request_id` of the message this one answers, 0 for requests
    pub response_to: i32,
    /// Op-specific body
    pub body: Body,
}

impl Message {
    /// Message with both header ids defaulted to 0.
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            request_id: 0,
            response_to: 0,
            body: body.into(),
        }
    }

    /// Message with explicit header ids.
    pub fn with_ids(body: impl Into<Body>, request_id: i32, response_to: i32) -> Self {
        Self {
            request_id,
            response_to,
            body: body.into(),
        }
    }

    /// Op code identifying this message on the wire.
    #[must_use]
    pub fn op_code(&self) -> OpCode {
        self.body.op_code()
    }

    /// Encode this message to its wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        super::encode(self)
    }

    /// Decode a received buffer into a message.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        super::decode(buf)
    }
}
