//! Op codes and per-op flag tables

use std::collections::BTreeMap;
use std::fmt;

/// Message op codes
///
/// The integer values are part of the wire contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum OpCode {
    /// Server reply to a query or getmore
    Reply = 1,
    /// Generic diagnostic message
    Msg = 1000,
    /// Update documents matching a selector
    Update = 2001,
    /// Insert one or more documents
    Insert = 2002,
    /// Query a collection
    Query = 2004,
    /// Fetch more results from an open cursor
    GetMore = 2005,
    /// Delete documents matching a selector
    Delete = 2006,
    /// Invalidate server-side cursors
    KillCursors = 2007,
}

impl OpCode {
    /// Map a wire integer to its op code.
    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Reply),
            1000 => Some(Self::Msg),
            2001 => Some(Self::Update),
            2002 => Some(Self::Insert),
            2004 => Some(Self::Query),
            2005 => Some(Self::GetMore),
            2006 => Some(Self::Delete),
            2007 => Some(Self::KillCursors),
            _ => None,
        }
    }

    /// Wire integer for this op code.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reply => "reply",
            Self::Msg => "msg",
            Self::Update => "update",
            Self::Insert => "insert",
            Self::Query => "query",
            Self::GetMore => "getmore",
            Self::Delete => "delete",
            Self::KillCursors => "kill_cursors",
        };
        write!(f, "{name}")
    }
}

/// Symbolic flag name → value.
///
/// Which names are meaningful depends on the enclosing message's op code;
/// see [`flag_table`]. Ordered so decoded maps compare deterministically.
pub type FlagMap = BTreeMap<String, bool>;

const UPDATE_FLAGS: &[(u32, &str)] = &[(0, "Upsert"), (1, "MultiUpdate")];

const INSERT_FLAGS: &[(u32, &str)] = &[(0, "ContinueOnError")];

// Bit 0 of the query flag word is reserved and never mapped.
const QUERY_FLAGS: &[(u32, &str)] = &[
    (1, "TailableCursor"),
    (2, "SlaveOk"),
    (3, "OplogReplay"),
    (4, "NoCursorTimeout"),
    (5, "AwaitData"),
    (6, "Exhaust"),
    (7, "Partial"),
];

const DELETE_FLAGS: &[(u32, &str)] = &[(0, "SingleRemove")];

const REPLY_FLAGS: &[(u32, &str)] = &[
    (0, "CursorNotFound"),
    (1, "QueryFailure"),
    (2, "ShardConfigStale"),
    (3, "AwaitCapable"),
];

/// Bit-position → flag-name table for an op code.
///
/// getmore, kill_cursors and msg carry no flag word; their table is empty.
#[must_use]
pub fn flag_table(op: OpCode) -> &'static [(u32, &'static str)] {
    match op {
        OpCode::Update => UPDATE_FLAGS,
        OpCode::Insert => INSERT_FLAGS,
        OpCode::Query => QUERY_FLAGS,
        OpCode::Delete => DELETE_FLAGS,
        OpCode::Reply => REPLY_FLAGS,
        OpCode::GetMore | OpCode::KillCursors | OpCode::Msg => &[],
    }
}

/// Build the 32-bit flag word for `op` from a flag map.
///
/// Bit `b` is set iff the map holds a name defined at bit `b` for this op
/// code with value `true`. Names not defined for the op are ignored, so
/// this never fails.
#[must_use]
pub fn encode_flags(flags: &FlagMap, op: OpCode) -> u32 {
    let mut word = 0u32;
    for &(bit, name) in flag_table(op) {
        if flags.get(name).copied().unwrap_or(false) {
            word |= 1 << bit;
        }
    }
    word
}

/// Decode a 32-bit flag word for `op` into a flag map.
///
/// Request-side ops (update, insert, query, delete) report every defined
/// name explicitly, set or not. Reply reports only the names whose bit is
/// set; names for unset bits are absent entirely. The asymmetry is
/// observable wire behavior and is preserved deliberately.
#[must_use]
pub fn decode_flags(word: u32, op: OpCode) -> FlagMap {
    let mut flags = FlagMap::new();
    for &(bit, name) in flag_table(op) {
        let set = word & (1 << bit) != 0;
        if set || op != OpCode::Reply {
            flags.insert(name.to_owned(), set);
        }
    }
    flags
}
