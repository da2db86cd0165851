//! Message header
//!
//! Every message starts with the same 16 bytes:
//!
//! ```text
//! [message_length:i32][request_id:i32][response_to:i32][op_code:i32]
//! ```
//!
//! `message_length` covers the header itself plus the body.

use bytes::BufMut;

use super::{Error, HEADER_SIZE, OpCode, Reader, Result};

/// Parsed 16-byte message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Total message length, header included
    pub message_length: i32,
    /// Client-assigned message id
    pub request_id: i32,
    /// `request_id` of the message this one answers, 0 for requests
    pub response_to: i32,
    /// Which of the eight body shapes follows
    pub op_code: OpCode,
}

impl MessageHeader {
    /// Serialize the header to its 16 wire bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.message_length.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.request_id.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.response_to.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.op_code.as_i32().to_le_bytes());
        bytes
    }

    /// Parse the leading 16 bytes of a message.
    ///
    /// Fails with [`Error::UnknownOpCode`] when the op-code integer has no
    /// mapping. Does not compare `message_length` against the buffer; the
    /// decode facade owns that check because only it sees the full
    /// received buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes, 0);
        let message_length = r.read_i32()?;
        let request_id = r.read_i32()?;
        let response_to = r.read_i32()?;
        let raw_op = r.read_i32()?;
        let op_code = OpCode::from_i32(raw_op).ok_or(Error::UnknownOpCode { code: raw_op })?;

        Ok(Self {
            message_length,
            request_id,
            response_to,
            op_code,
        })
    }
}

/// Total message length for a body, or an error when it cannot be
/// represented in the header's i32 length field.
fn message_length(body_len: usize) -> Result<i32> {
    i32::try_from(HEADER_SIZE + body_len).map_err(|_| Error::InvalidArgument {
        field: "body",
        reason: format!("body of {body_len} bytes overflows the length header"),
    })
}

/// Prepend the header to a finished body.
///
/// This is the single shared apply-header step: every encoder builds its
/// body first and finishes here, so the length arithmetic lives in one
/// place. Fails when the total length overflows the i32 length field.
pub fn finish_message(
    body: &[u8],
    request_id: i32,
    response_to: i32,
    op_code: OpCode,
) -> Result<Vec<u8>> {
    let header = MessageHeader {
        message_length: message_length(body.len())?,
        request_id,
        response_to,
        op_code,
    };

    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.put_slice(&header.to_bytes());
    buf.put_slice(body);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = MessageHeader {
            message_length: 62,
            request_id: 7,
            response_to: 3,
            op_code: OpCode::Update,
        };
        let bytes = header.to_bytes();
        assert_eq!(MessageHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_wire_layout() {
        let header = MessageHeader {
            message_length: 40,
            request_id: 1,
            response_to: 0,
            op_code: OpCode::KillCursors,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &40i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &0i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &2007i32.to_le_bytes());
    }

    #[test]
    fn test_unknown_op_code_rejected() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[12..16].copy_from_slice(&2003i32.to_le_bytes());
        assert!(matches!(
            MessageHeader::from_bytes(&bytes),
            Err(Error::UnknownOpCode { code: 2003 })
        ));
    }

    #[test]
    fn test_short_header_rejected() {
        assert!(matches!(
            MessageHeader::from_bytes(&[0u8; 10]),
            Err(Error::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_finish_message_length_covers_header_and_body() {
        let body = [0xAB; 9];
        let buf = finish_message(&body, 0, 0, OpCode::Msg).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + 9);
        assert_eq!(&buf[0..4], &(buf.len() as i32).to_le_bytes());
        assert_eq!(&buf[HEADER_SIZE..], &body);
    }

    #[test]
    fn test_oversized_body_overflows_length_header() {
        assert_eq!(message_length(100).unwrap(), 116);
        assert!(matches!(
            message_length(i32::MAX as usize),
            Err(Error::InvalidArgument { field: "body", .. })
        ));
    }
}
