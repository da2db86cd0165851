//! Opaque documents and the document-stream codec
//!
//! Document contents belong to an external document codec; this crate
//! treats a document as an atomic blob whose first four bytes declare its
//! own total length. That self-declared length is the only delimiter
//! between documents in a stream.

use bytes::Bytes;

use super::{Error, Result};

/// Minimum encoded document: 4-byte length prefix + 1-byte terminator.
const MIN_DOCUMENT_SIZE: usize = 5;

/// One externally-encoded, self-length-prefixed document.
///
/// Immutable once built. The wrapped bytes are exactly one document: the
/// leading 4-byte little-endian length prefix covers the whole buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document(Bytes);

impl Document {
    /// Wrap an already-encoded document, validating its length prefix
    /// against the buffer.
    pub fn from_encoded(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < MIN_DOCUMENT_SIZE {
            return Err(Error::InvalidArgument {
                field: "document",
                reason: format!(
                    "encoded document must be at least {MIN_DOCUMENT_SIZE} bytes, got {}",
                    bytes.len()
                ),
            });
        }
        let declared = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if declared as usize != bytes.len() {
            return Err(Error::InvalidArgument {
                field: "document",
                reason: format!(
                    "length prefix declares {declared} bytes, buffer holds {}",
                    bytes.len()
                ),
            });
        }
        Ok(Self(bytes))
    }

    /// Used by the stream decoder, which has already validated the prefix.
    pub(crate) fn from_validated(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// The document's encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encoded length in bytes (equals the length prefix).
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

/// Append zero or more documents back-to-back, no separators.
pub fn encode_documents(documents: &[Document], buf: &mut Vec<u8>) {
    for doc in documents {
        buf.extend_from_slice(doc.as_bytes());
    }
}

/// Split a contiguous byte range into its ordered documents.
///
/// `base_offset` is where `buf` sits within the full message, used for
/// error context. The result is fully materialized so callers can check
/// the count immediately.
pub fn decode_documents(buf: &[u8], base_offset: usize) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        let remaining = buf.len() - pos;
        if remaining < 4 {
            return Err(Error::TruncatedDocument {
                offset: base_offset + pos,
                needed: 4,
                remaining,
            });
        }
        let declared = i32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap());
        // A negative or sub-minimum prefix is corrupt in its own right;
        // keep the raw wire value in the diagnostic.
        let needed = usize::try_from(declared).ok().filter(|&n| n >= MIN_DOCUMENT_SIZE);
        let Some(needed) = needed else {
            return Err(Error::InvalidDocumentLength {
                offset: base_offset + pos,
                declared,
            });
        };
        if needed > remaining {
            return Err(Error::TruncatedDocument {
                offset: base_offset + pos,
                needed,
                remaining,
            });
        }
        let bytes = Bytes::copy_from_slice(&buf[pos..pos + needed]);
        documents.push(Document::from_validated(bytes));
        pos += needed;
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_doc(payload: &[u8]) -> Document {
        let total = 4 + payload.len() + 1;
        let mut bytes = Vec::with_capacity(total);
        bytes.extend_from_slice(&(total as i32).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes.push(0);
        Document::from_encoded(bytes).unwrap()
    }

    #[test]
    fn test_from_encoded_validates_prefix() {
        let mut bytes = vec![0u8; 8];
        bytes[0..4].copy_from_slice(&9i32.to_le_bytes());
        assert!(matches!(
            Document::from_encoded(bytes),
            Err(Error::InvalidArgument { field: "document", .. })
        ));
    }

    #[test]
    fn test_from_encoded_rejects_tiny_buffer() {
        assert!(matches!(
            Document::from_encoded(vec![5, 0, 0]),
            Err(Error::InvalidArgument { field: "document", .. })
        ));
    }

    #[test]
    fn test_encode_empty_stream_is_zero_bytes() {
        let mut buf = Vec::new();
        encode_documents(&[], &mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_stream_roundtrip_preserves_order() {
        let docs = vec![raw_doc(b"first"), raw_doc(b"second"), raw_doc(b"")];
        let mut buf = Vec::new();
        encode_documents(&docs, &mut buf);
        assert_eq!(
            buf.len(),
            docs.iter().map(Document::encoded_len).sum::<usize>()
        );

        let decoded = decode_documents(&buf, 0).unwrap();
        assert_eq!(decoded, docs);
    }

    #[test]
    fn test_truncated_document_rejected() {
        let doc = raw_doc(b"payload");
        let mut buf = Vec::new();
        encode_documents(&[doc], &mut buf);
        buf.truncate(buf.len() - 2);

        let err = decode_documents(&buf, 16).unwrap_err();
        assert!(matches!(err, Error::TruncatedDocument { offset: 16, .. }));
    }

    #[test]
    fn test_truncation_offset_points_at_second_doc() {
        let first = raw_doc(b"ok");
        let first_len = first.encoded_len();
        let mut buf = Vec::new();
        encode_documents(&[first], &mut buf);
        // Second document declares more bytes than remain.
        buf.extend_from_slice(&100i32.to_le_bytes());
        buf.push(0);

        let err = decode_documents(&buf, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedDocument { offset, needed: 100, .. } if offset == first_len
        ));
    }

    #[test]
    fn test_negative_declared_length_reported_raw() {
        let buf = (-5i32).to_le_bytes();
        assert!(matches!(
            decode_documents(&buf, 16),
            Err(Error::InvalidDocumentLength {
                offset: 16,
                declared: -5,
            })
        ));
    }

    #[test]
    fn test_sub_minimum_declared_length_rejected() {
        let buf = 3i32.to_le_bytes();
        assert!(matches!(
            decode_documents(&buf, 0),
            Err(Error::InvalidDocumentLength { declared: 3, .. })
        ));
    }
}
