//! Append buffer
//!
//! Joins message tokens into a single newline-terminated line.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{AppendError, Result};

/// Token separator
const SEPARATOR: u8 = b' ';

/// Line terminator
const NEWLINE: u8 = b'\n';

/// A fully built line, ready to be written with a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendLine {
    bytes: Bytes,
}

impl AppendLine {
    /// Build a line from `messages`, refusing anything longer than `limit`.
    ///
    /// The required length is computed before any allocation, so an
    /// oversized request never touches memory beyond the size check.
    pub fn build<S: AsRef<[u8]>>(messages: &[S], limit: usize) -> Result<Self> {
        if messages.is_empty() {
            return Err(AppendError::InvalidArgument(
                "at least one message token is required".to_string(),
            ));
        }

        let required = match Self::required_len(messages) {
            Some(len) if len <= limit => len,
            Some(len) => return Err(AppendError::MessageTooLarge { required: len, limit }),
            None => {
                return Err(AppendError::MessageTooLarge { required: usize::MAX, limit });
            }
        };

        let mut buf = BytesMut::with_capacity(required);
        for (i, token) in messages.iter().enumerate() {
            if i > 0 {
                buf.put_u8(SEPARATOR);
            }
            buf.put_slice(token.as_ref());
        }
        buf.put_u8(NEWLINE);

        debug_assert_eq!(buf.len(), required);

        Ok(Self { bytes: buf.freeze() })
    }

    /// Serialized length: tokens + separators + newline.
    /// `None` if it does not fit in `usize`.
    pub fn required_len<S: AsRef<[u8]>>(messages: &[S]) -> Option<usize> {
        let separators = messages.len().saturating_sub(1);
        messages
            .iter()
            .try_fold(separators, |acc, token| acc.checked_add(token.as_ref().len()))?
            .checked_add(1)
    }

    /// The line bytes, newline included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes, newline included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a built line holds at least its newline
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
