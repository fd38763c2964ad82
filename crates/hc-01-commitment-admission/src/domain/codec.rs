//! # Token Codec
//!
//! Flat length-prefixed framing: one length byte `L`, then `L` bytes of
//! field, repeated until the buffer ends. There are no type tags and no
//! escaping; the codec knows nothing about what the fields mean, and the
//! field count is the validator's business.

use super::errors::CodecError;

/// Longest field the one-byte length prefix can describe.
pub const MAX_FIELD_LEN: usize = u8::MAX as usize;

/// Split `buffer` into its fields, borrowing from the input.
///
/// An empty buffer decodes to zero fields. A length byte that points past
/// the end of the buffer is `MalformedToken`.
pub fn decode(buffer: &[u8]) -> Result<Vec<&[u8]>, CodecError> {
    let mut fields = Vec::new();
    let mut offset = 0;

    while let Some(&length) = buffer.get(offset) {
        let declared = usize::from(length);
        let start = offset + 1;
        let remaining = buffer.len() - start;
        if declared > remaining {
            return Err(CodecError::MalformedToken {
                offset,
                declared,
                remaining,
            });
        }
        fields.push(&buffer[start..start + declared]);
        offset = start + declared;
    }

    Ok(fields)
}

/// Frame `fields` into one buffer. Fails without output if any field is
/// longer than [`MAX_FIELD_LEN`].
pub fn encode<T: AsRef<[u8]>>(fields: &[T]) -> Result<Vec<u8>, CodecError> {
    let total: usize = fields.iter().map(|f| f.as_ref().len() + 1).sum();
    let mut buffer = Vec::with_capacity(total);

    for (index, field) in fields.iter().enumerate() {
        let field = field.as_ref();
        let length = u8::try_from(field.len()).map_err(|_| CodecError::FieldTooLong {
            index,
            len: field.len(),
        })?;
        buffer.push(length);
        buffer.extend_from_slice(field);
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_buffer() {
        assert_eq!(decode(&[]).unwrap(), Vec::<&[u8]>::new());
    }

    #[test]
    fn test_decode_fields_in_order() {
        let buffer = [2, b'h', b'i', 0, 3, 1, 2, 3];
        let fields = decode(&buffer).unwrap();
        assert_eq!(fields, vec![&b"hi"[..], &[][..], &[1, 2, 3][..]]);
    }

    #[test]
    fn test_decode_truncated_field() {
        let buffer = [2, b'o', b'k', 5, 1, 2];
        assert_eq!(
            decode(&buffer),
            Err(CodecError::MalformedToken {
                offset: 3,
                declared: 5,
                remaining: 2,
            })
        );
    }

    #[test]
    fn test_decode_trailing_length_byte_only() {
        assert_eq!(
            decode(&[1]),
            Err(CodecError::MalformedToken {
                offset: 0,
                declared: 1,
                remaining: 0,
            })
        );
    }

    #[test]
    fn test_decode_zero_length_trailer_is_empty_field() {
        assert_eq!(decode(&[0]).unwrap(), vec![&[][..]]);
    }

    #[test]
    fn test_encode_matches_decode() {
        let fields: Vec<&[u8]> = vec![b"1UHRP", b"", &[0xff; 255]];
        let buffer = encode(&fields).unwrap();
        assert_eq!(buffer.len(), 5 + 1 + 1 + 256);
        assert_eq!(decode(&buffer).unwrap(), fields);
    }

    #[test]
    fn test_encode_rejects_long_field() {
        let fields = vec![vec![0u8; 3], vec![0u8; 256]];
        assert_eq!(
            encode(&fields),
            Err(CodecError::FieldTooLong { index: 1, len: 256 })
        );
    }
}
