//! The CAS parser: a forward scan over an untrusted byte slice that recovers
//! a [`Container`](crate::structs::container::Container) without ever
//! reading behind a record's declared (or scanned) boundary.

use crate::structs::container::{
    self, AddressTriple, Container, DataBlock, File, FileKind, FileName,
};
use crate::utils::cursor::ByteCursor;
use crate::utils::errors::ParseError;

/// Result of a parse attempt: everything recovered before the failure, plus
/// the failure itself if parsing stopped early.
///
/// Parsing never fails outright — a malformed record truncates the scan but
/// every file recognised up to that point is still returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome<'a> {
    pub container: Container<'a>,
    pub error: Option<ParseError>,
}

/// Scans `buffer` for a sequence of CAS file records.
///
/// Trailing bytes that don't begin with a magic are silently ignored — this
/// includes the case of no magic anywhere in `buffer`, which yields an empty
/// container rather than an error. A non-magic byte at the very start is
/// never skipped over in search of a later one: only files beginning at the
/// cursor are recognised.
pub fn parse(buffer: &[u8]) -> ParseOutcome<'_> {
    let mut cursor = ByteCursor::new(buffer);
    let mut files = Vec::new();
    let mut error = None;

    while !cursor.is_at_end() {
        if !cursor.match_and_advance(&container::MAGIC) {
            break;
        }
        let file_offset = cursor.position() - container::MAGIC.len();
        match parse_one_file(&mut cursor, file_offset) {
            Ok(file) => files.push(file),
            Err(e) => {
                error = Some(e);
                break;
            }
        }
    }

    ParseOutcome {
        container: Container { files },
        error,
    }
}

fn parse_one_file<'a>(
    cursor: &mut ByteCursor<'a>,
    file_offset: usize,
) -> Result<File<'a>, ParseError> {
    let type_marker = cursor.peek(10);

    match type_marker {
        Some(bytes) if bytes == container::TYPE_ASCII.as_slice() => {
            let name = take_header_name(cursor)?;
            parse_ascii_blocks(cursor, file_offset, name)
        }
        Some(bytes) if bytes == container::TYPE_BINARY.as_slice() => {
            let name = take_header_name(cursor)?;
            parse_binary_block(cursor, file_offset, name)
        }
        Some(bytes) if bytes == container::TYPE_BASIC.as_slice() => {
            let name = take_header_name(cursor)?;
            parse_basic_block(cursor, file_offset, name)
        }
        _ => {
            log::warn!(
                "file at offset {file_offset}: unrecognised type marker, treating as custom"
            );
            parse_custom_body(cursor, file_offset)
        }
    }
}

fn take_header_name(cursor: &mut ByteCursor<'_>) -> Result<FileName, ParseError> {
    let header = cursor
        .take(container::FILE_HEADER_LEN)
        .ok_or_else(|| ParseError::MalformedHeader(cursor.position()))?;
    let name: [u8; 6] = header[10..16].try_into().expect("header is 16 bytes");
    Ok(FileName(name))
}

/// Takes the payload bounded by the next magic or end-of-input, without
/// consuming the boundary magic itself.
fn take_bounded_block<'a>(cursor: &mut ByteCursor<'a>) -> &'a [u8] {
    let boundary = cursor.search_forward(&container::MAGIC);
    cursor.take_until(boundary).expect("boundary is never behind the cursor")
}

fn parse_ascii_blocks<'a>(
    cursor: &mut ByteCursor<'a>,
    file_offset: usize,
    name: FileName,
) -> Result<File<'a>, ParseError> {
    let mut blocks = Vec::new();

    loop {
        if !cursor.match_and_advance(&container::MAGIC) {
            return Err(ParseError::UnexpectedEof(cursor.position()));
        }
        let block_offset = cursor.position();
        let span = take_bounded_block(cursor);
        let reached_eof = cursor.is_at_end();

        match span.iter().position(|&b| b == container::ASCII_EOF_MARKER) {
            Some(eof_pos) => {
                blocks.push(DataBlock {
                    payload: &span[..eof_pos],
                    offset: block_offset,
                });
                break;
            }
            None => {
                blocks.push(DataBlock {
                    payload: span,
                    offset: block_offset,
                });
                if reached_eof {
                    return Err(ParseError::UnexpectedEof(cursor.position()));
                }
            }
        }
    }

    Ok(File {
        offset: file_offset,
        kind: FileKind::Ascii { name, blocks },
    })
}

fn parse_binary_block<'a>(
    cursor: &mut ByteCursor<'a>,
    file_offset: usize,
    name: FileName,
) -> Result<File<'a>, ParseError> {
    if !cursor.match_and_advance(&container::MAGIC) {
        return Err(ParseError::UnexpectedEof(cursor.position()));
    }
    if cursor.remaining() < 6 {
        return Err(ParseError::MalformedHeader(cursor.position()));
    }
    let address = AddressTriple {
        load: cursor.read_le_u16().expect("checked remaining() >= 6 above"),
        end: cursor.read_le_u16().expect("checked remaining() >= 6 above"),
        exec: cursor.read_le_u16().expect("checked remaining() >= 6 above"),
    };

    let block_offset = cursor.position();
    let payload = take_bounded_block(cursor);

    let expected_len = i64::from(address.end) - i64::from(address.load) + 1;
    let address_length_mismatch =
        expected_len < 0 || expected_len as usize != payload.len();
    if address_length_mismatch {
        log::warn!(
            "binary file at offset {file_offset}: address triple implies length {expected_len}, scanned {}",
            payload.len()
        );
    }

    Ok(File {
        offset: file_offset,
        kind: FileKind::Binary {
            name,
            address,
            block: DataBlock {
                payload,
                offset: block_offset,
            },
            address_length_mismatch,
        },
    })
}

fn parse_basic_block<'a>(
    cursor: &mut ByteCursor<'a>,
    file_offset: usize,
    name: FileName,
) -> Result<File<'a>, ParseError> {
    if !cursor.match_and_advance(&container::MAGIC) {
        return Err(ParseError::UnexpectedEof(cursor.position()));
    }
    let block_offset = cursor.position();
    let payload = take_bounded_block(cursor);

    Ok(File {
        offset: file_offset,
        kind: FileKind::Basic {
            name,
            block: DataBlock {
                payload,
                offset: block_offset,
            },
        },
    })
}

fn parse_custom_body<'a>(
    cursor: &mut ByteCursor<'a>,
    file_offset: usize,
) -> Result<File<'a>, ParseError> {
    let block_offset = cursor.position();
    let payload = take_bounded_block(cursor);

    Ok(File {
        offset: file_offset,
        kind: FileKind::Custom {
            block: DataBlock {
                payload,
                offset: block_offset,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::container::MAGIC;

    fn concat(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn empty_input_yields_empty_container() {
        let outcome = parse(&[]);
        assert!(outcome.container.is_empty());
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn lone_magic_with_no_type_marker_is_empty_custom() {
        // Fewer than 10 bytes remain after the magic, so no known type
        // marker can match; this falls back to an empty CUSTOM file rather
        // than a parse error.
        let outcome = parse(&MAGIC);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.container.len(), 1);
        match &outcome.container.files[0].kind {
            FileKind::Custom { block } => assert!(block.payload.is_empty()),
            other => panic!("expected Custom, got {other:?}"),
        }
    }

    #[test]
    fn no_magic_at_all_yields_empty_container_without_error() {
        let outcome = parse(b"just some garbage bytes");
        assert!(outcome.container.is_empty());
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn leading_garbage_is_not_skipped() {
        let mut data = b"X".to_vec();
        data.extend_from_slice(&concat(&[&MAGIC, &container::TYPE_ASCII, b"HELLO ", &MAGIC, b"HI\x1a"]));
        let outcome = parse(&data);
        assert!(outcome.container.is_empty());
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn scenario_1_minimum_ascii() {
        let data = concat(&[&MAGIC, &container::TYPE_ASCII, b"HELLO ", &MAGIC, b"HI\x1a"]);
        let outcome = parse(&data);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.container.len(), 1);
        let file = &outcome.container.files[0];
        assert_eq!(file.offset, 0);
        match &file.kind {
            FileKind::Ascii { name, blocks } => {
                assert_eq!(name.trimmed(), "HELLO");
                assert_eq!(blocks.len(), 1);
                assert_eq!(blocks[0].payload, b"HI");
            }
            other => panic!("expected Ascii, got {other:?}"),
        }
    }

    #[test]
    fn scenario_2_minimum_binary() {
        let data = concat(&[
            &MAGIC,
            &container::TYPE_BINARY,
            b"PROG  ",
            &MAGIC,
            &[0x00, 0x80, 0x02, 0x80, 0x00, 0x80],
            &[0xAA, 0xBB, 0xCC],
        ]);
        let outcome = parse(&data);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.container.len(), 1);
        match &outcome.container.files[0].kind {
            FileKind::Binary {
                name,
                address,
                block,
                address_length_mismatch,
            } => {
                assert_eq!(name.trimmed(), "PROG");
                assert_eq!(address.load, 0x8000);
                assert_eq!(address.end, 0x8002);
                assert_eq!(address.exec, 0x8000);
                assert_eq!(block.payload, &[0xAA, 0xBB, 0xCC]);
                assert!(!*address_length_mismatch);
            }
            other => panic!("expected Binary, got {other:?}"),
        }
    }

    #[test]
    fn scenario_3_custom_trailing() {
        let data = concat(&[&MAGIC, &[0xFF; 10], &[0xAA, 0xBB, 0xCC]]);
        let outcome = parse(&data);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.container.len(), 1);
        match &outcome.container.files[0].kind {
            FileKind::Custom { block } => {
                assert_eq!(block.payload.len(), 13);
                assert_eq!(&block.payload[..10], &[0xFF; 10]);
                assert_eq!(&block.payload[10..13], &[0xAA, 0xBB, 0xCC]);
            }
            other => panic!("expected Custom, got {other:?}"),
        }
    }

    #[test]
    fn scenario_4_two_files_in_offset_order() {
        let ascii = concat(&[&MAGIC, &container::TYPE_ASCII, b"HELLO ", &MAGIC, b"HI\x1a"]);
        let binary = concat(&[
            &MAGIC,
            &container::TYPE_BINARY,
            b"PROG  ",
            &MAGIC,
            &[0x00, 0x80, 0x02, 0x80, 0x00, 0x80],
            &[0xAA, 0xBB, 0xCC],
        ]);
        let data = concat(&[&ascii, &binary]);
        let outcome = parse(&data);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.container.len(), 2);
        assert!(outcome.container.files[0].offset < outcome.container.files[1].offset);
        assert!(matches!(outcome.container.files[0].kind, FileKind::Ascii { .. }));
        assert!(matches!(outcome.container.files[1].kind, FileKind::Binary { .. }));
    }

    #[test]
    fn missing_eof_marker_surfaces_unexpected_eof() {
        let data = concat(&[&MAGIC, &container::TYPE_ASCII, b"HELLO ", &MAGIC, b"no terminator here"]);
        let outcome = parse(&data);
        assert!(outcome.container.is_empty());
        assert!(matches!(outcome.error, Some(ParseError::UnexpectedEof(_))));
    }

    #[test]
    fn truncated_address_triple_is_malformed_header() {
        let data = concat(&[&MAGIC, &container::TYPE_BINARY, b"PROG  ", &MAGIC, &[0x00, 0x80]]);
        let outcome = parse(&data);
        assert!(outcome.container.is_empty());
        assert!(matches!(outcome.error, Some(ParseError::MalformedHeader(_))));
    }

    #[test]
    fn unaligned_magic_between_ascii_blocks_is_found() {
        // A multi-block ASCII file where the final block carries a non-default
        // length, exercising the unaligned next-magic search.
        let data = concat(&[
            &MAGIC,
            &container::TYPE_ASCII,
            b"HELLO ",
            &MAGIC,
            b"first block, no terminator",
            &MAGIC,
            b"last\x1a",
        ]);
        let outcome = parse(&data);
        assert_eq!(outcome.error, None);
        match &outcome.container.files[0].kind {
            FileKind::Ascii { blocks, .. } => {
                assert_eq!(blocks.len(), 2);
                assert_eq!(blocks[0].payload, b"first block, no terminator");
                assert_eq!(blocks[1].payload, b"last");
            }
            other => panic!("expected Ascii, got {other:?}"),
        }
    }

    #[test]
    fn parse_is_idempotent() {
        let data = concat(&[&MAGIC, &container::TYPE_ASCII, b"HELLO ", &MAGIC, b"HI\x1a"]);
        assert_eq!(parse(&data), parse(&data));
    }
}
