//! Integrity auditor: inspects a parsed [`Container`] for recognised but
//! suspicious byte patterns — chiefly on-disk format marker bytes that have
//! no business appearing in a tape payload.
//!
//! Issues are returned as data. The auditor never modifies the container
//! and never treats an issue as fatal.

use crate::structs::container::{Container, FileKind};

/// Width of the context window returned alongside an issue, for a consumer
/// that wants to render a hex dump around the flagged byte.
const CONTEXT_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A BINARY payload's first byte is `0xFE`, the on-disk BSAVE start
    /// marker, which has no place in a tape payload.
    BinaryDiskStartMarker,
    /// A BINARY payload's last byte is `0xFF`, the on-disk BSAVE end
    /// marker.
    BinaryDiskEndMarker,
    /// A BASIC payload's first byte is `0xFF`, the on-disk tokenized-BASIC
    /// marker.
    BasicDiskTokenMarker,
}

/// A single suspicious-but-not-fatal condition found in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Offset of the `File` this issue concerns, for cross-referencing
    /// against the parsed container.
    pub file_offset: usize,
    pub kind: IssueKind,
    /// Byte offset of `context[0]` in the originating buffer.
    pub context_offset: usize,
    /// Up to [`CONTEXT_LEN`] bytes around the flagged byte.
    pub context: Vec<u8>,
}

fn leading_context(offset: usize, payload: &[u8]) -> (usize, Vec<u8>) {
    let len = payload.len().min(CONTEXT_LEN);
    (offset, payload[..len].to_vec())
}

fn trailing_context(offset: usize, payload: &[u8]) -> (usize, Vec<u8>) {
    let start = payload.len().saturating_sub(CONTEXT_LEN);
    (offset + start, payload[start..].to_vec())
}

/// Scans every BINARY and BASIC file in `container` for embedded disk-format
/// markers.
pub fn audit(container: &Container<'_>) -> Vec<Issue> {
    let mut issues = Vec::new();

    for file in container.iter() {
        match &file.kind {
            FileKind::Binary { block, .. } => {
                if block.payload.first() == Some(&0xFE) {
                    let (context_offset, context) = leading_context(block.offset, block.payload);
                    issues.push(Issue {
                        file_offset: file.offset,
                        kind: IssueKind::BinaryDiskStartMarker,
                        context_offset,
                        context,
                    });
                }
                if block.payload.last() == Some(&0xFF) {
                    let (context_offset, context) = trailing_context(block.offset, block.payload);
                    issues.push(Issue {
                        file_offset: file.offset,
                        kind: IssueKind::BinaryDiskEndMarker,
                        context_offset,
                        context,
                    });
                }
            }
            FileKind::Basic { block, .. } => {
                if block.payload.first() == Some(&0xFF) {
                    let (context_offset, context) = leading_context(block.offset, block.payload);
                    issues.push(Issue {
                        file_offset: file.offset,
                        kind: IssueKind::BasicDiskTokenMarker,
                        context_offset,
                        context,
                    });
                }
            }
            FileKind::Ascii { .. } | FileKind::Custom { .. } => {}
        }
    }

    issues
}
