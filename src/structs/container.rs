//! Typed representation of a parsed CAS container: an ordered sequence of
//! logical files, each with its own length-determination strategy.

use msxtape_macros::ToBytes;

/// The fixed 8-byte sequence delimiting every logical record on tape.
pub const MAGIC: [u8; 8] = [0x1F, 0xA6, 0xDE, 0xBA, 0xCC, 0x13, 0x7D, 0x74];

/// 10 copies of `0xEA`: the type marker preceding an ASCII file header.
pub const TYPE_ASCII: [u8; 10] = [0xEA; 10];
/// 10 copies of `0xD0`: the type marker preceding a BINARY file header.
pub const TYPE_BINARY: [u8; 10] = [0xD0; 10];
/// 10 copies of `0xD3`: the type marker preceding a BASIC file header.
pub const TYPE_BASIC: [u8; 10] = [0xD3; 10];

/// In-band terminator for an ASCII file's final block.
pub const ASCII_EOF_MARKER: u8 = 0x1A;

/// Number of bytes in a file-record header (10-byte type marker + 6-byte
/// name) for a non-CUSTOM file.
pub const FILE_HEADER_LEN: usize = 16;

/// The 6-byte name carried by ASCII, BINARY, and BASIC file headers.
///
/// Tape names are fixed-width and space-padded; [`FileName::trimmed`]
/// strips the trailing padding for display and filename generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileName(pub [u8; 6]);

impl FileName {
    pub fn trimmed(&self) -> String {
        String::from_utf8_lossy(&self.0)
            .trim_end_matches(' ')
            .to_string()
    }
}

/// The little-endian (load, end, exec) triple prefixing a BINARY payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToBytes)]
pub struct AddressTriple {
    pub load: u16,
    pub end: u16,
    pub exec: u16,
}

/// A contiguous run of payload bytes, bounded by successive magics (or
/// end-of-input). Borrows directly from the buffer the container was
/// parsed from — parsing is zero-copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBlock<'a> {
    pub payload: &'a [u8],
    /// Byte offset of `payload[0]` in the originating buffer, for
    /// diagnostics.
    pub offset: usize,
}

/// The conventional MSX BASIC command to load a file back from cassette.
///
/// Derived purely from the file's kind and, for BINARY, whether it carries
/// a nonzero exec address — a one-line fact about the typed model, not a
/// command-line feature in its own right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCommandHint {
    /// `RUN"CAS:",R` — ASCII and BASIC files both auto-run on load.
    RunAutoStart,
    /// `BLOAD"CAS:",R` — BINARY with a nonzero exec address.
    BloadAutoStart,
    /// `BLOAD"CAS:"` — BINARY with no exec address.
    Bload,
    /// CUSTOM files have no conventional MSX load command.
    None,
}

/// One logical file recovered from a CAS container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind<'a> {
    Ascii {
        name: FileName,
        blocks: Vec<DataBlock<'a>>,
    },
    Binary {
        name: FileName,
        address: AddressTriple,
        block: DataBlock<'a>,
        /// Set when `end - load + 1` disagrees with the scanned payload
        /// length — the address triple is not trusted for sizing (see
        /// `process::parse`), but a mismatch is worth flagging.
        address_length_mismatch: bool,
    },
    Basic {
        name: FileName,
        block: DataBlock<'a>,
    },
    Custom {
        block: DataBlock<'a>,
    },
}

/// A single logical file, tagged with the byte offset of its leading magic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File<'a> {
    pub offset: usize,
    pub kind: FileKind<'a>,
}

impl<'a> File<'a> {
    pub fn name(&self) -> Option<FileName> {
        match &self.kind {
            FileKind::Ascii { name, .. } => Some(*name),
            FileKind::Binary { name, .. } => Some(*name),
            FileKind::Basic { name, .. } => Some(*name),
            FileKind::Custom { .. } => None,
        }
    }

    /// Concatenated payload across all data blocks, in order. For ASCII
    /// files, the in-band `0x1A` terminator is already absent — the parser
    /// slices it off the final block before storing it, so it never reaches
    /// this vec.
    pub fn concatenated_payload(&self) -> Vec<u8> {
        match &self.kind {
            FileKind::Ascii { blocks, .. } => {
                blocks.iter().flat_map(|b| b.payload.iter().copied()).collect()
            }
            FileKind::Binary { block, .. } | FileKind::Basic { block, .. } | FileKind::Custom { block } => {
                block.payload.to_vec()
            }
        }
    }

    pub fn msx_load_command_hint(&self) -> LoadCommandHint {
        match &self.kind {
            FileKind::Ascii { .. } | FileKind::Basic { .. } => LoadCommandHint::RunAutoStart,
            FileKind::Binary { address, .. } => {
                if address.exec != 0 {
                    LoadCommandHint::BloadAutoStart
                } else {
                    LoadCommandHint::Bload
                }
            }
            FileKind::Custom { .. } => LoadCommandHint::None,
        }
    }
}

/// An ordered, possibly-empty sequence of [`File`]s parsed from one CAS
/// byte slice. Iteration order equals file-offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container<'a> {
    pub files: Vec<File<'a>>,
}

impl<'a> Container<'a> {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, File<'a>> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for Container<'a> {
    type Item = File<'a>;
    type IntoIter = std::vec::IntoIter<File<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Container<'a> {
    type Item = &'b File<'a>;
    type IntoIter = std::slice::Iter<'b, File<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_trims_trailing_spaces() {
        let name = FileName(*b"HELLO ");
        assert_eq!(name.trimmed(), "HELLO");
    }

    #[test]
    fn file_name_keeps_internal_spaces() {
        let name = FileName(*b"A B  ");
        assert_eq!(name.trimmed(), "A B");
    }

    #[test]
    fn load_command_hint_binary_exec_zero() {
        let file = File {
            offset: 0,
            kind: FileKind::Binary {
                name: FileName(*b"PROG  "),
                address: AddressTriple {
                    load: 0x8000,
                    end: 0x8002,
                    exec: 0,
                },
                block: DataBlock {
                    payload: &[1, 2, 3],
                    offset: 26,
                },
                address_length_mismatch: false,
            },
        };
        assert_eq!(file.msx_load_command_hint(), LoadCommandHint::Bload);
    }

    #[test]
    fn load_command_hint_ascii() {
        let file = File {
            offset: 0,
            kind: FileKind::Ascii {
                name: FileName(*b"HELLO "),
                blocks: vec![],
            },
        };
        assert_eq!(
            file.msx_load_command_hint(),
            LoadCommandHint::RunAutoStart
        );
    }
}
