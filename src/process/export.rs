//! Exporter: writes each parsed [`File`] back to disk in its conventional
//! on-disk layout.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::byteorder::WriteBytesLe;
use crate::structs::container::{File, FileKind};
use crate::utils::errors::ExportError;

/// Options controlling how a file is written to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Overwrite an existing file at the destination path instead of
    /// refusing with [`ExportError::FileExists`].
    pub force: bool,
    /// Prepend `0xFE` and append `0xFF` to a BINARY file's body, matching
    /// the on-disk BSAVE convention.
    pub binary_disk_markers: bool,
}

fn extension(kind: &FileKind) -> &'static str {
    match kind {
        FileKind::Ascii { .. } => "asc",
        FileKind::Binary { .. } => "bin",
        FileKind::Basic { .. } => "bas",
        FileKind::Custom { .. } => "dat",
    }
}

/// Derives the export filename for the `index`-th file in a container:
/// `<index>-<trimmed-name>.<ext>`, or `<index>.<ext>` when the name is
/// empty or the file has no name (CUSTOM).
pub fn export_filename(file: &File<'_>, index: usize) -> String {
    let ext = extension(&file.kind);
    match file.name().map(|n| n.trimmed()) {
        Some(name) if !name.is_empty() => format!("{index}-{name}.{ext}"),
        _ => format!("{index}.{ext}"),
    }
}

fn export_body(file: &File<'_>, options: ExportOptions) -> Vec<u8> {
    match &file.kind {
        FileKind::Ascii { .. } => file.concatenated_payload(),
        FileKind::Basic { block } => block.payload.to_vec(),
        FileKind::Binary { address, block, .. } => {
            let mut body = Vec::with_capacity(block.payload.len() + 9);
            if options.binary_disk_markers {
                body.push(0xFE);
            }
            address.write_le(&mut body);
            body.extend_from_slice(block.payload);
            if options.binary_disk_markers {
                body.push(0xFF);
            }
            body
        }
        FileKind::Custom { block } => block.payload.to_vec(),
    }
}

/// Writes `file` into `dir` under its derived filename, refusing to
/// overwrite an existing file unless `options.force` is set. Returns the
/// path written.
pub fn export(
    file: &File<'_>,
    dir: &Path,
    index: usize,
    options: ExportOptions,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_filename(file, index));
    let body = export_body(file, options);

    let mut open_options = OpenOptions::new();
    open_options.write(true).truncate(true);
    if options.force {
        open_options.create(true);
    } else {
        open_options.create_new(true);
    }

    let mut handle = open_options.open(&path).map_err(|e| {
        if !options.force && e.kind() == std::io::ErrorKind::AlreadyExists {
            ExportError::FileExists(path.clone())
        } else {
            ExportError::Io(e)
        }
    })?;
    handle.write_all(&body)?;
    Ok(path)
}
