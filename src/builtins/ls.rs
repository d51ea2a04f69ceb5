use std::ffi::OsString;
use std::fs::{self, DirEntry, FileType};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::Path;

use chrono::{DateTime, Local};

use super::{BuiltinFlow, Builtins};
use crate::utils::write_line;

const DIRECTORY_LABEL: &str = "<DIR>";
const NO_EXTENSION_LABEL: &str = "(none)";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    Regular,
    Symlink,
    Fifo,
    Socket,
    CharDevice,
    BlockDevice,
    Unknown,
}

impl EntryKind {
    fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::Regular
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_fifo() {
            EntryKind::Fifo
        } else if file_type.is_socket() {
            EntryKind::Socket
        } else if file_type.is_char_device() {
            EntryKind::CharDevice
        } else if file_type.is_block_device() {
            EntryKind::BlockDevice
        } else {
            EntryKind::Unknown
        }
    }

    fn type_char(self) -> char {
        match self {
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 'l',
            EntryKind::Fifo => 'p',
            EntryKind::Socket => 's',
            EntryKind::CharDevice => 'c',
            EntryKind::BlockDevice => 'b',
            EntryKind::Regular | EntryKind::Unknown => '-',
        }
    }
}

#[derive(Debug)]
struct EntryRecord {
    /// Raw name; sorting compares these bytes.
    name: OsString,
    display_name: String,
    kind: EntryKind,
    modified: DateTime<Local>,
    permissions: Option<String>,
}

impl EntryRecord {
    fn type_label(&self) -> &str {
        if self.kind == EntryKind::Directory {
            DIRECTORY_LABEL
        } else {
            extension(&self.display_name).unwrap_or(NO_EXTENSION_LABEL)
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ListOptions<'a> {
    show_permissions: bool,
    path: &'a str,
}

impl<'a> ListOptions<'a> {
    /// `-p` may appear anywhere; of several paths the last one wins.
    fn parse(args: &'a [String]) -> Self {
        let mut options = ListOptions {
            show_permissions: false,
            path: ".",
        };
        for arg in args {
            if arg == "-p" {
                options.show_permissions = true;
            } else {
                options.path = arg;
            }
        }
        options
    }
}

pub(super) fn builtin_ls(
    _builtins: &Builtins,
    parts: &[String],
    stdout_writer: &mut dyn Write,
    stderr_writer: &mut dyn Write,
) -> io::Result<BuiltinFlow> {
    let options = ListOptions::parse(parts.get(1..).unwrap_or_default());
    let dir = Path::new(options.path);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            write_line(
                stderr_writer,
                &format!("ls: cannot open directory '{}': {}", dir.display(), err),
            )?;
            return Ok(BuiltinFlow::Continue);
        }
    };

    let mut records = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                write_line(
                    stderr_writer,
                    &format!("ls: error reading '{}': {}", dir.display(), err),
                )?;
                continue;
            }
        };
        match read_record(&entry, options.show_permissions) {
            Ok(record) => records.push(record),
            Err(err) => write_line(
                stderr_writer,
                &format!("ls: cannot access '{}': {}", entry.path().display(), err),
            )?,
        }
    }
    log::debug!("ls: {} entries in {}", records.len(), dir.display());

    sort_records(&mut records);
    render_table(&records, options.show_permissions, stdout_writer)?;
    Ok(BuiltinFlow::Continue)
}

/// The type tag comes from the entry itself; time and mode follow symlinks.
fn read_record(entry: &DirEntry, show_permissions: bool) -> io::Result<EntryRecord> {
    let kind = EntryKind::from_file_type(entry.file_type()?);
    let metadata = fs::metadata(entry.path())?;
    let modified = DateTime::<Local>::from(metadata.modified()?);
    let permissions =
        show_permissions.then(|| permission_string(kind, metadata.permissions().mode()));

    let name = entry.file_name();
    Ok(EntryRecord {
        display_name: name.to_string_lossy().into_owned(),
        name,
        kind,
        modified,
        permissions,
    })
}

/// Directories first, then byte-wise by name.
fn sort_records(records: &mut [EntryRecord]) {
    records.sort_by(|a, b| {
        let a_is_file = a.kind != EntryKind::Directory;
        let b_is_file = b.kind != EntryKind::Directory;
        a_is_file
            .cmp(&b_is_file)
            .then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
    });
}

/// Text after the last `.`; dotfiles and names without one have none.
fn extension(name: &str) -> Option<&str> {
    if name.starts_with('.') {
        return None;
    }
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

fn permission_string(kind: EntryKind, mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    // (bit, position, with execute, without execute)
    const SPECIAL: [(u32, usize, char, char); 3] = [
        (0o4000, 3, 's', 'S'),
        (0o2000, 6, 's', 'S'),
        (0o1000, 9, 't', 'T'),
    ];

    let mut chars = ['-'; 10];
    chars[0] = kind.type_char();
    for (i, (bit, ch)) in BITS.iter().enumerate() {
        if mode & bit != 0 {
            chars[i + 1] = *ch;
        }
    }
    for (bit, pos, executable, plain) in SPECIAL {
        if mode & bit != 0 {
            chars[pos] = if chars[pos] == 'x' { executable } else { plain };
        }
    }
    chars.iter().collect()
}

fn render_table(
    records: &[EntryRecord],
    show_permissions: bool,
    writer: &mut dyn Write,
) -> io::Result<()> {
    let mut header = vec!["Name", "Type", "Modified"];
    if show_permissions {
        header.push("Permissions");
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![
                record.display_name.clone(),
                record.type_label().to_string(),
                record.modified.format(TIMESTAMP_FORMAT).to_string(),
            ];
            if let Some(permissions) = &record.permissions {
                row.push(permissions.clone());
            }
            row
        })
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(column, label)| {
            rows.iter()
                .map(|row| row[column].chars().count())
                .chain(std::iter::once(label.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    write_line(writer, &format_row(&header, &widths))?;
    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    write_line(writer, &format_row(&separator, &widths))?;
    for row in &rows {
        write_line(writer, &format_row(row, &widths))?;
    }
    Ok(())
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    padded.join(COLUMN_GAP).trim_end().to_string()
}
