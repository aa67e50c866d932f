//! # filer
//!
//! `filer` is the module to read and write system definition project files.
//!
//! A project is stored as a core file, a UI file next to it (`<stem>_ui.<ext>`) and an
//! optional shared Datapool file (`<stem>_shared_datapools.<ext>`). Projects up to file
//! version 2 keep everything in one file with a `<gui-only>` section.

mod load;
pub(crate) mod model;
mod save;

pub use load::{load_core, load_legacy, load_shared_datapools, load_ui, read_file_version};
pub use save::{save_core, save_legacy, save_shared_datapools, save_ui};

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

use crate::types::errors::FilerError;

/// Version written to and expected in core files.
pub const FILE_VERSION: u16 = 3;
/// Highest version of the single-file format.
pub const LEGACY_FILE_VERSION: u16 = 2;
/// Version written to UI and shared Datapool files.
pub const UI_FILE_VERSION: u16 = 1;

pub const ROOT_SYSTEM_DEFINITION: &str = "opensyde-system-definition";
pub const ROOT_SYSTEM_DEFINITION_UI: &str = "opensyde-system-definition-ui";
pub const ROOT_SHARED_DATAPOOLS: &str = "opensyde-shared-datapools";

/// `dir/stem.ext` -> `dir/stem<suffix>.ext`
pub fn companion_file_path(path: &Path, suffix: &str) -> PathBuf {
    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name: String = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(file_name)
}

pub(crate) fn path_string(path: &Path) -> String {
    path.display().to_string()
}

/// Reads a whole file as text. Files that are not valid UTF-8 are decoded as Windows-1252.
pub(crate) fn read_text(path: &Path) -> Result<String, FilerError> {
    let mut file: File = File::open(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            FilerError::NotFound {
                path: path_string(path),
            }
        } else {
            FilerError::Unreadable {
                path: path_string(path),
                source,
            }
        }
    })?;

    let mut bytes: Vec<u8> = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| FilerError::Unreadable {
            path: path_string(path),
            source,
        })?;

    let text: String = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            decoded.into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Checks that the document is well formed up to its first element and that this
/// element is `expected`.
pub(crate) fn check_root(path: &Path, text: &str, expected: &str) -> Result<(), FilerError> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.name();
                let root: String = String::from_utf8_lossy(name.as_ref()).into_owned();
                if root == expected {
                    return Ok(());
                }
                return Err(FilerError::MalformedXml {
                    path: path_string(path),
                    details: format!("root element is '{root}', expected '{expected}'"),
                });
            }
            Ok(Event::Eof) => {
                return Err(FilerError::MalformedXml {
                    path: path_string(path),
                    details: "no root element".to_string(),
                });
            }
            Ok(_) => {}
            Err(err) => {
                return Err(FilerError::MalformedXml {
                    path: path_string(path),
                    details: err.to_string(),
                });
            }
        }
    }
}

/// Deserializes a checked document. Syntax errors are malformed XML, everything else
/// (missing attributes, unparsable numbers) is invalid content.
pub(crate) fn deserialize<T>(path: &Path, text: &str) -> Result<T, FilerError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    quick_xml::de::from_str(text).map_err(|err| match err {
        quick_xml::DeError::InvalidXml(inner) => FilerError::MalformedXml {
            path: path_string(path),
            details: inner.to_string(),
        },
        other => FilerError::InvalidContent {
            path: path_string(path),
            details: other.to_string(),
        },
    })
}

/// Serializes `document` with an XML declaration.
pub(crate) fn serialize<T: Serialize>(
    path: &Path,
    document: &T,
    indent: usize,
) -> Result<String, FilerError> {
    let serialize_error = |details: String| FilerError::Serialize {
        path: path_string(path),
        details,
    };

    let mut buffer = String::new();
    buffer.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.indent(' ', indent);
    document
        .serialize(serializer)
        .map_err(|err| serialize_error(err.to_string()))?;
    buffer.push('\n');
    Ok(buffer)
}

/// Writes `content` to `path`, creating missing parent directories.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), FilerError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| FilerError::CreateDirectory {
            path: path_string(parent),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| FilerError::WriteFailure {
        path: path_string(path),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(content.as_bytes())
        .map_err(|source| FilerError::WriteFailure {
            path: path_string(path),
            source,
        })?;
    writer.flush().map_err(|source| FilerError::WriteFailure {
        path: path_string(path),
        source,
    })?;
    Ok(())
}
