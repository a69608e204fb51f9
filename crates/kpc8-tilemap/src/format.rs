use std::path::{Path, PathBuf};

use crc32fast::hash as crc32;

use crate::common::{extension_of, normalize_extension, write_failed};
use crate::consts::{
    BASE64_FORMAT_EXTENSION, BASE64_FORMAT_NAME, BINARY_FORMAT_EXTENSION, BINARY_FORMAT_NAME,
};
use crate::encoder::encode;
use crate::{
    flatten, BinaryFile, EncodedOutput, ExportError, ExportErrorCode, FileHost, OpenMode, Result,
    TextFile, TileMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Base64,
    Binary,
}

/// A named output format the host can offer in its export dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    pub name: &'static str,
    /// Without the leading dot.
    pub extension: &'static str,
    pub payload: PayloadKind,
}

impl ExportFormat {
    pub const fn base64() -> Self {
        Self {
            name: BASE64_FORMAT_NAME,
            extension: BASE64_FORMAT_EXTENSION,
            payload: PayloadKind::Base64,
        }
    }

    pub const fn binary() -> Self {
        Self {
            name: BINARY_FORMAT_NAME,
            extension: BINARY_FORMAT_EXTENSION,
            payload: PayloadKind::Binary,
        }
    }

    pub fn matches_extension(&self, extension: &str) -> bool {
        normalize_extension(extension) == self.extension
    }

    /// Flattens and encodes `map` without touching any destination.
    pub fn render<M: TileMap + ?Sized>(&self, map: &M) -> Result<EncodedOutput> {
        let buffer = flatten(map)?;
        Ok(encode(self.payload, &buffer))
    }

    /// Exports `map` to `file_name` through `host`.
    ///
    /// The map is fully validated and encoded before the destination is
    /// opened, so a rejected map never produces a file.
    pub fn write<M, H>(
        &self,
        map: &M,
        file_name: impl AsRef<Path>,
        host: &H,
    ) -> Result<ExportReport>
    where
        M: TileMap + ?Sized,
        H: FileHost + ?Sized,
    {
        let path = file_name.as_ref();
        let buffer = flatten(map)?;
        let checksum = crc32(buffer.as_bytes());

        let bytes_written = match encode(self.payload, &buffer) {
            EncodedOutput::Base64(text) => {
                let mut file = host
                    .open_text(path, OpenMode::WriteOnly)
                    .map_err(|err| write_failed("open", path, err))?;
                file.write(&text)
                    .map_err(|err| write_failed("write", path, err))?;
                file.commit()
                    .map_err(|err| write_failed("commit", path, err))?;
                text.len()
            }
            EncodedOutput::Binary(bytes) => {
                let mut file = host
                    .open_binary(path, OpenMode::WriteOnly)
                    .map_err(|err| write_failed("open", path, err))?;
                file.write(&bytes)
                    .map_err(|err| write_failed("write", path, err))?;
                file.commit()
                    .map_err(|err| write_failed("commit", path, err))?;
                bytes.len()
            }
        };

        log::info!(
            "exported {} to {} ({bytes_written} bytes, crc32={checksum:08x})",
            self.name,
            path.display()
        );

        Ok(ExportReport {
            format: self.name,
            path: path.to_path_buf(),
            bytes_written,
            crc32: checksum,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub format: &'static str,
    pub path: PathBuf,
    pub bytes_written: usize,
    /// CRC-32 of the 960 tile bytes, independent of the output encoding.
    pub crc32: u32,
}

pub fn builtin_formats() -> [ExportFormat; 2] {
    [ExportFormat::base64(), ExportFormat::binary()]
}

/// Implemented by hosts that keep their own table of export formats.
pub trait FormatRegistry {
    fn register_map_format(&mut self, name: &str, format: ExportFormat);
}

/// Registers both KPC8 formats under their display names.
pub fn register_formats<R: FormatRegistry + ?Sized>(registry: &mut R) {
    for format in builtin_formats() {
        log::debug!("registering map format {:?}", format.name);
        registry.register_map_format(format.name, format);
    }
}

/// Ordered registry for hosts without one. Registering a name twice replaces
/// the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatTable {
    entries: Vec<(String, ExportFormat)>,
}

impl FormatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        let mut table = Self::new();
        register_formats(&mut table);
        table
    }

    pub fn get(&self, name: &str) -> Option<&ExportFormat> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, format)| format)
    }

    pub fn by_extension(&self, extension: &str) -> Option<&ExportFormat> {
        self.entries
            .iter()
            .map(|(_, format)| format)
            .find(|format| format.matches_extension(extension))
    }

    /// Picks the format whose extension matches `path`.
    pub fn for_path(&self, path: &Path) -> Result<&ExportFormat> {
        extension_of(path)
            .and_then(|extension| self.by_extension(&extension))
            .ok_or_else(|| {
                ExportError::new(
                    ExportErrorCode::UnknownFormat,
                    format!("No registered format for {}.", path.display()),
                )
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExportFormat> {
        self.entries.iter().map(|(_, format)| format)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FormatRegistry for FormatTable {
    fn register_map_format(&mut self, name: &str, format: ExportFormat) {
        match self.entries.iter_mut().find(|(entry_name, _)| entry_name == name) {
            Some(entry) => entry.1 = format,
            None => self.entries.push((name.to_owned(), format)),
        }
    }
}
