//! Destination files supplied by the host.
//!
//! An export opens exactly one file, writes the whole payload and commits it.
//! Nothing reaches the destination path until `commit` succeeds.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STAGING_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    #[default]
    WriteOnly,
}

pub trait TextFile {
    fn write(&mut self, text: &str) -> io::Result<()>;
    fn commit(self) -> io::Result<()>
    where
        Self: Sized;
}

pub trait BinaryFile {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn commit(self) -> io::Result<()>
    where
        Self: Sized;
}

pub trait FileHost {
    type Text: TextFile;
    type Binary: BinaryFile;

    fn open_text(&self, path: &Path, mode: OpenMode) -> io::Result<Self::Text>;
    fn open_binary(&self, path: &Path, mode: OpenMode) -> io::Result<Self::Binary>;
}

/// Writes through `std::fs`, staging into a sibling temporary file that is
/// renamed over the destination on commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsHost;

impl FileHost for FsHost {
    type Text = FsFile;
    type Binary = FsFile;

    fn open_text(&self, path: &Path, mode: OpenMode) -> io::Result<FsFile> {
        FsFile::create(path, mode)
    }

    fn open_binary(&self, path: &Path, mode: OpenMode) -> io::Result<FsFile> {
        FsFile::create(path, mode)
    }
}

/// A staged file. Dropping it without `commit` discards the staged bytes.
#[derive(Debug)]
pub struct FsFile {
    target: PathBuf,
    staging: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FsFile {
    pub fn create(path: &Path, mode: OpenMode) -> io::Result<Self> {
        let (staging, file) = loop {
            let staging = staging_path(path)?;
            let opened = match mode {
                OpenMode::WriteOnly => OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&staging),
            };
            match opened {
                Ok(file) => break (staging, file),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        };
        log::debug!("staging {} at {}", path.display(), staging.display());

        Ok(Self {
            target: path.to_path_buf(),
            staging,
            writer: Some(BufWriter::new(file)),
        })
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(bytes),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "file was already committed",
            )),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        let Some(writer) = self.writer.take() else {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "file was already committed",
            ));
        };

        let result = writer
            .into_inner()
            .map_err(|err| err.into_error())
            .and_then(|file| file.sync_all())
            .and_then(|()| fs::rename(&self.staging, &self.target));

        if result.is_err() {
            discard(&self.staging);
        }
        result
    }
}

impl TextFile for FsFile {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.write_bytes(text.as_bytes())
    }

    fn commit(mut self) -> io::Result<()> {
        self.finish()
    }
}

impl BinaryFile for FsFile {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_bytes(bytes)
    }

    fn commit(mut self) -> io::Result<()> {
        self.finish()
    }
}

impl Drop for FsFile {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            drop(writer);
            log::debug!("discarding uncommitted {}", self.target.display());
            discard(&self.staging);
        }
    }
}

fn staging_path(target: &Path) -> io::Result<PathBuf> {
    let file_name = target.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", target.display()),
        )
    })?;
    let mut staging_name = std::ffi::OsString::from(".");
    staging_name.push(file_name);
    let id = NEXT_STAGING_ID.fetch_add(1, Ordering::Relaxed);
    staging_name.push(format!(".{}-{id}.tmp", std::process::id()));
    Ok(target.with_file_name(staging_name))
}

fn discard(staging: &Path) {
    if let Err(err) = fs::remove_file(staging) {
        if err.kind() != io::ErrorKind::NotFound {
            log::warn!("could not remove {}: {err}", staging.display());
        }
    }
}
