//! File and console handles.

use super::error::{set_system_error, OsError, OsResult};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

/// A handle to an open file or one of the process's standard streams.
///
/// Path inputs are UTF-8; the platform's native (possibly wide-character)
/// path API does the transcoding, with conversion failure reported as
/// [`OsError::SystemFailure`].
pub enum OsFile {
    /// The process's standard output stream.
    Stdout,
    /// The process's standard error stream.
    Stderr,
    /// A regular, caller-opened file.
    Handle(File),
}

impl OsFile {
    /// Opens `utf8_path` for reading.
    pub fn open_read(utf8_path: &str) -> OsResult<Self> {
        if utf8_path.is_empty() {
            return Err(OsError::InvalidArgument);
        }
        File::open(utf8_path)
            .map(OsFile::Handle)
            .map_err(|e| system_failure(e))
    }

    /// Opens `utf8_path` for writing.
    ///
    /// `truncate = true` truncates an existing file to zero length (or
    /// creates it); `truncate = false` creates the file if absent and
    /// appends otherwise.
    pub fn open_write(utf8_path: &str, truncate: bool) -> OsResult<Self> {
        if utf8_path.is_empty() {
            return Err(OsError::InvalidArgument);
        }
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if truncate {
            options.truncate(true);
        } else {
            options.append(true);
        }
        options
            .open(utf8_path)
            .map(OsFile::Handle)
            .map_err(|e| system_failure(e))
    }

    /// Returns the shared standard-output handle.
    pub fn stdout() -> Self {
        OsFile::Stdout
    }

    /// Returns the shared standard-error handle.
    pub fn stderr() -> Self {
        OsFile::Stderr
    }

    /// Reads up to `buffer.len()` bytes, returning the number read (`0` at
    /// end of file).
    pub fn read(&mut self, buffer: &mut [u8]) -> OsResult<usize> {
        let result = match self {
            OsFile::Handle(f) => f.read(buffer),
            OsFile::Stdout | OsFile::Stderr => return Err(OsError::NotSupported),
        };
        result.map_err(|e| system_failure(e))
    }

    /// Writes `data`, returning the number of bytes actually written (which
    /// may be less than `data.len()` on a partial write).
    pub fn write(&mut self, data: &[u8]) -> OsResult<usize> {
        let result = match self {
            OsFile::Handle(f) => f.write(data),
            OsFile::Stdout => io::stdout().write(data),
            OsFile::Stderr => io::stderr().write(data),
        };
        result.map_err(|e| system_failure(e))
    }

    /// Writes all of `data`, retrying on partial writes until the buffer
    /// is exhausted or the host reports failure.
    ///
    /// This is the primitive [`crate::panic::panic_`] uses to get the
    /// banner onto the stream even under truncated-write conditions.
    pub fn write_all(&mut self, mut data: &[u8]) -> OsResult<()> {
        while !data.is_empty() {
            let written = self.write(data)?;
            if written == 0 {
                return Err(system_failure(io::Error::from(io::ErrorKind::WriteZero)));
            }
            data = &data[written..];
        }
        Ok(())
    }

    /// Closes the handle. A no-op for `Stdout`/`Stderr`.
    pub fn close(self) -> OsResult<()> {
        // `File`'s `Drop` impl closes the descriptor; nothing else to do.
        Ok(())
    }
}

fn system_failure(e: io::Error) -> OsError {
    set_system_error(e.to_string());
    OsError::SystemFailure
}
