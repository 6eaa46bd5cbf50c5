//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use serde::Serialize;
use tallyman::IngestError;

/// Writes `value` to the given writer as pretty-printed JSON and a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), IngestError> {
    serde_json::to_writer_pretty(&mut *writer, value).map_err(|error| IngestError::Io {
        message: error.to_string(),
    })?;
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Converts an I/O error to an [`IngestError::Io`].
pub fn io_error(error: &io::Error) -> IngestError {
    IngestError::Io {
        message: error.to_string(),
    }
}
