//! PNG header and text lookup: image size plus the first tEXt entry

use crate::{FsError, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// Size and first textual entry of a PNG file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PngMetadata {
    pub width: u32,
    pub height: u32,
    pub keyword: String,
    pub text: String,
}

/// Read the metadata of the PNG file at `path`
pub fn read_png_metadata<P: AsRef<Path>>(path: P) -> Result<PngMetadata> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FsError::NotFound(path.display().to_string()),
        _ => FsError::Io(e),
    })?;
    parse_png_metadata(BufReader::new(file))
}

/// Parse PNG metadata from a stream positioned at the signature
///
/// Text chunks placed after the image data are found by reading the stream
/// to its end. A damaged tail after the header still yields the size.
pub fn parse_png_metadata<R: Read>(reader: R) -> Result<PngMetadata> {
    let mut reader = png::Decoder::new(reader).read_info()?;

    let mut meta = PngMetadata {
        width: reader.info().width,
        height: reader.info().height,
        ..Default::default()
    };

    if reader.info().uncompressed_latin1_text.is_empty() {
        if let Err(e) = reader.finish() {
            tracing::debug!("Stopped reading PNG after the header: {}", e);
        }
    }

    if let Some(entry) = reader.info().uncompressed_latin1_text.first() {
        meta.keyword = entry.keyword.clone();
        meta.text = entry.text.clone();
    }

    Ok(meta)
}
