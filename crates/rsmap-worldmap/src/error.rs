//! World-map error types.

use thiserror::Error;

use rsmap_buffer::BufferError;

#[derive(Debug, Error)]
pub enum WorldMapError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("unknown area type id: {0}")]
    UnknownAreaType(u8),

    #[error("unknown section type id: {0}")]
    UnknownSectionType(u8),

    #[error("geography header mismatch: {field} is {header}, block data says {expected}")]
    HeaderMismatch {
        field: &'static str,
        header: i32,
        expected: i32,
    },

    #[error("section field out of range: {field} = {value}")]
    FieldOutOfRange { field: &'static str, value: i32 },

    #[error("mismatched section rectangle {axis}: source {source_min}..={source_max}, destination {destination_min}..={destination_max}")]
    MismatchedExtents {
        axis: &'static str,
        source_min: i32,
        source_max: i32,
        destination_min: i32,
        destination_max: i32,
    },

    #[error("too many sections: {0}, at most 255 fit the wire format")]
    TooManySections(usize),

    #[error("missing cache entry: archive {archive}, group {group}, file {file}")]
    MissingEntry {
        archive: i32,
        group: String,
        file: String,
    },

    #[error("no free group id left in archive {0}")]
    ArchiveFull(i32),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}
