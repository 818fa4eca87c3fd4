/// Extension reserved for compressed containers.
pub const CONTAINER_EXT: &str = "hzip";

/// Byte separating the stored file extension from the file content.
pub const SEPARATOR: u8 = b' ';

pub const DEFAULT_BUFFER_SIZE: usize = 0xFFF;

/// Runtime knobs for a compress/decompress run. None of them affect the
/// bytes that end up in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    buffer_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Options {
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Internal I/O chunk size, always at least one byte.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}
