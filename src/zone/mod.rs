mod block;
mod bytes;
mod error;
mod reloc;
mod stream;

/// Block model: kinds, descriptors, owned regions, and block-relative refs.
pub use block::{Block, BlockDesc, BlockKind, BlockRef, BlockSet};
/// Byte-source contract and the shipped stream implementations.
pub use bytes::{LoadStream, ReaderStream, SliceStream};
/// Error and result aliases.
pub use error::{Result, ZoneError};
/// Compact reference-code bit-split configuration.
pub use reloc::{PointerWidth, RelocCodec};
/// Block stream engine driving one zone load.
pub use stream::ZoneStream;
