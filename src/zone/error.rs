use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ZoneError>;

/// Errors produced while streaming zone data into memory blocks.
///
/// All variants are fail-fast and non-retryable: they indicate format
/// corruption, a format-version mismatch, or a coding defect, and abort
/// the in-progress zone load.
#[derive(Debug, Error)]
pub enum ZoneError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained in the byte source for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// An operation would advance a block cursor past its capacity.
	#[error("block overflow in {name} (block {block}): offset {at} exceeds capacity {capacity}")]
	BlockOverflow {
		/// Offending block id.
		block: usize,
		/// Offending block name.
		name: String,
		/// Cursor position the operation would have reached.
		at: usize,
		/// Capacity of the block.
		capacity: usize,
	},
	/// A load destination fell outside the active block's buffer.
	#[error("destination out of bounds for {name} (block {block}): offset {offset}, capacity {capacity}")]
	OutOfBlockBounds {
		/// Active block id.
		block: usize,
		/// Active block name.
		name: String,
		/// Rejected destination offset.
		offset: usize,
		/// Capacity of the block.
		capacity: usize,
	},
	/// A decoded reference named a block the zone does not have.
	#[error("invalid offset block {block}, zone has {block_count} blocks")]
	InvalidOffsetBlock {
		/// Decoded block id.
		block: usize,
		/// Number of blocks in the zone.
		block_count: usize,
	},
	/// A decoded reference pointed past the end of its block.
	#[error("invalid offset {offset} into {name} (block {block}), capacity {capacity}")]
	InvalidOffsetBlockOffset {
		/// Decoded block id.
		block: usize,
		/// Decoded block name.
		name: String,
		/// Decoded intra-block offset.
		offset: usize,
		/// Capacity of the block.
		capacity: usize,
	},
}
