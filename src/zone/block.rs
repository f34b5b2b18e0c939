/// Allocation discipline of one memory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
	/// Ordinary serialized data, copied from the byte source.
	Persistent,
	/// Reusable temporary region, reset to a checkpoint on scope exit.
	Scratch,
	/// Runtime-derived content, zero-filled and absent from the stream.
	ZeroFilled,
	/// Placeholder region never populated at load time.
	Deferred,
}

impl BlockKind {
	/// Render the kind as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Persistent => "persistent",
			Self::Scratch => "scratch",
			Self::ZeroFilled => "zero-filled",
			Self::Deferred => "deferred",
		}
	}
}

/// Construction descriptor for one block, derived from zone header metadata.
#[derive(Debug, Clone)]
pub struct BlockDesc {
	/// Block name used in diagnostics.
	pub name: String,
	/// Allocation discipline.
	pub kind: BlockKind,
	/// Buffer size in bytes.
	pub capacity: usize,
}

impl BlockDesc {
	/// Create a descriptor.
	pub fn new(name: impl Into<String>, kind: BlockKind, capacity: usize) -> Self {
		Self {
			name: name.into(),
			kind,
			capacity,
		}
	}
}

/// One named memory region with a fixed capacity.
#[derive(Debug)]
pub struct Block {
	/// Dense position in the owning [`BlockSet`], stable for the whole load.
	pub id: usize,
	/// Block name used in diagnostics.
	pub name: String,
	/// Allocation discipline.
	pub kind: BlockKind,
	buffer: Vec<u8>,
}

impl Block {
	/// Return the buffer size in bytes.
	pub fn capacity(&self) -> usize {
		self.buffer.len()
	}

	/// Return the full buffer contents.
	pub fn bytes(&self) -> &[u8] {
		&self.buffer
	}

	pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
		&mut self.buffer
	}
}

/// Location inside a block, the crate-wide stand-in for a raw address.
///
/// References decoded from the stream, allocations, and reserved pointer
/// slots are all expressed this way; bytes are materialized only at point
/// of use via [`BlockSet::slice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
	/// Target block id.
	pub block: usize,
	/// Byte offset inside the target block.
	pub offset: usize,
}

/// The fixed, densely-indexed collection of blocks for one zone load.
///
/// Exclusively owned by the engine while loading; handed back with buffers
/// intact by [`crate::zone::ZoneStream::finish`].
#[derive(Debug)]
pub struct BlockSet {
	blocks: Vec<Block>,
}

impl BlockSet {
	/// Build the block set from ordered descriptors; buffers start zeroed.
	pub fn new(descs: Vec<BlockDesc>) -> Self {
		let blocks = descs
			.into_iter()
			.enumerate()
			.map(|(id, desc)| Block {
				id,
				name: desc.name,
				kind: desc.kind,
				buffer: vec![0_u8; desc.capacity],
			})
			.collect();
		Self { blocks }
	}

	/// Return the number of blocks.
	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	/// Return whether the set has no blocks.
	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	/// Return the block with the given id, if any.
	pub fn get(&self, id: usize) -> Option<&Block> {
		self.blocks.get(id)
	}

	/// Return all blocks in id order.
	pub fn blocks(&self) -> &[Block] {
		&self.blocks
	}

	/// Return `len` bytes starting at `at`, if in bounds.
	pub fn slice(&self, at: BlockRef, len: usize) -> Option<&[u8]> {
		let block = self.blocks.get(at.block)?;
		let end = at.offset.checked_add(len)?;
		block.buffer.get(at.offset..end)
	}

	pub(crate) fn block(&self, id: usize) -> &Block {
		&self.blocks[id]
	}

	pub(crate) fn block_mut(&mut self, id: usize) -> &mut Block {
		&mut self.blocks[id]
	}
}

#[cfg(test)]
mod tests {
	use super::{BlockDesc, BlockKind, BlockRef, BlockSet};

	#[test]
	fn buffers_start_zeroed_at_capacity() {
		let set = BlockSet::new(vec![
			BlockDesc::new("data", BlockKind::Persistent, 8),
			BlockDesc::new("runtime", BlockKind::ZeroFilled, 3),
		]);

		assert_eq!(set.len(), 2);
		assert_eq!(set.block(0).capacity(), 8);
		assert_eq!(set.block(1).bytes(), &[0, 0, 0]);
		assert_eq!(set.block(1).id, 1);
	}

	#[test]
	fn slice_is_bounds_checked() {
		let set = BlockSet::new(vec![BlockDesc::new("data", BlockKind::Persistent, 4)]);

		assert!(set.slice(BlockRef { block: 0, offset: 1 }, 3).is_some());
		assert!(set.slice(BlockRef { block: 0, offset: 1 }, 4).is_none());
		assert!(set.slice(BlockRef { block: 1, offset: 0 }, 1).is_none());
	}

	#[test]
	fn kind_labels_are_stable() {
		assert_eq!(BlockKind::Scratch.as_str(), "scratch");
		assert_eq!(BlockKind::ZeroFilled.as_str(), "zero-filled");
	}
}
