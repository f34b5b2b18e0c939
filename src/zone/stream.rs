use crate::zone::{BlockKind, BlockRef, BlockSet, LoadStream, RelocCodec, Result, ZoneError};

/// Block stream engine driving one zone load.
///
/// Owns the block set exclusively for the load's duration and borrows the
/// byte source. A structure decoder drives the engine through the same
/// align/push/alloc/load/pop sequence the zone was serialized with; any
/// mismatch between stream layout and expected structure fails loudly
/// instead of producing a subtly wrong graph.
///
/// Strictly sequential: the context stack and cursor table assume a
/// depth-first traversal of the serialized structure graph. Concurrent
/// zone loads use fully independent engine instances.
pub struct ZoneStream<'a> {
	blocks: BlockSet,
	source: &'a mut dyn LoadStream,
	codec: RelocCodec,
	insert_block: usize,
	cursors: Vec<usize>,
	stack: Vec<usize>,
	// One checkpoint stack per scratch block; unused entries stay empty.
	marks: Vec<Vec<usize>>,
}

impl<'a> ZoneStream<'a> {
	/// Create an engine over `blocks`, reading from `source`.
	///
	/// `insert_block` designates the block that backs two-phase pointer
	/// slots; it must be a valid block id.
	pub fn new(blocks: BlockSet, source: &'a mut dyn LoadStream, codec: RelocCodec, insert_block: usize) -> Self {
		assert!(insert_block < blocks.len(), "insert block {insert_block} out of range");

		let cursors = vec![0; blocks.len()];
		let marks = vec![Vec::new(); blocks.len()];
		Self {
			blocks,
			source,
			codec,
			insert_block,
			cursors,
			stack: Vec::new(),
			marks,
		}
	}

	/// Return the configured reference codec.
	pub fn codec(&self) -> RelocCodec {
		self.codec
	}

	/// Return the block set being filled.
	pub fn blocks(&self) -> &BlockSet {
		&self.blocks
	}

	/// Return the current write offset of a block.
	pub fn cursor(&self, block: usize) -> usize {
		self.cursors[block]
	}

	fn active(&self) -> usize {
		*self.stack.last().expect("no active block")
	}

	/// Round the active block's cursor up to a multiple of `alignment`.
	///
	/// No-op for `alignment == 0`. Panics if no block is active.
	pub fn align(&mut self, alignment: usize) {
		let id = self.active();
		if alignment > 0 {
			self.cursors[id] = align_up(self.cursors[id], alignment);
		}
	}

	/// Enter `block` as the active allocation scope.
	///
	/// Scratch blocks checkpoint their cursor here and restore it on the
	/// matching [`Self::pop_block`].
	pub fn push_block(&mut self, block: usize) {
		assert!(block < self.blocks.len(), "block {block} out of range");

		self.stack.push(block);
		if self.blocks.block(block).kind == BlockKind::Scratch {
			self.marks[block].push(self.cursors[block]);
		}
	}

	/// Leave the active allocation scope, returning the popped block id.
	///
	/// Panics if no block is active.
	pub fn pop_block(&mut self) -> usize {
		let block = self.stack.pop().expect("no active block");
		if self.blocks.block(block).kind == BlockKind::Scratch {
			let mark = self.marks[block].pop().expect("scratch checkpoint missing");
			self.cursors[block] = mark;
		}
		block
	}

	/// Align, then return the active block's cursor position without
	/// advancing it; the paired load call advances.
	///
	/// Fails `BlockOverflow` if the aligned cursor would exceed capacity,
	/// leaving the cursor unchanged.
	pub fn alloc(&mut self, alignment: usize) -> Result<BlockRef> {
		let id = self.active();
		let cursor = self.cursors[id];
		let aligned = if alignment > 0 { align_up(cursor, alignment) } else { cursor };
		if aligned > self.blocks.block(id).capacity() {
			return Err(self.overflow(id, aligned));
		}

		self.cursors[id] = aligned;
		Ok(BlockRef { block: id, offset: aligned })
	}

	/// Copy `dst.len()` bytes straight from the byte source, bypassing
	/// block bookkeeping; only the source position advances.
	pub fn load_raw(&mut self, dst: &mut [u8]) -> Result<()> {
		self.source.load(dst)
	}

	/// Fill `size` bytes at `dst`, which must be the position returned by
	/// the paired [`Self::alloc`] on the active block.
	///
	/// Persistent and scratch blocks copy from the byte source; zero-filled
	/// blocks write zeros without touching the source. The cursor advances
	/// by `size` on success regardless of kind.
	///
	/// # Panics
	///
	/// Panics if no block is active, or on a load into a deferred block
	/// (deferred content never appears in the stream; reaching one is a
	/// format invariant violation).
	pub fn load_in_block(&mut self, dst: BlockRef, size: usize) -> Result<()> {
		let id = self.active();
		let capacity = self.blocks.block(id).capacity();
		if dst.block != id || dst.offset > capacity {
			return Err(self.out_of_bounds(id, dst.offset));
		}
		if size > capacity - dst.offset {
			return Err(self.overflow(id, dst.offset.saturating_add(size)));
		}
		if dst.offset != self.cursors[id] {
			return Err(self.out_of_bounds(id, dst.offset));
		}

		match self.blocks.block(id).kind {
			BlockKind::Persistent | BlockKind::Scratch => {
				let buffer = self.blocks.block_mut(id).bytes_mut();
				self.source.load(&mut buffer[dst.offset..dst.offset + size])?;
			}
			BlockKind::ZeroFilled => {
				let buffer = self.blocks.block_mut(id).bytes_mut();
				buffer[dst.offset..dst.offset + size].fill(0);
			}
			BlockKind::Deferred => {
				panic!("load into deferred block {}", self.blocks.block(id).name);
			}
		}

		self.cursors[id] += size;
		Ok(())
	}

	/// Fill bytes at `dst` one at a time from the byte source through the
	/// terminating zero inclusive, bounds-checked per iteration.
	///
	/// `dst` must be the position returned by the paired [`Self::alloc`];
	/// the cursor advances to just past the terminator.
	pub fn load_null_terminated(&mut self, dst: BlockRef) -> Result<()> {
		let id = self.active();
		let capacity = self.blocks.block(id).capacity();
		if dst.block != id || dst.offset > capacity {
			return Err(self.out_of_bounds(id, dst.offset));
		}
		if dst.offset != self.cursors[id] {
			return Err(self.out_of_bounds(id, dst.offset));
		}

		let mut offset = dst.offset;
		loop {
			if offset >= capacity {
				return Err(self.overflow(id, offset + 1));
			}

			let mut byte = [0_u8; 1];
			self.source.load(&mut byte)?;
			self.blocks.block_mut(id).bytes_mut()[offset] = byte[0];
			offset += 1;

			if byte[0] == 0 {
				break;
			}
		}

		self.cursors[id] = offset;
		Ok(())
	}

	/// Reserve a pointer-width slot in the insert block and return it for
	/// a later [`Self::write_pointer`] once the pointee's location is
	/// known. Nothing is read from the byte source.
	///
	/// The insert block is entered transiently; the reservation is not
	/// part of caller-visible nesting and survives regardless of the
	/// block's kind.
	pub fn insert_pointer(&mut self) -> Result<BlockRef> {
		let id = self.insert_block;
		let width = self.codec.width().bytes();
		let aligned = align_up(self.cursors[id], width);
		if aligned + width > self.blocks.block(id).capacity() {
			return Err(self.overflow(id, aligned + width));
		}

		self.cursors[id] = aligned + width;
		Ok(BlockRef { block: id, offset: aligned })
	}

	/// Store `value` little-endian at pointer width into `slot`, the
	/// second phase of two-phase pointer creation.
	pub fn write_pointer(&mut self, slot: BlockRef, value: u64) -> Result<()> {
		let width = self.codec.width().bytes();
		let Some(block) = self.blocks.get(slot.block) else {
			return Err(ZoneError::InvalidOffsetBlock {
				block: slot.block,
				block_count: self.blocks.len(),
			});
		};
		if slot.offset > block.capacity() || width > block.capacity() - slot.offset {
			return Err(self.out_of_bounds(slot.block, slot.offset));
		}

		let raw = value.to_le_bytes();
		let buffer = self.blocks.block_mut(slot.block).bytes_mut();
		buffer[slot.offset..slot.offset + width].copy_from_slice(&raw[..width]);
		Ok(())
	}

	/// Decode a non-null reference code into a validated block location.
	///
	/// `code == 0` denotes null and must be handled by the caller.
	pub fn offset_to_ptr(&self, code: u64) -> Result<BlockRef> {
		let at = self.codec.decode(code);
		let Some(block) = self.blocks.get(at.block) else {
			return Err(ZoneError::InvalidOffsetBlock {
				block: at.block,
				block_count: self.blocks.len(),
			});
		};
		if at.offset >= block.capacity() {
			return Err(ZoneError::InvalidOffsetBlockOffset {
				block: block.id,
				name: block.name.clone(),
				offset: at.offset,
				capacity: block.capacity(),
			});
		}

		Ok(at)
	}

	/// Decode a non-null reference code that points at a stored pointer,
	/// returning the pointer-width little-endian value at that location.
	pub fn offset_to_alias(&self, code: u64) -> Result<u64> {
		let at = self.codec.decode(code);
		let width = self.codec.width().bytes();
		let Some(block) = self.blocks.get(at.block) else {
			return Err(ZoneError::InvalidOffsetBlock {
				block: at.block,
				block_count: self.blocks.len(),
			});
		};
		if at.offset > block.capacity() || width > block.capacity() - at.offset {
			return Err(ZoneError::InvalidOffsetBlockOffset {
				block: block.id,
				name: block.name.clone(),
				offset: at.offset,
				capacity: block.capacity(),
			});
		}

		let mut raw = [0_u8; 8];
		raw[..width].copy_from_slice(&block.bytes()[at.offset..at.offset + width]);
		Ok(u64::from_le_bytes(raw))
	}

	/// Finish the load, handing the filled block set to the caller's zone
	/// object.
	pub fn finish(self) -> BlockSet {
		self.blocks
	}

	fn overflow(&self, block: usize, at: usize) -> ZoneError {
		let b = self.blocks.block(block);
		ZoneError::BlockOverflow {
			block,
			name: b.name.clone(),
			at,
			capacity: b.capacity(),
		}
	}

	fn out_of_bounds(&self, block: usize, offset: usize) -> ZoneError {
		let b = self.blocks.block(block);
		ZoneError::OutOfBlockBounds {
			block,
			name: b.name.clone(),
			offset,
			capacity: b.capacity(),
		}
	}
}

fn align_up(value: usize, alignment: usize) -> usize {
	(value + alignment - 1) / alignment * alignment
}
