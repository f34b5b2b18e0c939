use crate::zone::BlockRef;

/// Pointer width of the serialized format, decoupled from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
	/// 32-bit pointers and reference codes.
	W32,
	/// 64-bit pointers and reference codes.
	W64,
}

impl PointerWidth {
	/// Return the width in bytes.
	pub fn bytes(self) -> usize {
		match self {
			Self::W32 => 4,
			Self::W64 => 8,
		}
	}

	/// Return the width in bits.
	pub fn bits(self) -> u32 {
		match self {
			Self::W32 => 32,
			Self::W64 => 64,
		}
	}
}

/// Bit-split configuration for compact block+offset reference codes.
///
/// A non-null code is `((block << offset_bits) | offset) + 1`: the top
/// `block_bits` bits of the biased value select the block, the rest are
/// the intra-block byte offset. The +1 bias keeps block 0 / offset 0
/// distinguishable from the all-zero null code. Both the split and the
/// pointer width are format-version constants supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RelocCodec {
	width: PointerWidth,
	block_bits: u32,
}

impl RelocCodec {
	/// Create a codec for one format version.
	///
	/// # Panics
	///
	/// Panics unless `0 < block_bits < width.bits()`.
	pub fn new(width: PointerWidth, block_bits: u32) -> Self {
		assert!(
			block_bits > 0 && block_bits < width.bits(),
			"block_bits {block_bits} out of range for {}-bit codes",
			width.bits()
		);
		Self { width, block_bits }
	}

	/// Return the configured pointer width.
	pub fn width(self) -> PointerWidth {
		self.width
	}

	/// Return the number of block-selector bits.
	pub fn block_bits(self) -> u32 {
		self.block_bits
	}

	fn offset_bits(self) -> u32 {
		self.width.bits() - self.block_bits
	}

	fn offset_mask(self) -> u64 {
		(1_u64 << self.offset_bits()) - 1
	}

	fn code_mask(self) -> u64 {
		match self.width {
			PointerWidth::W32 => u64::from(u32::MAX),
			PointerWidth::W64 => u64::MAX,
		}
	}

	/// Encode a block-relative location as a non-null reference code.
	pub fn encode(self, at: BlockRef) -> u64 {
		debug_assert!((at.block as u64) <= self.code_mask() >> self.offset_bits());
		debug_assert!((at.offset as u64) <= self.offset_mask());

		(((at.block as u64) << self.offset_bits()) | at.offset as u64) + 1
	}

	/// Decode a non-null reference code into an unvalidated location.
	///
	/// `code == 0` denotes null and must be handled by the caller before
	/// decoding. Bounds validation against a concrete block set happens in
	/// the engine's conversion operations.
	pub fn decode(self, code: u64) -> BlockRef {
		debug_assert_ne!(code, 0, "null reference must be handled by the caller");

		let biased = code.wrapping_sub(1) & self.code_mask();
		BlockRef {
			block: (biased >> self.offset_bits()) as usize,
			offset: (biased & self.offset_mask()) as usize,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{PointerWidth, RelocCodec};
	use crate::zone::BlockRef;

	#[test]
	fn encode_decode_round_trips() {
		for &width in &[PointerWidth::W32, PointerWidth::W64] {
			for block_bits in [1, 4, 8, 16] {
				let codec = RelocCodec::new(width, block_bits);
				for at in [
					BlockRef { block: 0, offset: 0 },
					BlockRef { block: 0, offset: 1 },
					BlockRef { block: 1, offset: 3 },
					BlockRef { block: 1, offset: 4095 },
				] {
					assert_eq!(codec.decode(codec.encode(at)), at, "width {width:?}, block_bits {block_bits}");
				}
			}
		}
	}

	#[test]
	fn zero_code_is_reserved_for_null() {
		let codec = RelocCodec::new(PointerWidth::W32, 4);
		assert_eq!(codec.encode(BlockRef { block: 0, offset: 0 }), 1);
	}

	#[test]
	fn split_matches_wire_formula() {
		// block 1 / offset 3 with 4 selector bits in a 32-bit code.
		let codec = RelocCodec::new(PointerWidth::W32, 4);
		let code = ((1_u64 << (32 - 4)) | 3) + 1;

		assert_eq!(codec.encode(BlockRef { block: 1, offset: 3 }), code);
		assert_eq!(codec.decode(code), BlockRef { block: 1, offset: 3 });
	}

	#[test]
	fn high_bits_above_code_width_are_ignored() {
		let codec = RelocCodec::new(PointerWidth::W32, 4);
		let code = ((1_u64 << (32 - 4)) | 3) + 1;

		assert_eq!(codec.decode(code | 0xFFFF_FFFF_0000_0000), BlockRef { block: 1, offset: 3 });
	}

	#[test]
	#[should_panic(expected = "block_bits 32 out of range")]
	fn selector_must_leave_offset_bits() {
		let _ = RelocCodec::new(PointerWidth::W32, 32);
	}
}
