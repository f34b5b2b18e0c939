#![allow(missing_docs)]

use unzone::zone::{BlockDesc, BlockKind, BlockRef, BlockSet, PointerWidth, RelocCodec, SliceStream, ZoneStream};

fn demo_blocks() -> BlockSet {
	BlockSet::new(vec![
		BlockDesc::new("persistent", BlockKind::Persistent, 64),
		BlockDesc::new("scratch", BlockKind::Scratch, 32),
		BlockDesc::new("runtime", BlockKind::ZeroFilled, 16),
	])
}

/// Drives the engine through the call sequence a structure decoder would
/// issue for one small asset: a fixed header, a name string referenced by
/// a serialized code, a transient scratch structure, runtime-derived
/// state, and a two-phase pointer fixup.
#[test]
fn nested_structure_load_round_trips() {
	let codec = RelocCodec::new(PointerWidth::W32, 4);
	// The serializer laid the asset header at block 0 offset 0 and the
	// name string right behind it at offset 8.
	let name_code = codec.encode(BlockRef { block: 0, offset: 8 });

	let mut stream = Vec::new();
	stream.extend_from_slice(&(name_code as u32).to_le_bytes());
	stream.extend_from_slice(&2_u32.to_le_bytes());
	stream.extend_from_slice(b"lamp\0");
	stream.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);

	let mut source = SliceStream::new(&stream);
	let mut engine = ZoneStream::new(demo_blocks(), &mut source, codec, 0);

	engine.push_block(0);

	// Fixed-size asset header.
	let header_at = engine.alloc(4).expect("header alloc");
	engine.load_in_block(header_at, 8).expect("header load");

	let header = engine.blocks().slice(header_at, 8).expect("header bytes");
	let stored_code = u64::from(u32::from_le_bytes(header[..4].try_into().expect("code bytes")));
	let flag_count = u32::from_le_bytes(header[4..].try_into().expect("count bytes"));
	assert_eq!(stored_code, name_code);
	assert_eq!(flag_count, 2);

	// The name string lands exactly where the serialized code points.
	let name_at = engine.alloc(0).expect("name alloc");
	engine.load_null_terminated(name_at).expect("name load");
	assert_eq!(engine.offset_to_ptr(stored_code).expect("name code resolves"), name_at);

	// Transient sub-structure in the scratch block.
	engine.push_block(1);
	let tmp_at = engine.alloc(4).expect("scratch alloc");
	engine.load_in_block(tmp_at, 12).expect("scratch load");
	assert_eq!(engine.blocks().slice(tmp_at, 3), Some(&[1, 2, 3][..]));
	assert_eq!(engine.pop_block(), 1);
	assert_eq!(engine.cursor(1), 0, "scratch scope discards its allocations");

	// Runtime-derived state never appears in the stream.
	engine.push_block(2);
	let state_at = engine.alloc(4).expect("runtime alloc");
	engine.load_in_block(state_at, 8).expect("runtime load");
	assert_eq!(engine.pop_block(), 2);

	// Reserve a pointer slot now, fill it once the pointee is known.
	let slot = engine.insert_pointer().expect("slot reserves");
	engine.write_pointer(slot, name_code).expect("slot fills");
	assert_eq!(engine.offset_to_alias(codec.encode(slot)).expect("alias reads slot"), name_code);

	assert_eq!(engine.pop_block(), 0);

	let set = engine.finish();
	assert_eq!(source.pos(), stream.len(), "every serialized byte was consumed");
	assert_eq!(set.slice(name_at, 5), Some(&b"lamp\0"[..]));
	assert_eq!(set.slice(state_at, 8), Some(&[0_u8; 8][..]));

	// The filled slot holds the encoded reference, little-endian at
	// pointer width.
	let raw = set.slice(slot, 4).expect("slot bytes");
	assert_eq!(u64::from(u32::from_le_bytes(raw.try_into().expect("slot width"))), name_code);
}
