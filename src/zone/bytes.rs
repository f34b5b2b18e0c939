use std::io::Read;

use crate::zone::{Result, ZoneError};

/// Synchronous byte source feeding one zone load.
///
/// The engine borrows the source for the load's duration; reads block the
/// caller until satisfied or failed, and a short read is a hard error.
pub trait LoadStream {
	/// Fill `dst` completely from the source or fail.
	fn load(&mut self, dst: &mut [u8]) -> Result<()>;
}

/// Bounded byte source over a decompressed in-memory zone.
pub struct SliceStream<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> SliceStream<'a> {
	/// Create a source at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}
}

impl LoadStream for SliceStream<'_> {
	fn load(&mut self, dst: &mut [u8]) -> Result<()> {
		let need = dst.len();
		if need > self.remaining() {
			return Err(ZoneError::UnexpectedEof {
				at: self.pos,
				need,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += need;
		dst.copy_from_slice(&self.bytes[start..self.pos]);
		Ok(())
	}
}

/// Byte source adapter over any [`Read`] implementation.
pub struct ReaderStream<R> {
	inner: R,
}

impl<R: Read> ReaderStream<R> {
	/// Wrap a reader.
	pub fn new(inner: R) -> Self {
		Self { inner }
	}

	/// Unwrap the inner reader.
	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl<R: Read> LoadStream for ReaderStream<R> {
	fn load(&mut self, dst: &mut [u8]) -> Result<()> {
		self.inner.read_exact(dst)?;
		Ok(())
	}
}
