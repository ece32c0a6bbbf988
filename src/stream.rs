/// Immutable view over a loaded image. Reads past the end yield `None`.
#[derive(Clone, Copy, Debug)]
pub struct ByteStream<'a> {
  bytes: &'a [u8],
}

impl<'a> ByteStream<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self { bytes }
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  pub fn byte_at(&self, index: usize) -> Option<u8> {
    self.bytes.get(index).copied()
  }

  /// Whether at least `n` bytes remain starting at `pos`.
  pub fn has_remaining(&self, pos: usize, n: usize) -> bool {
    pos.checked_add(n).is_some_and(|end| end <= self.bytes.len())
  }

  /// Little-endian read of `width` bytes (1..=8) starting at `pos`.
  pub fn read_le(&self, pos: usize, width: usize) -> Option<u64> {
    if width == 0 || width > 8 || !self.has_remaining(pos, width) {
      return None;
    }
    let value = self.bytes[pos..pos + width]
      .iter()
      .rev()
      .fold(0_u64, |acc, &byte| (acc << 8) | u64::from(byte));
    Some(value)
  }

  pub fn read_u16(&self, pos: usize) -> Option<u16> {
    self.read_le(pos, 2).map(|value| value as u16)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_byte_at_bounds() {
    let stream = ByteStream::new(&[0x89, 0xD9]);
    assert_eq!(stream.len(), 2);
    assert_eq!(stream.byte_at(1), Some(0xD9));
    assert_eq!(stream.byte_at(2), None);
  }

  #[test]
  fn test_has_remaining() {
    let stream = ByteStream::new(&[1, 2, 3]);
    assert!(stream.has_remaining(0, 3));
    assert!(stream.has_remaining(3, 0));
    assert!(!stream.has_remaining(1, 3));
    assert!(!stream.has_remaining(usize::MAX, 2));
  }

  #[test]
  fn test_reads_are_little_endian() {
    let stream = ByteStream::new(&[0x34, 0x12, 0xFF, 0x01, 0, 0, 0, 0, 0, 0x80]);
    assert_eq!(stream.read_u16(0), Some(0x1234));
    assert_eq!(stream.read_le(2, 1), Some(0xFF));
    assert_eq!(stream.read_le(2, 4), Some(0x0000_01FF));
    assert_eq!(stream.read_le(2, 8), Some(0x8000_0000_0000_01FF));
    assert_eq!(stream.read_le(9, 2), None);
    assert_eq!(stream.read_le(0, 9), None);
  }
}
