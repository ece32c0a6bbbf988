use thiserror::Error;

/// Trailing bytes an instruction needs but the image does not have.
/// Any of these ends the scan.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
  #[error("Incomplete MOD-REG-R/M byte for MOV")]
  MissingModRm,
  #[error("Missing 16-bit displacement for memory address")]
  MissingDirectAddress,
  #[error("Missing 8-bit displacement")]
  MissingDisplacement8,
  #[error("Missing 16-bit displacement")]
  MissingDisplacement16,
  #[error("Missing immediate value")]
  MissingImmediate,
}
