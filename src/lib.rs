//! Mnemonic listing for 16-bit real-mode x86 images.

pub mod decode;
pub mod error;
pub mod modrm;
pub mod opcode;
pub mod stream;

pub use decode::{disassemble, Decoder};
pub use error::DecodeError;
