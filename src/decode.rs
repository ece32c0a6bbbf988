use log::{debug, trace, warn};

use crate::error::DecodeError;
use crate::modrm::{register, Mode, ModRm, UNKNOWN};
use crate::opcode::{
  classify, is_immediate_to_memory, is_immediate_to_register, JumpKind, OpcodeClass,
};
use crate::stream::ByteStream;

/// Disassembles a whole image into a listing, one line per instruction.
/// A truncation diagnostic, if any, is the last line.
pub fn disassemble(bytes: &[u8]) -> String {
  let mut listing = String::new();
  for line in Decoder::new(bytes) {
    match line {
      Ok(line) => listing.push_str(&line),
      Err(err) => listing.push_str(&err.to_string()),
    }
    listing.push('\n');
  }
  listing
}

/// Forward-only scan over a byte stream. Yields one formatted line per
/// decoded instruction; after the first error it yields nothing more.
pub struct Decoder<'a> {
  stream: ByteStream<'a>,
  cursor: usize,
  halted: bool,
}

impl<'a> Decoder<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self {
      stream: ByteStream::new(bytes),
      cursor: 0,
      halted: false,
    }
  }

  /// Offset of the next byte to be scanned.
  pub fn position(&self) -> usize {
    self.cursor
  }

  fn take_byte(&mut self) -> Option<u8> {
    let byte = self.stream.byte_at(self.cursor)?;
    self.cursor += 1;
    Some(byte)
  }

  fn take_u16(&mut self) -> Option<u16> {
    let word = self.stream.read_u16(self.cursor)?;
    self.cursor += 2;
    Some(word)
  }

  /// Returns `Ok(None)` when neither operand resolved.
  fn decode_data_movement(
    &mut self,
    mnemonic: &str,
    opcode: u8,
  ) -> Result<Option<String>, DecodeError> {
    // the register lives in the opcode; there is no ModRM byte
    if is_immediate_to_register(opcode) {
      let imm = self.take_byte().ok_or(DecodeError::MissingImmediate)?;
      let dst = register(opcode & 0b111);
      return Ok(Some(format!("{mnemonic} {dst}, 0x{imm:02X}")));
    }

    let modrm = ModRm::from(self.take_byte().ok_or(DecodeError::MissingModRm)?);
    let dst = register(modrm.reg);
    let mut src = self.rm_operand(modrm)?;

    if is_immediate_to_memory(opcode) {
      let imm = self.take_byte().ok_or(DecodeError::MissingImmediate)?;
      src = format!("{src} 0x{imm:02X}");
    }

    if dst == UNKNOWN && src == UNKNOWN {
      debug!("suppressing unresolved {mnemonic} with ModRM {modrm:?}");
      return Ok(None);
    }
    Ok(Some(format!("{mnemonic} {dst}, {src}")))
  }

  fn rm_operand(&mut self, modrm: ModRm) -> Result<String, DecodeError> {
    if modrm.is_direct_address() {
      let address = self.take_u16().ok_or(DecodeError::MissingDirectAddress)?;
      return Ok(format!("[0x{address:04X}]"));
    }
    let base = modrm.base();
    let operand = match modrm.mode {
      Mode::Memory | Mode::Register => base.to_string(),
      Mode::Memory8 => {
        let disp = self.take_byte().ok_or(DecodeError::MissingDisplacement8)? as i8;
        let sign = if disp < 0 { '-' } else { '+' };
        format!("{base} {sign} 0x{:02X}", disp.unsigned_abs())
      }
      Mode::Memory16 => {
        let disp = self.take_u16().ok_or(DecodeError::MissingDisplacement16)?;
        format!("{base} + 0x{disp:04X}")
      }
    };
    Ok(operand)
  }

  fn decode_jump(&mut self, mnemonic: &str, kind: JumpKind, start: usize) -> String {
    let width = kind.width();
    let target = match jump_target(&self.stream, kind, start) {
      Some(target) => {
        self.cursor += width;
        target
      }
      None => {
        // what is left is the truncated offset field
        warn!("truncated {mnemonic} offset at {start}, target left unresolved");
        self.cursor = self.stream.len();
        start as i64
      }
    };
    format!("{mnemonic} {}", format_target(target))
  }
}

/// Absolute target of the jump whose opcode sits at `start`, measured from the
/// byte following the whole instruction. Negative when a backward jump leaves
/// the image. `None` when the offset field runs past the end of the stream.
pub fn jump_target(stream: &ByteStream, kind: JumpKind, start: usize) -> Option<i64> {
  let width = kind.width();
  let raw = stream.read_le(start + 1, width)?;
  let offset = match kind {
    JumpKind::Short => i64::from(raw as u8 as i8),
    JumpKind::Near => i64::from(raw as u16 as i16),
    JumpKind::Far => raw as i64,
  };
  let next = start as i64 + width as i64 + 1;
  Some(next.wrapping_add(offset))
}

fn format_target(target: i64) -> String {
  let sign = if target < 0 { "-" } else { "" };
  format!("{sign}0x{:04X}", target.unsigned_abs())
}

impl Iterator for Decoder<'_> {
  type Item = Result<String, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.halted {
      return None;
    }
    while let Some(opcode) = self.take_byte() {
      let start = self.cursor - 1;
      let text = match classify(opcode) {
        OpcodeClass::Padding => continue,
        OpcodeClass::Unrecognized => {
          trace!("skipping unrecognized opcode {opcode:#04X} at {start}");
          continue;
        }
        OpcodeClass::ZeroOperand(mnemonic) => mnemonic.to_string(),
        OpcodeClass::Jump(mnemonic, kind) => self.decode_jump(mnemonic, kind, start),
        OpcodeClass::DataMovement(mnemonic) => match self.decode_data_movement(mnemonic, opcode) {
          Ok(Some(text)) => text,
          Ok(None) => continue,
          Err(err) => {
            warn!("aborting scan at {start}: {err}");
            self.halted = true;
            return Some(Err(err));
          }
        },
      };
      debug!("{start}..{}: {text}", self.cursor);
      return Some(Ok(format!("CS:{start}   {text}")));
    }
    self.halted = true;
    None
  }
}
