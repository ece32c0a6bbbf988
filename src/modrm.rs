//! ModRM bit fields and the register / effective-address tables they index.

/// Printed in place of any operand a table cannot resolve.
pub const UNKNOWN: &str = "UNKNOWN";

/// RM value that means "direct 16-bit address" when MOD is `00`.
pub const DIRECT_ADDRESS: u8 = 0b110;

const REGISTERS: [&str; 8] = ["AX", "CX", "DX", "BX", "SP", "BP", "SI", "DI"];

// index 0b110 is the direct-address carve-out and is never looked up
const INDIRECT: [&str; 8] = [
  "[BX+SI]", "[BX+DI]", "[BP+SI]", "[BP+DI]", "[SI]", "[DI]", UNKNOWN, "[BX]",
];

const DISPLACED: [&str; 8] = [
  "[BX+SI]", "[BX+DI]", "[BP+SI]", "[BP+DI]", "[SI]", "[DI]", "[BP]", "[BX]",
];

/// The MOD field of a ModRM byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
  /// `00`: register indirect, no displacement.
  Memory,
  /// `01`: register indirect + signed 8-bit displacement.
  Memory8,
  /// `10`: register indirect + 16-bit displacement.
  Memory16,
  /// `11`: RM names a register.
  Register,
}

impl Mode {
  pub fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Mode::Memory,
      0b01 => Mode::Memory8,
      0b10 => Mode::Memory16,
      _ => Mode::Register,
    }
  }

  /// RM table for the memory modes; `None` for register-direct.
  fn rm_table(self) -> Option<&'static [&'static str; 8]> {
    match self {
      Mode::Memory => Some(&INDIRECT),
      Mode::Memory8 | Mode::Memory16 => Some(&DISPLACED),
      Mode::Register => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModRm {
  pub mode: Mode,
  pub reg: u8,
  pub rm: u8,
}

impl From<u8> for ModRm {
  fn from(byte: u8) -> Self {
    Self {
      mode: Mode::from_bits(byte >> 6),
      reg: (byte >> 3) & 0b111,
      rm: byte & 0b111,
    }
  }
}

impl ModRm {
  pub fn is_direct_address(&self) -> bool {
    self.mode == Mode::Memory && self.rm == DIRECT_ADDRESS
  }

  /// Base expression for the RM field under this mode, without displacement.
  pub fn base(&self) -> &'static str {
    match self.mode.rm_table() {
      Some(table) => table.get(usize::from(self.rm)).copied().unwrap_or(UNKNOWN),
      None => register(self.rm),
    }
  }
}

pub fn register(index: u8) -> &'static str {
  REGISTERS.get(usize::from(index)).copied().unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_fields() {
    let modrm = ModRm::from(0b01_011_110);
    assert_eq!(modrm.mode, Mode::Memory8);
    assert_eq!(modrm.reg, 0b011);
    assert_eq!(modrm.rm, 0b110);
    assert_eq!(modrm.base(), "[BP]");
  }

  #[test]
  fn test_register_mode_uses_register_table() {
    assert_eq!(ModRm::from(0b11_000_111).base(), "DI");
    assert_eq!(ModRm::from(0b11_000_100).base(), "SP");
  }

  #[test]
  fn test_direct_address_carve_out() {
    assert!(ModRm::from(0b00_000_110).is_direct_address());
    assert!(!ModRm::from(0b01_000_110).is_direct_address());
    assert!(!ModRm::from(0b00_000_111).is_direct_address());
    assert_eq!(ModRm::from(0b00_000_111).base(), "[BX]");
  }

  #[test]
  fn test_register_fallback() {
    assert_eq!(register(0), "AX");
    assert_eq!(register(7), "DI");
    assert_eq!(register(8), UNKNOWN);
  }
}
