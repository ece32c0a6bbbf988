//! Opcode tables and the ordered classification over them.

/// Treated as padding: skipped, never decoded.
pub const PADDING: u8 = 0x00;

/// Width of a jump's relative offset field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
  Short,
  Near,
  /// Eight offset bytes; a simplification of the real segment:offset form.
  Far,
}

impl JumpKind {
  pub fn width(self) -> usize {
    match self {
      JumpKind::Short => 1,
      JumpKind::Near => 2,
      JumpKind::Far => 8,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpcodeClass {
  Padding,
  ZeroOperand(&'static str),
  Jump(&'static str, JumpKind),
  DataMovement(&'static str),
  Unrecognized,
}

/// Fixed-mnemonic opcodes take priority over data movement.
pub fn classify(opcode: u8) -> OpcodeClass {
  if opcode == PADDING {
    return OpcodeClass::Padding;
  }
  if let Some(mnemonic) = fixed_mnemonic(opcode) {
    return match jump_kind(opcode) {
      Some(kind) => OpcodeClass::Jump(mnemonic, kind),
      None => OpcodeClass::ZeroOperand(mnemonic),
    };
  }
  match data_movement_mnemonic(opcode) {
    Some(mnemonic) => OpcodeClass::DataMovement(mnemonic),
    None => OpcodeClass::Unrecognized,
  }
}

/// `MOV reg, imm` with the register in the opcode's low 3 bits.
pub fn is_immediate_to_register(opcode: u8) -> bool {
  (0xB0..=0xBF).contains(&opcode)
}

/// `MOV r/m, imm`.
pub fn is_immediate_to_memory(opcode: u8) -> bool {
  matches!(opcode, 0xC6 | 0xC7)
}

fn data_movement_mnemonic(opcode: u8) -> Option<&'static str> {
  match opcode {
    0x88..=0x8B | 0xB0 | 0xB8 | 0xC6 | 0xC7 => Some("MOV"),
    _ => None,
  }
}

fn jump_kind(opcode: u8) -> Option<JumpKind> {
  match opcode {
    0x70..=0x7F | 0xEB => Some(JumpKind::Short),
    0xE9 => Some(JumpKind::Near),
    0xEA => Some(JumpKind::Far),
    _ => None,
  }
}

fn fixed_mnemonic(opcode: u8) -> Option<&'static str> {
  let mnemonic = match opcode {
    0x70 => "JO",
    0x71 => "JNO",
    0x72 => "JB",
    0x73 => "JNB",
    0x74 => "JZ",
    0x75 => "JNZ",
    0x76 => "JBE",
    0x77 => "JA",
    0x78 => "JS",
    0x79 => "JNS",
    0x7A => "JP",
    0x7B => "JNP",
    0x7C => "JL",
    0x7D => "JGE",
    0x7E => "JLE",
    0x7F => "JG",

    0x90 => "NOP / XCHG AX, AX",
    0x98 => "CBW",
    0x99 => "CWD",
    0x9B => "WAIT",
    0x9C => "PUSHF",
    0x9D => "POPF",
    0x9E => "SAHF",
    0x9F => "LAHF",

    0xC3 => "RET / RETN",
    0xCB => "RETF",
    0xCC => "INT 3",
    0xCE => "INTO",
    0xCF => "IRET",
    0xD7 => "XLAT",

    0xE9 => "JMP",
    0xEA => "JMP FAR",
    0xEB => "JMP SHORT",

    0xF0 => "LOCK",
    0xF2 => "REPNZ / REPNE",
    0xF3 => "REP / REPZ / REPE",
    0xF4 => "HLT",
    0xF5 => "CMC",

    0xF8 => "CLC",
    0xF9 => "STC",
    0xFA => "CLI",
    0xFB => "STI",
    0xFC => "CLD",
    0xFD => "STD",
    _ => return None,
  };
  Some(mnemonic)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_classify() {
    assert_eq!(classify(0x00), OpcodeClass::Padding);
    assert_eq!(classify(0xF4), OpcodeClass::ZeroOperand("HLT"));
    assert_eq!(classify(0x74), OpcodeClass::Jump("JZ", JumpKind::Short));
    assert_eq!(classify(0xE9), OpcodeClass::Jump("JMP", JumpKind::Near));
    assert_eq!(classify(0xEA), OpcodeClass::Jump("JMP FAR", JumpKind::Far));
    assert_eq!(classify(0x89), OpcodeClass::DataMovement("MOV"));
    assert_eq!(classify(0xB1), OpcodeClass::Unrecognized);
    assert_eq!(classify(0x01), OpcodeClass::Unrecognized);
  }

  #[test]
  fn test_set_sizes() {
    let all = || (0..=u8::MAX).map(classify);
    let moves = all().filter(|c| matches!(c, OpcodeClass::DataMovement(_))).count();
    let jumps = all().filter(|c| matches!(c, OpcodeClass::Jump(_, _))).count();
    let conditional = (0x70..=0x7F)
      .filter(|&op| matches!(classify(op), OpcodeClass::Jump(_, JumpKind::Short)))
      .count();
    assert_eq!(moves, 8);
    assert_eq!(jumps, 19);
    assert_eq!(conditional, 16);
  }

  #[test]
  fn test_fixed_mnemonics_win_over_data_movement() {
    for opcode in 0..=u8::MAX {
      if let Some(mnemonic) = fixed_mnemonic(opcode) {
        assert!(!matches!(classify(opcode), OpcodeClass::DataMovement(_)));
        assert!(matches!(
          classify(opcode),
          OpcodeClass::ZeroOperand(m) | OpcodeClass::Jump(m, _) if m == mnemonic
        ));
      }
    }
  }

  #[test]
  fn test_jump_widths() {
    assert_eq!(JumpKind::Short.width(), 1);
    assert_eq!(JumpKind::Near.width(), 2);
    assert_eq!(JumpKind::Far.width(), 8);
  }

  #[test]
  fn test_immediate_forms() {
    assert!(is_immediate_to_register(0xB0));
    assert!(is_immediate_to_register(0xBF));
    assert!(!is_immediate_to_register(0xC6));
    assert!(is_immediate_to_memory(0xC7));
    assert!(!is_immediate_to_memory(0x88));
  }
}
