//! The linear bytecode stream handed to backends.

pub mod instruction;

pub use instruction::{Constant, Instruction};

use std::fmt::Write;

/// Render an instruction stream as text, one instruction per line prefixed
/// with its index. Inspection format only; backends consume the structured
/// stream.
pub fn disassemble(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for (idx, instr) in instructions.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{:4}: {}", idx, instr);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_numbers_lines() {
        let stream = vec![
            Instruction::LoadConst {
                dst: 0,
                value: Constant::Int(1),
            },
            Instruction::Print { src: 0 },
        ];
        let text = disassemble(&stream);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("LOAD_CONST"));
        assert!(lines[1].starts_with("   1:"));
    }
}
