//! Bytecode instruction definitions
//!
//! One struct variant per operation. Instructions are register-addressed:
//! a `dst` is either the storage slot of a named variable or a virtual
//! register from the per-lowering counter; the two share one number space.
//! Jump targets are instruction indices into the final stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant operand carried by `LoadConst`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Str(String),
    Nil,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Float(v) => write!(f, "{:?}", v),
            Constant::Str(v) => write!(f, "{:?}", v),
            Constant::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    // Values
    LoadConst {
        dst: u32,
        value: Constant,
    },
    LoadName {
        dst: u32,
        name: String,
    },
    StoreName {
        slot: u32,
        name: String,
        src: u32,
    },

    // Arithmetic
    Add {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Sub {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Mul {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Div {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Mod {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Neg {
        dst: u32,
        operand: u32,
    },

    // Strings
    Concat {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Repeat {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    StrLen {
        dst: u32,
        src: u32,
    },

    // Comparisons and logic
    Eq {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    NotEq {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Lt {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    LtEq {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Gt {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    GtEq {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    And {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Or {
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Not {
        dst: u32,
        operand: u32,
    },

    // Control flow. Targets are backpatched after the jumped-over region
    // has been emitted.
    Jump {
        target: usize,
    },
    JumpIfFalse {
        cond: u32,
        target: usize,
    },

    // Functions
    FuncDef {
        name: String,
        params: Vec<String>,
        /// Index of the first body instruction.
        entry: usize,
    },
    Call {
        name: String,
        dst: u32,
        args: Vec<u32>,
    },
    Return {
        src: Option<u32>,
    },

    // Lists
    MakeList {
        dst: u32,
        elems: Vec<u32>,
    },
    Index {
        dst: u32,
        object: u32,
        index: u32,
    },
    SetIndex {
        object: u32,
        index: u32,
        src: u32,
    },

    // Structs. Field access carries names, not offsets; layout is the
    // backend's job.
    NewStruct {
        dst: u32,
        name: String,
    },
    GetField {
        dst: u32,
        object: u32,
        field: String,
    },
    SetField {
        object: u32,
        field: String,
        src: u32,
    },

    // Pointers
    AddrOf {
        dst: u32,
        slot: u32,
        name: String,
    },
    Deref {
        dst: u32,
        src: u32,
    },
    SetDeref {
        ptr: u32,
        src: u32,
    },

    Print {
        src: u32,
    },
}

impl Instruction {
    /// The register or slot this instruction leaves its value in, if any.
    pub fn result(&self) -> Option<u32> {
        match self {
            Instruction::LoadConst { dst, .. }
            | Instruction::LoadName { dst, .. }
            | Instruction::Add { dst, .. }
            | Instruction::Sub { dst, .. }
            | Instruction::Mul { dst, .. }
            | Instruction::Div { dst, .. }
            | Instruction::Mod { dst, .. }
            | Instruction::Neg { dst, .. }
            | Instruction::Concat { dst, .. }
            | Instruction::Repeat { dst, .. }
            | Instruction::StrLen { dst, .. }
            | Instruction::Eq { dst, .. }
            | Instruction::NotEq { dst, .. }
            | Instruction::Lt { dst, .. }
            | Instruction::LtEq { dst, .. }
            | Instruction::Gt { dst, .. }
            | Instruction::GtEq { dst, .. }
            | Instruction::And { dst, .. }
            | Instruction::Or { dst, .. }
            | Instruction::Not { dst, .. }
            | Instruction::Call { dst, .. }
            | Instruction::MakeList { dst, .. }
            | Instruction::Index { dst, .. }
            | Instruction::NewStruct { dst, .. }
            | Instruction::GetField { dst, .. }
            | Instruction::AddrOf { dst, .. }
            | Instruction::Deref { dst, .. } => Some(*dst),
            Instruction::StoreName { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    /// The jump target, for the two control-flow instructions.
    pub fn jump_target(&self) -> Option<usize> {
        match self {
            Instruction::Jump { target } | Instruction::JumpIfFalse { target, .. } => Some(*target),
            _ => None,
        }
    }
}

fn triad(f: &mut fmt::Formatter<'_>, mnemonic: &str, dst: u32, lhs: u32, rhs: u32) -> fmt::Result {
    write!(f, "{} %r{}, %r{}, %r{}", mnemonic, dst, lhs, rhs)
}

impl fmt::Display for Instruction {
    /// The human-readable text form: one instruction per line, mnemonic
    /// plus space-separated operands. A debugging format, not a contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LoadConst { dst, value } => write!(f, "LOAD_CONST %r{}, {}", dst, value),
            Instruction::LoadName { dst, name } => write!(f, "LOAD_NAME %r{}, {}", dst, name),
            Instruction::StoreName { slot, name, src } => {
                write!(f, "STORE_NAME {}, %r{} <- %r{}", name, slot, src)
            }
            Instruction::Add { dst, lhs, rhs } => triad(f, "ADD", *dst, *lhs, *rhs),
            Instruction::Sub { dst, lhs, rhs } => triad(f, "SUB", *dst, *lhs, *rhs),
            Instruction::Mul { dst, lhs, rhs } => triad(f, "MUL", *dst, *lhs, *rhs),
            Instruction::Div { dst, lhs, rhs } => triad(f, "DIV", *dst, *lhs, *rhs),
            Instruction::Mod { dst, lhs, rhs } => triad(f, "MOD", *dst, *lhs, *rhs),
            Instruction::Neg { dst, operand } => write!(f, "NEG %r{}, %r{}", dst, operand),
            Instruction::Concat { dst, lhs, rhs } => triad(f, "CONCAT", *dst, *lhs, *rhs),
            Instruction::Repeat { dst, lhs, rhs } => triad(f, "REPEAT", *dst, *lhs, *rhs),
            Instruction::StrLen { dst, src } => write!(f, "STR_LEN %r{}, %r{}", dst, src),
            Instruction::Eq { dst, lhs, rhs } => triad(f, "EQ", *dst, *lhs, *rhs),
            Instruction::NotEq { dst, lhs, rhs } => triad(f, "NOT_EQ", *dst, *lhs, *rhs),
            Instruction::Lt { dst, lhs, rhs } => triad(f, "LT", *dst, *lhs, *rhs),
            Instruction::LtEq { dst, lhs, rhs } => triad(f, "LT_EQ", *dst, *lhs, *rhs),
            Instruction::Gt { dst, lhs, rhs } => triad(f, "GT", *dst, *lhs, *rhs),
            Instruction::GtEq { dst, lhs, rhs } => triad(f, "GT_EQ", *dst, *lhs, *rhs),
            Instruction::And { dst, lhs, rhs } => triad(f, "AND", *dst, *lhs, *rhs),
            Instruction::Or { dst, lhs, rhs } => triad(f, "OR", *dst, *lhs, *rhs),
            Instruction::Not { dst, operand } => write!(f, "NOT %r{}, %r{}", dst, operand),
            Instruction::Jump { target } => write!(f, "JUMP {}", target),
            Instruction::JumpIfFalse { target, .. } => write!(f, "JUMP_IF_FALSE {}", target),
            Instruction::FuncDef {
                name,
                params,
                entry,
            } => {
                write!(f, "FUNC_DEF {} @{} params:", name, entry)?;
                for param in params {
                    write!(f, " {}", param)?;
                }
                Ok(())
            }
            Instruction::Call { name, dst, args } => {
                write!(f, "CALL {} -> {} args:", name, dst)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Instruction::Return { src } => match src {
                Some(src) => write!(f, "RETURN %r{}", src),
                None => write!(f, "RETURN"),
            },
            Instruction::MakeList { dst, elems } => {
                write!(f, "MAKE_LIST %r{} elems:", dst)?;
                for elem in elems {
                    write!(f, " {}", elem)?;
                }
                Ok(())
            }
            Instruction::Index { dst, object, index } => {
                write!(f, "INDEX %r{}, %r{}, %r{}", dst, object, index)
            }
            Instruction::SetIndex { object, index, src } => {
                write!(f, "SET_INDEX %r{}, %r{}, %r{}", object, index, src)
            }
            Instruction::NewStruct { dst, name } => write!(f, "NEW_STRUCT %r{}, {}", dst, name),
            Instruction::GetField { dst, object, field } => {
                write!(f, "GET_FIELD %r{}, %r{}, {}", dst, object, field)
            }
            Instruction::SetField { object, field, src } => {
                write!(f, "SET_FIELD %r{}, {}, %r{}", object, field, src)
            }
            Instruction::AddrOf { dst, slot, name } => {
                write!(f, "ADDR_OF %r{}, %r{} ({})", dst, slot, name)
            }
            Instruction::Deref { dst, src } => write!(f, "DEREF %r{}, %r{}", dst, src),
            Instruction::SetDeref { ptr, src } => write!(f, "SET_DEREF %r{}, %r{}", ptr, src),
            Instruction::Print { src } => write!(f, "PRINT %r{}", src),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_format() {
        let add = Instruction::Add {
            dst: 3,
            lhs: 1,
            rhs: 2,
        };
        assert_eq!(add.to_string(), "ADD %r3, %r1, %r2");

        let jif = Instruction::JumpIfFalse { cond: 4, target: 12 };
        assert_eq!(jif.to_string(), "JUMP_IF_FALSE 12");

        let call = Instruction::Call {
            name: "foo".to_string(),
            dst: 5,
            args: vec![1, 2],
        };
        assert_eq!(call.to_string(), "CALL foo -> 5 args: 1 2");
    }

    #[test]
    fn test_result_register() {
        let add = Instruction::Add {
            dst: 3,
            lhs: 1,
            rhs: 2,
        };
        assert_eq!(add.result(), Some(3));

        let store = Instruction::StoreName {
            slot: 0,
            name: "x".to_string(),
            src: 7,
        };
        assert_eq!(store.result(), Some(0));

        let print = Instruction::Print { src: 1 };
        assert_eq!(print.result(), None);
    }
}
