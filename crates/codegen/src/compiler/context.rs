//! Lowering context holding state during bytecode generation.

use crate::bytecode::Instruction;
use crate::error::{CodegenError, CodegenResult};
use reef_front::TypeContext;
use std::collections::HashMap;

/// Recursion ceiling for expression emission.
pub const MAX_DEPTH: u32 = 1000;

/// Placeholder written into a jump before its target is known. Every
/// placeholder must be patched before lowering finishes.
const UNPATCHED: usize = usize::MAX;

/// Break/continue jumps of one enclosing loop, patched when the loop's
/// bounds are known.
#[derive(Debug, Default)]
struct LoopFrame {
    break_patches: Vec<usize>,
    continue_patches: Vec<usize>,
}

pub struct LoweringContext<'t> {
    /// The variable→type table from inference, queried by name.
    pub types: &'t TypeContext,
    pub instructions: Vec<Instruction>,
    /// One counter covers both variable slots and expression temporaries.
    next_register: u32,
    slots: HashMap<String, u32>,
    loops: Vec<LoopFrame>,
    pub depth: u32,
}

impl<'t> LoweringContext<'t> {
    pub fn new(types: &'t TypeContext) -> Self {
        Self {
            types,
            instructions: Vec::new(),
            next_register: 0,
            slots: HashMap::new(),
            loops: Vec::new(),
            depth: 0,
        }
    }

    /// Append an instruction, returning its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    /// Index of the next instruction to be emitted.
    pub fn here(&self) -> usize {
        self.instructions.len()
    }

    pub fn alloc_register(&mut self) -> u32 {
        let reg = self.next_register;
        self.next_register += 1;
        reg
    }

    /// The storage slot of a named variable, allocated on first sight.
    pub fn slot_of(&mut self, name: &str) -> u32 {
        if let Some(slot) = self.slots.get(name) {
            return *slot;
        }
        let slot = self.alloc_register();
        self.slots.insert(name.to_string(), slot);
        slot
    }

    /// The value register of the immediately preceding instruction. The
    /// operand of the next instruction is whatever the last emission left
    /// behind: a variable slot for loads/stores, a fresh register for
    /// everything else.
    pub fn result_of_last(&self) -> CodegenResult<u32> {
        self.instructions
            .last()
            .and_then(Instruction::result)
            .ok_or_else(|| {
                CodegenError::InvalidInstruction(
                    "preceding instruction produces no value".to_string(),
                )
            })
    }

    /// Emit a jump whose target is not yet known.
    pub fn emit_jump_placeholder(&mut self) -> usize {
        self.emit(Instruction::Jump { target: UNPATCHED })
    }

    /// Emit a conditional jump whose target is not yet known.
    pub fn emit_jump_if_false_placeholder(&mut self, cond: u32) -> usize {
        self.emit(Instruction::JumpIfFalse {
            cond,
            target: UNPATCHED,
        })
    }

    /// Write the resolved target into a previously emitted jump.
    pub fn patch_jump(&mut self, idx: usize, to: usize) -> CodegenResult<()> {
        match self.instructions.get_mut(idx) {
            Some(Instruction::Jump { target }) | Some(Instruction::JumpIfFalse { target, .. }) => {
                *target = to;
                Ok(())
            }
            _ => Err(CodegenError::InvalidInstruction(format!(
                "instruction {} is not a jump",
                idx
            ))),
        }
    }

    pub fn enter_loop(&mut self) {
        self.loops.push(LoopFrame::default());
    }

    /// Close the innermost loop, resolving its break/continue jumps.
    pub fn exit_loop(&mut self, continue_target: usize, break_target: usize) -> CodegenResult<()> {
        let frame = self.loops.pop().ok_or_else(|| {
            CodegenError::CompilationError("loop frame underflow".to_string())
        })?;
        for idx in frame.continue_patches {
            self.patch_jump(idx, continue_target)?;
        }
        for idx in frame.break_patches {
            self.patch_jump(idx, break_target)?;
        }
        Ok(())
    }

    pub fn add_break(&mut self, idx: usize) -> CodegenResult<()> {
        match self.loops.last_mut() {
            Some(frame) => {
                frame.break_patches.push(idx);
                Ok(())
            }
            None => Err(CodegenError::CompilationError(
                "Break outside loop".to_string(),
            )),
        }
    }

    pub fn add_continue(&mut self, idx: usize) -> CodegenResult<()> {
        match self.loops.last_mut() {
            Some(frame) => {
                frame.continue_patches.push(idx);
                Ok(())
            }
            None => Err(CodegenError::CompilationError(
                "Continue outside loop".to_string(),
            )),
        }
    }

    /// Verify that no emitted jump still carries the placeholder target and
    /// that every target lands inside the stream.
    pub fn check_jumps(&self) -> CodegenResult<()> {
        for (idx, instr) in self.instructions.iter().enumerate() {
            if let Some(target) = instr.jump_target() {
                if target == UNPATCHED || target >= self.instructions.len() {
                    return Err(CodegenError::InvalidInstruction(format!(
                        "jump at {} has unresolved target",
                        idx
                    )));
                }
            }
        }
        Ok(())
    }
}
