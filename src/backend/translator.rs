//! Serializes a lowered module into the deterministic opcode stream.
//!
//! Every instruction becomes one line: the catalog code and mnemonic,
//! then a `;` comment naming the operands. The comment column is
//! advisory; the emitter keys on the code alone. Operations without a
//! catalog entry serialize as `?? (mnemonic)` and are carried through
//! rather than failing the build.

use std::{fs, path::Path};

use crate::{
    error::{CompileError, CompileResult},
    middle::ir::{BinaryOp, Function, Instruction, Module, Terminator, Value},
};

use super::catalog::Opcode;

pub fn translate_module(module: &Module) -> String {
    let mut output = String::new();

    for function in &module.functions {
        translate_function(function, &mut output);
    }

    output
}

pub fn write_stream_file(path: &Path, stream: &str) -> CompileResult<()> {
    fs::write(path, stream).map_err(|source| CompileError::io(path, source))
}

fn translate_function(function: &Function, output: &mut String) {
    output.push_str(&format!("FUNC {}\n", function.name));

    for block in function.blocks.iter() {
        output.push_str(&format!("  BLOCK {}\n", block.label));

        for instruction in &block.instructions {
            let (line, operands) = serialize_instruction(function, instruction);
            push_line(output, &line, &operands);
        }

        if let Some(terminator) = &block.terminator {
            let (line, operands) = serialize_terminator(function, terminator);
            push_line(output, &line, &operands);
        }
    }

    output.push_str("END FUNC\n\n");
}

fn push_line(output: &mut String, line: &str, operands: &[String]) {
    output.push_str("    ");
    output.push_str(line);
    if !operands.is_empty() {
        output.push_str(" ; ");
        output.push_str(&operands.join(", "));
    }
    output.push('\n');
}

fn serialize_instruction(function: &Function, instruction: &Instruction) -> (String, Vec<String>) {
    match instruction {
        Instruction::Binary { op, lhs, rhs, .. } => {
            let operands = vec![render_value(function, *lhs), render_value(function, *rhs)];

            match opcode_for_binary(*op) {
                Some(opcode) => (opcode.stream_line(), operands),
                None => (format!("?? ({})", op.mnemonic()), operands),
            }
        }
        Instruction::Compare { lhs, rhs, .. } => (
            Opcode::Icmp.stream_line(),
            vec![render_value(function, *lhs), render_value(function, *rhs)],
        ),
        Instruction::Call {
            callee, arguments, ..
        } => {
            let mut operands: Vec<String> = arguments
                .iter()
                .map(|argument| render_value(function, *argument))
                .collect();
            operands.push(callee.clone());

            (Opcode::Call.stream_line(), operands)
        }
        Instruction::Alloc { slot } => (
            Opcode::Alloca.stream_line(),
            vec![function.slot_name(*slot).to_owned()],
        ),
        Instruction::Load { slot, .. } => (
            Opcode::Load.stream_line(),
            vec![function.slot_name(*slot).to_owned()],
        ),
        Instruction::Store { slot, value } => (
            Opcode::Store.stream_line(),
            vec![
                render_value(function, *value),
                function.slot_name(*slot).to_owned(),
            ],
        ),
    }
}

fn serialize_terminator(function: &Function, terminator: &Terminator) -> (String, Vec<String>) {
    match terminator {
        Terminator::Jump { target } => (
            Opcode::Br.stream_line(),
            vec![function.blocks[*target].label.clone()],
        ),
        Terminator::Branch {
            condition,
            positive,
            negative,
        } => (
            Opcode::Br.stream_line(),
            vec![
                render_value(function, *condition),
                function.blocks[*positive].label.clone(),
                function.blocks[*negative].label.clone(),
            ],
        ),
        Terminator::Return { value } => (
            Opcode::Ret.stream_line(),
            vec![render_value(function, *value)],
        ),
    }
}

fn opcode_for_binary(op: BinaryOp) -> Option<Opcode> {
    match op {
        BinaryOp::Add => Some(Opcode::Add),
        BinaryOp::Sub => Some(Opcode::Sub),
        BinaryOp::Mul => Some(Opcode::Mul),
        BinaryOp::SDiv => Some(Opcode::SDiv),
        // Bitwise-not desugars to xor, which has no catalog entry yet.
        BinaryOp::Xor => None,
    }
}

/// Named operands keep their names; temporaries are anonymous in the
/// stream and collapse to a placeholder.
fn render_value(function: &Function, value: Value) -> String {
    match value {
        Value::Const(value) => value.to_string(),
        Value::Str(id) => id.label(),
        Value::Slot(slot) => function.slot_name(slot).to_owned(),
        Value::Temp(_) => "%tmp".to_owned(),
    }
}
