//! A small reference evaluator for lowered modules, used by tests to pin
//! down execution semantics without assembling anything. Runtime calls are
//! modeled natively: `strict_print` appends to a transcript, `strict_input`
//! pops scripted values, and the `__match_*` helpers mirror the runtime
//! library. List and array primitives are not modeled.

use std::collections::VecDeque;

use crate::index::Index;

use super::{BinaryOp, BlockId, Function, Instruction, Module, StringId, Terminator, Value};

pub struct Evaluator<'m> {
    module: &'m Module,
    pub printed: Vec<String>,
    pub inputs: VecDeque<i32>,
}

/// A runtime value: slots and temporaries are type-opaque, so a cell holds
/// whichever of the two representable shapes was last written.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Int(i32),
    Str(StringId),
}

struct Frame {
    slots: Vec<Cell>,
    temps: Vec<Cell>,
}

impl Frame {
    fn read(&self, value: Value) -> Cell {
        match value {
            Value::Const(value) => Cell::Int(value),
            Value::Str(id) => Cell::Str(id),
            Value::Slot(slot) => self.slots[slot.index()],
            Value::Temp(temp) => self.temps[temp.index()],
        }
    }

    fn read_int(&self, value: Value) -> i32 {
        int(self.read(value))
    }
}

fn int(cell: Cell) -> i32 {
    match cell {
        Cell::Int(value) => value,
        Cell::Str(_) => panic!("expected an integer, found a string"),
    }
}

impl<'m> Evaluator<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            module,
            printed: Vec::new(),
            inputs: VecDeque::new(),
        }
    }

    pub fn with_inputs(module: &'m Module, inputs: &[i32]) -> Self {
        let mut evaluator = Self::new(module);
        evaluator.inputs.extend(inputs);
        evaluator
    }

    pub fn run_main(&mut self) -> i32 {
        self.call_named("main", Vec::new())
    }

    pub fn call_function(&mut self, name: &str, arguments: &[i32]) -> i32 {
        self.call_named(name, arguments.iter().copied().map(Cell::Int).collect())
    }

    fn call_named(&mut self, name: &str, arguments: Vec<Cell>) -> i32 {
        let module = self.module;
        let function = module
            .function(name)
            .unwrap_or_else(|| panic!("no function named `{name}`"));
        int(self.execute(function, arguments))
    }

    fn execute(&mut self, function: &Function, arguments: Vec<Cell>) -> Cell {
        let mut frame = Frame {
            slots: vec![Cell::Int(0); function.slots.len()],
            temps: vec![Cell::Int(0); function.temps.len()],
        };
        for (slot, value) in function.parameters.iter().zip(arguments) {
            frame.slots[slot.index()] = value;
        }

        let mut block = BlockId::ZERO;
        loop {
            let current = &function.blocks[block];
            for instruction in &current.instructions {
                self.step(&mut frame, instruction);
            }

            match current
                .terminator
                .as_ref()
                .expect("block must be terminated")
            {
                Terminator::Jump { target } => block = *target,
                Terminator::Branch {
                    condition,
                    positive,
                    negative,
                } => {
                    block = if frame.read_int(*condition) != 0 {
                        *positive
                    } else {
                        *negative
                    };
                }
                Terminator::Return { value } => return frame.read(*value),
            }
        }
    }

    fn step(&mut self, frame: &mut Frame, instruction: &Instruction) {
        match instruction {
            Instruction::Binary {
                op,
                destination,
                lhs,
                rhs,
            } => {
                let lhs = frame.read_int(*lhs);
                let rhs = frame.read_int(*rhs);
                let result = match op {
                    BinaryOp::Add => lhs.wrapping_add(rhs),
                    BinaryOp::Sub => lhs.wrapping_sub(rhs),
                    BinaryOp::Mul => lhs.wrapping_mul(rhs),
                    // `idiv` faults on a zero divisor and on MIN / -1;
                    // the evaluator has no model for hardware traps.
                    BinaryOp::SDiv => lhs
                        .checked_div(rhs)
                        .expect("division trap is not modeled"),
                    BinaryOp::Xor => lhs ^ rhs,
                };
                frame.temps[destination.index()] = Cell::Int(result);
            }
            Instruction::Compare {
                predicate,
                destination,
                lhs,
                rhs,
            } => {
                let lhs = frame.read_int(*lhs);
                let rhs = frame.read_int(*rhs);
                frame.temps[destination.index()] = Cell::Int(predicate.apply(lhs, rhs) as i32);
            }
            Instruction::Call {
                callee,
                arguments,
                destination,
            } => {
                let arguments: Vec<Cell> = arguments
                    .iter()
                    .map(|argument| frame.read(*argument))
                    .collect();
                let result = self.dispatch(callee, arguments);
                if let Some(destination) = destination {
                    frame.temps[destination.index()] = result;
                }
            }
            // Frames preallocate every slot.
            Instruction::Alloc { .. } => {}
            Instruction::Load { destination, slot } => {
                frame.temps[destination.index()] = frame.slots[slot.index()];
            }
            Instruction::Store { slot, value } => {
                frame.slots[slot.index()] = frame.read(*value);
            }
        }
    }

    fn dispatch(&mut self, callee: &str, arguments: Vec<Cell>) -> Cell {
        let module = self.module;
        if let Some(function) = module.function(callee) {
            return self.execute(function, arguments);
        }

        match callee {
            "strict_print" => {
                let line = match arguments[0] {
                    Cell::Str(id) => self.module.strings[id].clone(),
                    Cell::Int(value) => value.to_string(),
                };
                self.printed.push(line);
                Cell::Int(0)
            }
            "strict_input" => Cell::Int(self.inputs.pop_front().unwrap_or(0)),
            "__match_int" => Cell::Int((int(arguments[0]) == int(arguments[1])) as i32),
            "__match_range" => {
                let value = int(arguments[0]);
                Cell::Int((int(arguments[1]) <= value && value <= int(arguments[2])) as i32)
            }
            "__match_lt" => Cell::Int((int(arguments[0]) < int(arguments[1])) as i32),
            "__match_gt" => Cell::Int((int(arguments[0]) > int(arguments[1])) as i32),
            other => panic!("no evaluation model for runtime symbol `{other}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::{
        frontend::{SourceFile, parser::Parser},
        middle::ir::ast_lowering,
    };

    fn compile(source: &str) -> Module {
        let source = SourceFile::in_memory(source);
        let program = Parser::parse_program(&source);
        let module = ast_lowering::lower_program(&program).expect("lowering should succeed");
        module.verify();
        module
    }

    #[test]
    fn test_operator_precedence_applies_to_runtime_values() {
        let module = compile("Return Input() + Input() * Input()");
        let mut evaluator = Evaluator::with_inputs(&module, &[2, 3, 4]);

        assert_eq!(evaluator.run_main(), 14);
    }

    #[test]
    fn test_function_calls_pass_arguments() {
        let module = compile(indoc! {"
            Func add(a, b)
                Return a + b
            End
            Return add(2, 3)
        "});

        assert_eq!(Evaluator::new(&module).run_main(), 5);
        assert_eq!(Evaluator::new(&module).call_function("add", &[10, -4]), 6);
    }

    #[test]
    fn test_if_takes_the_branch_matching_the_condition() {
        let module = compile(indoc! {"
            Let x = Input()
            If x
                Return 1
            End
            Return 2
        "});

        assert_eq!(Evaluator::with_inputs(&module, &[7]).run_main(), 1);
        assert_eq!(Evaluator::with_inputs(&module, &[0]).run_main(), 2);
    }

    #[test]
    fn test_else_branch_executes_on_zero() {
        let module = compile(indoc! {r#"
            Let x = Input()
            If x
                Print "yes"
            Else
                Print "no"
            End
        "#});

        let mut truthy = Evaluator::with_inputs(&module, &[5]);
        truthy.run_main();
        assert_eq!(truthy.printed, ["yes"]);

        let mut falsy = Evaluator::with_inputs(&module, &[0]);
        falsy.run_main();
        assert_eq!(falsy.printed, ["no"]);
    }

    #[test]
    fn test_while_iterates_until_the_condition_is_zero() {
        let module = compile(indoc! {r#"
            While Input()
                Print "tick"
            End
        "#});

        let mut evaluator = Evaluator::with_inputs(&module, &[1, 1, 0]);
        evaluator.run_main();
        assert_eq!(evaluator.printed, ["tick", "tick"]);

        let mut never = Evaluator::with_inputs(&module, &[0]);
        never.run_main();
        assert!(never.printed.is_empty());
    }

    #[test]
    fn test_for_covers_the_inclusive_range() {
        let module = compile(indoc! {r#"
            For i = 1..3
                Print "x"
            End
        "#});

        let mut evaluator = Evaluator::new(&module);
        evaluator.run_main();
        assert_eq!(evaluator.printed.len(), 3);
    }

    #[test]
    fn test_degenerate_for_range_runs_exactly_once() {
        let module = compile(indoc! {r#"
            For i = 5..5
                Print "once"
            End
        "#});

        let mut evaluator = Evaluator::new(&module);
        evaluator.run_main();
        assert_eq!(evaluator.printed, ["once"]);
    }

    #[test]
    fn test_for_skips_entirely_when_start_exceeds_end() {
        let module = compile(indoc! {r#"
            For i = 5..4
                Print "never"
            End
        "#});

        let mut evaluator = Evaluator::new(&module);
        evaluator.run_main();
        assert!(evaluator.printed.is_empty());
    }

    #[test]
    fn test_match_selects_the_first_matching_case() {
        let module = compile(indoc! {r#"
            Func classify(v)
                Match v
                Case 1:
                    Print "one"
                Case 2..5:
                    Print "range"
                Case <0:
                    Print "less"
                Case >100:
                    Print "greater"
                End
                Return 0
            End
            Return classify(Input())
        "#});

        let expectations: [(i32, &[&str]); 5] = [
            (1, &["one"]),
            (3, &["range"]),
            (-7, &["less"]),
            (250, &["greater"]),
            (42, &[]),
        ];

        for (input, expected) in expectations {
            let mut evaluator = Evaluator::with_inputs(&module, &[input]);
            evaluator.run_main();
            assert_eq!(evaluator.printed, expected, "scrutinee {input}");
        }
    }

    #[test]
    fn test_recursion_computes() {
        let module = compile(indoc! {"
            Func fact(n)
                If n
                    Return n * fact(n - 1)
                End
                Return 1
            End
            Return fact(5)
        "});

        assert_eq!(Evaluator::new(&module).run_main(), 120);
    }

    #[test]
    fn test_shadowed_slot_does_not_leak_out_of_its_block() {
        let module = compile(indoc! {"
            Let x = Input()
            If 1
                Let x = 9
            End
            Return x
        "});

        assert_eq!(Evaluator::with_inputs(&module, &[5]).run_main(), 5);
    }

    #[test]
    fn test_unary_operators_execute() {
        let negate = compile("Return -Input()");
        assert_eq!(Evaluator::with_inputs(&negate, &[5]).run_main(), -5);

        let invert = compile("Return !Input()");
        assert_eq!(Evaluator::with_inputs(&invert, &[5]).run_main(), !5);
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        let module = compile("Return Input() / Input()");
        assert_eq!(Evaluator::with_inputs(&module, &[7, 2]).run_main(), 3);
        assert_eq!(Evaluator::with_inputs(&module, &[-7, 2]).run_main(), -3);
    }

    #[test]
    #[should_panic(expected = "division trap is not modeled")]
    fn test_division_by_zero_is_an_unmodeled_trap() {
        let module = compile("Return 1 / Input()");
        Evaluator::with_inputs(&module, &[0]).run_main();
    }
}
