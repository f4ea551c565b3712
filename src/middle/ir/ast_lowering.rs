//! Lowering from the syntax tree to the block IR.
//!
//! One [`Lowering`] drives a whole program and owns the module being built
//! plus the function table used to resolve calls. Each function body gets
//! its own [`FunctionLowering`] with a fresh scope chain, so names never
//! leak between functions. Resolution is a single pass: a call site only
//! sees functions declared earlier in the source, with the one deliberate
//! exception that a function's own name is registered before its body is
//! lowered, which keeps recursion legal.

use hashbrown::HashMap;

use crate::{
    error::{CompileError, CompileResult},
    frontend::ast,
    index::IndexVec,
    middle::scope::ScopeChain,
};

use super::{
    BinaryOp, Block, BlockId, ClassStub, ComparePredicate, Function, Instruction, Module, Slot,
    SlotId, TempId, TempSource, Terminator, Value,
};

/// Lowers a parsed program into an IR module.
///
/// Top-level executable statements become the body of a synthesized entry
/// function. Function declarations may appear anywhere, including nested in
/// another function's body, and are lifted to module scope.
pub fn lower_program(program: &ast::Program) -> CompileResult<Module> {
    let mut lowering = Lowering::default();

    // Registered before anything else so a user-written `Func main`
    // collides with the synthesized entry function.
    lowering.declare_function("main", 0)?;
    let mut entry = FunctionLowering::new("main", &[])?;

    for statement in &program.statements {
        entry.lower_statement(&mut lowering, statement)?;
    }

    let entry = entry.into_function();
    lowering.module.functions.insert(0, entry);

    Ok(lowering.module)
}

#[derive(Debug, Default)]
struct Lowering {
    module: Module,
    function_table: HashMap<String, FunctionInfo>,
}

#[derive(Debug, Clone, Copy)]
struct FunctionInfo {
    arity: usize,
}

/// Identifier-callable surface over the runtime library. `Print` and
/// `Input()` have dedicated syntax and bypass this table. A user function
/// may shadow a builtin's surface name, but never its linked symbol:
/// identifiers must start with a letter, so the `__` symbols cannot be
/// named in source.
#[derive(Debug)]
struct Builtin {
    name: &'static str,
    symbol: &'static str,
    arity: usize,
    has_result: bool,
}

#[rustfmt::skip]
const BUILTINS: &[Builtin] = &[
    Builtin { name: "list_new",    symbol: "__list_new",    arity: 0, has_result: true },
    Builtin { name: "list_append", symbol: "__list_append", arity: 2, has_result: false },
    Builtin { name: "list_remove", symbol: "__list_remove", arity: 2, has_result: false },
    Builtin { name: "list_get",    symbol: "__list_get",    arity: 2, has_result: true },
    Builtin { name: "list_size",   symbol: "__list_size",   arity: 1, has_result: true },
    Builtin { name: "array_new",   symbol: "__array_new",   arity: 1, has_result: true },
    Builtin { name: "array_store", symbol: "__array_store", arity: 3, has_result: false },
    Builtin { name: "array_load",  symbol: "__array_load",  arity: 2, has_result: true },
];

fn builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

impl Lowering {
    fn declare_function(&mut self, name: &str, arity: usize) -> CompileResult<()> {
        if self.function_table.contains_key(name) {
            return Err(CompileError::DuplicateFunction {
                name: name.to_owned(),
            });
        }

        self.function_table
            .insert(name.to_owned(), FunctionInfo { arity });
        Ok(())
    }

    fn lower_func_decl(&mut self, declaration: &ast::FuncDecl) -> CompileResult<()> {
        // Registered before the body so the function can call itself.
        self.declare_function(&declaration.name.name, declaration.parameters.len())?;

        let mut function = FunctionLowering::new(&declaration.name.name, &declaration.parameters)?;
        for statement in &declaration.body {
            function.lower_statement(self, statement)?;
        }

        self.module.functions.push(function.into_function());
        Ok(())
    }

    fn lower_class_decl(&mut self, declaration: &ast::ClassDecl) {
        self.module.classes.push(ClassStub {
            name: declaration.name.name.clone(),
            base: declaration.base.as_ref().map(|base| base.name.clone()),
        });
    }
}

/// Per-function lowering state. Exactly one block is "open" at any time;
/// instructions pushed after the open block was terminated are unreachable
/// and silently dropped, and only a block's first terminator sticks. The
/// two rules together maintain the one-terminator invariant without
/// special-casing `Return` in the middle of a body.
struct FunctionLowering {
    function: Function,
    scopes: ScopeChain,
    current: BlockId,
    labels: usize,
}

impl FunctionLowering {
    fn new(name: &str, parameters: &[ast::Identifier]) -> CompileResult<Self> {
        let mut this = Self {
            function: Function {
                name: name.to_owned(),
                parameters: Vec::new(),
                slots: IndexVec::new(),
                temps: IndexVec::new(),
                blocks: IndexVec::new(),
            },
            scopes: ScopeChain::new(),
            current: BlockId::ZERO,
            labels: 0,
        };

        this.create_block("entry".to_owned());

        // Parameters are slots pre-bound by the calling convention; no
        // entry stores are emitted for them.
        for parameter in parameters {
            let slot = this.create_slot(&parameter.name);
            this.scopes.declare(&parameter.name, slot)?;
            this.function.parameters.push(slot);
        }

        Ok(this)
    }

    fn into_function(mut self) -> Function {
        // A body without a trailing explicit `Return` falls off the end of
        // its last open block.
        self.terminate(Terminator::Return {
            value: Value::Const(0),
        });
        self.function
    }

    fn create_block(&mut self, label: String) -> BlockId {
        self.function.blocks.push(Block {
            label,
            instructions: Vec::new(),
            terminator: None,
        })
    }

    fn create_slot(&mut self, name: &str) -> SlotId {
        self.function.slots.push(Slot {
            name: name.to_owned(),
        })
    }

    fn create_temp(&mut self, source: TempSource) -> TempId {
        self.function.temps.push(source)
    }

    fn next_label(&mut self) -> usize {
        let label = self.labels;
        self.labels += 1;
        label
    }

    fn switch_to(&mut self, block: BlockId) {
        self.current = block;
    }

    fn push_instruction(&mut self, instruction: Instruction) {
        let block = &mut self.function.blocks[self.current];
        if !block.is_terminated() {
            block.instructions.push(instruction);
        }
    }

    fn terminate(&mut self, terminator: Terminator) {
        let block = &mut self.function.blocks[self.current];
        if !block.is_terminated() {
            block.terminator = Some(terminator);
        }
    }

    fn lower_statement(
        &mut self,
        cx: &mut Lowering,
        statement: &ast::Statement,
    ) -> CompileResult<()> {
        match &statement.kind {
            ast::StatementKind::VarDecl(declaration) => self.lower_var_decl(cx, declaration),
            ast::StatementKind::FuncDecl(declaration) => cx.lower_func_decl(declaration),
            ast::StatementKind::ClassDecl(declaration) => {
                cx.lower_class_decl(declaration);
                Ok(())
            }
            ast::StatementKind::If(if_statement) => self.lower_if(cx, if_statement),
            ast::StatementKind::For(for_statement) => self.lower_for(cx, for_statement),
            ast::StatementKind::While(while_statement) => self.lower_while(cx, while_statement),
            ast::StatementKind::Match(match_statement) => self.lower_match(cx, match_statement),
            ast::StatementKind::Print(expression) => self.lower_print(cx, expression),
            ast::StatementKind::Return(expression) => {
                let value = self.lower_expression(cx, expression)?;
                self.terminate(Terminator::Return { value });
                Ok(())
            }
            ast::StatementKind::Expr(expression) => {
                self.lower_expression(cx, expression)?;
                Ok(())
            }
        }
    }

    /// Lowers a statement block in a frame of its own.
    fn lower_body(&mut self, cx: &mut Lowering, body: &[ast::Statement]) -> CompileResult<()> {
        self.scopes.enter_frame();
        for statement in body {
            self.lower_statement(cx, statement)?;
        }
        self.scopes.exit_frame();
        Ok(())
    }

    fn lower_var_decl(
        &mut self,
        cx: &mut Lowering,
        declaration: &ast::VarDecl,
    ) -> CompileResult<()> {
        let name = &declaration.name.name;
        // Rejected before the initializer is lowered, so a bad declaration
        // leaves no partial code behind.
        if self.scopes.is_bound_in_current_frame(name) {
            return Err(CompileError::Redeclaration { name: name.clone() });
        }

        let value = match &declaration.initializer {
            Some(initializer) => self.lower_expression(cx, initializer)?,
            None => Value::Const(0),
        };

        let slot = self.create_slot(name);
        self.scopes.declare(name, slot)?;
        self.push_instruction(Instruction::Alloc { slot });
        self.push_instruction(Instruction::Store { slot, value });
        Ok(())
    }

    fn lower_if(&mut self, cx: &mut Lowering, if_statement: &ast::IfStatement) -> CompileResult<()> {
        let condition = self.lower_expression(cx, &if_statement.condition)?;
        // Any nonzero value counts as true.
        let truth = self.lower_compare(ComparePredicate::Ne, condition, Value::Const(0));

        let label = self.next_label();
        let then_block = self.create_block(format!("then{label}"));
        let else_block = self.create_block(format!("else{label}"));
        let merge_block = self.create_block(format!("merge{label}"));

        self.terminate(Terminator::Branch {
            condition: truth,
            positive: then_block,
            negative: else_block,
        });

        self.switch_to(then_block);
        self.lower_body(cx, &if_statement.then_body)?;
        self.terminate(Terminator::Jump {
            target: merge_block,
        });

        // An absent `else` still gets its (empty) block, keeping the graph
        // shape uniform.
        self.switch_to(else_block);
        self.lower_body(cx, &if_statement.else_body)?;
        self.terminate(Terminator::Jump {
            target: merge_block,
        });

        self.switch_to(merge_block);
        Ok(())
    }

    fn lower_while(
        &mut self,
        cx: &mut Lowering,
        while_statement: &ast::WhileStatement,
    ) -> CompileResult<()> {
        let label = self.next_label();
        let condition_block = self.create_block(format!("cond{label}"));
        let body_block = self.create_block(format!("body{label}"));
        let exit_block = self.create_block(format!("exit{label}"));

        self.terminate(Terminator::Jump {
            target: condition_block,
        });

        // Re-evaluated on every iteration.
        self.switch_to(condition_block);
        let condition = self.lower_expression(cx, &while_statement.condition)?;
        let truth = self.lower_compare(ComparePredicate::Ne, condition, Value::Const(0));
        self.terminate(Terminator::Branch {
            condition: truth,
            positive: body_block,
            negative: exit_block,
        });

        self.switch_to(body_block);
        self.lower_body(cx, &while_statement.body)?;
        self.terminate(Terminator::Jump {
            target: condition_block,
        });

        self.switch_to(exit_block);
        Ok(())
    }

    fn lower_for(
        &mut self,
        cx: &mut Lowering,
        for_statement: &ast::ForStatement,
    ) -> CompileResult<()> {
        // Both bounds are evaluated once, in the enclosing scope, before
        // the loop variable exists. The upper bound is loaded out of any
        // slot here so the loop keeps its initial value even if the body
        // stores to the variable it came from.
        let start = self.lower_expression(cx, &for_statement.start)?;
        let end = self.lower_expression(cx, &for_statement.end)?;
        let end = self.materialize(end);

        self.scopes.enter_frame();
        let slot = self.create_slot(&for_statement.variable.name);
        self.scopes.declare(&for_statement.variable.name, slot)?;
        self.push_instruction(Instruction::Alloc { slot });
        self.push_instruction(Instruction::Store { slot, value: start });

        let label = self.next_label();
        let condition_block = self.create_block(format!("cond{label}"));
        let body_block = self.create_block(format!("body{label}"));
        let exit_block = self.create_block(format!("exit{label}"));

        self.terminate(Terminator::Jump {
            target: condition_block,
        });

        // The range is inclusive of `end`.
        self.switch_to(condition_block);
        let truth = self.lower_compare(ComparePredicate::Le, Value::Slot(slot), end);
        self.terminate(Terminator::Branch {
            condition: truth,
            positive: body_block,
            negative: exit_block,
        });

        // The body shares the loop variable's frame, so a `Let` of the
        // same name inside it is a redeclaration, not a shadow.
        self.switch_to(body_block);
        for statement in &for_statement.body {
            self.lower_statement(cx, statement)?;
        }
        let next = self.lower_binary_op(BinaryOp::Add, Value::Slot(slot), Value::Const(1));
        self.push_instruction(Instruction::Store { slot, value: next });
        self.terminate(Terminator::Jump {
            target: condition_block,
        });

        self.scopes.exit_frame();
        self.switch_to(exit_block);
        Ok(())
    }

    fn lower_match(
        &mut self,
        cx: &mut Lowering,
        match_statement: &ast::MatchStatement,
    ) -> CompileResult<()> {
        let scrutinee = self.lower_expression(cx, &match_statement.scrutinee)?;
        // Pinned into a temporary so every case tests the same value.
        let scrutinee = self.materialize(scrutinee);

        let label = self.next_label();
        let mut case_blocks = Vec::with_capacity(match_statement.cases.len());
        for index in 0..match_statement.cases.len() {
            let test = self.create_block(format!("case{label}_{index}"));
            let body = self.create_block(format!("body{label}_{index}"));
            case_blocks.push((test, body));
        }
        let end_block = self.create_block(format!("endmatch{label}"));

        let first_test = case_blocks
            .first()
            .map(|(test, _)| *test)
            .unwrap_or(end_block);
        self.terminate(Terminator::Jump { target: first_test });

        for (index, case) in match_statement.cases.iter().enumerate() {
            let (test_block, body_block) = case_blocks[index];
            // A failed test moves on to the next case; the last one falls
            // through to the end with no effect.
            let no_match = case_blocks
                .get(index + 1)
                .map(|(test, _)| *test)
                .unwrap_or(end_block);

            self.switch_to(test_block);
            let matched = self.lower_pattern_test(cx, scrutinee, &case.pattern)?;
            self.terminate(Terminator::Branch {
                condition: matched,
                positive: body_block,
                negative: no_match,
            });

            self.switch_to(body_block);
            self.lower_body(cx, &case.body)?;
            self.terminate(Terminator::Jump { target: end_block });
        }

        self.switch_to(end_block);
        Ok(())
    }

    /// Pattern operands are lowered inside the test block itself, so a
    /// later case's operand expressions only run if every earlier case
    /// failed to match.
    fn lower_pattern_test(
        &mut self,
        cx: &mut Lowering,
        scrutinee: Value,
        pattern: &ast::Pattern,
    ) -> CompileResult<Value> {
        let matched = match &pattern.kind {
            ast::PatternKind::Equals(expression) => {
                let pattern = self.lower_expression(cx, expression)?;
                self.emit_call("__match_int", vec![scrutinee, pattern], true)
            }
            ast::PatternKind::Range(low, high) => {
                let low = self.lower_expression(cx, low)?;
                let high = self.lower_expression(cx, high)?;
                self.emit_call("__match_range", vec![scrutinee, low, high], true)
            }
            ast::PatternKind::LessThan(expression) => {
                let limit = self.lower_expression(cx, expression)?;
                self.emit_call("__match_lt", vec![scrutinee, limit], true)
            }
            ast::PatternKind::GreaterThan(expression) => {
                let limit = self.lower_expression(cx, expression)?;
                self.emit_call("__match_gt", vec![scrutinee, limit], true)
            }
        };

        Ok(matched)
    }

    fn lower_print(
        &mut self,
        cx: &mut Lowering,
        expression: &ast::Expression,
    ) -> CompileResult<()> {
        let value = self.lower_expression(cx, expression)?;
        if !self.may_be_string(value) {
            return Err(CompileError::UnsupportedOperator(
                "`Print` applied to a non-string value".to_owned(),
            ));
        }

        self.emit_call("strict_print", vec![value], false);
        Ok(())
    }

    /// `Print` hands its operand straight to the runtime, which expects a
    /// string pointer. Values that are provably plain integers are
    /// rejected; slot contents and call results are type-opaque and pass
    /// through.
    fn may_be_string(&self, value: Value) -> bool {
        match value {
            Value::Str(_) | Value::Slot(_) => true,
            Value::Const(_) => false,
            Value::Temp(temp) => matches!(
                self.function.temps[temp],
                TempSource::Call | TempSource::Load
            ),
        }
    }

    /// Pins a slot-held value into a temporary, so later stores to the
    /// slot cannot change it.
    fn materialize(&mut self, value: Value) -> Value {
        match value {
            Value::Slot(slot) => {
                let destination = self.create_temp(TempSource::Load);
                self.push_instruction(Instruction::Load { destination, slot });
                Value::Temp(destination)
            }
            other => other,
        }
    }

    fn lower_expression(
        &mut self,
        cx: &mut Lowering,
        expression: &ast::Expression,
    ) -> CompileResult<Value> {
        match &expression.kind {
            ast::ExpressionKind::IntegerLiteral(value) => Ok(Value::Const(*value)),
            ast::ExpressionKind::StringLiteral(text) => {
                Ok(Value::Str(cx.module.intern_string(text)))
            }
            ast::ExpressionKind::Variable(identifier) => self
                .scopes
                .lookup(&identifier.name)
                .map(Value::Slot)
                .ok_or_else(|| CompileError::UnknownSymbol {
                    name: identifier.name.clone(),
                }),
            ast::ExpressionKind::Unary { operator, operand } => {
                let operand = self.lower_expression(cx, operand)?;
                let value = match operator {
                    // `-x` is `0 - x`.
                    ast::UnaryOperatorKind::Negate => {
                        self.lower_binary_op(BinaryOp::Sub, Value::Const(0), operand)
                    }
                    // `!x` is `x ^ -1`.
                    ast::UnaryOperatorKind::BitwiseNot => {
                        self.lower_binary_op(BinaryOp::Xor, operand, Value::Const(-1))
                    }
                };
                Ok(value)
            }
            ast::ExpressionKind::Binary { operator, lhs, rhs } => {
                let lhs = self.lower_expression(cx, lhs)?;
                let rhs = self.lower_expression(cx, rhs)?;
                Ok(self.lower_operator(*operator, lhs, rhs))
            }
            ast::ExpressionKind::Call { callee, arguments } => {
                self.lower_call(cx, callee, arguments)
            }
            ast::ExpressionKind::Input => Ok(self.emit_call("strict_input", Vec::new(), true)),
        }
    }

    fn lower_operator(
        &mut self,
        operator: ast::BinaryOperatorKind,
        lhs: Value,
        rhs: Value,
    ) -> Value {
        use ast::BinaryOperatorKind as Op;
        match operator {
            Op::Add => self.lower_binary_op(BinaryOp::Add, lhs, rhs),
            Op::Subtract => self.lower_binary_op(BinaryOp::Sub, lhs, rhs),
            Op::Multiply => self.lower_binary_op(BinaryOp::Mul, lhs, rhs),
            Op::Divide => self.lower_binary_op(BinaryOp::SDiv, lhs, rhs),
            Op::Equals => self.lower_compare(ComparePredicate::Eq, lhs, rhs),
            Op::NotEquals => self.lower_compare(ComparePredicate::Ne, lhs, rhs),
            Op::LessThan => self.lower_compare(ComparePredicate::Lt, lhs, rhs),
            Op::LessThanOrEqualTo => self.lower_compare(ComparePredicate::Le, lhs, rhs),
            Op::GreaterThan => self.lower_compare(ComparePredicate::Gt, lhs, rhs),
            Op::GreaterThanOrEqualTo => self.lower_compare(ComparePredicate::Ge, lhs, rhs),
        }
    }

    fn lower_binary_op(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Value {
        if let (Value::Const(lhs), Value::Const(rhs)) = (lhs, rhs)
            && let Some(folded) = fold(op, lhs, rhs)
        {
            return Value::Const(folded);
        }

        let destination = self.create_temp(TempSource::Arithmetic);
        self.push_instruction(Instruction::Binary {
            op,
            destination,
            lhs,
            rhs,
        });
        Value::Temp(destination)
    }

    fn lower_compare(&mut self, predicate: ComparePredicate, lhs: Value, rhs: Value) -> Value {
        if let (Value::Const(lhs), Value::Const(rhs)) = (lhs, rhs) {
            return Value::Const(predicate.apply(lhs, rhs) as i32);
        }

        let destination = self.create_temp(TempSource::Comparison);
        self.push_instruction(Instruction::Compare {
            predicate,
            destination,
            lhs,
            rhs,
        });
        Value::Temp(destination)
    }

    fn lower_call(
        &mut self,
        cx: &mut Lowering,
        callee: &ast::Identifier,
        arguments: &[ast::Expression],
    ) -> CompileResult<Value> {
        let name = &callee.name;

        // User functions shadow builtin surface names.
        if let Some(info) = cx.function_table.get(name).copied() {
            if info.arity != arguments.len() {
                return Err(CompileError::ArityMismatch {
                    name: name.clone(),
                    expected: info.arity,
                    found: arguments.len(),
                });
            }

            let arguments = self.lower_arguments(cx, arguments)?;
            return Ok(self.emit_call(name, arguments, true));
        }

        if let Some(builtin) = builtin(name) {
            if builtin.arity != arguments.len() {
                return Err(CompileError::ArityMismatch {
                    name: name.clone(),
                    expected: builtin.arity,
                    found: arguments.len(),
                });
            }

            let arguments = self.lower_arguments(cx, arguments)?;
            return Ok(self.emit_call(builtin.symbol, arguments, builtin.has_result));
        }

        Err(CompileError::UnknownFunction { name: name.clone() })
    }

    /// Arguments evaluate strictly left to right.
    fn lower_arguments(
        &mut self,
        cx: &mut Lowering,
        arguments: &[ast::Expression],
    ) -> CompileResult<Vec<Value>> {
        arguments
            .iter()
            .map(|argument| self.lower_expression(cx, argument))
            .collect()
    }

    /// Emits a call. Result-less callees yield a zero placeholder for the
    /// rare case where such a call sits in value position.
    fn emit_call(&mut self, callee: &str, arguments: Vec<Value>, has_result: bool) -> Value {
        let destination = if has_result {
            Some(self.create_temp(TempSource::Call))
        } else {
            None
        };

        self.push_instruction(Instruction::Call {
            callee: callee.to_owned(),
            arguments,
            destination,
        });

        match destination {
            Some(destination) => Value::Temp(destination),
            None => Value::Const(0),
        }
    }
}

/// Constant-folds `op` unless it could trap at runtime: division stays an
/// instruction whenever it would divide by zero or overflow.
fn fold(op: BinaryOp, lhs: i32, rhs: i32) -> Option<i32> {
    match op {
        BinaryOp::Add => Some(lhs.wrapping_add(rhs)),
        BinaryOp::Sub => Some(lhs.wrapping_sub(rhs)),
        BinaryOp::Mul => Some(lhs.wrapping_mul(rhs)),
        BinaryOp::SDiv => lhs.checked_div(rhs),
        BinaryOp::Xor => Some(lhs ^ rhs),
    }
}
