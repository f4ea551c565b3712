//! Block-structured intermediate representation.
//!
//! The syntax tree is lowered into a [`Module`] of [`Function`]s, each a
//! graph of labeled [`Block`]s. A block holds straight-line instructions
//! and ends in exactly one [`Terminator`]; that invariant is carried by the
//! representation itself, since the terminator is a dedicated field rather
//! than an instruction in the list. Storage is modeled as named mutable
//! [`Slot`]s instead of SSA values: the language permits a slot to be
//! written more than once (loop counters, declarations re-executed inside a
//! loop body), so operands reference slots and single-assignment
//! temporaries side by side.

use crate::index::{Index, IndexVec, simple_index};

pub mod ast_lowering;
#[cfg(test)]
pub mod interp;
pub mod pretty_print;

simple_index! {
    /// Identifies a [`Slot`] within its owning [`Function`].
    pub struct SlotId;
}

simple_index! {
    /// Identifies a single-assignment temporary within its owning
    /// [`Function`].
    pub struct TempId;
}

simple_index! {
    /// Identifies a [`Block`] within its owning [`Function`].
    pub struct BlockId;
}

simple_index! {
    /// Identifies an entry in the module-wide string constant pool.
    pub struct StringId;
}

impl StringId {
    /// Stable label under which the constant appears in serialized
    /// artifacts.
    pub fn label(self) -> String {
        format!("str{}", self.index())
    }
}

/// Everything produced for one compilation unit. Owned by a single pipeline
/// invocation and discarded once assembly has been written; nothing in here
/// is shared across compilations.
#[derive(Debug, Default)]
pub struct Module {
    pub functions: Vec<Function>,
    pub strings: IndexVec<StringId, String>,
    pub classes: Vec<ClassStub>,
}

impl Module {
    /// Adds `value` to the string pool, reusing the existing entry if the
    /// same text was interned before.
    pub fn intern_string(&mut self, value: &str) -> StringId {
        let existing = self
            .strings
            .enumerate()
            .find_map(|(id, text)| (text.as_str() == value).then_some(id));

        match existing {
            Some(id) => id,
            None => self.strings.push(value.to_owned()),
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Asserts the structural invariants the later stages rely on. A
    /// violation here is a compiler bug, never a user error.
    pub fn verify(&self) {
        for function in &self.functions {
            assert!(
                !function.blocks.is_empty(),
                "function `{}` has no entry block",
                function.name
            );

            for parameter in &function.parameters {
                assert!(
                    parameter.index() < function.slots.len(),
                    "function `{}` binds a parameter to a missing slot",
                    function.name
                );
            }

            for block in function.blocks.iter() {
                let Some(terminator) = &block.terminator else {
                    panic!(
                        "block `{}` in function `{}` has no terminator",
                        block.label, function.name
                    );
                };

                let check_target = |target: BlockId| {
                    assert!(
                        target.index() < function.blocks.len(),
                        "block `{}` in function `{}` transfers to a missing block",
                        block.label,
                        function.name
                    );
                };

                match terminator {
                    Terminator::Jump { target } => check_target(*target),
                    Terminator::Branch {
                        positive, negative, ..
                    } => {
                        check_target(*positive);
                        check_target(*negative);
                    }
                    Terminator::Return { .. } => {}
                }
            }
        }
    }
}

/// A single lowered function. Parameters are slots pre-bound by the calling
/// convention, so the body never stores into them on entry; execution
/// begins at the first block.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<SlotId>,
    pub slots: IndexVec<SlotId, Slot>,
    pub temps: IndexVec<TempId, TempSource>,
    pub blocks: IndexVec<BlockId, Block>,
}

impl Function {
    pub fn entry(&self) -> &Block {
        &self.blocks[BlockId::ZERO]
    }

    pub fn slot_name(&self, slot: SlotId) -> &str {
        &self.slots[slot].name
    }
}

/// A named, mutable storage cell. Slots are lexically scoped while the
/// lowering runs; the finished IR keeps a flat per-function list, so two
/// distinct slots may well carry the same source name.
#[derive(Debug)]
pub struct Slot {
    pub name: String,
}

/// A class declaration, recorded as a named placeholder only. No layout or
/// dispatch is lowered for it.
#[derive(Debug)]
pub struct ClassStub {
    pub name: String,
    pub base: Option<String>,
}

/// What produced a temporary. Recorded so contract checks can tell values
/// that may legally carry a string (call results, slot reads) apart from
/// values that are always plain integers (arithmetic, comparisons).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempSource {
    Arithmetic,
    Comparison,
    Call,
    Load,
}

/// A straight-line run of instructions ending in one control transfer.
#[derive(Debug)]
pub struct Block {
    pub label: String,
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

impl Block {
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

/// An instruction operand. `Slot` operands denote the slot's contents at
/// the moment the instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Const(i32),
    Str(StringId),
    Slot(SlotId),
    Temp(TempId),
}

#[derive(Debug)]
pub enum Instruction {
    Binary {
        op: BinaryOp,
        destination: TempId,
        lhs: Value,
        rhs: Value,
    },
    Compare {
        predicate: ComparePredicate,
        destination: TempId,
        lhs: Value,
        rhs: Value,
    },
    Call {
        callee: String,
        arguments: Vec<Value>,
        destination: Option<TempId>,
    },
    /// Reserves storage for `slot`.
    Alloc { slot: SlotId },
    /// Reads the current contents of `slot` into a temporary.
    Load { destination: TempId, slot: SlotId },
    /// Writes `value` into `slot`.
    Store { slot: SlotId, value: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    Xor,
}

impl BinaryOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::Xor => "xor",
        }
    }
}

/// Signed comparison predicates, named after the usual IR spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparePredicate {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparePredicate {
    pub fn name(self) -> &'static str {
        match self {
            ComparePredicate::Eq => "eq",
            ComparePredicate::Ne => "ne",
            ComparePredicate::Lt => "slt",
            ComparePredicate::Le => "sle",
            ComparePredicate::Gt => "sgt",
            ComparePredicate::Ge => "sge",
        }
    }

    /// Evaluates the predicate over two known integers.
    pub fn apply(self, lhs: i32, rhs: i32) -> bool {
        match self {
            ComparePredicate::Eq => lhs == rhs,
            ComparePredicate::Ne => lhs != rhs,
            ComparePredicate::Lt => lhs < rhs,
            ComparePredicate::Le => lhs <= rhs,
            ComparePredicate::Gt => lhs > rhs,
            ComparePredicate::Ge => lhs >= rhs,
        }
    }
}

/// The single control transfer ending a block. `Branch` takes `positive`
/// when the condition is nonzero.
#[derive(Debug)]
pub enum Terminator {
    Jump {
        target: BlockId,
    },
    Branch {
        condition: Value,
        positive: BlockId,
        negative: BlockId,
    },
    Return {
        value: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function_returning_zero() -> Function {
        let mut blocks = IndexVec::new();
        blocks.push(Block {
            label: "entry".to_owned(),
            instructions: Vec::new(),
            terminator: Some(Terminator::Return {
                value: Value::Const(0),
            }),
        });

        Function {
            name: "f".to_owned(),
            parameters: Vec::new(),
            slots: IndexVec::new(),
            temps: IndexVec::new(),
            blocks,
        }
    }

    #[test]
    fn test_intern_string_reuses_identical_text() {
        let mut module = Module::default();
        let a = module.intern_string("hello");
        let b = module.intern_string("world");
        let c = module.intern_string("hello");

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(module.strings.len(), 2);
        assert_eq!(a.label(), "str0");
        assert_eq!(b.label(), "str1");
    }

    #[test]
    fn test_verify_accepts_terminated_blocks() {
        let module = Module {
            functions: vec![function_returning_zero()],
            ..Module::default()
        };

        module.verify();
    }

    #[test]
    #[should_panic(expected = "no terminator")]
    fn test_verify_rejects_unterminated_block() {
        let mut function = function_returning_zero();
        function.blocks[BlockId::ZERO].terminator = None;

        let module = Module {
            functions: vec![function],
            ..Module::default()
        };

        module.verify();
    }

    #[test]
    #[should_panic(expected = "missing block")]
    fn test_verify_rejects_dangling_jump() {
        let mut function = function_returning_zero();
        function.blocks[BlockId::ZERO].terminator = Some(Terminator::Jump {
            target: BlockId::new(7),
        });

        let module = Module {
            functions: vec![function],
            ..Module::default()
        };

        module.verify();
    }
}
