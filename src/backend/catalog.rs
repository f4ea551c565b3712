//! The fixed operation catalog shared by the translator and the emitter.
//!
//! Each operation owns a stable one-byte code and a mnemonic. Streams are
//! keyed by the code column, so renaming a mnemonic can never silently
//! change what the emitter produces for existing streams. The code space
//! reserves room for up to [`CATALOG_CAPACITY`] operations.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;

/// Upper bound on distinct operation codes the stream format reserves.
pub const CATALOG_CAPACITY: usize = 144;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Opcode {
    Alloca,
    Load,
    Store,
    Icmp,
    Add,
    Sub,
    Mul,
    SDiv,
    Call,
    Br,
    Ret,
}

impl Opcode {
    /// The stable stream code. Codes follow the historical numbering and
    /// are never reused, so the sequence has gaps.
    pub const fn code(self) -> u8 {
        match self {
            Opcode::Alloca => 0x01,
            Opcode::Load => 0x02,
            Opcode::Store => 0x03,
            Opcode::Icmp => 0x15,
            Opcode::Add => 0x17,
            Opcode::Sub => 0x18,
            Opcode::Mul => 0x19,
            Opcode::SDiv => 0x1B,
            Opcode::Call => 0x2B,
            Opcode::Br => 0x30,
            Opcode::Ret => 0x33,
        }
    }

    /// The x86-64 template the emitter pastes for this operation.
    pub const fn assembly(self) -> &'static str {
        match self {
            Opcode::Alloca => "sub rsp, 8",
            Opcode::Load => "mov rax, [rbx]",
            Opcode::Store => "mov [rax], rbx",
            Opcode::Icmp => "cmp rax, rbx",
            Opcode::Add => "add rax, rbx",
            Opcode::Sub => "sub rax, rbx",
            Opcode::Mul => "imul rax, rbx",
            Opcode::SDiv => "idiv rbx",
            Opcode::Call => "call",
            Opcode::Br => "jmp",
            Opcode::Ret => "ret",
        }
    }

    /// Renders the `code mnemonic` pair that opens a stream line.
    pub fn stream_line(self) -> String {
        format!("{:02X} {}", self.code(), self)
    }
}

/// The lookup table handed to one pipeline invocation. Built fresh per
/// run so no invocation can observe another's state.
#[derive(Debug)]
pub struct OpcodeCatalog {
    by_code: BTreeMap<u8, Opcode>,
}

impl OpcodeCatalog {
    pub fn new() -> Self {
        let mut by_code = BTreeMap::new();

        for opcode in Opcode::iter() {
            let previous = by_code.insert(opcode.code(), opcode);
            assert!(
                previous.is_none(),
                "operation code {:#04X} is assigned twice",
                opcode.code()
            );
        }

        assert!(by_code.len() <= CATALOG_CAPACITY);

        Self { by_code }
    }

    pub fn lookup(&self, code: u8) -> Option<Opcode> {
        self.by_code.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for OpcodeCatalog {
    fn default() -> Self {
        Self::new()
    }
}
