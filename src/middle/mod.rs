//! The middle of the compiler turns the parsed syntax tree into a
//! block-structured IR. Names are resolved against a lexical scope chain
//! here, constant expressions are folded, and structured control flow is
//! flattened into labeled basic blocks ending in a single terminator.

pub mod ir;
pub mod scope;
