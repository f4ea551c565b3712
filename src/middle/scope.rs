use hashbrown::HashMap;

use crate::{
    error::{CompileError, CompileResult},
    middle::ir::SlotId,
};

/// Lexical name environment for a single function body.
///
/// Each frame corresponds to one block construct (an `If` arm, a loop body,
/// a `Case` body), plus one outermost frame for the function itself that
/// holds the parameters. Bindings in an inner frame shadow same-named
/// bindings in outer frames and expire when the frame is popped.
#[derive(Debug)]
pub struct ScopeChain {
    frames: Vec<HashMap<String, SlotId>>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn enter_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn exit_frame(&mut self) {
        assert!(self.frames.len() > 1, "cannot exit the function frame");
        self.frames.pop();
    }

    /// Binds `name` in the innermost frame. Declaring a name twice in the
    /// same frame is an error; shadowing an outer frame is not.
    pub fn declare(&mut self, name: &str, slot: SlotId) -> CompileResult<()> {
        if self.is_bound_in_current_frame(name) {
            return Err(CompileError::Redeclaration {
                name: name.to_owned(),
            });
        }

        self.frames
            .last_mut()
            .expect("scope chain always has a frame")
            .insert(name.to_owned(), slot);

        Ok(())
    }

    /// Resolves `name` against the innermost frame that binds it.
    pub fn lookup(&self, name: &str) -> Option<SlotId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    pub fn is_bound_in_current_frame(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.contains_key(name))
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}
