//! The two back ends of the pipeline: the stream translator that
//! serializes a lowered module against the opcode catalog, and the
//! assembly emitter that turns a stream back into NASM source for a
//! concrete target.

pub mod catalog;
pub mod emitter;
pub mod targets;
pub mod translator;
