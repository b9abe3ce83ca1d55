//! Instruction grammar.
//!
//! ```text
//! component(param,param)@viewport/child+sibling
//! -            clear every viewport
//! -+a@main     clear, then load a into main
//! a/(b+c)      b and c both go into a's scope
//! ```
//!
//! Parsing and stringifying are pure; the resolver never touches the
//! viewport tree.

pub mod query;
pub mod resolver;
pub mod viewport_instruction;

pub use query::{parse_query, split_query, ParsedQuery};
pub use resolver::InstructionResolver;
pub use viewport_instruction::ViewportInstruction;
