/// Lexical formatting of numbers, booleans, and durations.
pub mod format;
/// Namespace-bound query helpers over a response tree.
pub mod node;
/// Owned element tree built from a response document.
pub mod tree;
/// Request fragment writer using the `blk:` prefix.
pub mod writer;
