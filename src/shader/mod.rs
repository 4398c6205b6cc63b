//! Shader-language front end: types, symbols, the builtin catalogue and the unit compiler.

/// Parsed compilation units.
pub mod ast;
/// Builtin variables and function overloads.
pub mod catalogue;
/// Compilation-unit walker.
pub mod compile;
/// Variables, functions and their modifiers.
pub mod symbols;
/// Scoped symbol table.
pub mod table;
/// Scalar, vector and sampler types.
pub mod types;
