use std::fmt;

/// Convenience result type used across shadefx.
pub type ShadefxResult<T> = Result<T, ShadefxError>;

/// Scope a symbol-table operation ran in, carried by declaration errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// Unit-level declarations.
    Global,
    /// The body frame of the named function (empty name before the prototype is declared).
    Function(String),
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global scope"),
            Self::Function(name) if name.is_empty() => f.write_str("function scope"),
            Self::Function(name) => write!(f, "scope of function `{name}`"),
        }
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ShadefxError {
    /// A variable with the same name already exists in the active scope.
    #[error("duplicate variable `{name}` in {scope}")]
    DuplicateName {
        /// Variable name.
        name: String,
        /// Scope the declaration was attempted in.
        scope: ScopeKind,
    },

    /// A function with an identical signature has already been declared.
    #[error("duplicate function `{signature}` in {scope}")]
    DuplicateFunction {
        /// Rendered signature, e.g. `float2 min(float2, float)`.
        signature: String,
        /// Scope the function set belongs to.
        scope: ScopeKind,
    },

    /// Array declarations must have a positive size (or -1 for "not an array").
    #[error("invalid array size {size} for `{name}` in {scope}")]
    InvalidArraySize {
        /// Variable name.
        name: String,
        /// Offending size.
        size: i32,
        /// Scope the declaration was attempted in.
        scope: ScopeKind,
    },

    /// Declaration or frame operation not permitted in the active scope.
    #[error("scope error for `{name}` in {scope}: {message}")]
    Scope {
        /// Symbol (or function) the operation concerned.
        name: String,
        /// Scope the operation was attempted in.
        scope: ScopeKind,
        /// What went wrong.
        message: String,
    },

    /// Type token not present in the type catalogue.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// No overload matches a call site.
    #[error("no function `{name}({args})` in {scope}")]
    UnresolvedFunction {
        /// Called name.
        name: String,
        /// Comma-separated argument types.
        args: String,
        /// Scope of the call site.
        scope: ScopeKind,
    },

    /// Identifier not visible in the active scope.
    #[error("undeclared variable `{name}` in {scope}")]
    UndeclaredVariable {
        /// Identifier.
        name: String,
        /// Scope of the reference.
        scope: ScopeKind,
    },

    /// Operand or value types do not agree.
    #[error("type mismatch in {scope}: {message}")]
    TypeMismatch {
        /// Description of the mismatch.
        message: String,
        /// Scope of the expression.
        scope: ScopeKind,
    },

    /// A transform could not be inverted.
    #[error("transform is not invertible")]
    NonInvertibleTransform,

    /// An image failed validation.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Invalid user-provided graph or buffer data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while filtering a graph for a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShadefxError {
    /// Build a [`ShadefxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShadefxError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ShadefxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`ShadefxError::InvalidImage`] value.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Return `true` for static shader-program errors (symbol table or typing).
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. }
                | Self::DuplicateFunction { .. }
                | Self::InvalidArraySize { .. }
                | Self::Scope { .. }
                | Self::UnknownType(_)
                | Self::UnresolvedFunction { .. }
                | Self::UndeclaredVariable { .. }
                | Self::TypeMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for ShadefxError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
