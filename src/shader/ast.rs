//! Already-parsed compilation unit consumed by [`crate::compile_unit`].
//!
//! The tree deserializes from JSON (`{"decls": [{"kind": "function", ...}]}`) so front ends in
//! other processes can hand over units without linking a parser.

use crate::foundation::error::ShadefxResult;
use crate::shader::symbols::{Param, Precision, Qualifier};
use crate::shader::types::Type;

fn not_an_array() -> i32 {
    -1
}

/// A compilation unit: top-level declarations in source order.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Unit {
    /// Declarations in source order.
    pub decls: Vec<Decl>,
}

impl Unit {
    /// Parse a unit from its JSON form.
    pub fn from_json(src: &str) -> ShadefxResult<Self> {
        Ok(serde_json::from_str(src)?)
    }
}

/// Top-level declaration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decl {
    /// Global variable.
    Variable(VarDecl),
    /// Function definition.
    Function(FuncDecl),
}

/// Variable declaration (global or local).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VarDecl {
    /// Declared name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: Type,
    /// Optional qualifier.
    #[serde(default)]
    pub qualifier: Option<Qualifier>,
    /// Optional precision hint.
    #[serde(default)]
    pub precision: Option<Precision>,
    /// Array length, `-1` for scalars and vectors.
    #[serde(default = "not_an_array")]
    pub array_size: i32,
    /// Optional initializer.
    #[serde(default)]
    pub init: Option<Expr>,
}

impl VarDecl {
    /// Non-array, unqualified declaration.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            qualifier: None,
            precision: None,
            array_size: -1,
            init: None,
        }
    }

    /// Set the qualifier.
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    /// Set the array size.
    pub fn with_array_size(mut self, array_size: i32) -> Self {
        self.array_size = array_size;
        self
    }

    /// Set the initializer.
    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

/// Function definition.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FuncDecl {
    /// Function name.
    pub name: String,
    /// Return type.
    pub return_type: Type,
    /// Ordered parameters.
    #[serde(default)]
    pub params: Vec<Param>,
    /// Body statements.
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// Statement inside a function body.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    /// Local declaration.
    Variable(VarDecl),
    /// Assignment to a named variable.
    Assign {
        /// Assigned variable.
        target: String,
        /// Assigned value.
        value: Expr,
    },
    /// Expression evaluated for its effect.
    Expr {
        /// The expression.
        expr: Expr,
    },
    /// Return from the function.
    Return {
        /// Returned value (`None` for `void`).
        #[serde(default)]
        value: Option<Expr>,
    },
}

/// Literal value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Literal {
    /// Float literal.
    Float(f64),
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&&`
    And,
    /// `||`
    Or,
}

/// Expression tree.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Literal value.
    Literal {
        /// The literal.
        value: Literal,
    },
    /// Variable reference.
    Ident {
        /// Referenced name.
        name: String,
    },
    /// Function call resolved by overload.
    Call {
        /// Called name.
        name: String,
        /// Arguments in order.
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// Vector/scalar constructor, e.g. `float4(rgb, 1.0)`.
    Construct {
        /// Constructed type.
        #[serde(rename = "type")]
        ty: Type,
        /// Arguments in order.
        args: Vec<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Swizzle / component selection such as `.xy` or `.rgb`.
    Field {
        /// Selected expression.
        base: Box<Expr>,
        /// Component letters.
        selector: String,
    },
}

impl Expr {
    /// Float literal.
    pub fn float(v: f64) -> Self {
        Self::Literal {
            value: Literal::Float(v),
        }
    }

    /// Integer literal.
    pub fn int(v: i64) -> Self {
        Self::Literal {
            value: Literal::Int(v),
        }
    }

    /// Boolean literal.
    pub fn bool(v: bool) -> Self {
        Self::Literal {
            value: Literal::Bool(v),
        }
    }

    /// Variable reference.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident { name: name.into() }
    }

    /// Function call.
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// Constructor.
    pub fn construct(ty: Type, args: Vec<Expr>) -> Self {
        Self::Construct { ty, args }
    }

    /// Binary operation.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Component selection.
    pub fn field(base: Expr, selector: impl Into<String>) -> Self {
        Self::Field {
            base: Box::new(base),
            selector: selector.into(),
        }
    }
}
