use std::fmt;
use std::hash::{Hash, Hasher};

use crate::shader::types::{Type, join_types};

/// Declaration modifier constraining where and how a variable may be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    /// Read-only value.
    Const,
    /// Externally bound parameter; receives a register.
    Param,
}

/// Precision hint carried through to backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Low precision.
    Lowp,
    /// Medium precision.
    Mediump,
    /// High precision.
    Highp,
}

/// Compile-time constant attached to a `const` declaration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstValue {
    /// Float scalar.
    Float(f64),
    /// Integer scalar.
    Int(i64),
    /// Boolean scalar.
    Bool(bool),
}

/// A declared variable.
///
/// Immutable once declared, apart from the use counter that records whether the variable has
/// been referenced at least once.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    name: String,
    ty: Type,
    qualifier: Option<Qualifier>,
    precision: Option<Precision>,
    reg: i32,
    array_size: i32,
    const_value: Option<ConstValue>,
    is_param: bool,
    ref_count: u32,
}

impl Variable {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: impl Into<String>,
        ty: Type,
        qualifier: Option<Qualifier>,
        precision: Option<Precision>,
        reg: i32,
        array_size: i32,
        const_value: Option<ConstValue>,
        is_param: bool,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            qualifier,
            precision,
            reg,
            array_size,
            const_value,
            is_param,
            ref_count: 0,
        }
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Qualifier, if any.
    pub fn qualifier(&self) -> Option<Qualifier> {
        self.qualifier
    }

    /// Precision hint, if any.
    pub fn precision(&self) -> Option<Precision> {
        self.precision
    }

    /// Storage register for params and samplers, `-1` otherwise.
    pub fn reg(&self) -> i32 {
        self.reg
    }

    /// Array length, `-1` when the variable is not an array.
    pub fn array_size(&self) -> i32 {
        self.array_size
    }

    /// `true` when declared with an array size.
    pub fn is_array(&self) -> bool {
        self.array_size > 0
    }

    /// Constant initializer, if any.
    pub fn const_value(&self) -> Option<&ConstValue> {
        self.const_value.as_ref()
    }

    /// `true` for function parameters.
    pub fn is_param(&self) -> bool {
        self.is_param
    }

    /// `true` once the variable has been referenced.
    pub fn is_referenced(&self) -> bool {
        self.ref_count > 0
    }

    /// Number of recorded references.
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub(crate) fn mark_used(&mut self) {
        self.ref_count = self.ref_count.saturating_add(1);
    }
}

/// A named, typed function parameter.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Param {
    /// Build a parameter.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A declared function signature.
///
/// Equality and hashing use the name, return type, and parameter types in order; parameter
/// names are ignored.
#[derive(Clone, Debug)]
pub struct Function {
    name: String,
    return_type: Type,
    params: Vec<Param>,
}

impl Function {
    /// Build a function descriptor.
    pub fn new(name: impl Into<String>, return_type: Type, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            return_type,
            params,
        }
    }

    /// Function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return type.
    pub fn return_type(&self) -> Type {
        self.return_type
    }

    /// Ordered parameters.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Parameter types in order.
    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// `true` when name and positional parameter types match (return type ignored).
    pub fn matches(&self, name: &str, param_types: &[Type]) -> bool {
        self.name == name
            && self.params.len() == param_types.len()
            && self
                .params
                .iter()
                .zip(param_types)
                .all(|(p, ty)| p.ty == *ty)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.return_type == other.return_type && self.matches(&other.name, &other.param_types())
    }
}

impl Eq for Function {}

impl Hash for Function {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.return_type.hash(state);
        for p in &self.params {
            p.ty.hash(state);
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}({})",
            self.return_type,
            self.name,
            join_types(&self.param_types())
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/symbols.rs"]
mod tests;
