use std::fmt;
use std::str::FromStr;

use crate::foundation::error::ShadefxError;

/// Scalar classification of a [`Type`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// No value.
    Void,
    /// 32-bit float lanes.
    Float,
    /// Integer lanes.
    Int,
    /// Boolean lanes.
    Bool,
    /// Texture sampler handle.
    Sampler,
}

/// The fixed catalogue of shader value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// `void`
    Void,
    /// `float`
    Float,
    /// `float2`
    Float2,
    /// `float3`
    Float3,
    /// `float4`
    Float4,
    /// `int`
    Int,
    /// `int2`
    Int2,
    /// `int3`
    Int3,
    /// `int4`
    Int4,
    /// `bool`
    Bool,
    /// `bool2`
    Bool2,
    /// `bool3`
    Bool3,
    /// `bool4`
    Bool4,
    /// `sampler` (linear filtering)
    Sampler,
    /// `lsampler` (lookup sampler)
    LSampler,
    /// `fsampler` (float data sampler)
    FSampler,
}

impl Type {
    /// Every type, in catalogue order.
    pub const ALL: [Type; 16] = [
        Type::Void,
        Type::Float,
        Type::Float2,
        Type::Float3,
        Type::Float4,
        Type::Int,
        Type::Int2,
        Type::Int3,
        Type::Int4,
        Type::Bool,
        Type::Bool2,
        Type::Bool3,
        Type::Bool4,
        Type::Sampler,
        Type::LSampler,
        Type::FSampler,
    ];

    /// Scalar classification.
    pub fn base_type(self) -> BaseType {
        match self {
            Type::Void => BaseType::Void,
            Type::Float | Type::Float2 | Type::Float3 | Type::Float4 => BaseType::Float,
            Type::Int | Type::Int2 | Type::Int3 | Type::Int4 => BaseType::Int,
            Type::Bool | Type::Bool2 | Type::Bool3 | Type::Bool4 => BaseType::Bool,
            Type::Sampler | Type::LSampler | Type::FSampler => BaseType::Sampler,
        }
    }

    /// Number of lanes: 1 for scalars and samplers, 2–4 for vectors.
    pub fn field_count(self) -> usize {
        match self {
            Type::Float2 | Type::Int2 | Type::Bool2 => 2,
            Type::Float3 | Type::Int3 | Type::Bool3 => 3,
            Type::Float4 | Type::Int4 | Type::Bool4 => 4,
            _ => 1,
        }
    }

    /// `true` for 2–4 lane types.
    pub fn is_vector(self) -> bool {
        self.field_count() > 1
    }

    /// The `width`-lane type over `base`, if the catalogue has one.
    pub fn vector(base: BaseType, width: usize) -> Option<Type> {
        let ty = match (base, width) {
            (BaseType::Float, 1) => Type::Float,
            (BaseType::Float, 2) => Type::Float2,
            (BaseType::Float, 3) => Type::Float3,
            (BaseType::Float, 4) => Type::Float4,
            (BaseType::Int, 1) => Type::Int,
            (BaseType::Int, 2) => Type::Int2,
            (BaseType::Int, 3) => Type::Int3,
            (BaseType::Int, 4) => Type::Int4,
            (BaseType::Bool, 1) => Type::Bool,
            (BaseType::Bool, 2) => Type::Bool2,
            (BaseType::Bool, 3) => Type::Bool3,
            (BaseType::Bool, 4) => Type::Bool4,
            _ => return None,
        };
        Some(ty)
    }

    /// The source token for this type.
    pub fn token(self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Float => "float",
            Type::Float2 => "float2",
            Type::Float3 => "float3",
            Type::Float4 => "float4",
            Type::Int => "int",
            Type::Int2 => "int2",
            Type::Int3 => "int3",
            Type::Int4 => "int4",
            Type::Bool => "bool",
            Type::Bool2 => "bool2",
            Type::Bool3 => "bool3",
            Type::Bool4 => "bool4",
            Type::Sampler => "sampler",
            Type::LSampler => "lsampler",
            Type::FSampler => "fsampler",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Type {
    type Err = ShadefxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Type::ALL
            .into_iter()
            .find(|t| t.token() == s)
            .ok_or_else(|| ShadefxError::UnknownType(s.to_owned()))
    }
}

/// Join type tokens with `", "` for signatures and diagnostics.
pub(crate) fn join_types(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.token())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "../../tests/unit/shader/types.rs"]
mod tests;
