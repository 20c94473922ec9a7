use strum::{Display, EnumIter, EnumString};

/// Scalar type of matrix entries. The textual form is the MLIR scalar type.
///
/// This is a superset of what is accepted as an operand type, since the accumulator
/// may use a type of its own (e.g. `i8` operands accumulating into `i32`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ElemType {
    /// Not set.
    #[default]
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "i8")]
    I8,
    #[strum(serialize = "i32")]
    I32,
    #[strum(serialize = "f32")]
    F32,
    #[strum(serialize = "f16")]
    F16,
    #[strum(serialize = "bf16")]
    BF16,
}

impl ElemType {
    pub fn is_float(&self) -> bool {
        matches!(self, ElemType::F32 | ElemType::F16 | ElemType::BF16)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ElemType::None)
    }

    /// The literal used to zero-initialize a buffer of this type.
    pub fn zero_literal(&self) -> &'static str {
        if self.is_float() { "0.0" } else { "0" }
    }
}
