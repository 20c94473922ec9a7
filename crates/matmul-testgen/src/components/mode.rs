use strum::{Display, EnumIter, EnumString};

/// How the tensor types of a testcase are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Dynamicity {
    /// Use `?` everywhere, e.g. `tensor<?x?xf32>`.
    Dynamic,
    /// Use fixed values everywhere, e.g. `tensor<4x6xf32>`.
    Static,
    /// Mix `?` and values, e.g. `tensor<?x4xf32>`.
    Mixed,
}

/// How the contents of a matrix buffer are initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum FillStrategy {
    /// Fill with zeros.
    Zero,
    /// Fill with deterministic pseudorandom values.
    Random,
}
