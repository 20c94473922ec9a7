use core::{fmt::Display, str::FromStr};

use derive_new::new;
use strum::IntoEnumIterator;

use crate::{
    ConfigError, GenerateError, UnsupportedError,
    components::{Dynamicity, TestShape},
};

/// Per-testcase generation options, each a comma separated list such as `4,6,8`.
///
/// Lists of length 1 are broadcast to the length of the others.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct TestShapeArgs {
    /// Rows of the lhs and the accumulator.
    pub m: String,
    /// Columns of the rhs and the accumulator.
    pub n: String,
    /// Columns of the lhs and rows of the rhs.
    pub k: String,
    pub accumulate: String,
    pub dynamicity: String,
}

impl TestShapeArgs {
    /// Expands the options into one [TestShape] per testcase.
    pub fn test_shapes(&self) -> Result<Vec<TestShape>, GenerateError> {
        let m = parse_dims("m", &self.m)?;
        let n = parse_dims("n", &self.n)?;
        let k = parse_dims("k", &self.k)?;
        let dynamicity = self
            .dynamicity
            .split(',')
            .map(|value| parse_option::<Dynamicity>("dynamicity", value))
            .collect::<Result<Vec<_>, _>>()?;
        let accumulate: Vec<bool> = self.accumulate.split(',').map(parse_bool).collect();

        if accumulate.iter().any(|accumulate| *accumulate) {
            return Err(UnsupportedError::Accumulate.into());
        }

        let sizes = [m.len(), n.len(), k.len(), dynamicity.len(), accumulate.len()];
        let max_size = sizes.iter().copied().max().unwrap_or(1);
        if !sizes.iter().all(|size| *size == 1 || *size == max_size) {
            return Err(ConfigError::LengthMismatch {
                m: m.len(),
                n: n.len(),
                k: k.len(),
                dynamicity: dynamicity.len(),
                accumulate: accumulate.len(),
            }
            .into());
        }

        if dynamicity.contains(&Dynamicity::Mixed) {
            return Err(UnsupportedError::MixedDynamicity.into());
        }

        let shapes = (0..max_size)
            .map(|i| {
                TestShape::new(
                    broadcast(&m, i),
                    broadcast(&k, i),
                    broadcast(&n, i),
                    broadcast(&accumulate, i),
                    broadcast(&dynamicity, i),
                )
            })
            .collect();

        Ok(shapes)
    }
}

/// Parses one of the tags of an option, e.g. an element type.
pub fn parse_option<T>(option: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + IntoEnumIterator + Display,
{
    T::from_str(value).map_err(|_| ConfigError::UnknownValue {
        option,
        value: value.to_string(),
        expected: T::iter()
            .map(|tag| tag.to_string())
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Anything but `false`, `0` or an empty value is true.
pub fn parse_bool(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "false" | "0" | "")
}

fn parse_dims(dim: &'static str, values: &str) -> Result<Vec<u32>, ConfigError> {
    values
        .split(',')
        .map(|value| match value.trim().parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(ConfigError::InvalidDimension {
                dim,
                value: value.to_string(),
            }),
        })
        .collect()
}

fn broadcast<T: Copy>(values: &[T], index: usize) -> T {
    match values.len() {
        1 => values[0],
        _ => values[index],
    }
}
