mod output;

#[macro_use]
extern crate log;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use matmul_testgen::{
    GenerationRequest, Generator, TestShapeArgs,
    components::{CompilationInfoId, ElemType},
    config::{GenerationLogger, GeneratorConfig},
    parse_option,
    synthesis::MatmulTypes,
};

/// Generates the MLIR modules of an end-to-end matmul test.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path of the generated module defining the matmul functions.
    #[arg(long = "output_matmuls_mlir")]
    output_matmuls_mlir: PathBuf,

    /// Path of the generated module calling the matmul functions.
    #[arg(long = "output_calls_mlir")]
    output_calls_mlir: PathBuf,

    /// Numeric type of the lhs and rhs.
    #[arg(long = "lhs_rhs_type")]
    lhs_rhs_type: String,

    /// Numeric type of the accumulator and result. Defaults to the lhs and rhs type.
    #[arg(long = "acc_type", default_value = "")]
    acc_type: String,

    /// Comma separated rows of the lhs and the result, e.g. `4,8,16`.
    #[arg(long)]
    m: String,

    /// Comma separated columns of the rhs and the result.
    #[arg(long)]
    n: String,

    /// Comma separated columns of the lhs and rows of the rhs.
    #[arg(long)]
    k: String,

    /// Comma separated booleans, whether the matmul accumulates into an existing result.
    #[arg(long, default_value = "false")]
    accumulate: String,

    /// Comma separated `static`, `dynamic` or `mixed` shapes.
    #[arg(long, default_value = "static")]
    dynamicity: String,

    /// Whether the rhs is transposed, i.e. uses `linalg.matmul_transpose_b`. A bare flag is true.
    #[arg(
        long = "transpose_rhs",
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    transpose_rhs: String,

    /// Compilation info attached to the generated matmuls, if any.
    #[arg(long = "compilation_info", default_value = "")]
    compilation_info: String,

    /// Comma separated target features the tests require, e.g. `+avx512f`.
    #[arg(long)]
    requirements: Option<String>,

    /// Configuration file, instead of looking up `matmul-testgen.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn request(&self) -> anyhow::Result<GenerationRequest> {
        let types = MatmulTypes::new(
            parse_option::<ElemType>("lhs_rhs_type", &self.lhs_rhs_type)?,
            parse_option::<ElemType>("acc_type", &self.acc_type)?,
        );
        let shapes = TestShapeArgs::new(
            self.m.clone(),
            self.n.clone(),
            self.k.clone(),
            self.accumulate.clone(),
            self.dynamicity.clone(),
        )
        .test_shapes()?;
        let compilation_info =
            parse_option::<CompilationInfoId>("compilation_info", &self.compilation_info)?;

        Ok(GenerationRequest::new(
            types,
            shapes,
            matmul_testgen::parse_bool(&self.transpose_rhs),
            compilation_info,
        ))
    }

    fn generator_config(&self) -> anyhow::Result<GeneratorConfig> {
        let config = match &self.config {
            Some(path) => GeneratorConfig::from_file_path(path)?.override_from_env(),
            None => GeneratorConfig::load()?,
        };

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.generator_config()?;
    let logger = GenerationLogger::new(&config.logger).context("Unable to open the log file")?;
    let request = args.request()?;

    let mut generator = Generator::new(logger);
    let modules = generator.generate(&request)?;

    let matmuls = modules.matmuls_module().to_string();
    let calls = modules
        .calls_module(args.requirements.as_deref())
        .to_string();

    output::write_all(&[
        (args.output_matmuls_mlir.as_path(), matmuls.as_str()),
        (args.output_calls_mlir.as_path(), calls.as_str()),
    ])?;

    info!(
        "Wrote {} and {}",
        args.output_matmuls_mlir.display(),
        args.output_calls_mlir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use matmul_testgen::{ConfigError, GenerateError};

    fn parse(n: &str, extra: &[&str]) -> Args {
        let mut argv = vec![
            "matmul-testgen",
            "--output_matmuls_mlir",
            "matmuls.mlir",
            "--output_calls_mlir",
            "calls.mlir",
            "--m",
            "4,8",
            "--n",
            n,
            "--k",
            "4,8",
        ];
        argv.extend_from_slice(extra);

        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn request_from_flags() {
        let args = parse("4", &[
            "--lhs_rhs_type",
            "i8",
            "--acc_type",
            "i32",
            "--transpose_rhs",
            "true",
            "--compilation_info",
            "AMDAIEPadBasedPassPipeline",
        ]);

        let request = args.request().unwrap();

        assert_eq!(request.types, MatmulTypes::new(ElemType::I8, ElemType::I32));
        assert_eq!(request.shapes.len(), 2);
        assert!(request.transpose_rhs);
        assert_eq!(
            request.compilation_info,
            CompilationInfoId::AMDAIEPadBasedPassPipeline
        );
    }

    #[test]
    fn bare_transpose_flag() {
        let args = parse("4", &["--lhs_rhs_type", "f32", "--transpose_rhs"]);

        assert!(args.request().unwrap().transpose_rhs);

        let args = parse("4", &["--transpose_rhs", "--lhs_rhs_type", "f32"]);

        assert!(args.request().unwrap().transpose_rhs);
    }

    #[test]
    fn optional_flags_default_to_none() {
        let args = parse("4", &["--lhs_rhs_type", "f32"]);

        let request = args.request().unwrap();

        assert_eq!(request.types, MatmulTypes::new(ElemType::F32, ElemType::None));
        assert!(!request.transpose_rhs);
        assert_eq!(request.compilation_info, CompilationInfoId::None);
        assert_eq!(args.requirements, None);
    }

    #[test]
    fn unknown_type_is_reported() {
        let args = parse("4", &["--lhs_rhs_type", "f64"]);

        let err = args.request().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownValue { option: "lhs_rhs_type", .. })
        ));
    }

    #[test]
    fn shape_errors_are_reported() {
        let args = parse("4,8,16", &["--lhs_rhs_type", "f32"]);

        let err = args.request().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GenerateError>(),
            Some(GenerateError::Config(ConfigError::LengthMismatch { .. }))
        ));
    }
}
