use core::fmt::Display;

use crate::{
    TestModules,
    synthesis::{CHECK_MATMUL_RESULTS_DECLARATION, GENERATE_RANDOM_MATRIX_DECLARATION},
};

/// Source of the module defining every generated function.
#[derive(Debug, Clone, Copy)]
pub struct MatmulsModule<'a> {
    modules: &'a TestModules,
}

/// Source of the module calling the generated functions and checking their results.
#[derive(Debug, Clone, Copy)]
pub struct CallsModule<'a> {
    modules: &'a TestModules,
    requirements: Option<&'a str>,
}

impl TestModules {
    pub fn matmuls_module(&self) -> MatmulsModule<'_> {
        MatmulsModule { modules: self }
    }

    /// `requirements` are comma separated target features, as in
    /// `-iree-llvmcpu-target-cpu-features`. The test tool skips the module on targets
    /// missing any of them.
    pub fn calls_module<'a>(&'a self, requirements: Option<&'a str>) -> CallsModule<'a> {
        CallsModule {
            modules: self,
            requirements: requirements.filter(|requirements| !requirements.is_empty()),
        }
    }
}

impl Display for MatmulsModule<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for function in self.modules.functions.iter() {
            writeln!(f, "{}", function.definition)?;
        }

        Ok(())
    }
}

impl Display for CallsModule<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Module-level reflection information used to control the test tool.
        match self.requirements {
            Some(requirements) => {
                let features: Vec<&str> = requirements
                    .split(',')
                    .map(|feature| feature.trim().trim_start_matches('+'))
                    .collect();
                writeln!(f, "builtin.module @calls attributes {{")?;
                writeln!(
                    f,
                    "  iree.reflection = {{target_features = \"{}\"}}",
                    features.join(",")
                )?;
                writeln!(f, "}} {{")?;
            }
            None => writeln!(f, "builtin.module @calls {{")?,
        }
        writeln!(f)?;

        writeln!(f, "{GENERATE_RANDOM_MATRIX_DECLARATION}")?;
        writeln!(f, "{CHECK_MATMUL_RESULTS_DECLARATION}")?;
        writeln!(f)?;

        for function in self.modules.functions.iter() {
            writeln!(f, "{}", function.import_declaration)?;
        }
        writeln!(f)?;

        for call in self.modules.calls.iter() {
            writeln!(f, "{}", call.op)?;
        }

        writeln!(f)?;
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        GenerationRequest,
        components::{CompilationInfoId, Dynamicity, ElemType, TestShape},
        generate,
        synthesis::MatmulTypes,
    };
    use pretty_assertions::assert_eq;

    fn modules() -> TestModules {
        let request = GenerationRequest::new(
            MatmulTypes::new(ElemType::I32, ElemType::I32),
            vec![TestShape::new(2, 2, 2, false, Dynamicity::Static)],
            false,
            CompilationInfoId::None,
        );

        generate(&request).unwrap()
    }

    #[test]
    fn matmuls_module_separates_functions() {
        let modules = modules();
        let source = modules.matmuls_module().to_string();

        assert!(source.starts_with("func.func @matmul_2x2_2xi32_i32("));
        assert!(source.ends_with("}\n\n"));
    }

    #[test]
    fn calls_module_layout() {
        let modules = modules();
        let source = modules.calls_module(None).to_string();
        let call = &modules.calls[0].op;

        assert_eq!(
            source,
            format!(
                "builtin.module @calls {{\n\
                 \n\
                 {GENERATE_RANDOM_MATRIX_DECLARATION}\n\
                 {CHECK_MATMUL_RESULTS_DECLARATION}\n\
                 \n\
                 func.func private @module.matmul_2x2_2xi32_i32(%lhs: !hal.buffer_view, %rhs: !hal.buffer_view) -> !hal.buffer_view\n\
                 \n\
                 {call}\n\
                 \n\
                 }}\n"
            )
        );
    }

    #[test]
    fn requirements_become_target_features() {
        let modules = modules();
        let source = modules.calls_module(Some("+avx2,+fma")).to_string();

        assert!(source.starts_with(
            "builtin.module @calls attributes {\n  iree.reflection = {target_features = \"avx2,fma\"}\n} {\n\n"
        ));
        assert_eq!(
            modules.calls_module(Some("")).to_string(),
            modules.calls_module(None).to_string()
        );
    }
}
