use derive_new::new;
use hashbrown::HashMap;

use crate::{
    ConfigError, GenerateError,
    components::{CompilationInfoId, ElemType, GenerationState, ResolvedShape, TestShape},
    config::{GenerationLogLevel, GenerationLogger},
    synthesis::{MatmulTypes, MlirFunction, TestCall, function_name, generate_call, generate_function},
};

/// Everything needed to generate the tests of one run.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub types: MatmulTypes,
    pub shapes: Vec<TestShape>,
    /// Applies to every testcase.
    pub transpose_rhs: bool,
    pub compilation_info: CompilationInfoId,
}

/// Generated functions keyed by name, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionMap {
    functions: Vec<MlirFunction>,
    index: HashMap<String, usize>,
}

impl FunctionMap {
    /// Returns the function named `name`, creating it first if there is none.
    ///
    /// The first function created under a name is kept, `create` isn't called afterwards.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        name: &str,
        create: impl FnOnce() -> Result<MlirFunction, E>,
    ) -> Result<&MlirFunction, E> {
        let index = match self.index.get(name) {
            Some(index) => *index,
            None => {
                let function = create()?;
                let index = self.functions.len();
                self.index.insert(name.to_string(), index);
                self.functions.push(function);
                index
            }
        };

        Ok(&self.functions[index])
    }

    pub fn get(&self, name: &str) -> Option<&MlirFunction> {
        self.index.get(name).map(|index| &self.functions[*index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MlirFunction> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// The generated functions and the calls exercising them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestModules {
    pub functions: FunctionMap,
    /// In (compilation info variant, testcase) order.
    pub calls: Vec<TestCall>,
}

/// Generates test modules, keeping seeds and counters unique across all of its runs.
#[derive(Debug, Default)]
pub struct Generator {
    state: GenerationState,
    logger: GenerationLogger,
}

impl Generator {
    pub fn new(logger: GenerationLogger) -> Self {
        Self {
            state: GenerationState::default(),
            logger,
        }
    }

    /// Generates one function per distinct testcase signature and one call per testcase,
    /// for every compilation info variant of the request.
    ///
    /// On error nothing is returned and the generator is left untouched.
    pub fn generate(&mut self, request: &GenerationRequest) -> Result<TestModules, GenerateError> {
        let types = resolve_types(request.types)?;
        let mut state = self.state.clone();
        let mut modules = TestModules::default();
        let mut events = Vec::new();

        for compilation_info in request.compilation_info.compilation_infos() {
            for shape in request.shapes.iter() {
                // Testcases that only differ by runtime sizes share the same function, e.g.
                // dynamic shapes all use tensor<?x?xf32>. So functions are only generated
                // once per name, while every testcase gets its own call.
                let shapes = ResolvedShape::resolve(shape, request.transpose_rhs)?;
                let name = function_name(
                    types,
                    &shapes,
                    shape.accumulate,
                    request.transpose_rhs,
                    compilation_info.as_ref(),
                );
                if modules.functions.contains(&name) {
                    events.push(format!("Reusing function {name}"));
                }

                let function = modules.functions.get_or_try_insert_with(&name, || {
                    events.push(format!("Generated function {name}"));
                    generate_function(
                        &mut state,
                        types,
                        shape,
                        request.transpose_rhs,
                        compilation_info.as_ref(),
                    )
                })?;
                let call = generate_call(&mut state, function, types, shape, request.transpose_rhs);
                events.push(format!("Generated call {} to {name}", call.name));
                modules.calls.push(call);
            }
        }

        self.state = state;
        self.log(&modules, events);

        Ok(modules)
    }

    fn log(&mut self, modules: &TestModules, events: Vec<String>) {
        let summary = format!(
            "Generated {} functions and {} calls",
            modules.functions.len(),
            modules.calls.len()
        );
        log::info!("{summary}");

        match self.logger.log_level() {
            GenerationLogLevel::Disabled => {}
            GenerationLogLevel::Basic => self.logger.log_generation(&summary),
            GenerationLogLevel::Full => {
                for event in events {
                    self.logger.log_generation(&event);
                }
                self.logger.log_generation(&summary);
            }
        }
    }
}

/// Generates the test modules of a single run.
pub fn generate(request: &GenerationRequest) -> Result<TestModules, GenerateError> {
    Generator::default().generate(request)
}

// The accumulator defaults to the operand type.
fn resolve_types(types: MatmulTypes) -> Result<MatmulTypes, ConfigError> {
    if types.lhs_rhs.is_none() {
        return Err(ConfigError::MissingOperandType);
    }

    let acc = match types.acc {
        ElemType::None => types.lhs_rhs,
        acc => acc,
    };

    Ok(MatmulTypes::new(types.lhs_rhs, acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UnsupportedError, components::Dynamicity};

    fn request(shapes: Vec<TestShape>, compilation_info: CompilationInfoId) -> GenerationRequest {
        GenerationRequest::new(
            MatmulTypes::new(ElemType::F32, ElemType::F32),
            shapes,
            false,
            compilation_info,
        )
    }

    #[test]
    fn first_function_wins() {
        let function = |definition: &str| MlirFunction {
            name: "matmul_4x4_4xf32_f32".to_string(),
            signature: String::new(),
            import_declaration: String::new(),
            definition: definition.to_string(),
            arity: 2,
        };
        let mut functions = FunctionMap::default();

        let first = functions
            .get_or_try_insert_with("matmul_4x4_4xf32_f32", || Ok::<_, ()>(function("first")))
            .unwrap();
        assert_eq!(first.definition, "first");

        let second = functions
            .get_or_try_insert_with("matmul_4x4_4xf32_f32", || -> Result<MlirFunction, ()> {
                panic!("already generated")
            })
            .unwrap();
        assert_eq!(second.definition, "first");
        assert_eq!(functions.len(), 1);
    }

    #[test]
    fn failed_creation_inserts_nothing() {
        let mut functions = FunctionMap::default();

        let result = functions.get_or_try_insert_with("matmul_4x4_4xf32_f32", || {
            Err(UnsupportedError::MixedDynamicity)
        });

        assert_eq!(result, Err(UnsupportedError::MixedDynamicity));
        assert!(functions.is_empty());
        assert!(!functions.contains("matmul_4x4_4xf32_f32"));
    }

    #[test]
    fn dynamic_testcases_share_a_function() {
        let shapes = vec![
            TestShape::new(4, 4, 4, false, Dynamicity::Dynamic),
            TestShape::new(8, 16, 32, false, Dynamicity::Dynamic),
        ];

        let modules = generate(&request(shapes, CompilationInfoId::None)).unwrap();

        assert_eq!(modules.functions.len(), 1);
        assert_eq!(modules.calls.len(), 2);
        assert_eq!(
            modules.calls[0].function_name,
            modules.calls[1].function_name
        );
        assert_ne!(modules.calls[0].name, modules.calls[1].name);
    }

    #[test]
    fn static_testcases_get_their_own_functions() {
        let shapes = vec![
            TestShape::new(4, 4, 4, false, Dynamicity::Static),
            TestShape::new(8, 4, 8, false, Dynamicity::Static),
            TestShape::new(4, 4, 4, false, Dynamicity::Static),
        ];

        let modules = generate(&request(shapes, CompilationInfoId::None)).unwrap();

        let names: Vec<&str> = modules.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["matmul_4x4_4xf32_f32", "matmul_8x8_4xf32_f32"]);
        assert_eq!(modules.calls.len(), 3);
    }

    #[test]
    fn every_pairing_gets_a_function_and_a_call() {
        let shapes = vec![TestShape::new(16, 16, 16, false, Dynamicity::Static)];

        let modules = generate(&request(
            shapes,
            CompilationInfoId::AMDAIEPadBasedPassPipeline,
        ))
        .unwrap();

        assert_eq!(modules.functions.len(), 3);
        assert_eq!(modules.calls.len(), 3);
        for (call, function) in modules.calls.iter().zip(modules.functions.iter()) {
            assert_eq!(call.function_name, function.name);
        }
    }

    #[test]
    fn absent_accumulator_type_follows_operands() {
        let shapes = vec![TestShape::new(4, 4, 4, false, Dynamicity::Static)];
        let request = GenerationRequest::new(
            MatmulTypes::new(ElemType::BF16, ElemType::None),
            shapes,
            false,
            CompilationInfoId::None,
        );

        let modules = generate(&request).unwrap();

        assert!(modules.functions.contains("matmul_4x4_4xbf16_bf16"));
    }

    #[test]
    fn absent_operand_type_is_rejected() {
        let request = GenerationRequest::new(
            MatmulTypes::new(ElemType::None, ElemType::I32),
            vec![TestShape::new(4, 4, 4, false, Dynamicity::Static)],
            false,
            CompilationInfoId::None,
        );

        assert_eq!(
            generate(&request),
            Err(GenerateError::Config(ConfigError::MissingOperandType))
        );
    }

    #[test]
    fn failed_run_leaves_the_generator_untouched() {
        let mut generator = Generator::default();
        let failing = request(
            vec![
                TestShape::new(4, 4, 4, false, Dynamicity::Static),
                TestShape::new(4, 4, 4, false, Dynamicity::Mixed),
            ],
            CompilationInfoId::None,
        );
        let passing = request(
            vec![TestShape::new(4, 4, 4, false, Dynamicity::Static)],
            CompilationInfoId::None,
        );

        assert_eq!(
            generator.generate(&failing),
            Err(GenerateError::Unsupported(UnsupportedError::MixedDynamicity))
        );

        let modules = generator.generate(&passing).unwrap();
        assert_eq!(modules, generate(&passing).unwrap());
    }

    #[test]
    fn successive_runs_keep_seeds_unique() {
        let mut generator = Generator::default();
        let request = request(
            vec![TestShape::new(4, 4, 4, false, Dynamicity::Static)],
            CompilationInfoId::None,
        );

        let first = generator.generate(&request).unwrap();
        let second = generator.generate(&request).unwrap();

        assert!(first.calls[0].op.contains("%lhs_seed = arith.constant 2 : i32"));
        assert!(second.calls[0].op.contains("%lhs_seed = arith.constant 4 : i32"));
        assert_ne!(first.calls[0].name, second.calls[0].name);
    }
}
