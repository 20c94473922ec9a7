use core::fmt::Display;

use derive_new::new;

use crate::{
    UnsupportedError,
    components::{CompilationInfo, DimSize, ElemType, GenerationState, ResolvedShape, TestShape},
};

/// Element types of a testcase.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatmulTypes {
    /// Type of both the lhs and the rhs.
    pub lhs_rhs: ElemType,
    pub acc: ElemType,
}

/// A generated test function.
///
/// The function takes the same arguments as the `linalg.matmul` variants and just forwards
/// them, returning the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlirFunction {
    pub name: String,
    /// Typed signature, e.g. `(tensor<4x4xf32>, tensor<4x4xf32>) -> tensor<4x4xf32>`.
    pub signature: String,
    /// Declaration used by the calls module, which only sees buffer views.
    pub import_declaration: String,
    /// Full definition, preceded by its compilation info attribute if any.
    pub definition: String,
    /// Number of buffers the function takes.
    pub arity: usize,
}

#[derive(new, Debug, Clone, Copy)]
struct TensorType {
    rows: DimSize,
    cols: DimSize,
    elem: ElemType,
}

impl Display for TensorType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "tensor<{}x{}x{}>", self.rows, self.cols, self.elem)
    }
}

fn matmul_op(transpose_rhs: bool) -> &'static str {
    match transpose_rhs {
        true => "linalg.matmul_transpose_b",
        false => "linalg.matmul",
    }
}

/// Name of the test function for the given resolved shapes.
///
/// Testcases that only differ by runtime sizes resolve to the same name, so they can share
/// a single function.
pub fn function_name(
    types: MatmulTypes,
    shapes: &ResolvedShape,
    accumulate: bool,
    transpose_rhs: bool,
    compilation_info: Option<&CompilationInfo>,
) -> String {
    let mut kind = String::from("matmul");
    if transpose_rhs {
        kind.push_str("_transpose_b");
    }
    if accumulate {
        kind.push_str("_accumulate");
    }

    let m = shapes.acc_rows.ident();
    let n = shapes.acc_cols.ident();
    let k = shapes.lhs_cols.ident();

    let info = match compilation_info {
        Some(info) => format!(
            "_for_{}_{}",
            info.dispatch_lowering_pass_pipeline,
            info.tile_workgroup_key()
        ),
        None => String::new(),
    };

    format!("{kind}_{m}x{n}_{k}x{}_{}{info}", types.lhs_rhs, types.acc)
}

/// Generates the test function for a testcase.
///
/// A compilation info is registered under a fresh index of `state` every time one is given.
pub fn generate_function(
    state: &mut GenerationState,
    types: MatmulTypes,
    shape: &TestShape,
    transpose_rhs: bool,
    compilation_info: Option<&CompilationInfo>,
) -> Result<MlirFunction, UnsupportedError> {
    let shapes = ResolvedShape::resolve(shape, transpose_rhs)?;
    let name = function_name(
        types,
        &shapes,
        shape.accumulate,
        transpose_rhs,
        compilation_info,
    );

    let lhs = TensorType::new(shapes.lhs_rows, shapes.lhs_cols, types.lhs_rhs);
    let rhs = TensorType::new(shapes.rhs_rows, shapes.rhs_cols, types.lhs_rhs);
    let acc = TensorType::new(shapes.acc_rows, shapes.acc_cols, types.acc);
    let op = matmul_op(transpose_rhs);

    let mut definition = String::new();
    let mut attr = String::new();
    if let Some(info) = compilation_info {
        let attribute = info.attribute(state.next_compilation_index());
        definition += &attribute.to_string();
        attr = attribute.reference();
    }

    let matmul = format!(
        "  %result = {op} {attr}ins(%lhs, %rhs: {lhs}, {rhs}) outs(%acc: {acc}) -> {acc}\n\
         \x20 return %result: {acc}\n\
         }}\n"
    );

    if shape.accumulate {
        definition += &format!(
            "func.func @{name}(%lhs: {lhs}, %rhs: {rhs}, %acc: {acc}) -> {acc} {{\n{matmul}"
        );

        return Ok(MlirFunction {
            import_declaration: import_declaration(&name, &["lhs", "rhs", "acc"]),
            signature: format!("({lhs}, {rhs}, {acc}) -> {acc}"),
            definition,
            arity: 3,
            name,
        });
    }

    let acc_elem = types.acc;
    let zero = acc_elem.zero_literal();
    definition += &format!("func.func @{name}(%lhs: {lhs}, %rhs: {rhs}) -> {acc} {{\n");

    if shapes.acc_rows.is_dynamic() {
        // The accumulator size can only be known from the inputs.
        definition += &format!(
            "  %c0 = arith.constant 0 : index\n\
             \x20 %c1 = arith.constant 1 : index\n\
             \x20 %acc_dim0 = tensor.dim %lhs, %c0 : {lhs}\n\
             \x20 %acc_dim1 = tensor.dim %rhs, %c1 : {rhs}\n\
             \x20 %init_acc = tensor.empty(%acc_dim0, %acc_dim1) : {acc}\n"
        );
    } else {
        definition += &format!("  %init_acc = tensor.empty() : {acc}\n");
    }

    definition += &format!(
        "  %c0_acc_type = arith.constant {zero}: {acc_elem}\n\
         \x20 %acc = linalg.fill ins(%c0_acc_type : {acc_elem}) outs(%init_acc : {acc}) -> {acc}\n\
         {matmul}"
    );

    Ok(MlirFunction {
        import_declaration: import_declaration(&name, &["lhs", "rhs"]),
        signature: format!("({lhs}, {rhs}) -> {acc}"),
        definition,
        arity: 2,
        name,
    })
}

fn import_declaration(name: &str, params: &[&str]) -> String {
    let params: Vec<String> = params
        .iter()
        .map(|param| format!("%{param}: !hal.buffer_view"))
        .collect();

    format!(
        "func.func private @module.{name}({}) -> !hal.buffer_view",
        params.join(", ")
    )
}
