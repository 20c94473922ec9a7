use core::fmt::Display;

use derive_new::new;

use super::{MatmulTypes, MlirFunction};
use crate::components::{ElemType, FillStrategy, GenerationState, TestShape};

/// Declaration of the collaborator entry point generating input matrices.
pub const GENERATE_RANDOM_MATRIX_DECLARATION: &str = "func.func private @matmul_test.generate_random_matrix(%device: !hal.device, %dim0: i64, %dim1: i64, %element_type: i32, %seed: i32) -> !hal.buffer_view";

/// Declaration of the collaborator entry point checking a matmul result.
pub const CHECK_MATMUL_RESULTS_DECLARATION: &str = "func.func private @matmul_test.check_matmul_results(%device: !hal.device, %m: i64, %k: i64, %n: i64, %transpose_rhs: i32, %lhs: !hal.buffer_view, %rhs: !hal.buffer_view, %acc: !hal.buffer_view, %actual_result: !hal.buffer_view)";

/// A single call to a generated test function, with its inputs and the result check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCall {
    /// Name of the called [MlirFunction].
    pub function_name: String,
    /// Name of the function wrapping the call.
    pub name: String,
    pub op: String,
    /// Number of buffers passed to the called function.
    pub arity: usize,
}

/// A matrix function argument bound to `%name`.
///
/// Without a seed the matrix is zero-filled, which the result check receives as a null
/// buffer.
#[derive(new, Debug, Clone)]
struct InputMatrix<'a> {
    name: &'a str,
    shape: [u32; 2],
    elem: ElemType,
    seed: Option<u32>,
}

impl Display for InputMatrix<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = self.name;
        let Some(seed) = self.seed else {
            return writeln!(f, "  %{name} = util.null : !hal.buffer_view");
        };

        writeln!(f, "  %{name}_dim0 = arith.constant {} : i64", self.shape[0])?;
        writeln!(f, "  %{name}_dim1 = arith.constant {} : i64", self.shape[1])?;
        writeln!(
            f,
            "  %{name}_element_type = hal.element_type<{}> : i32",
            self.elem
        )?;
        writeln!(f, "  %{name}_seed = arith.constant {seed} : i32")?;
        writeln!(
            f,
            "  %{name} = call @matmul_test.generate_random_matrix(%device, %{name}_dim0, %{name}_dim1, %{name}_element_type, %{name}_seed) : (!hal.device, i64, i64, i32, i32) -> !hal.buffer_view"
        )
    }
}

/// Generates the call of `function` for one testcase.
///
/// Every pseudorandom matrix consumes the next seed of `state`, zero-filled ones none.
pub fn generate_call(
    state: &mut GenerationState,
    function: &MlirFunction,
    types: MatmulTypes,
    shape: &TestShape,
    transpose_rhs: bool,
) -> TestCall {
    let mut name = format!("{}_{}_{}_{}", function.name, shape.m, shape.k, shape.n);
    if shape.accumulate {
        name.push_str("_acc");
    }
    name = format!("{name}_{}", state.next_call_id());

    let description = format!(
        "Matmul shape (MxKxN): {}x{}x{}",
        shape.m, shape.k, shape.n
    );
    let mut op = format!(
        "func.func @{name}() attributes {{\n\
         \x20 iree.reflection = {{description = \"{description}\"}}\n\
         }} {{\n\
         \x20 %device_index = arith.constant 0 : index\n\
         \x20 %device = hal.devices.get %device_index : !hal.device\n"
    );

    let lhs_shape = [shape.m, shape.k];
    let rhs_shape = match transpose_rhs {
        true => [shape.n, shape.k],
        false => [shape.k, shape.n],
    };
    let acc_shape = [shape.m, shape.n];

    let seed = state.seeds.seed_for(FillStrategy::Random);
    op += &InputMatrix::new("lhs", lhs_shape, types.lhs_rhs, seed).to_string();
    let seed = state.seeds.seed_for(FillStrategy::Random);
    op += &InputMatrix::new("rhs", rhs_shape, types.lhs_rhs, seed).to_string();

    let acc_fill = match shape.accumulate {
        true => FillStrategy::Random,
        false => FillStrategy::Zero,
    };
    let seed = state.seeds.seed_for(acc_fill);
    op += &InputMatrix::new("acc", acc_shape, types.acc, seed).to_string();

    let args = if shape.accumulate {
        // The called function may write its result into its accumulator input, so it
        // gets a replica of `%acc`, which is kept intact for the result check.
        op += &InputMatrix::new("acc_copy", acc_shape, types.acc, seed).to_string();
        vec!["%lhs", "%rhs", "%acc_copy"]
    } else {
        vec!["%lhs", "%rhs"]
    };

    let arg_types = vec!["!hal.buffer_view"; args.len()];
    op += &format!(
        "  %result = call @module.{}({}) : ({}) -> !hal.buffer_view\n",
        function.name,
        args.join(", "),
        arg_types.join(", ")
    );

    op += &format!(
        "  %m = arith.constant {} : i64\n\
         \x20 %k = arith.constant {} : i64\n\
         \x20 %n = arith.constant {} : i64\n\
         \x20 %transpose_rhs = arith.constant {} : i32\n\
         \x20 call @matmul_test.check_matmul_results(%device, %m, %k, %n, %transpose_rhs, %lhs, %rhs, %acc, %result) : (!hal.device, i64, i64, i64, i32, !hal.buffer_view, !hal.buffer_view, !hal.buffer_view, !hal.buffer_view) -> ()\n\
         \x20 return\n\
         }}\n",
        shape.m, shape.k, shape.n, transpose_rhs as u32,
    );

    TestCall {
        function_name: function.name.clone(),
        name,
        op,
        arity: args.len(),
    }
}
