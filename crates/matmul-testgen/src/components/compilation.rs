use core::fmt::Display;

use strum::{EnumIter, EnumString};

/// Collections of compilation info that tests can be generated for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, EnumString, EnumIter,
)]
pub enum CompilationInfoId {
    /// No compilation info, functions are left to the compiler's default pipeline.
    #[default]
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "AMDAIEPadBasedPassPipeline")]
    AMDAIEPadBasedPassPipeline,
}

/// A tiling paired with the workgroup size it runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWorkgroupSizePair {
    pub tile_sizes: &'static [&'static [u32]],
    pub workgroup_size: &'static [u32],
}

const PAD_BASED_PAIRS: &[TileWorkgroupSizePair] = &[
    TileWorkgroupSizePair {
        tile_sizes: &[&[8, 8], &[4, 4], &[0, 0, 4]],
        workgroup_size: &[2, 2, 1],
    },
    TileWorkgroupSizePair {
        tile_sizes: &[&[16, 16], &[8, 8], &[0, 0, 8]],
        workgroup_size: &[2, 2, 1],
    },
    TileWorkgroupSizePair {
        tile_sizes: &[&[32, 32], &[16, 16], &[0, 0, 16]],
        workgroup_size: &[2, 2, 1],
    },
];

/// Software pipelining depth requested for every registered tiling.
const SOFTWARE_PIPELINE_DEPTH: u32 = 3;

impl CompilationInfoId {
    /// The registered tile/workgroup pairings for this collection.
    pub fn tile_workgroup_size_pairs(&self) -> &'static [TileWorkgroupSizePair] {
        match self {
            CompilationInfoId::None => &[],
            CompilationInfoId::AMDAIEPadBasedPassPipeline => PAD_BASED_PAIRS,
        }
    }

    /// The compilation infos to generate tests for, one variant per registered pairing.
    ///
    /// Without a collection there is a single variant with no compilation info.
    pub fn compilation_infos(&self) -> Vec<Option<CompilationInfo>> {
        if let CompilationInfoId::None = self {
            return vec![None];
        }

        self.tile_workgroup_size_pairs()
            .iter()
            .map(|pair| Some(CompilationInfo::from_pair(*self, pair)))
            .collect()
    }
}

/// Lowering configuration attached to the multiply op of a generated function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompilationInfo {
    /// Lowering config.
    pub tile_sizes: Vec<Vec<u32>>,
    /// Translation info.
    pub dispatch_lowering_pass_pipeline: String,
    pub workload_per_wg: Vec<u32>,
    pub software_pipeline_depth: u32,
    pub workgroup_size: Vec<u32>,
}

impl CompilationInfo {
    fn from_pair(id: CompilationInfoId, pair: &TileWorkgroupSizePair) -> Self {
        let tile_sizes: Vec<Vec<u32>> = pair.tile_sizes.iter().map(|t| t.to_vec()).collect();
        let workload_per_wg = tile_sizes
            .first()
            .map(|level| level.iter().take(2).rev().copied().collect())
            .unwrap_or_default();

        Self {
            tile_sizes,
            dispatch_lowering_pass_pipeline: id.to_string(),
            workload_per_wg,
            software_pipeline_depth: SOFTWARE_PIPELINE_DEPTH,
            workgroup_size: pair.workgroup_size.to_vec(),
        }
    }

    /// Identifier-safe key of the tiling and workgroup size, e.g. `8_8_4_4_0_0_4_2_2_1`.
    pub fn tile_workgroup_key(&self) -> String {
        let tiles = self.tile_sizes.iter().flatten();
        let key: Vec<String> = tiles
            .chain(self.workgroup_size.iter())
            .map(|size| size.to_string())
            .collect();

        key.join("_")
    }

    /// Renders the attribute declaration registered under `#compilation{index}`.
    pub fn attribute(&self, index: u64) -> CompilationAttribute<'_> {
        CompilationAttribute { info: self, index }
    }
}

/// `#compilationN = #iree_codegen.compilation_info<...>` declaration.
#[derive(Debug, Clone, Copy)]
pub struct CompilationAttribute<'a> {
    info: &'a CompilationInfo,
    index: u64,
}

impl CompilationAttribute<'_> {
    /// Attribute dictionary attaching the declaration to an op.
    pub fn reference(&self) -> String {
        format!("{{compilation_info = #compilation{}}} ", self.index)
    }
}

impl Display for CompilationAttribute<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let info = self.info;
        let tile_sizes: Vec<String> = info.tile_sizes.iter().map(|t| list(t)).collect();

        writeln!(
            f,
            "#compilation{} = #iree_codegen.compilation_info<",
            self.index
        )?;
        writeln!(f, "  lowering_config = <tile_sizes = [{}]>,", tile_sizes.join(", "))?;
        writeln!(
            f,
            "  translation_info = <{}",
            info.dispatch_lowering_pass_pipeline
        )?;
        writeln!(f, "  pipeline_depth = {}>,", info.software_pipeline_depth)?;
        writeln!(f, "  workgroup_size = {}>", list(&info.workgroup_size))
    }
}

fn list(values: &[u32]) -> String {
    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn none_is_a_single_empty_variant() {
        assert_eq!(CompilationInfoId::None.compilation_infos(), vec![None]);
    }

    #[test]
    fn pad_based_pipeline_expands_every_pair() {
        let infos = CompilationInfoId::AMDAIEPadBasedPassPipeline.compilation_infos();

        assert_eq!(infos.len(), 3);
        let first = infos[0].as_ref().unwrap();
        assert_eq!(first.dispatch_lowering_pass_pipeline, "AMDAIEPadBasedPassPipeline");
        assert_eq!(first.workload_per_wg, vec![8, 8]);
        assert_eq!(first.software_pipeline_depth, 3);
        assert_eq!(first.tile_workgroup_key(), "8_8_4_4_0_0_4_2_2_1");
    }

    #[test]
    fn attribute_declaration() {
        let info = CompilationInfo {
            tile_sizes: vec![vec![16, 8], vec![0, 0, 4]],
            dispatch_lowering_pass_pipeline: "AMDAIEPadBasedPassPipeline".to_string(),
            workload_per_wg: vec![8, 16],
            software_pipeline_depth: 3,
            workgroup_size: vec![4, 1, 1],
        };
        let attribute = info.attribute(2);

        assert_eq!(
            attribute.to_string(),
            "#compilation2 = #iree_codegen.compilation_info<\n\
             \x20 lowering_config = <tile_sizes = [[16, 8], [0, 0, 4]]>,\n\
             \x20 translation_info = <AMDAIEPadBasedPassPipeline\n\
             \x20 pipeline_depth = 3>,\n\
             \x20 workgroup_size = [4, 1, 1]>\n"
        );
        assert_eq!(attribute.reference(), "{compilation_info = #compilation2} ");
    }
}
