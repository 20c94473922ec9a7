use super::FillStrategy;

/// Seed every sequence starts from.
pub const INITIAL_SEED: u32 = 1;

/// Produces the seeds of pseudorandom matrix buffers.
///
/// Only buffer construction advances it. Call ids and compilation indices are counted
/// separately in [GenerationState].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSequencer {
    seed: u32,
}

impl Default for SeedSequencer {
    fn default() -> Self {
        Self { seed: INITIAL_SEED }
    }
}

impl SeedSequencer {
    /// Advances the sequence and returns the new seed.
    pub fn next_seed(&mut self) -> u32 {
        self.seed += 1;
        self.seed
    }

    /// The seed for a buffer filled with the given strategy, if it needs one.
    ///
    /// Zero-filled buffers don't consume a seed.
    pub fn seed_for(&mut self, fill: FillStrategy) -> Option<u32> {
        match fill {
            FillStrategy::Zero => None,
            FillStrategy::Random => Some(self.next_seed()),
        }
    }

    /// The last seed handed out, or [INITIAL_SEED] if none was.
    pub fn current(&self) -> u32 {
        self.seed
    }
}

/// Mutable state of one generation run.
///
/// Buffer seeds and bookkeeping counters are kept apart, see [SeedSequencer].
#[derive(Debug, Clone, Default)]
pub struct GenerationState {
    pub seeds: SeedSequencer,
    call_id: u64,
    compilation_index: u64,
}

impl GenerationState {
    /// Returns a call id unique to this run.
    pub fn next_call_id(&mut self) -> u64 {
        let id = self.call_id;
        self.call_id += 1;
        id
    }

    /// Returns a fresh index to register a compilation info attribute under.
    pub fn next_compilation_index(&mut self) -> u64 {
        let index = self.compilation_index;
        self.compilation_index += 1;
        index
    }
}
