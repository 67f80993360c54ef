/// Cosmetic variant selection for randomized block textures.
///
/// The loader takes a `&mut dyn VariantSource`, so level loading is
/// reproducible with the seeded source and fully scripted in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default seed for block variants.
pub const DEFAULT_LEVEL_SEED: u64 = 354668;

pub trait VariantSource {
    /// A variant index in `0..count`. `count` is never zero.
    fn next_variant(&mut self, count: u32) -> u32;
}

pub struct SeededVariants {
    rng: StdRng,
}

impl SeededVariants {
    pub fn new(seed: u64) -> Self {
        SeededVariants { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for SeededVariants {
    fn default() -> Self {
        SeededVariants::new(DEFAULT_LEVEL_SEED)
    }
}

impl VariantSource for SeededVariants {
    fn next_variant(&mut self, count: u32) -> u32 {
        self.rng.gen_range(0..count)
    }
}
