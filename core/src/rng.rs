use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Index stream driving bomb placement.
///
/// The session machine seeds this exactly once per process run, at the
/// first activate press, and never reseeds it between games: later boards
/// continue the same stream.
pub trait RandomSource {
    fn seed(&mut self, entropy: u64);
    fn next_index(&mut self) -> u32;
}

/// One-shot entropy read taken at seed time. On the target hardware this
/// is a free-running timer register; frontends substitute whatever clock
/// they have.
pub trait EntropySource {
    fn read(&mut self) -> u64;
}

/// `SmallRng`-backed [`RandomSource`]. The pre-seed stream is fixed, but
/// the session never draws from it before seeding.
#[derive(Clone, Debug)]
pub struct SmallRngSource {
    rng: SmallRng,
}

impl SmallRngSource {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::seed_from_u64(0),
        }
    }
}

impl Default for SmallRngSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SmallRngSource {
    fn seed(&mut self, entropy: u64) {
        self.rng = SmallRng::seed_from_u64(entropy);
    }

    fn next_index(&mut self) -> u32 {
        self.rng.next_u32()
    }
}
