use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Randomness used at spawn points (food cells, pipe gaps, AI moves, deck shuffles).
///
/// Sources are full `RngCore`s, so `rand::seq` helpers work on `&mut dyn RandomSource`.
pub trait RandomSource: RngCore {
    /// Uniform integer in `0..upper`. `upper` must be non-zero.
    fn below(&mut self, upper: u32) -> u32;
}

/// Default source backed by `StdRng`, seeded from entropy or a fixed seed.
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RngCore for SystemRandom {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

impl RandomSource for SystemRandom {
    fn below(&mut self, upper: u32) -> u32 {
        self.rng.gen_range(0..upper.max(1))
    }
}

/// Replays a fixed list of values (each reduced modulo `upper`), then repeats the last one.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    values: Vec<u32>,
    cursor: usize,
}

#[cfg(test)]
impl Scripted {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    fn next_raw(&mut self) -> u32 {
        match self.values.get(self.cursor) {
            Some(v) => {
                self.cursor += 1;
                *v
            }
            None => self.values.last().copied().unwrap_or(0),
        }
    }
}

#[cfg(test)]
impl RngCore for Scripted {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.next_raw())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn below(&mut self, upper: u32) -> u32 {
        self.next_raw() % upper.max(1)
    }
}
