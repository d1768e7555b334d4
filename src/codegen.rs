use crate::{db::LinkStore, error::GenerateError};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// The 62-character code alphabet: lowercase, uppercase, digits.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_CODE_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Draws random short codes and checks them against a store for collisions.
///
/// A single draw collides with probability `n / 62^length` when `n` codes
/// are stored. At the default length of 6 the keyspace is 62^6 ≈ 5.68e10,
/// so even a million stored links give roughly a 1-in-56,800 chance per
/// draw. `max_attempts` only matters when the random source is broken.
pub struct CodeGenerator {
    length: usize,
    max_attempts: u32,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl CodeGenerator {
    pub fn new(length: usize, max_attempts: u32, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            length,
            max_attempts,
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Generator backed by an OS-seeded [`StdRng`].
    pub fn from_entropy(length: usize, max_attempts: u32) -> Self {
        Self::new(length, max_attempts, StdRng::from_entropy())
    }

    /// Return a code not currently present in `store`.
    ///
    /// The check and the caller's later insert are separate statements; the
    /// store's primary key catches the remaining race.
    pub async fn generate<S>(&self, store: &S) -> Result<String, GenerateError>
    where
        S: LinkStore + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.draw();
            if !store.exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!("Short code collision on attempt {}: {}", attempt, candidate);
        }

        Err(GenerateError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    fn draw(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        random_code(&mut **rng, self.length)
    }
}

/// Generate a random alphanumeric string of the given length, each position
/// drawn uniformly from [`ALPHABET`].
pub fn random_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
