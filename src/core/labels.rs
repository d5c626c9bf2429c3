use crate::utils::error::{ReconError, Result};
use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random 0/1 labels standing in for ground truth, 1 with probability `match_rate`.
pub fn synthetic_labels<R: Rng>(n: usize, match_rate: f64, rng: &mut R) -> Result<Vec<u8>> {
    let coin = Bernoulli::new(match_rate).map_err(|e| ReconError::InvalidConfigValueError {
        field: "model.match_rate".to_string(),
        value: match_rate.to_string(),
        reason: e.to_string(),
    })?;

    Ok(coin.sample_iter(rng).take(n).map(u8::from).collect())
}

pub fn label_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
