//! Synthetic regression data for smoke tests.

use polars::prelude::*;
use rand::Rng;

use crate::error::Result;

/// Generate `n_samples` rows of `target_y = 2 * feature_x + 1 + noise`,
/// with `feature_x` uniform in `[0, 10)` and bounded uniform noise.
pub fn linear_frame(n_samples: usize) -> Result<DataFrame> {
    let mut rng = rand::thread_rng();

    let mut xs = Vec::with_capacity(n_samples);
    let mut ys = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let x: f64 = rng.gen_range(0.0..10.0);
        let noise: f64 = rng.gen_range(-1.0..1.0);
        xs.push(x);
        ys.push(2.0 * x + 1.0 + noise);
    }

    let df = df!(
        "feature_x" => xs,
        "target_y" => ys,
    )?;
    Ok(df)
}
