//! Random oversampling of minority classes

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::dataset::Label;

/// Duplicate randomly chosen rows of every minority class until each class
/// matches the majority count. Original rows keep their positions; the
/// duplicates are appended.
pub fn random_oversample(
    x: &[Vec<f64>],
    y: &[Label],
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<Label>) {
    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, label) in y.iter().enumerate() {
        by_class[label.id() as usize].push(i);
    }
    let target = by_class.iter().map(Vec::len).max().unwrap_or(0);

    let mut x_out = x.to_vec();
    let mut y_out = y.to_vec();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for (class_id, members) in by_class.iter().enumerate() {
        if members.is_empty() || members.len() == target {
            continue;
        }
        let deficit = target - members.len();
        debug!("oversampling class {} by {} rows", class_id, deficit);
        for _ in 0..deficit {
            let pick = members[rng.random_range(0..members.len())];
            x_out.push(x[pick].clone());
            y_out.push(y[pick]);
        }
    }

    (x_out, y_out)
}
