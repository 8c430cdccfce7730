use rand::rngs::SmallRng;
use rand::Rng;

///
/// Inverse-transform sampling from unnormalized weights.
///
/// Picks the first index whose cumulative weight exceeds `u * total`.
/// Zero weights are never picked. Returns `None` if the total weight is
/// not positive or not finite.
///
/// * `weights` - non-negative weights
/// * `u` - uniform draw in `[0, 1)`
///
pub fn sample_inverse_transform(weights: &[f64], u: f64) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let target = u * total;
    let mut cum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cum += w;
        if target < cum {
            return Some(i);
        }
    }

    // rounding left `target` at the very end
    weights.iter().rposition(|&w| w > 0.0)
}

/// Draw an index from `weights`; panics if nothing can be drawn.
pub fn draw_index(weights: &[f64], rng: &mut SmallRng) -> usize {
    let u = rng.random::<f64>();
    match sample_inverse_transform(weights, u) {
        Some(k) => k,
        None => panic!("inverse transform sampling failed on weights {:?}", weights),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_inverse_transform_boundaries() {
        let weights = [1.0, 0.0, 3.0];
        assert_eq!(sample_inverse_transform(&weights, 0.0), Some(0));
        assert_eq!(sample_inverse_transform(&weights, 0.24), Some(0));
        assert_eq!(sample_inverse_transform(&weights, 0.25), Some(2));
        assert_eq!(sample_inverse_transform(&weights, 0.999), Some(2));
        assert_eq!(sample_inverse_transform(&weights, 1.0), Some(2));
    }

    #[test]
    fn test_inverse_transform_degenerate() {
        assert_eq!(sample_inverse_transform(&[0.0, 0.0], 0.5), None);
        assert_eq!(sample_inverse_transform(&[], 0.5), None);
        assert_eq!(sample_inverse_transform(&[1.0, f64::NAN], 0.5), None);
    }

    #[test]
    fn test_draw_frequencies() {
        let mut rng = SmallRng::seed_from_u64(42);
        let weights = [1.0, 0.0, 3.0];
        let mut counts = [0usize; 3];
        for _ in 0..4000 {
            counts[draw_index(&weights, &mut rng)] += 1;
        }
        assert_eq!(counts[1], 0);
        let frac = counts[2] as f64 / 4000.0;
        assert!((frac - 0.75).abs() < 0.05, "{}", frac);
    }

    #[test]
    #[should_panic(expected = "inverse transform sampling failed")]
    fn test_draw_panics_on_zero_mass() {
        let mut rng = SmallRng::seed_from_u64(1);
        draw_index(&[0.0, 0.0], &mut rng);
    }
}
