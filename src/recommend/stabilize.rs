const FLUCTUATION_CV: f64 = 0.15;
const RELAXATION_RATIO: f64 = 0.8;
const SHARP_DROP_PCT: f64 = 15.0;

/// Collapses multi-year cutoffs to one value: the median when the years swing
/// (coefficient of variation above 0.15), otherwise the highest cutoff.
pub fn stabilize_cutoff(cutoffs: &[f64]) -> Option<f64> {
    match cutoffs {
        [] => return None,
        [only] => return Some(*only),
        _ => {}
    }

    let mut sorted = cutoffs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
    if mean > 0.0 && sample_std_dev(&sorted, mean) / mean > FLUCTUATION_CV {
        return Some(median(&sorted).trunc());
    }

    sorted.last().copied()
}

/// Whether a branch above the applicant's rank is still worth listing, given
/// `cutoffs` in chronological order.
pub fn historically_relaxed(cutoffs: &[f64], rank: u32) -> bool {
    let Some(latest) = cutoffs.last().copied() else {
        return false;
    };

    let threshold = (f64::from(rank) * RELAXATION_RATIO).trunc();
    if cutoffs.iter().any(|c| *c <= threshold) {
        return true;
    }

    if latest > f64::from(rank) {
        let earlier = &cutoffs[..cutoffs.len() - 1];
        if earlier.iter().any(|c| *c < latest) {
            return true;
        }
        return cutoffs.windows(2).any(|pair| {
            let (previous, current) = (pair[0], pair[1]);
            previous > 0.0 && (previous - current) / previous * 100.0 >= SHARP_DROP_PCT
        });
    }

    false
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
