//! Summary statistics over decoded numeric arrays.

use ndarray::ArrayD;

/// Pre-computed statistics of a numeric array, NaN excluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayStats {
    /// Minimum and maximum values.
    pub min_max: Option<(f64, f64)>,
    /// Mean value.
    pub mean: Option<f64>,
    /// Population standard deviation.
    pub std: Option<f64>,
    /// Count of valid (non-NaN) values.
    pub valid_count: usize,
}

impl ArrayStats {
    /// Compute statistics for `data`.
    pub fn compute(data: &ArrayD<f64>) -> Self {
        let valid: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
        if valid.is_empty() {
            return Self {
                min_max: None,
                mean: None,
                std: None,
                valid_count: 0,
            };
        }

        let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let count = valid.len() as f64;
        let mean = valid.iter().sum::<f64>() / count;
        let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

        Self {
            min_max: Some((min, max)),
            mean: Some(mean),
            std: Some(variance.sqrt()),
            valid_count: valid.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn skips_nan() {
        let data = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, f64::NAN, 3.0, 5.0]).unwrap();
        let stats = ArrayStats::compute(&data);
        assert_eq!(stats.min_max, Some((1.0, 5.0)));
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.valid_count, 3);
    }

    #[test]
    fn all_nan_has_no_stats() {
        let data = ArrayD::from_shape_vec(IxDyn(&[1]), vec![f64::NAN]).unwrap();
        let stats = ArrayStats::compute(&data);
        assert_eq!(stats.min_max, None);
        assert_eq!(stats.valid_count, 0);
    }
}
