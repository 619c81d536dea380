use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ForecastError, Result};
use crate::stats::{FeatureRow, feature_names};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

const MAX_SWEEPS: usize = 64;
const EIGEN_RTOL: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

/// `intercept + sum(coefficients[i] * x[i])` over raw (unscaled) features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept + dot(&self.coefficients, x)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model: LinearModel,
    pub train_mse: f64,
    pub test_mse: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: u64,
}

/// Seeded shuffle split: the first `ceil(n * test_fraction)` indices of the
/// permutation form the test partition, the rest the training partition.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut order = (0..n).collect::<Vec<_>>();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    let n_test = ((n as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(n);
    let test = order[..n_test].to_vec();
    let train = order[n_test..].to_vec();
    (train, test)
}

/// Fit lagged stats -> current-season points and score it on a held-out split.
pub fn train_points_model(rows: &[FeatureRow], opts: &TrainOptions) -> Result<TrainedModel> {
    if rows.is_empty() {
        return Err(ForecastError::InsufficientData {
            rows: 0,
            reason: "the feature table is empty".to_string(),
        });
    }
    if !rows.iter().any(FeatureRow::has_history) {
        return Err(ForecastError::InsufficientData {
            rows: rows.len(),
            reason: "no player has a prior season, so every lag feature is zero".to_string(),
        });
    }

    if !(opts.test_fraction > 0.0 && opts.test_fraction < 1.0) {
        return Err(ForecastError::Config {
            field: "test_fraction".to_string(),
            message: format!(
                "must be between 0 and 1 exclusive, got {}",
                opts.test_fraction
            ),
        });
    }

    let (train_idx, test_idx) = train_test_split(rows.len(), opts.test_fraction, opts.seed);
    if test_idx.is_empty() {
        return Err(ForecastError::InsufficientData {
            rows: rows.len(),
            reason: "the split left no held-out rows to score the model on".to_string(),
        });
    }
    if train_idx.is_empty() {
        return Err(ForecastError::InsufficientData {
            rows: rows.len(),
            reason: format!(
                "a {:.0}% test split leaves no training rows",
                opts.test_fraction * 100.0
            ),
        });
    }

    let x = rows.iter().map(FeatureRow::feature_vector).collect::<Vec<_>>();
    let y = rows.iter().map(|r| r.stats.points).collect::<Vec<_>>();

    let x_train = train_idx.iter().map(|i| x[*i].as_slice()).collect::<Vec<_>>();
    let y_train = train_idx.iter().map(|i| y[*i]).collect::<Vec<_>>();

    let lag_depth = rows[0].lags.len();
    let (intercept, coefficients) = fit_least_squares(&x_train, &y_train);
    let model = LinearModel {
        feature_names: feature_names(lag_depth),
        intercept,
        coefficients,
    };

    let train_mse = mean_squared_error(&model, &x, &y, &train_idx);
    let test_mse = mean_squared_error(&model, &x, &y, &test_idx);

    info!(
        "points model fit train={} test={} seed={} test_mse={:.3}",
        train_idx.len(),
        test_idx.len(),
        opts.seed,
        test_mse
    );
    for (name, coeff) in model.feature_names.iter().zip(&model.coefficients) {
        debug!("  {name:12} coeff={coeff:+.6}");
    }

    Ok(TrainedModel {
        model,
        train_mse,
        test_mse,
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        seed: opts.seed,
    })
}

fn mean_squared_error(model: &LinearModel, x: &[Vec<f64>], y: &[f64], idx: &[usize]) -> f64 {
    if idx.is_empty() {
        return 0.0;
    }
    let sum = idx
        .iter()
        .map(|i| {
            let err = model.predict(&x[*i]) - y[*i];
            err * err
        })
        .sum::<f64>();
    sum / idx.len() as f64
}

/// Ordinary least squares with an intercept.
///
/// Features are centred and scaled, then solved through the eigen-decomposition
/// of the Gram matrix. Directions with (near) zero variance are dropped, which
/// gives the minimum-norm solution when the system is rank deficient, e.g. when
/// there are fewer rows than features.
pub fn fit_least_squares(x: &[&[f64]], y: &[f64]) -> (f64, Vec<f64>) {
    let n = x.len();
    let p = x.first().map(|row| row.len()).unwrap_or(0);
    if n == 0 {
        return (0.0, vec![0.0; p]);
    }

    let y_mean = y.iter().sum::<f64>() / n as f64;
    let (means, stds) = column_norm_stats(x, p);

    let z = x
        .iter()
        .map(|row| {
            (0..p)
                .map(|j| (row[j] - means[j]) / stds[j])
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut gram = vec![vec![0.0; p]; p];
    let mut rhs = vec![0.0; p];
    for (row, target) in z.iter().zip(y) {
        let r = target - y_mean;
        for a in 0..p {
            rhs[a] += row[a] * r;
            for b in a..p {
                gram[a][b] += row[a] * row[b];
            }
        }
    }
    for a in 0..p {
        for b in 0..a {
            gram[a][b] = gram[b][a];
        }
    }

    let (eigenvalues, eigenvectors) = symmetric_eigen(gram);
    let max_eig = eigenvalues.iter().cloned().fold(0.0_f64, f64::max);
    let mut scaled = vec![0.0; p];
    if max_eig > 0.0 {
        for (k, lambda) in eigenvalues.iter().enumerate() {
            if *lambda <= max_eig * EIGEN_RTOL {
                continue;
            }
            let proj = (0..p).map(|j| eigenvectors[j][k] * rhs[j]).sum::<f64>() / lambda;
            for j in 0..p {
                scaled[j] += proj * eigenvectors[j][k];
            }
        }
    }

    let coefficients = (0..p).map(|j| scaled[j] / stds[j]).collect::<Vec<_>>();
    let intercept = y_mean - dot(&coefficients, &means);
    (intercept, coefficients)
}

fn column_norm_stats(x: &[&[f64]], p: usize) -> (Vec<f64>, Vec<f64>) {
    let n = x.len() as f64;
    let mut mean = vec![0.0; p];
    for row in x {
        for j in 0..p {
            mean[j] += row[j];
        }
    }
    for v in &mut mean {
        *v /= n;
    }

    let mut std = vec![0.0; p];
    for row in x {
        for j in 0..p {
            let d = row[j] - mean[j];
            std[j] += d * d;
        }
    }
    for v in &mut std {
        let s = (*v / n).sqrt();
        // Constant columns centre to zero; any scale keeps them at zero.
        *v = if s > 1e-12 { s } else { 1.0 };
    }
    (mean, std)
}

/// Cyclic Jacobi eigen-decomposition of a symmetric matrix.
/// Returns eigenvalues and the eigenvectors as columns (`vectors[row][k]`).
fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v = vec![vec![0.0; n]; n];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let total = a.iter().flatten().map(|x| x * x).sum::<f64>();
    if total == 0.0 {
        return (vec![0.0; n], v);
    }

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[p][q] * a[p][q];
            }
        }
        if off <= total * 1e-30 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let akp = row[p];
                    let akq = row[q];
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let vkp = row[p];
                    let vkq = row[q];
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| a[i][i]).collect();
    (eigenvalues, v)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
