//! Linear one-vs-rest classifier trained with plain SGD on hinge loss.
//!
//! Learning rate follows the "optimal" schedule `1 / (alpha * (t0 + t))`
//! with L2 decay. Each fit starts from zero weights; there is no partial
//! update of an existing model.

use crate::config::ClassifierConfig;
use crate::error::ModelError;
use crate::vectorizer::SparseVector;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

const N_ITER_NO_CHANGE: usize = 5;
const MIN_WEIGHT_SCALE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgdClassifier {
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl SgdClassifier {
    pub fn fit(
        samples: &[SparseVector],
        labels: &[String],
        n_features: usize,
        cfg: &ClassifierConfig,
    ) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if samples.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        let classes: Vec<String> = labels
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        if classes.len() < 2 {
            return Err(ModelError::NotEnoughClasses(classes.len()));
        }

        let mut weights = Vec::with_capacity(classes.len());
        let mut intercepts = Vec::with_capacity(classes.len());
        for class in &classes {
            let targets: Vec<f64> = labels
                .iter()
                .map(|l| if l == class { 1.0 } else { -1.0 })
                .collect();
            let (w, b, epochs) = fit_binary(samples, &targets, n_features, cfg);
            debug!(class = %class, epochs, "fitted binary classifier");
            weights.push(w);
            intercepts.push(b);
        }

        Ok(Self {
            classes,
            weights,
            intercepts,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Signed distance to each class hyperplane, in `classes()` order.
    pub fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| dot(w, x) + b)
            .collect()
    }

    /// Highest-scoring class; ties go to the first in sorted order.
    pub fn predict(&self, x: &SparseVector) -> &str {
        let scores = self.decision_function(x);
        let mut best = 0;
        for (i, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = i;
            }
        }
        &self.classes[best]
    }
}

fn dot(w: &[f64], x: &SparseVector) -> f64 {
    x.iter()
        .filter_map(|(j, v)| w.get(*j).map(|wj| wj * v))
        .sum()
}

/// Returns (weights, intercept, epochs run).
fn fit_binary(
    samples: &[SparseVector],
    targets: &[f64],
    n_features: usize,
    cfg: &ClassifierConfig,
) -> (Vec<f64>, f64, usize) {
    let alpha = cfg.alpha;
    let typw = (1.0 / alpha.sqrt()).sqrt();
    // hinge loss has |dloss| == 1 at p = -typw, so eta0 == typw
    let t0 = 1.0 / (typw * alpha);

    let mut rng = StdRng::seed_from_u64(cfg.random_state);
    let mut order: Vec<usize> = (0..samples.len()).collect();
    let mut w = vec![0.0; n_features];
    let mut w_scale = 1.0;
    let mut b = 0.0;
    let mut t = 1.0;
    let mut best_loss = f64::INFINITY;
    let mut no_improvement = 0;
    let mut epochs = 0;

    for _ in 0..cfg.max_iter {
        epochs += 1;
        order.shuffle(&mut rng);
        let mut sum_loss = 0.0;
        for &i in &order {
            let x = &samples[i];
            let y = targets[i];
            let p = dot(&w, x) * w_scale + b;
            let margin = p * y;
            sum_loss += (1.0 - margin).max(0.0);

            let eta = 1.0 / (alpha * (t0 + t - 1.0));
            w_scale *= 1.0 - eta * alpha;
            if margin < 1.0 {
                let step = eta * y;
                for (j, v) in x {
                    if let Some(wj) = w.get_mut(*j) {
                        *wj += step * v / w_scale;
                    }
                }
                b += step;
            }
            if w_scale < MIN_WEIGHT_SCALE {
                w.iter_mut().for_each(|wj| *wj *= w_scale);
                w_scale = 1.0;
            }
            t += 1.0;
        }

        if sum_loss > best_loss - cfg.tol * samples.len() as f64 {
            no_improvement += 1;
        } else {
            no_improvement = 0;
        }
        if sum_loss < best_loss {
            best_loss = sum_loss;
        }
        if no_improvement >= N_ITER_NO_CHANGE {
            break;
        }
    }

    w.iter_mut().for_each(|wj| *wj *= w_scale);
    (w, b, epochs)
}
