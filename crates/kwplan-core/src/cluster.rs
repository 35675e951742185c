//! Text clustering used by the growth planner.
//!
//! The planner only depends on [`TextClusterer`]. [`TfIdfKMeans`] is the
//! bundled implementation: bag-of-words TF-IDF vectors, L2-normalised, grouped
//! with Lloyd's k-means. Centroids are seeded with k-means++ and the best of
//! several seeded restarts is kept.

use crate::error::{KwError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

pub trait TextClusterer {
    /// One group id per input text, in input order. Ids are `0..group_count`.
    fn cluster(&self, texts: &[String], group_count: usize, seed: u64) -> Result<Vec<usize>>;
}

// ---------------------------------------------------------------------------
// TfIdfKMeans
// ---------------------------------------------------------------------------

pub const DEFAULT_RESTARTS: usize = 10;

#[derive(Debug, Clone)]
pub struct TfIdfKMeans {
    pub max_iterations: usize,
    /// Independently seeded runs; the one with the lowest inertia wins.
    pub restarts: usize,
}

impl Default for TfIdfKMeans {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            restarts: DEFAULT_RESTARTS,
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Dense TF-IDF matrix with smoothed idf, rows L2-normalised.
fn tfidf(texts: &[String]) -> Vec<Vec<f64>> {
    let docs: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

    // BTreeMap keeps the vocabulary order stable across runs.
    let mut vocab: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &docs {
        for token in doc {
            vocab.entry(token.as_str()).or_insert(0);
        }
    }
    for (i, slot) in vocab.values_mut().enumerate() {
        *slot = i;
    }

    let n = docs.len() as f64;
    let mut df = vec![0usize; vocab.len()];
    for doc in &docs {
        let mut seen: Vec<usize> = doc.iter().map(|t| vocab[t.as_str()]).collect();
        seen.sort_unstable();
        seen.dedup();
        for col in seen {
            df[col] += 1;
        }
    }
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    docs.iter()
        .map(|doc| {
            let mut row = vec![0.0; vocab.len()];
            for token in doc {
                row[vocab[token.as_str()]] += 1.0;
            }
            for (col, v) in row.iter_mut().enumerate() {
                *v *= idf[col];
            }
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|v| *v /= norm);
            }
            row
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the closest centroid; ties go to the lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// k-means++ seeding: the first centroid is uniform, each next one is drawn
/// with probability proportional to its squared distance from the closest
/// centroid chosen so far.
fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut chosen = vec![rng.gen_range(0..points.len())];
    let mut dist: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &points[chosen[0]]))
        .collect();

    while chosen.len() < k {
        let total: f64 = dist.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut pick = None;
            for (i, &d) in dist.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                pick = Some(i);
                if target < d {
                    break;
                }
                target -= d;
            }
            pick.unwrap_or(0)
        } else {
            // Every point duplicates a centroid; take the first unused one.
            (0..points.len()).find(|i| !chosen.contains(i)).unwrap_or(0)
        };
        chosen.push(next);
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &points[next]));
        }
    }
    chosen.into_iter().map(|i| points[i].clone()).collect()
}

/// Lloyd iterations from `centroids`. Returns the labels and their inertia.
fn lloyd(
    points: &[Vec<f64>],
    mut centroids: Vec<Vec<f64>>,
    max_iterations: usize,
) -> (Vec<usize>, f64) {
    let k = centroids.len();
    let mut labels: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
    for _ in 0..max_iterations {
        // An emptied cluster keeps its old centroid.
        let dims = centroids[0].len();
        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(p) {
                *s += v;
            }
        }
        for (c, sum) in sums.into_iter().enumerate() {
            if counts[c] > 0 {
                centroids[c] = sum.into_iter().map(|s| s / counts[c] as f64).collect();
            }
        }

        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
        if next == labels {
            break;
        }
        labels = next;
    }
    let inertia: f64 = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| squared_distance(p, &centroids[l]))
        .sum();
    (labels, inertia)
}

impl TextClusterer for TfIdfKMeans {
    fn cluster(&self, texts: &[String], group_count: usize, seed: u64) -> Result<Vec<usize>> {
        if group_count == 0 {
            return Err(KwError::Clustering("group count must be at least 1".to_string()));
        }
        if group_count > texts.len() {
            return Err(KwError::Clustering(format!(
                "cannot form {group_count} groups from {} keywords",
                texts.len()
            )));
        }

        let points = tfidf(texts);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut best: Option<(Vec<usize>, f64)> = None;
        for _ in 0..self.restarts.max(1) {
            let centroids = seed_centroids(&points, group_count, &mut rng);
            let (labels, inertia) = lloyd(&points, centroids, self.max_iterations);
            // Ties keep the earlier run.
            if best.as_ref().map_or(true, |(_, b)| inertia < *b - 1e-12) {
                best = Some((labels, inertia));
            }
        }
        Ok(best.map(|(labels, _)| labels).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
