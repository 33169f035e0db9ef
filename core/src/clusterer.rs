use crate::detector::{hamming_distance, Fingerprint};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A group of filenames that share one fingerprint, or lie within the
/// soft threshold of the group's representative after a soft merge.
/// Files keep their insertion order; the first member is the one a
/// duplicate sweep keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCluster {
    pub fingerprint: Fingerprint,
    pub files: Vec<String>,
}

/// Insertion-ordered buckets keyed by exact fingerprint equality.
///
/// Bucket order and member order both matter: the soft merge is greedy
/// and first-match, so identical input order must reproduce identical
/// clusters.
#[derive(Debug, Default)]
pub struct HashBuckets {
    order: Vec<HashCluster>,
    index: FxHashMap<Fingerprint, usize>,
}

impl HashBuckets {
    pub fn insert(&mut self, fingerprint: Fingerprint, filename: String) {
        match self.index.get(&fingerprint) {
            Some(&position) => self.order[position].files.push(filename),
            None => {
                self.index.insert(fingerprint, self.order.len());
                self.order.push(HashCluster {
                    fingerprint,
                    files: vec![filename],
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Finalizes the buckets into clusters. With a soft threshold the
    /// exact buckets are re-grouped by `soft_merge`; without one they are
    /// the final clusters.
    pub fn into_clusters(self, soft_threshold: Option<u32>) -> Vec<HashCluster> {
        match soft_threshold {
            Some(threshold) => soft_merge(self.order, threshold),
            None => self.order,
        }
    }
}

/// Greedy re-grouping of exact buckets under a Hamming threshold.
///
/// Each incoming bucket is compared against the representatives of the
/// clusters accumulated so far, in insertion order, and joins the first
/// whose distance is strictly below `threshold`; otherwise it opens a new
/// cluster keyed by its own fingerprint. Members are never re-compared,
/// only representatives, so the outcome depends on input order.
fn soft_merge(buckets: Vec<HashCluster>, threshold: u32) -> Vec<HashCluster> {
    let mut merged: Vec<HashCluster> = Vec::new();
    for bucket in buckets {
        match merged
            .iter_mut()
            .find(|cluster| hamming_distance(cluster.fingerprint, bucket.fingerprint) < threshold)
        {
            Some(cluster) => cluster.files.extend(bucket.files),
            None => merged.push(bucket),
        }
    }
    merged
}
