//! Slate assembly with per-artist diversity.
//!
//! Requested artists get a reserved share of the slate (filled round-robin
//! so no single requested artist crowds out the others); the rest comes from
//! a shuffled general pool capped per artist.

use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};

use crate::config::PipelineConfig;
use crate::models::Candidate;

/// Max tracks per non-requested artist taken from the general pool.
const GENERAL_ARTIST_CAP: usize = 1;
/// Max tracks per requested artist, including its round-robin picks.
const REQUESTED_ARTIST_CAP: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct DiversitySelector {
    pub slate_size: usize,
    pub priority_quota: usize,
}

impl DiversitySelector {
    pub fn new(slate_size: usize, priority_quota: usize) -> Self {
        Self {
            slate_size,
            priority_quota: priority_quota.min(slate_size),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.slate_size, config.priority_quota)
    }

    /// Split into one bucket per requested artist (request order) and the rest.
    ///
    /// Buckets are ordered by popularity, highest first; ties keep arrival order.
    fn partition(
        candidates: Vec<Candidate>,
        requested: &[String],
    ) -> (Vec<VecDeque<Candidate>>, Vec<Candidate>) {
        let mut buckets: Vec<Vec<Candidate>> = vec![Vec::new(); requested.len()];
        let mut other = Vec::new();

        for candidate in candidates {
            let slot = candidate
                .explicit_artist_name
                .as_deref()
                .and_then(|name| requested.iter().position(|r| r == name));
            match slot {
                Some(i) => buckets[i].push(candidate),
                None => other.push(candidate),
            }
        }

        let buckets = buckets
            .into_iter()
            .map(|mut bucket| {
                bucket.sort_by_key(|c| Reverse(c.popularity.unwrap_or(0)));
                VecDeque::from(bucket)
            })
            .collect();
        (buckets, other)
    }

    /// Selection before the final shuffle. `requested` holds lowercase
    /// artist keys in priority order.
    pub fn select_ordered<R: Rng + ?Sized>(
        &self,
        candidates: Vec<Candidate>,
        requested: &[String],
        rng: &mut R,
    ) -> Vec<Candidate> {
        let (mut buckets, mut other) = Self::partition(candidates, requested);
        let mut selected: Vec<Candidate> = Vec::with_capacity(self.slate_size);
        let mut artist_counts: HashMap<String, usize> = HashMap::new();

        // Round-robin over requested artists until the quota is met or dry.
        while selected.len() < self.priority_quota {
            let mut added = false;
            for bucket in buckets.iter_mut() {
                if selected.len() >= self.priority_quota {
                    break;
                }
                if let Some(candidate) = bucket.pop_front() {
                    *artist_counts.entry(candidate.artist_key().to_string()).or_default() += 1;
                    selected.push(candidate);
                    added = true;
                }
            }
            if !added {
                break;
            }
        }
        let priority_picks = selected.len();

        other.shuffle(rng);
        for candidate in other {
            if selected.len() >= self.slate_size {
                break;
            }
            let cap = if candidate.is_requested_artist {
                REQUESTED_ARTIST_CAP
            } else {
                GENERAL_ARTIST_CAP
            };
            let count = artist_counts.entry(candidate.artist_key().to_string()).or_default();
            if *count < cap {
                *count += 1;
                selected.push(candidate);
            }
        }
        let general_picks = selected.len() - priority_picks;

        // Still short: hand the remaining slots back to requested artists.
        for bucket in buckets.iter_mut() {
            while selected.len() < self.slate_size {
                match bucket.pop_front() {
                    Some(candidate) => selected.push(candidate),
                    None => break,
                }
            }
        }

        log::info!(
            "Diversity: {} priority, {} general, {} drained (target {})",
            priority_picks,
            general_picks,
            selected.len() - priority_picks - general_picks,
            self.slate_size
        );
        selected
    }

    /// Final slate: [`select_ordered`](Self::select_ordered), then shuffled.
    pub fn select<R: Rng + ?Sized>(
        &self,
        candidates: Vec<Candidate>,
        requested: &[String],
        rng: &mut R,
    ) -> Vec<Candidate> {
        let mut slate = self.select_ordered(candidates, requested, rng);
        slate.shuffle(rng);
        slate
    }
}
