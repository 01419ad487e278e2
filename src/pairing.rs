// pairing.rs
// Copyright 2025 Patrick Meade
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Greedy quality-maximizing Swiss pairing.
//!
//! Players are seeded by conservative rating, highest first. Each
//! unpaired player in seed order takes the not-yet-paired, lower-seeded
//! opponent with the best match quality, skipping rematches. Equal
//! qualities go to the higher seed. A single pass is not guaranteed to
//! find the best perfect matching, and a player whose every remaining
//! candidate is a rematch is left out of the round.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::{MatchQuality, RatingModel};
use crate::error::{Result, SkillpairError};
use crate::rating::BayesianRating;

/// Two player IDs meeting in a round, higher seed first. Treated as
/// unordered when checking for rematches.
pub type Pairing<P> = (P, P);

/// Candidate count at which the opponent scan moves onto the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Pairings for one Swiss round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwissRound<P> {
    pub pairings: Vec<Pairing<P>>,
    /// `qualities[i]` belongs to `pairings[i]`, with win probabilities in
    /// the pairing's order.
    pub qualities: Vec<MatchQuality>,
    /// Players with no eligible opponent left, in seed order. They need a
    /// bye or a relaxed second pass from the caller.
    pub unpaired: Vec<P>,
}

impl<P> SwissRound<P> {
    /// Mean quality across the round's pairings, 0 for an empty round.
    pub fn overall_quality(&self) -> f64 {
        if self.qualities.is_empty() {
            return 0.0;
        }
        self.qualities.iter().map(|q| q.quality).sum::<f64>() / self.qualities.len() as f64
    }
}

#[derive(Debug, Clone)]
pub struct PairingEngine {
    model: RatingModel,
    parallel_threshold: usize,
}

impl Default for PairingEngine {
    fn default() -> Self {
        Self::new(RatingModel::default())
    }
}

impl PairingEngine {
    pub fn new(model: RatingModel) -> Self {
        Self {
            model,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Scan candidates in parallel once at least `threshold` remain.
    /// The result is identical either way.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn model(&self) -> &RatingModel {
        &self.model
    }

    /// Pair the next Swiss round.
    ///
    /// `ratings` is any iterator of `(id, rating)`, such as `&HashMap` or
    /// `&BTreeMap`. Seeding is a stable sort, so players with equal
    /// conservative ratings keep the iterator's order.
    /// `previous_pairings` lists earlier meetings in either order.
    pub fn generate_swiss_pairings<'a, P, I>(
        &self,
        ratings: I,
        previous_pairings: &[Pairing<P>],
    ) -> Result<SwissRound<P>>
    where
        P: Clone + Eq + Hash + Debug + Sync + 'a,
        I: IntoIterator<Item = (&'a P, &'a BayesianRating)>,
    {
        let mut pool: Vec<(&P, &BayesianRating)> = ratings.into_iter().collect();
        if pool.len() % 2 == 1 {
            return Err(SkillpairError::OddPlayerCount(pool.len()));
        }
        pool.sort_by(|a, b| b.1.conservative_rating().total_cmp(&a.1.conservative_rating()));

        let played: HashSet<(&P, &P)> = previous_pairings
            .iter()
            .flat_map(|(a, b)| [(a, b), (b, a)])
            .collect();

        let num_players = pool.len();
        let mut paired = vec![false; num_players];
        let mut round = SwissRound {
            pairings: Vec::with_capacity(num_players / 2),
            qualities: Vec::with_capacity(num_players / 2),
            unpaired: Vec::new(),
        };

        for i in 0..num_players {
            if paired[i] {
                continue;
            }
            match self.best_opponent(&pool, &paired, &played, i) {
                Some((j, quality)) => {
                    trace!(
                        "paired {:?} with {:?} (quality {:.4})",
                        pool[i].0,
                        pool[j].0,
                        quality.quality
                    );
                    paired[i] = true;
                    paired[j] = true;
                    round.pairings.push((pool[i].0.clone(), pool[j].0.clone()));
                    round.qualities.push(quality);
                }
                None => {
                    warn!("no eligible opponent left for {:?}; leaving unpaired", pool[i].0);
                    round.unpaired.push(pool[i].0.clone());
                }
            }
        }

        debug!(
            "swiss round: {} players, {} pairings, {} unpaired, overall quality {:.4}",
            num_players,
            round.pairings.len(),
            round.unpaired.len(),
            round.overall_quality()
        );

        Ok(round)
    }

    /// Best remaining opponent below seed `i`; ties go to the lower index.
    fn best_opponent<'p, P>(
        &self,
        pool: &[(&'p P, &BayesianRating)],
        paired: &[bool],
        played: &HashSet<(&'p P, &'p P)>,
        i: usize,
    ) -> Option<(usize, MatchQuality)>
    where
        P: Eq + Hash + Sync,
    {
        let (player, rating) = pool[i];
        let eligible = |j: &usize| !paired[*j] && !played.contains(&(player, pool[*j].0));
        let score = |j: usize| (j, self.model.pair_quality(rating, pool[j].1));

        if pool.len() - i - 1 >= self.parallel_threshold {
            (i + 1..pool.len())
                .into_par_iter()
                .filter(eligible)
                .map(score)
                .reduce_with(|a, b| {
                    if b.1.quality > a.1.quality || (b.1.quality == a.1.quality && b.0 < a.0) {
                        b
                    } else {
                        a
                    }
                })
        } else {
            let mut best: Option<(usize, MatchQuality)> = None;
            for (j, quality) in (i + 1..pool.len()).filter(eligible).map(score) {
                let better = match &best {
                    Some((_, current)) => quality.quality > current.quality,
                    None => true,
                };
                if better {
                    best = Some((j, quality));
                }
            }
            best
        }
    }
}

// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
