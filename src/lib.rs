// lib.rs
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

//! Bayesian skill ratings and Swiss pairing for two-player games.
//!
//! Each player carries a Gaussian belief about their skill. Finished
//! matches sharpen the belief, and the conservative rating
//! `skill - k * uncertainty` ranks players without rewarding lucky
//! newcomers. The same model predicts how balanced a match will be,
//! which drives greedy Swiss pairing.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use skillpair::{MatchOutcome, PairingEngine, RatingModel};
//!
//! let model = RatingModel::default();
//! let mut ratings = BTreeMap::new();
//! for id in ["ana", "ben", "cho", "dev"] {
//!     ratings.insert(id.to_string(), model.create_initial_rating());
//! }
//!
//! let engine = PairingEngine::new(model.clone());
//! let round = engine.generate_swiss_pairings(&ratings, &[])?;
//! assert_eq!(round.pairings.len(), 2);
//!
//! let (first, second) = round.pairings[0].clone();
//! let outcomes = [MatchOutcome::new(first.clone(), 1), MatchOutcome::new(second.clone(), 2)];
//! let before = [ratings[&first].clone(), ratings[&second].clone()];
//! let updated = model.update_ratings(&before, &outcomes)?;
//! assert!(updated[0].skill() > updated[1].skill());
//! # Ok::<(), skillpair::SkillpairError>(())
//! ```

pub mod algorithm;
pub mod error;
pub mod numeric;
pub mod pairing;
pub mod rating;
pub mod simulation;
pub mod standings;

pub use algorithm::{BalanceCategory, MatchQuality, RatingConfig, RatingModel};
pub use error::{Result, SkillpairError};
pub use pairing::{Pairing, PairingEngine, SwissRound};
pub use rating::{BayesianRating, MatchOutcome, RatingRecord};
pub use simulation::{ConfidenceInterval, SimulationResult, simulate_match};
pub use standings::{leaderboard, percentile_ranks, player_percentile};
