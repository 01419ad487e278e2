// simulation.rs
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

//! Monte Carlo check of a predicted matchup.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::algorithm::RatingModel;
use crate::error::{Result, SkillpairError};
use crate::rating::BayesianRating;

const Z_95: f64 = 1.96;

// turn counts per game, by outcome
const DRAW_TURNS: std::ops::Range<u32> = 15..25;
const DECISIVE_TURNS: std::ops::Range<u32> = 8..23;

/// Normal-approximation interval on player 1's win rate, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub confidence: f64,
}

/// Observed outcome rates over a batch of simulated games, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub player1_win_rate: f64,
    pub player2_win_rate: f64,
    pub draw_rate: f64,
    pub total_games: u32,
    /// Mean number of turns per simulated game. Draws run longer.
    pub average_game_length: f64,
    pub confidence_interval: ConfidenceInterval,
}

/// Plays `games` independent games between two ratings.
///
/// Each game is a draw with the model's configured draw probability;
/// otherwise player 1 wins with the win probability from
/// [`RatingModel::calculate_match_quality`]. Each game also draws a turn
/// count: 15 to 24 for a draw, 8 to 22 otherwise. The same seed always
/// reproduces the same result.
pub fn simulate_match(
    model: &RatingModel,
    ratings: &[BayesianRating],
    games: u32,
    seed: u64,
) -> Result<SimulationResult> {
    let quality = model.calculate_match_quality(ratings)?;
    if games == 0 {
        let msg = "simulation needs at least one game".to_string();
        return Err(SkillpairError::ValueError(msg));
    }

    let draw_probability = model.config().draw_probability;
    let p1_win_probability = quality.win_probabilities[0];
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let (mut p1_wins, mut p2_wins, mut draws) = (0u32, 0u32, 0u32);
    let mut total_turns = 0u64;
    for _ in 0..games {
        let roll: f64 = rng.gen_range(0.0..1.0);
        let turns = if roll < draw_probability {
            draws += 1;
            rng.gen_range(DRAW_TURNS)
        } else {
            if (roll - draw_probability) / (1.0 - draw_probability) < p1_win_probability {
                p1_wins += 1;
            } else {
                p2_wins += 1;
            }
            rng.gen_range(DECISIVE_TURNS)
        };
        total_turns += u64::from(turns);
    }

    let n = f64::from(games);
    let p1_rate = f64::from(p1_wins) / n;
    let margin = Z_95 * (p1_rate * (1.0 - p1_rate) / n).sqrt();

    debug!(
        "simulated {games} games: {p1_wins} / {p2_wins} / {draws} (expected p1 {:.4})",
        p1_win_probability
    );

    Ok(SimulationResult {
        player1_win_rate: p1_rate * 100.0,
        player2_win_rate: f64::from(p2_wins) / n * 100.0,
        draw_rate: f64::from(draws) / n * 100.0,
        total_games: games,
        average_game_length: total_turns as f64 / n,
        confidence_interval: ConfidenceInterval {
            lower: (p1_rate - margin).max(0.0) * 100.0,
            upper: (p1_rate + margin).min(1.0) * 100.0,
            confidence: 95.0,
        },
    })
}

// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
