// standings.rs
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

//! Ranking a population by conservative rating.

use crate::rating::BayesianRating;

/// Share of `all_ratings` with a strictly lower conservative rating, as a
/// percentage in `[0, 100]`. An empty population gives 0.
///
/// `all_ratings` normally includes `rating` itself, which is never counted
/// against it; the top player of five therefore sits at 80, not 100.
pub fn player_percentile<'a, I>(rating: &BayesianRating, all_ratings: I) -> f64
where
    I: IntoIterator<Item = &'a BayesianRating>,
{
    let score = rating.conservative_rating();
    let mut total = 0usize;
    let mut below = 0usize;
    for other in all_ratings {
        total += 1;
        if other.conservative_rating() < score {
            below += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    below as f64 / total as f64 * 100.0
}

/// [`player_percentile`] for every player at once, in input order.
pub fn percentile_ranks<'a, P, I>(ratings: I) -> Vec<(P, f64)>
where
    P: Clone + 'a,
    I: IntoIterator<Item = (&'a P, &'a BayesianRating)>,
{
    let entries: Vec<(&P, f64)> = ratings
        .into_iter()
        .map(|(id, rating)| (id, rating.conservative_rating()))
        .collect();
    let mut sorted: Vec<f64> = entries.iter().map(|(_, score)| *score).collect();
    sorted.sort_by(f64::total_cmp);

    let total = sorted.len() as f64;
    entries
        .into_iter()
        .map(|(id, score)| {
            let below = sorted.partition_point(|other| *other < score);
            (id.clone(), below as f64 / total * 100.0)
        })
        .collect()
}

/// The top `limit` players by conservative rating, best first. Equal
/// ratings keep their input order.
pub fn leaderboard<'a, P, I>(ratings: I, limit: usize) -> Vec<(&'a P, &'a BayesianRating)>
where
    I: IntoIterator<Item = (&'a P, &'a BayesianRating)>,
{
    let mut board: Vec<(&P, &BayesianRating)> = ratings.into_iter().collect();
    board.sort_by(|a, b| b.1.conservative_rating().total_cmp(&a.1.conservative_rating()));
    board.truncate(limit);
    board
}

// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
