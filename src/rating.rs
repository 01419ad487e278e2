// rating.rs
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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillpairError};

/// A player's skill belief for one game format.
///
/// Values are immutable: an update produces a new rating. The
/// conservative rating is derived from skill and uncertainty whenever
/// either is set and cannot be assigned on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RatingRecord", try_from = "RatingRecord")]
pub struct BayesianRating {
    skill: f64,
    uncertainty: f64,
    confidence_multiplier: f64,
    conservative_rating: f64,
    matches_played: u32,
    last_updated: DateTime<Utc>,
}

impl BayesianRating {
    /// Builds a rating, rejecting non-finite values and non-positive
    /// uncertainty.
    pub fn new(
        skill: f64,
        uncertainty: f64,
        confidence_multiplier: f64,
        matches_played: u32,
        last_updated: DateTime<Utc>,
    ) -> Result<Self> {
        if !skill.is_finite() {
            let msg = format!("skill must be finite, not {skill}");
            return Err(SkillpairError::ValueError(msg));
        }
        if !uncertainty.is_finite() || uncertainty <= 0.0 {
            let msg = format!("uncertainty must be positive and finite, not {uncertainty}");
            return Err(SkillpairError::ValueError(msg));
        }
        if !confidence_multiplier.is_finite() || confidence_multiplier < 0.0 {
            let msg = format!(
                "confidence multiplier must be non-negative and finite, not {confidence_multiplier}"
            );
            return Err(SkillpairError::ValueError(msg));
        }
        Ok(Self::from_checked(
            skill,
            uncertainty,
            confidence_multiplier,
            matches_played,
            last_updated,
        ))
    }

    /// Caller guarantees the values already passed [`new`](Self::new)'s checks.
    pub(crate) fn from_checked(
        skill: f64,
        uncertainty: f64,
        confidence_multiplier: f64,
        matches_played: u32,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            skill,
            uncertainty,
            confidence_multiplier,
            conservative_rating: skill - confidence_multiplier * uncertainty,
            matches_played,
            last_updated,
        }
    }

    /// The belief after one more match. Inputs come from the update math,
    /// which keeps uncertainty above its floor.
    pub(crate) fn after_match(&self, skill: f64, uncertainty: f64, now: DateTime<Utc>) -> Self {
        Self::from_checked(
            skill,
            uncertainty,
            self.confidence_multiplier,
            self.matches_played.saturating_add(1),
            now,
        )
    }

    /// Mean of the skill belief (µ).
    pub fn skill(&self) -> f64 {
        self.skill
    }

    /// Standard deviation of the skill belief (σ), always positive.
    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    pub fn confidence_multiplier(&self) -> f64 {
        self.confidence_multiplier
    }

    /// `skill - confidence_multiplier * uncertainty`
    pub fn conservative_rating(&self) -> f64 {
        self.conservative_rating
    }

    pub fn matches_played(&self) -> u32 {
        self.matches_played
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Computes a single scalar value representing the player's skill,
    /// where their true skill is `z` standard deviations below their mean.
    ///
    /// [`conservative_rating`](Self::conservative_rating) is this value at
    /// `z = confidence_multiplier`.
    pub fn ordinal(&self, z: f64) -> f64 {
        self.skill - z * self.uncertainty
    }
}

/// The persisted shape of a [`BayesianRating`].
///
/// `conservative_rating` is written for the benefit of storage queries
/// (leaderboards sort on it) but ignored when read back; it is always
/// recomputed from skill and uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub skill: f64,
    pub uncertainty: f64,
    pub confidence_multiplier: f64,
    #[serde(default)]
    pub conservative_rating: f64,
    pub matches_played: u32,
    pub last_updated: DateTime<Utc>,
}

impl From<BayesianRating> for RatingRecord {
    fn from(rating: BayesianRating) -> Self {
        Self {
            skill: rating.skill,
            uncertainty: rating.uncertainty,
            confidence_multiplier: rating.confidence_multiplier,
            conservative_rating: rating.conservative_rating,
            matches_played: rating.matches_played,
            last_updated: rating.last_updated,
        }
    }
}

impl TryFrom<RatingRecord> for BayesianRating {
    type Error = SkillpairError;

    fn try_from(record: RatingRecord) -> Result<Self> {
        BayesianRating::new(
            record.skill,
            record.uncertainty,
            record.confidence_multiplier,
            record.matches_played,
            record.last_updated,
        )
    }
}

/// One participant's placement in a finished match.
///
/// `rank` is 1-based: `1` is the winner, higher is worse, and equal ranks
/// are a draw between those participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome<P = String> {
    pub player_id: P,
    pub rank: u32,
    /// Optional raw performance score; carried for the caller's records
    /// and not used by the update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
}

impl<P> MatchOutcome<P> {
    pub fn new(player_id: P, rank: u32) -> Self {
        Self {
            player_id,
            rank,
            performance: None,
        }
    }

    pub fn with_performance(mut self, performance: f64) -> Self {
        self.performance = Some(performance);
        self
    }
}

// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(skill: f64, uncertainty: f64) -> BayesianRating {
        BayesianRating::new(skill, uncertainty, 3.0, 0, DateTime::<Utc>::UNIX_EPOCH)
            .expect("valid rating")
    }

    #[test]
    fn test_conservative_rating_follows_formula() {
        let r = rating(25.0, 25.0 / 3.0);
        assert!(approx_equal(r.conservative_rating(), 0.0, 1e-9));

        let r = rating(30.0, 2.0);
        assert!(approx_equal(r.conservative_rating(), 24.0, 1e-12));
        assert!(approx_equal(r.ordinal(3.0), r.conservative_rating(), 1e-12));
    }

    #[test]
    fn test_ordinal_monotonicity() {
        for i in 0..100 {
            let mu = 10.0 + i as f64 * 0.1;
            let sigma = 2.0 + (i % 10) as f64 * 0.1;

            let ord1 = rating(mu, sigma).ordinal(3.0);
            let ord2 = rating(mu + 0.01, sigma).ordinal(3.0);
            let ord3 = rating(mu, sigma + 0.01).ordinal(3.0);

            assert!(ord2 > ord1, "ordinal should increase with mu");
            assert!(ord3 < ord1, "ordinal should decrease with sigma");
            assert!(ord1.is_finite(), "ordinal should be finite");
        }
    }

    #[test]
    fn test_new_rejects_bad_uncertainty() {
        for sigma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            BayesianRating::new(25.0, sigma, 3.0, 0, DateTime::<Utc>::UNIX_EPOCH)
                .expect_err("uncertainty must be positive and finite");
        }
        BayesianRating::new(f64::NAN, 1.0, 3.0, 0, DateTime::<Utc>::UNIX_EPOCH)
            .expect_err("skill must be finite");
        BayesianRating::new(25.0, 1.0, -3.0, 0, DateTime::<Utc>::UNIX_EPOCH)
            .expect_err("multiplier must be non-negative");
    }

    #[test]
    fn test_after_match_recomputes_and_counts() {
        let before = rating(25.0, 8.0);
        let now = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let after = before.after_match(27.0, 7.0, now);

        assert_eq!(after.matches_played(), 1);
        assert_eq!(after.last_updated(), now);
        assert!(approx_equal(after.conservative_rating(), 6.0, 1e-12));
        // the input rating is untouched
        assert_eq!(before.matches_played(), 0);
        assert!(approx_equal(before.skill(), 25.0, 1e-12));
    }

    #[test]
    fn test_record_round_trip_recomputes_conservative() {
        let record = RatingRecord {
            skill: 20.0,
            uncertainty: 2.0,
            confidence_multiplier: 3.0,
            conservative_rating: 99.0, // stale value from storage
            matches_played: 12,
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
        };
        let rating = BayesianRating::try_from(record).expect("valid record");
        assert!(approx_equal(rating.conservative_rating(), 14.0, 1e-12));
        assert_eq!(rating.matches_played(), 12);

        let back = RatingRecord::from(rating);
        assert!(approx_equal(back.conservative_rating, 14.0, 1e-12));
    }

    #[test]
    fn test_outcome_builder() {
        let outcome = MatchOutcome::new("alice".to_string(), 1).with_performance(42.0);
        assert_eq!(outcome.rank, 1);
        assert_eq!(outcome.performance, Some(42.0));
    }

    fn approx_equal(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }
}
