// algorithm.rs
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
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillpairError};
use crate::numeric::{draw_margin, normal_cdf, v_draw, v_win, w_draw, w_win};
use crate::rating::{BayesianRating, MatchOutcome};

/// Parameters of the two-player Gaussian skill model.
///
/// Missing keys fall back to [`Default`] when deserialized, so a partial
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Skill (µ) given to a player before any matches have been played.
    pub default_skill: f64,

    /// Uncertainty (σ) given to a player before any matches have been played.
    pub default_uncertainty: f64,

    /// Number of standard deviations subtracted from skill for the
    /// conservative rating.
    pub confidence_multiplier: f64,

    /// Standard deviation of a single performance around true skill.
    pub beta: f64,

    /// Additive dynamics parameter that lets skill drift between matches.
    pub tau: f64,

    /// Chance that two equally skilled players draw.
    pub draw_probability: f64,

    /// Arbitrary small positive real number that is used to
    /// prevent the variance of the posterior distribution from
    /// becoming too small or negative.
    pub kappa: f64,

    /// Boolean that determines whether to restrict
    /// the value of uncertainty from increasing.
    pub limit_uncertainty: bool,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            default_skill: 25.0,
            default_uncertainty: 25.0 / 3.0,
            confidence_multiplier: 3.0,
            beta: 25.0 / 6.0,
            tau: 25.0 / 300.0,
            draw_probability: 0.1,
            kappa: 0.0001,
            limit_uncertainty: true,
        }
    }
}

impl RatingConfig {
    /// Ensure every parameter is usable by the update math.
    pub fn validate(&self) -> Result<()> {
        if !self.default_skill.is_finite() {
            let msg = format!("default_skill must be finite, not {}", self.default_skill);
            return Err(SkillpairError::ValueError(msg));
        }
        if !self.default_uncertainty.is_finite() || self.default_uncertainty <= 0.0 {
            let msg = format!(
                "default_uncertainty must be positive and finite, not {}",
                self.default_uncertainty
            );
            return Err(SkillpairError::ValueError(msg));
        }
        if !self.confidence_multiplier.is_finite() || self.confidence_multiplier < 0.0 {
            let msg = format!(
                "confidence_multiplier must be non-negative and finite, not {}",
                self.confidence_multiplier
            );
            return Err(SkillpairError::ValueError(msg));
        }
        if !self.beta.is_finite() || self.beta <= 0.0 {
            let msg = format!("beta must be positive and finite, not {}", self.beta);
            return Err(SkillpairError::ValueError(msg));
        }
        if !self.tau.is_finite() || self.tau < 0.0 {
            let msg = format!("tau must be non-negative and finite, not {}", self.tau);
            return Err(SkillpairError::ValueError(msg));
        }
        if !(self.draw_probability > 0.0 && self.draw_probability < 1.0) {
            let msg = format!(
                "draw_probability must lie strictly between 0 and 1, not {}",
                self.draw_probability
            );
            return Err(SkillpairError::ValueError(msg));
        }
        if !(self.kappa > 0.0 && self.kappa < 1.0) {
            let msg = format!("kappa must lie strictly between 0 and 1, not {}", self.kappa);
            return Err(SkillpairError::ValueError(msg));
        }
        Ok(())
    }
}

/// How evenly matched a pairing is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Predicted balance of a two-player match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchQuality {
    /// Gaussian falloff of the skill gap, in `[0, 1]`; 1 means the two
    /// skills are indistinguishable given the combined uncertainty.
    pub quality: f64,
    /// Win probability of each input rating, in input order. The second
    /// is computed as `1 - first`.
    pub win_probabilities: [f64; 2],
    pub skill_difference: f64,
    /// Combined uncertainty `sqrt(σ₁² + σ₂² + 2β²)`.
    pub uncertainty_factor: f64,
}

impl MatchQuality {
    pub fn balance_category(&self) -> BalanceCategory {
        if self.quality >= 0.8 {
            BalanceCategory::Excellent
        } else if self.quality >= 0.6 {
            BalanceCategory::Good
        } else if self.quality >= 0.4 {
            BalanceCategory::Fair
        } else {
            BalanceCategory::Poor
        }
    }

    /// Queue priority from 0 to 10; better balanced matches go first.
    pub fn priority(&self) -> u8 {
        (self.quality.clamp(0.0, 1.0) * 10.0).round() as u8
    }

    /// Rough match length in minutes. Even matches run about an hour and
    /// each point of skill gap takes 45 seconds off, down to zero.
    pub fn expected_duration_minutes(&self) -> u32 {
        let minutes = 45.0 + (1.0 - self.skill_difference / 20.0) * 15.0;
        minutes.round().max(0.0) as u32
    }
}

/// Bayesian skill model for two-participant matches.
///
/// Holds a validated, immutable [`RatingConfig`]; every method is a pure
/// function of its arguments, so one model can be shared across threads.
#[derive(Debug, Clone)]
pub struct RatingModel {
    config: RatingConfig,
    draw_margin: f64,
}

impl Default for RatingModel {
    fn default() -> Self {
        let config = RatingConfig::default();
        let draw_margin = draw_margin(config.draw_probability, config.beta);
        Self {
            config,
            draw_margin,
        }
    }
}

impl RatingModel {
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;
        let draw_margin = draw_margin(config.draw_probability, config.beta);
        Ok(Self {
            config,
            draw_margin,
        })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Performance gap, in skill units, that counts as a draw.
    pub fn draw_margin(&self) -> f64 {
        self.draw_margin
    }

    /// Rating for a player with no match history.
    pub fn create_initial_rating(&self) -> BayesianRating {
        self.create_initial_rating_at(Utc::now())
    }

    pub fn create_initial_rating_at(&self, now: DateTime<Utc>) -> BayesianRating {
        BayesianRating::from_checked(
            self.config.default_skill,
            self.config.default_uncertainty,
            self.config.confidence_multiplier,
            0,
            now,
        )
    }

    /// Combined uncertainty of a two-player match.
    fn combined_uncertainty(&self, a: &BayesianRating, b: &BayesianRating) -> f64 {
        (a.uncertainty().powi(2) + b.uncertainty().powi(2) + 2.0 * self.config.beta.powi(2))
            .sqrt()
    }

    /// Predict balance and win probabilities for exactly two ratings.
    pub fn calculate_match_quality(&self, ratings: &[BayesianRating]) -> Result<MatchQuality> {
        let [a, b] = ratings else {
            return Err(SkillpairError::InvalidArity(ratings.len()));
        };
        Ok(self.pair_quality(a, b))
    }

    pub(crate) fn pair_quality(&self, a: &BayesianRating, b: &BayesianRating) -> MatchQuality {
        let total_uncertainty = self.combined_uncertainty(a, b);
        let skill_difference = (a.skill() - b.skill()).abs();
        let quality = (-skill_difference.powi(2) / (2.0 * total_uncertainty.powi(2))).exp();
        let first = normal_cdf((a.skill() - b.skill()) / total_uncertainty);

        MatchQuality {
            quality,
            win_probabilities: [first, 1.0 - first],
            skill_difference,
            uncertainty_factor: total_uncertainty,
        }
    }

    /// Probability that the two performances land within the draw margin.
    pub fn predict_draw(&self, ratings: &[BayesianRating]) -> Result<f64> {
        let [a, b] = ratings else {
            return Err(SkillpairError::InvalidArity(ratings.len()));
        };
        let c = self.combined_uncertainty(a, b);
        let delta = a.skill() - b.skill();
        let margin = self.draw_margin;
        Ok(normal_cdf((margin - delta) / c) - normal_cdf((-margin - delta) / c))
    }

    /// Update both participants of a finished match.
    ///
    /// The returned ratings are in input order; `ratings[i]` pairs with
    /// `outcomes[i]`. Inputs are left untouched.
    pub fn update_ratings<P>(
        &self,
        ratings: &[BayesianRating],
        outcomes: &[MatchOutcome<P>],
    ) -> Result<Vec<BayesianRating>> {
        self.update_ratings_at(ratings, outcomes, Utc::now())
    }

    /// [`update_ratings`](Self::update_ratings) with an explicit timestamp.
    pub fn update_ratings_at<P>(
        &self,
        ratings: &[BayesianRating],
        outcomes: &[MatchOutcome<P>],
        now: DateTime<Utc>,
    ) -> Result<Vec<BayesianRating>> {
        if ratings.len() != outcomes.len() {
            return Err(SkillpairError::ArityMismatch {
                ratings: ratings.len(),
                outcomes: outcomes.len(),
            });
        }
        let ([first, second], [first_outcome, second_outcome]) = (ratings, outcomes) else {
            return Err(SkillpairError::UnsupportedArity(ratings.len()));
        };
        if first_outcome.rank == 0 || second_outcome.rank == 0 {
            let msg = "ranks are 1-based; 0 is not a placement".to_string();
            return Err(SkillpairError::ValueError(msg));
        }

        let c = self.combined_uncertainty(first, second);
        let is_draw = first_outcome.rank == second_outcome.rank;

        // (v, w, sign) for each participant, seen from its own side
        let corrections = if is_draw {
            let margin = self.draw_margin / c;
            let t = (first.skill() - second.skill()) / c;
            [
                (v_draw(t, margin), w_draw(t, margin), 1.0),
                (v_draw(-t, margin), w_draw(-t, margin), 1.0),
            ]
        } else {
            let first_won = first_outcome.rank < second_outcome.rank;
            let (winner, loser) = if first_won {
                (first, second)
            } else {
                (second, first)
            };
            let t = (winner.skill() - loser.skill()) / c;
            let (v, w) = (v_win(t), w_win(t));
            if first_won {
                [(v, w, 1.0), (v, w, -1.0)]
            } else {
                [(v, w, -1.0), (v, w, 1.0)]
            }
        };

        let updated: Vec<BayesianRating> = [first, second]
            .into_iter()
            .zip(corrections)
            .map(|(rating, (v, w, sign))| {
                self.apply_correction(rating, c, (v, w, sign), !is_draw, now)
            })
            .collect();

        debug!(
            "updated ratings (draw: {is_draw}): skill {:.4} -> {:.4}, {:.4} -> {:.4}; \
             uncertainty {:.4} -> {:.4}, {:.4} -> {:.4}",
            first.skill(),
            updated[0].skill(),
            second.skill(),
            updated[1].skill(),
            first.uncertainty(),
            updated[0].uncertainty(),
            second.uncertainty(),
            updated[1].uncertainty(),
        );

        Ok(updated)
    }

    fn apply_correction(
        &self,
        rating: &BayesianRating,
        c: f64,
        (v, w, sign): (f64, f64, f64),
        decisive: bool,
        now: DateTime<Utc>,
    ) -> BayesianRating {
        let sigma_sq = rating.uncertainty().powi(2);
        let mut skill = rating.skill() + sign * (sigma_sq / c) * v;
        if decisive {
            // a lopsided result shifts by less than one ulp; still move
            skill = if sign > 0.0 {
                skill.max(rating.skill().next_up())
            } else {
                skill.min(rating.skill().next_down())
            };
        }

        let mut scale = 1.0 - w * sigma_sq / (c * c);
        if scale < self.config.kappa {
            warn!(
                "uncertainty floor reached (scale {scale:.3e}); clamping to {}",
                self.config.kappa
            );
            scale = self.config.kappa;
        }
        let shrunk = (sigma_sq * scale).sqrt();

        let drifted = (shrunk.powi(2) + self.config.tau.powi(2)).sqrt();
        let uncertainty = if self.config.limit_uncertainty && drifted >= rating.uncertainty() {
            // every result carries some information, even when w rounds to 0
            shrunk.min(rating.uncertainty().next_down())
        } else {
            drifted
        };

        rating.after_match(skill, uncertainty, now)
    }
}

// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn rating(skill: f64, uncertainty: f64, matches_played: u32) -> BayesianRating {
        BayesianRating::new(skill, uncertainty, 3.0, matches_played, epoch())
            .expect("valid rating")
    }

    fn win_loss() -> Vec<MatchOutcome<&'static str>> {
        vec![MatchOutcome::new("p1", 1), MatchOutcome::new("p2", 2)]
    }

    #[test]
    fn test_always_succeed() {
        assert!(true);
    }

    #[test]
    fn test_default_config() {
        let config = RatingConfig::default();
        assert!(approx_equal(config.default_skill, 25.0, 1e-12));
        assert!(approx_equal(config.default_uncertainty, 25.0 / 3.0, 1e-12));
        assert!(approx_equal(config.beta, 25.0 / 6.0, 1e-12));
        assert!(approx_equal(config.tau, 25.0 / 300.0, 1e-12));
        assert!(approx_equal(config.draw_probability, 0.1, 1e-12));
        assert!(approx_equal(config.kappa, 0.0001, 1e-12));
        assert!(config.limit_uncertainty);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let bad = [
            RatingConfig {
                draw_probability: 0.0,
                ..RatingConfig::default()
            },
            RatingConfig {
                draw_probability: 1.0,
                ..RatingConfig::default()
            },
            RatingConfig {
                beta: 0.0,
                ..RatingConfig::default()
            },
            RatingConfig {
                default_uncertainty: -1.0,
                ..RatingConfig::default()
            },
            RatingConfig {
                tau: f64::NAN,
                ..RatingConfig::default()
            },
            RatingConfig {
                kappa: 0.0,
                ..RatingConfig::default()
            },
        ];
        for config in bad {
            RatingModel::new(config).expect_err("config should be rejected");
        }
    }

    #[test]
    fn test_create_initial_rating() {
        let model = RatingModel::default();
        let r = model.create_initial_rating_at(epoch());
        assert!(approx_equal(r.skill(), 25.0, 1e-12));
        assert!(approx_equal(r.uncertainty(), 8.333333, 1e-5));
        assert!(approx_equal(r.conservative_rating(), 0.0, 1e-9));
        assert!(approx_equal(r.confidence_multiplier(), 3.0, 1e-12));
        assert_eq!(r.matches_played(), 0);
    }

    #[test]
    fn test_quality_requires_two_ratings() {
        let model = RatingModel::default();
        let r = model.create_initial_rating_at(epoch());
        assert_eq!(
            model.calculate_match_quality(&[r.clone()]),
            Err(SkillpairError::InvalidArity(1))
        );
        assert_eq!(
            model.calculate_match_quality(&[r.clone(), r.clone(), r]),
            Err(SkillpairError::InvalidArity(3))
        );
    }

    #[test]
    fn test_quality_of_equal_ratings() {
        let model = RatingModel::default();
        let r = model.create_initial_rating_at(epoch());
        let q = model.calculate_match_quality(&[r.clone(), r]).expect("two ratings");
        assert!(approx_equal(q.quality, 1.0, 1e-12));
        assert!(approx_equal(q.skill_difference, 0.0, 1e-12));
        assert!(approx_equal(q.win_probabilities[0], 0.5, 1e-8));
        assert_eq!(q.balance_category(), BalanceCategory::Excellent);
    }

    #[test]
    fn test_quality_mismatch_sensitivity() {
        let model = RatingModel::default();
        let strong = rating(40.0, 3.0, 30);
        let weak = rating(20.0, 3.0, 30);
        let q = model.calculate_match_quality(&[strong, weak]).expect("two ratings");
        assert!(q.quality < 0.3, "quality = {}", q.quality);
        assert!(q.win_probabilities[0] > 0.8);
        assert_eq!(q.balance_category(), BalanceCategory::Poor);

        let a = rating(25.0, 5.0, 10);
        let b = rating(25.5, 5.0, 10);
        let q = model.calculate_match_quality(&[a, b]).expect("two ratings");
        assert!(q.quality > 0.8, "quality = {}", q.quality);
    }

    #[test]
    fn test_quality_symmetry() {
        let model = RatingModel::default();
        let a = rating(31.0, 4.0, 12);
        let b = rating(22.0, 7.5, 3);
        let ab = model.calculate_match_quality(&[a.clone(), b.clone()]).expect("ab");
        let ba = model.calculate_match_quality(&[b, a]).expect("ba");
        assert_eq!(ab.quality, ba.quality);
        assert_eq!(ab.skill_difference, ba.skill_difference);
        assert_eq!(ab.uncertainty_factor, ba.uncertainty_factor);
        assert!(approx_equal(ab.win_probabilities[0], ba.win_probabilities[1], 1e-9));
        assert!(approx_equal(ab.win_probabilities[1], ba.win_probabilities[0], 1e-9));
        assert_eq!(ab.win_probabilities[0] + ab.win_probabilities[1], 1.0);
    }

    #[test]
    fn test_balance_categories() {
        let quality = |q: f64| MatchQuality {
            quality: q,
            win_probabilities: [0.5, 0.5],
            skill_difference: 0.0,
            uncertainty_factor: 1.0,
        };
        assert_eq!(quality(0.8).balance_category(), BalanceCategory::Excellent);
        assert_eq!(quality(0.79).balance_category(), BalanceCategory::Good);
        assert_eq!(quality(0.6).balance_category(), BalanceCategory::Good);
        assert_eq!(quality(0.45).balance_category(), BalanceCategory::Fair);
        assert_eq!(quality(0.1).balance_category(), BalanceCategory::Poor);
    }

    #[test]
    fn test_priority_and_expected_duration() {
        let model = RatingModel::default();
        let even = model
            .calculate_match_quality(&[rating(25.0, 4.0, 10), rating(25.0, 4.0, 10)])
            .expect("two ratings");
        assert_eq!(even.priority(), 10);
        assert_eq!(even.expected_duration_minutes(), 60);

        let lopsided = model
            .calculate_match_quality(&[rating(45.0, 2.0, 10), rating(25.0, 2.0, 10)])
            .expect("two ratings");
        assert!(lopsided.priority() < even.priority());
        assert_eq!(lopsided.expected_duration_minutes(), 45);

        let quality = |q: f64, gap: f64| MatchQuality {
            quality: q,
            win_probabilities: [0.5, 0.5],
            skill_difference: gap,
            uncertainty_factor: 1.0,
        };
        assert_eq!(quality(0.44, 0.0).priority(), 4);
        assert_eq!(quality(0.46, 0.0).priority(), 5);
        assert_eq!(quality(0.0, 0.0).priority(), 0);
        assert_eq!(quality(0.5, 10.0).expected_duration_minutes(), 53);
        assert_eq!(quality(0.0, 500.0).expected_duration_minutes(), 0);
    }

    #[test]
    fn test_predict_draw() {
        let model = RatingModel::default();
        let r = model.create_initial_rating_at(epoch());
        let even = model.predict_draw(&[r.clone(), r.clone()]).expect("two ratings");
        assert!(even > 0.0 && even < 0.1);

        let far = model
            .predict_draw(&[rating(45.0, 2.0, 40), rating(10.0, 2.0, 40)])
            .expect("two ratings");
        assert!(far < even);
        model.predict_draw(&[r]).expect_err("one rating");
    }

    #[test]
    fn test_update_arity_errors() {
        let model = RatingModel::default();
        let r = model.create_initial_rating_at(epoch());
        let outcomes = win_loss();

        assert_eq!(
            model.update_ratings(&[r.clone()], &outcomes),
            Err(SkillpairError::ArityMismatch {
                ratings: 1,
                outcomes: 2
            })
        );
        let three = vec![
            MatchOutcome::new("p1", 1),
            MatchOutcome::new("p2", 2),
            MatchOutcome::new("p3", 3),
        ];
        assert_eq!(
            model.update_ratings(&[r.clone(), r.clone(), r.clone()], &three),
            Err(SkillpairError::UnsupportedArity(3))
        );
        assert_eq!(
            model.update_ratings(&[r.clone()], &three[..1]),
            Err(SkillpairError::UnsupportedArity(1))
        );
        let zero_rank = vec![MatchOutcome::new("p1", 0), MatchOutcome::new("p2", 1)];
        model
            .update_ratings(&[r.clone(), r], &zero_rank)
            .expect_err("rank 0 is invalid");
    }

    #[test]
    fn test_update_1v1_fresh_players() {
        let model = RatingModel::default();
        let r = model.create_initial_rating_at(epoch());
        let now = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let result = model
            .update_ratings_at(&[r.clone(), r.clone()], &win_loss(), now)
            .expect("1v1 update");

        assert_eq!(2, result.len());
        let (winner, loser) = (&result[0], &result[1]);
        assert!(approx_equal(winner.skill(), 29.205221, 1e-5));
        assert!(approx_equal(loser.skill(), 20.794779, 1e-5));
        assert!(approx_equal(winner.uncertainty(), 7.194964, 1e-5));
        assert!(approx_equal(loser.uncertainty(), 7.194964, 1e-5));
        assert!(approx_equal(
            winner.conservative_rating(),
            winner.skill() - 3.0 * winner.uncertainty(),
            1e-12
        ));
        assert_eq!(winner.matches_played(), 1);
        assert_eq!(loser.last_updated(), now);
    }

    #[test]
    fn test_update_follows_input_order() {
        let model = RatingModel::default();
        let a = rating(25.0, 8.0, 0);
        let b = rating(25.0, 8.0, 0);
        let outcomes = vec![MatchOutcome::new("p1", 2), MatchOutcome::new("p2", 1)];
        let result = model
            .update_ratings(&[a.clone(), b.clone()], &outcomes)
            .expect("update");
        assert!(result[0].skill() < a.skill(), "second place should lose skill");
        assert!(result[1].skill() > b.skill(), "first place should gain skill");
    }

    #[test]
    fn test_update_monotonicity() {
        let model = RatingModel::default();
        let cases = [
            (rating(25.0, 25.0 / 3.0, 0), rating(25.0, 25.0 / 3.0, 0)),
            (rating(35.0, 2.0, 80), rating(18.0, 6.0, 4)),
            (rating(12.0, 1.0, 200), rating(40.0, 1.5, 150)),
            (rating(25.0, 0.3, 500), rating(26.0, 0.4, 500)),
        ];
        let loss_win = vec![MatchOutcome::new("p1", 2), MatchOutcome::new("p2", 1)];
        for (a, b) in cases {
            // first participant wins
            let result = model
                .update_ratings(&[a.clone(), b.clone()], &win_loss())
                .expect("update");
            assert!(result[0].skill() > a.skill());
            assert!(result[1].skill() < b.skill());
            assert!(result[0].uncertainty() < a.uncertainty());
            assert!(result[1].uncertainty() < b.uncertainty());

            // second participant wins
            let result = model
                .update_ratings(&[a.clone(), b.clone()], &loss_win)
                .expect("update");
            assert!(result[0].skill() < a.skill());
            assert!(result[1].skill() > b.skill());
            assert!(result[0].uncertainty() < a.uncertainty());
            assert!(result[1].uncertainty() < b.uncertainty());
        }
    }

    #[test]
    fn test_lopsided_win_still_moves_ratings() {
        let model = RatingModel::default();
        for sigma in [0.5, 1.0] {
            let favourite = rating(50.0, sigma, 300);
            let underdog = rating(0.0, sigma, 300);
            // the expected result barely registers, but it still registers
            let result = model
                .update_ratings(&[favourite.clone(), underdog.clone()], &win_loss())
                .expect("update");
            assert!(result[0].skill() > favourite.skill());
            assert!(result[1].skill() < underdog.skill());
            assert!(result[0].uncertainty() < favourite.uncertainty());
            assert!(result[1].uncertainty() < underdog.uncertainty());
            assert!(result[0].uncertainty() > 0.0 && result[1].uncertainty() > 0.0);
        }
    }

    #[test]
    fn test_update_draw() {
        let model = RatingModel::default();
        let outcomes = vec![MatchOutcome::new("p1", 1), MatchOutcome::new("p2", 1)];

        let r = model.create_initial_rating_at(epoch());
        let result = model
            .update_ratings(&[r.clone(), r.clone()], &outcomes)
            .expect("draw");
        for updated in &result {
            assert!(approx_equal(updated.skill(), r.skill(), 1e-9));
            assert!(updated.uncertainty() < r.uncertainty());
        }

        let favourite = rating(26.0, 4.0, 20);
        let underdog = rating(24.0, 5.0, 10);
        let result = model
            .update_ratings(&[favourite.clone(), underdog.clone()], &outcomes)
            .expect("draw");
        assert!(result[0].skill() < favourite.skill(), "favourite drops on a draw");
        assert!(result[1].skill() > underdog.skill(), "underdog rises on a draw");
        assert!((result[0].skill() - favourite.skill()).abs() < 1.0);
        assert!((result[1].skill() - underdog.skill()).abs() < 1.0);
        assert!(result[0].uncertainty() < favourite.uncertainty());
        assert!(result[1].uncertainty() < underdog.uncertainty());
    }

    #[test]
    fn test_novice_moves_further_than_veteran() {
        let model = RatingModel::default();
        let novice = model.create_initial_rating_at(epoch());
        let veteran = rating(30.0, 2.0, 60);
        let result = model
            .update_ratings(&[novice.clone(), veteran.clone()], &win_loss())
            .expect("upset");

        let novice_skill = (result[0].skill() - novice.skill()).abs();
        let veteran_skill = (result[1].skill() - veteran.skill()).abs();
        assert!(novice_skill > veteran_skill);

        let novice_conservative =
            (result[0].conservative_rating() - novice.conservative_rating()).abs();
        let veteran_conservative =
            (result[1].conservative_rating() - veteran.conservative_rating()).abs();
        assert!(novice_conservative > veteran_conservative);

        let novice_sigma = (result[0].uncertainty() - novice.uncertainty()).abs();
        let veteran_sigma = (result[1].uncertainty() - veteran.uncertainty()).abs();
        assert!(novice_sigma > veteran_sigma);
    }

    #[test]
    fn test_uncertainty_floor_never_reaches_zero() {
        let config = RatingConfig {
            beta: 1e-6,
            tau: 0.0,
            ..RatingConfig::default()
        };
        let model = RatingModel::new(config).expect("valid config");
        // an absurd upset drives the variance scale below kappa
        let a = rating(0.0, 10.0, 0);
        let b = rating(2000.0, 1e-6, 0);
        let result = model
            .update_ratings(&[a.clone(), b], &win_loss())
            .expect("update");
        let sigma = result[0].uncertainty();
        assert!(sigma.is_finite() && sigma > 0.0);
        assert!(approx_equal(sigma, a.uncertainty() * 0.0001f64.sqrt(), 1e-9));
        assert!(result[0].skill().is_finite());
        assert!(result[1].uncertainty() > 0.0);
    }

    #[test]
    fn test_limit_uncertainty_keeps_shrinkage() {
        let veteran = rating(25.0, 0.05, 1000);
        let other = rating(25.0, 0.05, 1000);

        let model = RatingModel::default();
        let limited = model
            .update_ratings(&[veteran.clone(), other.clone()], &win_loss())
            .expect("update");
        assert!(limited[0].uncertainty() < veteran.uncertainty());

        let unlimited = RatingModel::new(RatingConfig {
            limit_uncertainty: false,
            ..RatingConfig::default()
        })
        .expect("valid config");
        let drifted = unlimited
            .update_ratings(&[veteran.clone(), other], &win_loss())
            .expect("update");
        assert!(drifted[0].uncertainty() > veteran.uncertainty());
    }

    #[test]
    fn test_config_deserializes_partial_json() {
        let config: RatingConfig =
            serde_json::from_str(r#"{"beta": 5.0, "draw_probability": 0.2}"#).expect("json");
        assert!(approx_equal(config.beta, 5.0, 1e-12));
        assert!(approx_equal(config.draw_probability, 0.2, 1e-12));
        assert!(approx_equal(config.default_skill, 25.0, 1e-12));
        let model = RatingModel::new(config).expect("valid config");
        assert!(model.draw_margin() > RatingModel::default().draw_margin());
    }

    fn approx_equal(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }
}
