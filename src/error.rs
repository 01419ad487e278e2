// error.rs
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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkillpairError>;

/// Errors returned by the skillpair library.
///
/// Every variant is a deterministic input-validation failure; nothing
/// here is transient, so retrying with the same input never helps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkillpairError {
    /// Match quality was requested for something other than two ratings
    #[error("match quality needs exactly 2 ratings, not {0}")]
    InvalidArity(usize),

    /// The ratings and outcomes handed to an update differ in length
    #[error("got {ratings} ratings but {outcomes} outcomes")]
    ArityMismatch { ratings: usize, outcomes: usize },

    /// Rating updates are only defined for two participants
    #[error("rating updates support exactly 2 participants, not {0}")]
    UnsupportedArity(usize),

    /// Swiss pairing needs an even pool; byes are assigned by the caller
    #[error("cannot pair an odd number of players ({0}); assign a bye first")]
    OddPlayerCount(usize),

    /// Raised when an input value is invalid (e.g., non-positive uncertainty)
    #[error("invalid value: {0}")]
    ValueError(String),
}

// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
