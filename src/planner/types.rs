use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seat position within a layout (1..=seat_count)
pub type Seat = u8;

/// Member identifier, assigned by the member store
pub type MemberId = i64;

/// Errors produced while resolving layouts and planning moves
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("layout {0} not found")]
    LayoutNotFound(i64),

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("seat {seat} is outside the seat range 1..={seat_count}")]
    OutOfRange { seat: Seat, seat_count: Seat },

    #[error("a seating cycle needs a holding seat but every seat stays occupied")]
    NoHoldingSeat,
}

impl PlanError {
    /// Stable machine-readable error code, used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            PlanError::LayoutNotFound(_) => "LayoutNotFound",
            PlanError::InvalidLayout(_) => "InvalidLayout",
            PlanError::OutOfRange { .. } => "OutOfRange",
            PlanError::NoHoldingSeat => "NoHoldingSeat",
        }
    }
}

/// A single relocation: one member, one origin seat, one destination seat.
/// Valid only if, at the moment it executes, `from_seat` holds `member_id`
/// and `to_seat` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub member_id: MemberId,
    pub from_seat: Seat,
    pub to_seat: Seat,
}

/// Ordered sequence of moves; a pure output value, never persisted
pub type MovePlan = Vec<Move>;

/// Immutable seat -> occupant mapping for one layout at one point in time.
/// Empty seats are simply absent from the map. Each member occupies at most
/// one seat; the constructor rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSnapshot {
    seat_count: Seat,
    occupants: BTreeMap<Seat, MemberId>,
}

impl LayoutSnapshot {
    /// Creates an all-empty snapshot over `seat_count` seats
    pub fn empty(seat_count: Seat) -> Self {
        LayoutSnapshot {
            seat_count,
            occupants: BTreeMap::new(),
        }
    }

    /// Builds a snapshot from a `(seat_number, member_id)` assignment list,
    /// the shape the layout store hands out. Seats out of `1..=seat_count`
    /// fail with `OutOfRange`; a member appearing in two seats fails with
    /// `InvalidLayout`.
    pub fn from_assignments(
        seat_count: Seat,
        assignments: &[(Seat, Option<MemberId>)],
    ) -> Result<Self, PlanError> {
        let mut occupants: BTreeMap<Seat, MemberId> = BTreeMap::new();
        let mut seats_by_member: BTreeMap<MemberId, Seat> = BTreeMap::new();

        for &(seat, member) in assignments {
            if seat < 1 || seat > seat_count {
                return Err(PlanError::OutOfRange { seat, seat_count });
            }
            if occupants.contains_key(&seat) {
                return Err(PlanError::InvalidLayout(format!(
                    "seat {} is assigned twice",
                    seat
                )));
            }
            if let Some(member) = member {
                if let Some(other) = seats_by_member.insert(member, seat) {
                    return Err(PlanError::InvalidLayout(format!(
                        "member {} occupies both seat {} and seat {}",
                        member, other, seat
                    )));
                }
                occupants.insert(seat, member);
            }
        }

        Ok(LayoutSnapshot {
            seat_count,
            occupants,
        })
    }

    pub fn seat_count(&self) -> Seat {
        self.seat_count
    }

    /// Occupant of `seat`, or None if the seat is empty
    pub fn occupant(&self, seat: Seat) -> Option<MemberId> {
        self.occupants.get(&seat).copied()
    }

    /// The seat `member` sits in, or None if they are not in this layout
    pub fn seat_of(&self, member: MemberId) -> Option<Seat> {
        self.occupants
            .iter()
            .find(|(_, &m)| m == member)
            .map(|(&seat, _)| seat)
    }

    /// Occupied seats in ascending seat order
    pub fn occupants(&self) -> &BTreeMap<Seat, MemberId> {
        &self.occupants
    }
}
