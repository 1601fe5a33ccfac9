use std::collections::{BTreeMap, BTreeSet};

use super::types::{LayoutSnapshot, MemberId, PlanError, Seat};

/// Change required at one seat: who has to leave it and who has to arrive.
/// At least one side is always Some; identical seats never show up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    pub outgoing: Option<MemberId>,
    pub incoming: Option<MemberId>,
}

/// Computes which seats must change occupant between two snapshots.
///
/// Pure function of its inputs. Fails with `InvalidLayout` if the snapshots
/// cover different seat ranges or if `to` places a member id that is not in
/// the known member universe. Range and one-seat-per-member violations are
/// already rejected when the snapshots are constructed.
pub fn diff(
    from: &LayoutSnapshot,
    to: &LayoutSnapshot,
    known_members: &BTreeSet<MemberId>,
) -> Result<BTreeMap<Seat, Displacement>, PlanError> {
    if from.seat_count() != to.seat_count() {
        return Err(PlanError::InvalidLayout(format!(
            "snapshots cover different seat ranges ({} vs {})",
            from.seat_count(),
            to.seat_count()
        )));
    }

    // Every member placed in the target must exist in the member store
    for (&seat, &member) in to.occupants() {
        if !known_members.contains(&member) {
            return Err(PlanError::InvalidLayout(format!(
                "target layout places unknown member {} in seat {}",
                member, seat
            )));
        }
    }

    let mut displacements = BTreeMap::new();
    for seat in 1..=from.seat_count() {
        let outgoing = from.occupant(seat);
        let incoming = to.occupant(seat);
        if outgoing != incoming {
            displacements.insert(seat, Displacement { outgoing, incoming });
        }
    }

    Ok(displacements)
}
