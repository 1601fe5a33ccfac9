use std::collections::{BTreeMap, BTreeSet};

use super::differ::Displacement;
use super::types::{LayoutSnapshot, MemberId, Move, MovePlan, PlanError, Seat};

/// A path component: a chain of source seats whose final destination is a
/// seat that nobody has to leave
struct PathChain {
    seats: Vec<Seat>,
    final_dest: Seat,
    min_seat: Seat,
}

/// Orders the displaced seats into a physically realizable move sequence.
///
/// The displaced seats form a directed graph (seat -> destination of its
/// occupant) where every seat has in- and out-degree at most one, so the
/// graph splits into disjoint simple paths and simple cycles. Paths are
/// emitted tail-first so each destination is already free; cycles are
/// resolved afterwards through a holding seat, which paths may have just
/// vacated. Components are processed in ascending order of their
/// lowest-numbered seat, which makes plans reproducible.
///
/// A path of k edges costs exactly k moves; a cycle of k seats costs k+1.
/// Fails with `NoHoldingSeat` if a cycle must be broken while every seat in
/// the layout is still occupied.
pub fn sequence(
    from: &LayoutSnapshot,
    to: &LayoutSnapshot,
    displacements: &BTreeMap<Seat, Displacement>,
) -> Result<MovePlan, PlanError> {
    // Working occupancy during plan execution. Members absent from the
    // target layout leave the room before any move happens, so their seats
    // start out vacant here.
    let mut occupancy: BTreeMap<Seat, MemberId> = from
        .occupants()
        .iter()
        .filter(|&(_, &member)| to.seat_of(member).is_some())
        .map(|(&seat, &member)| (seat, member))
        .collect();

    // Edges: source seat -> (moving member, destination seat). Members only
    // present in one of the two layouts never move, so they get no edge.
    let mut edges: BTreeMap<Seat, (MemberId, Seat)> = BTreeMap::new();
    for (&seat, disp) in displacements {
        if let Some(member) = disp.outgoing {
            if let Some(dest) = to.seat_of(member) {
                edges.insert(seat, (member, dest));
            }
        }
    }

    // Reverse edges. In-degree is at most one because each destination seat
    // receives exactly one member in a valid target layout.
    let incoming: BTreeMap<Seat, Seat> = edges.iter().map(|(&s, &(_, d))| (d, s)).collect();

    // Decompose into simple paths and simple cycles. Iterating source seats
    // in ascending order means every cycle is entered at its lowest seat.
    let mut visited: BTreeSet<Seat> = BTreeSet::new();
    let mut paths: Vec<PathChain> = Vec::new();
    let mut cycles: Vec<Vec<Seat>> = Vec::new();

    for &start in edges.keys() {
        if visited.contains(&start) {
            continue;
        }

        let mut chain = vec![start];
        let mut cursor = start;
        let is_cycle = loop {
            let (_, next) = edges[&cursor];
            if next == start {
                break true;
            }
            if !edges.contains_key(&next) {
                break false;
            }
            chain.push(next);
            cursor = next;
        };

        if is_cycle {
            visited.extend(chain.iter().copied());
            cycles.push(chain);
        } else {
            // We may have entered mid-path; walk back to the head
            while let Some(&prev) = incoming.get(&chain[0]) {
                chain.insert(0, prev);
            }
            visited.extend(chain.iter().copied());
            let (_, final_dest) = edges[&cursor];
            let min_seat = chain
                .iter()
                .copied()
                .fold(final_dest, |min, seat| min.min(seat));
            paths.push(PathChain {
                seats: chain,
                final_dest,
                min_seat,
            });
        }
    }

    paths.sort_by_key(|p| p.min_seat);
    cycles.sort_by_key(|c| c[0]);

    let mut plan: MovePlan = Vec::new();

    // Paths first: each one ends at a free seat, and resolving it frees its
    // head seat, which cycles can then use as a hole
    for path in &paths {
        let mut dest = path.final_dest;
        for &seat in path.seats.iter().rev() {
            let (member, _) = edges[&seat];
            plan.push(Move {
                member_id: member,
                from_seat: seat,
                to_seat: dest,
            });
            occupancy.remove(&seat);
            occupancy.insert(dest, member);
            dest = seat;
        }
    }

    // Cycles: park the lowest seat's occupant in a holding seat, rotate the
    // rest of the cycle into place, then bring the parked member back in.
    // The hole is free again afterwards, so later cycles can reuse it.
    for chain in &cycles {
        let hole = (1..=from.seat_count())
            .find(|s| !occupancy.contains_key(s))
            .ok_or(PlanError::NoHoldingSeat)?;

        let first = chain[0];
        let (lead, _) = edges[&first];
        plan.push(Move {
            member_id: lead,
            from_seat: first,
            to_seat: hole,
        });
        occupancy.remove(&first);
        occupancy.insert(hole, lead);

        let mut dest = first;
        for &seat in chain.iter().skip(1).rev() {
            let (member, _) = edges[&seat];
            plan.push(Move {
                member_id: member,
                from_seat: seat,
                to_seat: dest,
            });
            occupancy.remove(&seat);
            occupancy.insert(dest, member);
            dest = seat;
        }

        // dest is now the lead's real destination
        plan.push(Move {
            member_id: lead,
            from_seat: hole,
            to_seat: dest,
        });
        occupancy.remove(&hole);
        occupancy.insert(dest, lead);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::differ::diff;

    fn snap(seat_count: Seat, assignments: &[(Seat, Option<MemberId>)]) -> LayoutSnapshot {
        LayoutSnapshot::from_assignments(seat_count, assignments).unwrap()
    }

    fn plan_for(from: &LayoutSnapshot, to: &LayoutSnapshot) -> Result<MovePlan, PlanError> {
        let known: BTreeSet<MemberId> = (1..=100).collect();
        let displacements = diff(from, to, &known).unwrap();
        sequence(from, to, &displacements)
    }

    /// Applies a plan move by move, panicking on any physically impossible
    /// step, and returns the resulting occupancy
    fn apply(from: &LayoutSnapshot, to: &LayoutSnapshot, plan: &[Move]) -> BTreeMap<Seat, MemberId> {
        // members not in the target leave the room before the plan runs
        let mut occupancy: BTreeMap<Seat, MemberId> = from
            .occupants()
            .iter()
            .filter(|&(_, &m)| to.seat_of(m).is_some())
            .map(|(&s, &m)| (s, m))
            .collect();

        for mv in plan {
            assert_eq!(
                occupancy.get(&mv.from_seat),
                Some(&mv.member_id),
                "move {:?}: member not in origin seat",
                mv
            );
            assert!(
                !occupancy.contains_key(&mv.to_seat),
                "move {:?}: destination seat occupied",
                mv
            );
            occupancy.remove(&mv.from_seat);
            occupancy.insert(mv.to_seat, mv.member_id);
        }
        occupancy
    }

    /// Checks that applying the plan lands every shared member in their
    /// target seat
    fn assert_reaches_target(from: &LayoutSnapshot, to: &LayoutSnapshot, plan: &[Move]) {
        let result = apply(from, to, plan);
        let expected: BTreeMap<Seat, MemberId> = to
            .occupants()
            .iter()
            .filter(|&(_, &m)| from.seat_of(m).is_some())
            .map(|(&s, &m)| (s, m))
            .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn identical_layouts_need_no_moves() {
        let a = snap(16, &[(1, Some(1)), (5, Some(2)), (9, Some(3))]);
        assert_eq!(plan_for(&a, &a).unwrap(), vec![]);
    }

    #[test]
    fn simple_path_uses_one_move_per_edge() {
        // member 1: seat 1 -> 2, member 2: seat 2 -> 3, seat 3 free
        let from = snap(3, &[(1, Some(1)), (2, Some(2))]);
        let to = snap(3, &[(2, Some(1)), (3, Some(2))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(
            plan,
            vec![
                Move {
                    member_id: 2,
                    from_seat: 2,
                    to_seat: 3
                },
                Move {
                    member_id: 1,
                    from_seat: 1,
                    to_seat: 2
                },
            ]
        );
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn path_of_length_k_costs_exactly_k_moves() {
        // chain 1 -> 2 -> 3 -> 4 -> 5 with seat 5 free: 4 edges, 4 moves
        let from = snap(16, &[(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, Some(4))]);
        let to = snap(16, &[(2, Some(1)), (3, Some(2)), (4, Some(3)), (5, Some(4))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(plan.len(), 4);
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn two_cycle_with_spare_seat_costs_three_moves() {
        // swap between seats 1 and 2, with seat 3 free as the hole
        let from = snap(3, &[(1, Some(1)), (2, Some(2))]);
        let to = snap(3, &[(1, Some(2)), (2, Some(1))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(
            plan,
            vec![
                Move {
                    member_id: 1,
                    from_seat: 1,
                    to_seat: 3
                },
                Move {
                    member_id: 2,
                    from_seat: 2,
                    to_seat: 1
                },
                Move {
                    member_id: 1,
                    from_seat: 3,
                    to_seat: 2
                },
            ]
        );
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn full_two_cycle_has_no_holding_seat() {
        // N=2, both seats occupied, pure swap: structurally infeasible
        let from = snap(2, &[(1, Some(1)), (2, Some(2))]);
        let to = snap(2, &[(1, Some(2)), (2, Some(1))]);
        assert_eq!(plan_for(&from, &to).unwrap_err(), PlanError::NoHoldingSeat);
    }

    #[test]
    fn cycle_of_length_k_costs_k_plus_one_moves() {
        // 3-cycle 1 -> 2 -> 3 -> 1 with seat 4 free
        let from = snap(4, &[(1, Some(1)), (2, Some(2)), (3, Some(3))]);
        let to = snap(4, &[(2, Some(1)), (3, Some(2)), (1, Some(3))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(plan.len(), 4);
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn path_vacancy_unblocks_a_cycle() {
        // Every seat occupied in `from`, but member 3 is absent from the
        // target, so seat 3 counts as vacant and the 1<->2 swap routes
        // through it
        let from = snap(3, &[(1, Some(1)), (2, Some(2)), (3, Some(3))]);
        let to = snap(3, &[(1, Some(2)), (2, Some(1))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(plan.len(), 3);
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn paths_run_before_cycles_and_free_their_head_seat() {
        // Path: member 3 moves 3 -> 4 (seat 4 free), vacating seat 3.
        // Cycle: 1 <-> 2 swap with no other vacancy; it must reuse seat 3.
        let from = snap(4, &[(1, Some(1)), (2, Some(2)), (3, Some(3))]);
        let to = snap(4, &[(1, Some(2)), (2, Some(1)), (4, Some(3))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(
            plan,
            vec![
                Move {
                    member_id: 3,
                    from_seat: 3,
                    to_seat: 4
                },
                Move {
                    member_id: 1,
                    from_seat: 1,
                    to_seat: 3
                },
                Move {
                    member_id: 2,
                    from_seat: 2,
                    to_seat: 1
                },
                Move {
                    member_id: 1,
                    from_seat: 3,
                    to_seat: 2
                },
            ]
        );
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn multiple_cycles_share_one_hole_sequentially() {
        // Two independent swaps, one spare seat (5): each cycle borrows the
        // hole and gives it back, 3 moves apiece
        let from = snap(5, &[(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, Some(4))]);
        let to = snap(5, &[(1, Some(2)), (2, Some(1)), (3, Some(4)), (4, Some(3))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(plan.len(), 6);
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn independent_components_come_out_in_seat_order() {
        // Two disjoint paths: 9 -> 10 and 1 -> 2; the component containing
        // seat 1 is emitted first
        let from = snap(16, &[(9, Some(1)), (1, Some(2))]);
        let to = snap(16, &[(10, Some(1)), (2, Some(2))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(
            plan,
            vec![
                Move {
                    member_id: 2,
                    from_seat: 1,
                    to_seat: 2
                },
                Move {
                    member_id: 1,
                    from_seat: 9,
                    to_seat: 10
                },
            ]
        );
    }

    #[test]
    fn plans_are_deterministic_for_identical_inputs() {
        let from = snap(
            16,
            &[(1, Some(1)), (2, Some(2)), (4, Some(3)), (7, Some(4)), (8, Some(5))],
        );
        let to = snap(
            16,
            &[(2, Some(1)), (1, Some(2)), (5, Some(3)), (8, Some(4)), (7, Some(5))],
        );
        let first = plan_for(&from, &to).unwrap();
        let second = plan_for(&from, &to).unwrap();
        assert_eq!(first, second);
        assert_reaches_target(&from, &to, &first);
    }

    #[test]
    fn joining_and_leaving_members_produce_no_moves() {
        // member 9 leaves, member 8 joins, member 1 stays put: nothing to do
        let from = snap(16, &[(1, Some(1)), (2, Some(9))]);
        let to = snap(16, &[(1, Some(1)), (3, Some(8))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(plan, vec![]);
    }

    #[test]
    fn seat_vacated_by_a_leaving_member_serves_as_destination() {
        // member 9 leaves seat 2; member 1 takes it over
        let from = snap(16, &[(1, Some(1)), (2, Some(9))]);
        let to = snap(16, &[(2, Some(1))]);
        let plan = plan_for(&from, &to).unwrap();
        assert_eq!(
            plan,
            vec![Move {
                member_id: 1,
                from_seat: 1,
                to_seat: 2
            }]
        );
        assert_reaches_target(&from, &to, &plan);
    }

    #[test]
    fn full_sixteen_seat_reshuffle_is_feasible_with_one_vacancy() {
        // 15 occupied seats rotated by one, seat 16 free the whole time
        let from_seats: Vec<(Seat, Option<MemberId>)> =
            (1..=15).map(|s| (s, Some(s as MemberId))).collect();
        let to_seats: Vec<(Seat, Option<MemberId>)> = (1..=15)
            .map(|s| (s % 15 + 1, Some(s as MemberId)))
            .collect();
        let from = snap(16, &from_seats);
        let to = snap(16, &to_seats);
        let plan = plan_for(&from, &to).unwrap();
        // one 15-cycle resolved through seat 16: 15 + 1 moves
        assert_eq!(plan.len(), 16);
        assert_reaches_target(&from, &to, &plan);
    }
}
