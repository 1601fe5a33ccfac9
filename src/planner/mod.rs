pub mod differ;
pub mod sequencer;
pub mod types;

use std::collections::BTreeSet;

pub use types::{LayoutSnapshot, MemberId, Move, MovePlan, PlanError, Seat};

/// What the planner needs from the layout/member storage: point-in-time
/// snapshots and the universe of known member ids. The store implements
/// this; tests can supply a canned one.
pub trait LayoutSource {
    /// `Ok(None)` when the id is unknown; `Err` when the stored layout
    /// itself is unusable (out-of-range seat, double-placed member)
    fn snapshot(&self, layout_id: i64) -> Result<Option<LayoutSnapshot>, PlanError>;
    fn member_ids(&self) -> BTreeSet<MemberId>;
}

/// Plans the moves that turn the `from` layout into the `to` layout.
///
/// Resolves both ids through `source`, diffs the snapshots and sequences
/// the required moves. Returns either a complete, valid plan (possibly
/// empty) or an error; never a truncated plan. Stored layouts are read
/// once and never mutated.
pub fn plan_between(
    source: &impl LayoutSource,
    from_layout_id: i64,
    to_layout_id: i64,
) -> Result<MovePlan, PlanError> {
    let from = source
        .snapshot(from_layout_id)?
        .ok_or(PlanError::LayoutNotFound(from_layout_id))?;
    let to = source
        .snapshot(to_layout_id)?
        .ok_or(PlanError::LayoutNotFound(to_layout_id))?;

    let known_members = source.member_ids();
    let displacements = differ::diff(&from, &to, &known_members)?;
    let plan = sequencer::sequence(&from, &to, &displacements)?;

    log::debug!(
        "planned {} move(s) from layout {} to layout {}",
        plan.len(),
        from_layout_id,
        to_layout_id
    );
    Ok(plan)
}
