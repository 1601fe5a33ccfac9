use std::fs::File;
use std::io::Write;

use crate::planner::{MemberId, Move};
use crate::store::SeatStore;

/// Resolves a member id to a display name, falling back to the raw id for
/// members that have since been deleted
pub fn member_display_name(store: &SeatStore, member_id: MemberId) -> String {
    store
        .list_members()
        .iter()
        .find(|m| m.id == member_id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| format!("member #{}", member_id))
}

/// Formats one numbered step of a move plan
pub fn format_move(step: usize, mv: &Move, store: &SeatStore) -> String {
    format!(
        "{}. {}: seat {} -> seat {}",
        step,
        member_display_name(store, mv.member_id),
        mv.from_seat,
        mv.to_seat
    )
}

/// Prints a move plan in execution order
pub fn print_move_plan(plan: &[Move], store: &SeatStore) {
    if plan.is_empty() {
        println!("No moves needed.");
        return;
    }
    println!("Move plan ({} step(s)):", plan.len());
    for (i, mv) in plan.iter().enumerate() {
        println!("  {}", format_move(i + 1, mv, store));
    }
}

/// Writes a move plan to a file, one step per line
pub fn write_plan_to_file(
    plan: &[Move],
    store: &SeatStore,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;
    writeln!(file, "** Move plan ({} step(s)) **", plan.len())?;
    for (i, mv) in plan.iter().enumerate() {
        writeln!(file, "{}", format_move(i + 1, mv, store))?;
    }
    Ok(())
}
