use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::planner::{LayoutSnapshot, LayoutSource, MemberId, PlanError, Seat};

/// A registered member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

/// One seat of a stored layout, in the wire shape the API uses
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub seat_number: Seat,
    pub member_id: Option<MemberId>,
}

/// A saved seating layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLayout {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub seats: Vec<SeatAssignment>,
}

/// In-memory member and layout storage, saved to a JSON file after every
/// mutation (in production this would be a database)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatStore {
    seat_count: Seat,
    members: Vec<Member>,
    layouts: Vec<StoredLayout>,
    next_member_id: MemberId,
    next_layout_id: i64,
}

impl SeatStore {
    pub fn new(seat_count: Seat) -> Self {
        SeatStore {
            seat_count,
            members: Vec::new(),
            layouts: Vec::new(),
            next_member_id: 1,
            next_layout_id: 1,
        }
    }

    /// Loads a store from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let data = fs::read_to_string(path)?;
        let store: SeatStore = serde_json::from_str(&data)?;
        Ok(store)
    }

    /// Saves the store to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn seat_count(&self) -> Seat {
        self.seat_count
    }

    pub fn list_members(&self) -> &[Member] {
        &self.members
    }

    /// Registers a new member and returns it
    pub fn create_member(&mut self, name: &str) -> Result<Member, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Member name is required".to_string());
        }
        let member = Member {
            id: self.next_member_id,
            name: name.to_string(),
        };
        self.next_member_id += 1;
        self.members.push(member.clone());
        Ok(member)
    }

    /// Deletes a member and clears them out of every stored layout, so the
    /// one-member-per-seat invariant keeps holding for saved snapshots
    pub fn delete_member(&mut self, id: MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        if self.members.len() == before {
            return false;
        }
        for layout in &mut self.layouts {
            for seat in &mut layout.seats {
                if seat.member_id == Some(id) {
                    seat.member_id = None;
                }
            }
        }
        true
    }

    pub fn list_layouts(&self) -> &[StoredLayout] {
        &self.layouts
    }

    pub fn get_layout(&self, id: i64) -> Option<&StoredLayout> {
        self.layouts.iter().find(|l| l.id == id)
    }

    /// Finds a layout by numeric id or, failing that, by name (CLI lookup)
    pub fn find_layout(&self, key: &str) -> Option<&StoredLayout> {
        if let Ok(id) = key.parse::<i64>() {
            if let Some(layout) = self.get_layout(id) {
                return Some(layout);
            }
        }
        self.layouts.iter().find(|l| l.name == key)
    }

    /// Saves a new layout after validating its seat list
    pub fn create_layout(
        &mut self,
        name: &str,
        seats: Vec<SeatAssignment>,
    ) -> Result<StoredLayout, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Layout name is required".to_string());
        }
        Self::validate_seats(self.seat_count, &seats)?;

        let layout = StoredLayout {
            id: self.next_layout_id,
            name: name.to_string(),
            created_at: Utc::now(),
            seats,
        };
        self.next_layout_id += 1;
        self.layouts.push(layout.clone());
        Ok(layout)
    }

    /// Replaces the name and seats of an existing layout
    pub fn update_layout(
        &mut self,
        id: i64,
        name: &str,
        seats: Vec<SeatAssignment>,
    ) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Layout name is required".to_string());
        }
        Self::validate_seats(self.seat_count, &seats)?;

        let layout = self
            .layouts
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| format!("Layout {} not found", id))?;
        layout.name = name.to_string();
        layout.seats = seats;
        Ok(())
    }

    pub fn delete_layout(&mut self, id: i64) -> bool {
        let before = self.layouts.len();
        self.layouts.retain(|l| l.id != id);
        self.layouts.len() != before
    }

    // Rejects out-of-range seats and double-placed members before anything
    // is stored; building the snapshot runs exactly those checks
    fn validate_seats(seat_count: Seat, seats: &[SeatAssignment]) -> Result<(), String> {
        let assignments: Vec<(Seat, Option<MemberId>)> = seats
            .iter()
            .map(|s| (s.seat_number, s.member_id))
            .collect();
        LayoutSnapshot::from_assignments(seat_count, &assignments)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

impl LayoutSource for SeatStore {
    fn snapshot(&self, layout_id: i64) -> Result<Option<LayoutSnapshot>, PlanError> {
        let layout = match self.get_layout(layout_id) {
            Some(layout) => layout,
            None => return Ok(None),
        };
        let assignments: Vec<(Seat, Option<MemberId>)> = layout
            .seats
            .iter()
            .map(|s| (s.seat_number, s.member_id))
            .collect();
        // layouts saved through the API were validated on the way in; this
        // only fails for a hand-edited store file
        LayoutSnapshot::from_assignments(self.seat_count, &assignments).map(Some)
    }

    fn member_ids(&self) -> BTreeSet<MemberId> {
        self.members.iter().map(|m| m.id).collect()
    }
}
