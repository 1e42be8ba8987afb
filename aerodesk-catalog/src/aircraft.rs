use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aerodesk_core::{CoreError, CoreResult};

use crate::seat::{Seat, SeatClass, SeatState};

/// Seat columns are lettered A.. so the grid is capped at 26 columns wide.
pub const MAX_COLUMNS: i32 = 26;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: Uuid,
    pub model: String,
    pub rows: i32,
    pub columns: i32,
    /// Always rows * columns. Recomputed whenever the grid is regenerated.
    pub capacity: i32,
}

impl Aircraft {
    pub fn new(model: impl Into<String>, rows: i32, columns: i32) -> CoreResult<Self> {
        validate_grid(rows, columns)?;
        Ok(Aircraft {
            id: Uuid::new_v4(),
            model: model.into(),
            rows,
            columns,
            capacity: rows * columns,
        })
    }

    /// Generate the full seat grid for this aircraft, one seat per
    /// (row, column) pair, tier assigned from the row.
    pub fn generate_seats(&self) -> Vec<Seat> {
        let mut seats = Vec::with_capacity((self.rows * self.columns) as usize);
        for row in 1..=self.rows {
            for col_idx in 0..self.columns {
                let column = column_letter(col_idx);
                seats.push(Seat {
                    id: Uuid::new_v4(),
                    aircraft_id: self.id,
                    number: format!("{row}{column}"),
                    row,
                    column,
                    class: SeatClass::from_row(row),
                    state: SeatState::Available,
                });
            }
        }
        seats
    }
}

/// Updatable aircraft fields. Grid changes are only honored while no
/// reservation references the aircraft's seats; the store enforces that.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AircraftPatch {
    pub model: Option<String>,
    pub rows: Option<i32>,
    pub columns: Option<i32>,
}

impl AircraftPatch {
    pub fn resizes(&self) -> bool {
        self.rows.is_some() || self.columns.is_some()
    }

    pub fn apply(self, aircraft: &mut Aircraft) -> CoreResult<()> {
        let rows = self.rows.unwrap_or(aircraft.rows);
        let columns = self.columns.unwrap_or(aircraft.columns);
        validate_grid(rows, columns)?;

        if let Some(model) = self.model {
            aircraft.model = model;
        }
        aircraft.rows = rows;
        aircraft.columns = columns;
        aircraft.capacity = rows * columns;
        Ok(())
    }
}

pub fn validate_grid(rows: i32, columns: i32) -> CoreResult<()> {
    if rows < 1 {
        return Err(CoreError::validation("an aircraft needs at least one row"));
    }
    if columns < 1 {
        return Err(CoreError::validation(
            "an aircraft needs at least one column",
        ));
    }
    if columns > MAX_COLUMNS {
        return Err(CoreError::validation(format!(
            "seat columns are lettered A-Z, at most {MAX_COLUMNS} columns"
        )));
    }
    Ok(())
}

pub fn column_letter(col_idx: i32) -> char {
    (b'A' + col_idx as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_grid_generation() {
        // 3 rows x 2 columns: six seats, all first class.
        let aircraft = Aircraft::new("E190", 3, 2).unwrap();
        assert_eq!(aircraft.capacity, 6);

        let seats = aircraft.generate_seats();
        assert_eq!(seats.len(), 6);
        assert!(seats.iter().all(|s| s.class == SeatClass::First));
        assert!(seats.iter().all(|s| s.state == SeatState::Available));
        assert_eq!(seats[0].number, "1A");
        assert_eq!(seats[1].number, "1B");
        assert_eq!(seats[5].number, "3B");
    }

    #[test]
    fn test_tiers_across_large_grid() {
        let aircraft = Aircraft::new("A320", 12, 6).unwrap();
        let seats = aircraft.generate_seats();
        assert_eq!(seats.len(), 72);
        let first = seats.iter().filter(|s| s.class == SeatClass::First).count();
        let business = seats
            .iter()
            .filter(|s| s.class == SeatClass::Business)
            .count();
        let economy = seats
            .iter()
            .filter(|s| s.class == SeatClass::Economy)
            .count();
        assert_eq!(first, 3 * 6);
        assert_eq!(business, 7 * 6);
        assert_eq!(economy, 2 * 6);
    }

    #[test]
    fn test_grid_bounds_rejected() {
        assert!(Aircraft::new("E190", 0, 4).is_err());
        assert!(Aircraft::new("E190", 10, 0).is_err());
        assert!(Aircraft::new("E190", 10, 27).is_err());
    }

    #[test]
    fn test_patch_recomputes_capacity() {
        let mut aircraft = Aircraft::new("E190", 3, 2).unwrap();
        let patch = AircraftPatch {
            model: None,
            rows: Some(5),
            columns: None,
        };
        patch.apply(&mut aircraft).unwrap();
        assert_eq!(aircraft.capacity, 10);

        let bad = AircraftPatch {
            model: None,
            rows: None,
            columns: Some(27),
        };
        assert!(bad.apply(&mut aircraft).is_err());
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), 'A');
        assert_eq!(column_letter(5), 'F');
        assert_eq!(column_letter(25), 'Z');
    }
}
