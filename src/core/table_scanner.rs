//! Scans table rows for departure times.
//!
//! A row is assigned to a direction when both its table and the row mention
//! the port. Rows without a port name fall back on table position: the first
//! table is taken as Kalundborg → Ballen, the second as Ballen → Kalundborg.

use crate::core::classifier::classify_by;
use crate::core::tokens::first_time_token;
use crate::domain::model::{Buckets, DepartureCandidate, DomSnapshot};

pub fn scan(snapshot: &DomSnapshot) -> Buckets {
    let mut buckets = Buckets::default();

    for (table_index, table) in snapshot.tables.iter().enumerate() {
        let table_text = table.text.to_lowercase();

        for (row_index, cells) in table.rows.iter().enumerate() {
            let joined = cells.join(" ");
            let Some(time) = first_time_token(&joined) else {
                continue;
            };
            let row_text = joined.to_lowercase();

            let direction = classify_by(|direction| {
                let port = direction.signal();
                table_text.contains(port)
                    && (row_text.contains(port) || table_index == direction.table_position())
            });
            let Some(direction) = direction else {
                continue;
            };

            buckets.push(
                direction,
                DepartureCandidate::new(direction, time).with_row(
                    cells.clone(),
                    table_index,
                    row_index,
                ),
            );
        }
    }

    buckets
}
