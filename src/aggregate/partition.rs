// Sweep insertion of sorted entries into a non-overlapping partition.

use crate::types::{Entry, EntryId, Timestamp};
use serde::Serialize;

/// One cell of the aggregated partition.
///
/// `services` holds every original entry whose span covers `[start, end)`.
/// For a single `aggregate` call the produced cells are sorted, pairwise
/// non-overlapping, and their union of spans equals the union of the input
/// spans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEntry {
    pub start: Timestamp,
    pub end: Timestamp,
    pub services: Vec<Entry>,
}

impl AggregatedEntry {
    /// Wrap a lone entry in its own cell.
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            start: entry.start,
            end: entry.end,
            services: vec![entry.clone()],
        }
    }

    pub fn duration(&self) -> Timestamp {
        self.end - self.start
    }

    /// The original id of the cell's only service, if it has exactly one
    /// and that service is not synthetic.
    pub fn sole_id(&self) -> Option<EntryId> {
        match self.services.as_slice() {
            [only] => only.provenance.id(),
            _ => None,
        }
    }

    fn is_zero_width(&self) -> bool {
        self.start == self.end
    }
}

/// Merge a sorted list of possibly-overlapping entries into a
/// non-overlapping partition.
///
/// `entries` must be sorted by `(start, end)` ascending; callers sort
/// during series preparation. Unsorted input is a programmer error checked
/// in debug builds only.
///
/// Instant events (`start == end`) become their own zero-width cell and are
/// otherwise passed through unchanged.
pub fn aggregate(entries: &[Entry]) -> Vec<AggregatedEntry> {
    debug_assert!(
        entries
            .windows(2)
            .all(|w| (w[0].start, w[0].end) <= (w[1].start, w[1].end)),
        "aggregate() requires input sorted by (start, end)"
    );

    let mut cells: Vec<AggregatedEntry> = Vec::new();
    // Cells left of this index end at or before the current entry's start
    // and can never intersect it again; the index only moves forward
    // because the input is sorted by start.
    let mut scan = 0;
    for entry in entries {
        while scan < cells.len() && cells[scan].end <= entry.start {
            scan += 1;
        }
        if entry.is_instant() {
            let mut pos = scan;
            while pos < cells.len() && cells[pos].start <= entry.start {
                pos += 1;
            }
            cells.insert(pos, AggregatedEntry::from_entry(entry));
            continue;
        }
        insert_spanning(&mut cells, scan, entry);
    }
    cells
}

/// Walk the cells intersecting `[entry.start, entry.end)`, splitting and
/// extending the partition so the entry's whole span is covered.
fn insert_spanning(cells: &mut Vec<AggregatedEntry>, scan: usize, entry: &Entry) {
    let mut start = entry.start;
    let end = entry.end;
    let mut i = scan;

    while start < end && i < cells.len() {
        if cells[i].start >= end {
            break;
        }
        if cells[i].is_zero_width() || cells[i].end <= start {
            i += 1;
            continue;
        }
        let c_start = cells[i].start;
        let c_end = cells[i].end;

        if start < c_start {
            // Uncovered gap before this cell gets its own cell.
            let gap_end = end.min(c_start);
            cells.insert(
                i,
                AggregatedEntry {
                    start,
                    end: gap_end,
                    services: vec![entry.clone()],
                },
            );
            start = gap_end;
            i += 1;
        } else if start == c_start {
            if end < c_end {
                // The entry stops inside the cell: split off the tail it
                // does not cover, keeping the tail's prior services.
                let mut trailing = cells[i].clone();
                trailing.start = end;
                cells[i].end = end;
                cells[i].services.push(entry.clone());
                cells.insert(i + 1, trailing);
                return;
            }
            cells[i].services.push(entry.clone());
            start = c_end;
            i += 1;
        } else {
            // start > c_start: split the cell at the entry's start; the
            // trailing half is intersected on the next pass.
            let mut trailing = cells[i].clone();
            trailing.start = start;
            cells[i].end = start;
            cells.insert(i + 1, trailing);
            i += 1;
        }
    }

    if start < end {
        // Remainder past every existing cell in range.
        cells.insert(
            i,
            AggregatedEntry {
                start,
                end,
                services: vec![entry.clone()],
            },
        );
    }
}
