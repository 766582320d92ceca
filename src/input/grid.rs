//! Key grid tracker.
//!
//! Every touch batch is scanned once over all of its pointers. A key that was
//! down is first marked provisionally up and only released in the finalize
//! pass if no pointer in the whole batch hit it, so overlapping fingers never
//! produce a spurious release.

use crate::input::events::TouchBatch;
use crate::util::Rect;

/// Fraction of a cell's size trimmed from each side before hit testing.
const INSET_DIVISOR: i32 = 10;

/// Press state of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Up,
    Down,
    /// Was down, not yet hit by any pointer in the current batch
    DownPendingUp,
    /// Hit by a pointer in the current batch
    DownPendingConfirmedDown,
}

impl KeyState {
    pub fn is_down(self) -> bool {
        !matches!(self, KeyState::Up)
    }
}

/// Transition produced by a batch, keyed by 1-based cell index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridTransition {
    KeyDown(usize),
    KeyUp(usize),
}

/// One cell of the grid.
#[derive(Debug, Clone)]
pub struct GridKey {
    /// 1-based, row-major
    pub index: usize,
    pub bounds: Rect,
    pub state: KeyState,
}

/// An owned, resizable grid of key cells.
#[derive(Debug, Clone)]
pub struct KeyGrid {
    rows: usize,
    cols: usize,
    keys: Vec<GridKey>,
}

impl KeyGrid {
    /// Lays out `rows × cols` equal cells over `area`. All keys start `Up`.
    ///
    /// Zero rows or columns are treated as one.
    pub fn new(rows: usize, cols: usize, area: Rect) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        // Zero-sized cells are allowed and simply never hit.
        let cell_width = area.width.max(0) / cols as i32;
        let cell_height = area.height.max(0) / rows as i32;

        let mut keys = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                keys.push(GridKey {
                    index: row * cols + col + 1,
                    bounds: Rect {
                        x: area.x + col as i32 * cell_width,
                        y: area.y + row as i32 * cell_height,
                        width: cell_width,
                        height: cell_height,
                    },
                    state: KeyState::Up,
                });
            }
        }

        log::debug!("Key grid rebuilt: {rows}x{cols} over {area:?}");
        Self { rows, cols, keys }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[GridKey] {
        &self.keys
    }

    /// Returns the cell at a 1-based index.
    pub fn key(&self, index: usize) -> Option<&GridKey> {
        let key = index.checked_sub(1).and_then(|i| self.keys.get(i));
        debug_assert!(key.is_some(), "grid index {index} out of range");
        key
    }

    pub fn state(&self, index: usize) -> KeyState {
        self.key(index).map(|k| k.state).unwrap_or_default()
    }

    /// Runs the full two-phase update for one batch.
    ///
    /// Only pointers still in contact are scanned; a lifted pointer, or
    /// every pointer on cancel, can release keys but never press them.
    pub fn process_batch(&mut self, batch: &TouchBatch) -> Vec<GridTransition> {
        let mut out = Vec::new();
        let mut live = batch.live_positions().peekable();
        if live.peek().is_none() {
            self.scan(None, &mut out);
        }
        for position in live {
            self.scan(Some(position), &mut out);
        }
        self.finalize(&mut out);
        out
    }

    /// Scans one pointer against every cell.
    pub fn scan(&mut self, position: Option<(f32, f32)>, out: &mut Vec<GridTransition>) {
        for key in &mut self.keys {
            let hit = position.is_some_and(|(x, y)| hits(&key.bounds, x, y));
            if hit {
                if key.state == KeyState::Up {
                    out.push(GridTransition::KeyDown(key.index));
                }
                key.state = KeyState::DownPendingConfirmedDown;
            } else if key.state == KeyState::Down {
                key.state = KeyState::DownPendingUp;
            }
        }
    }

    /// Resolves provisional states after all pointers of a batch were scanned.
    pub fn finalize(&mut self, out: &mut Vec<GridTransition>) {
        for key in &mut self.keys {
            match key.state {
                KeyState::DownPendingUp => {
                    key.state = KeyState::Up;
                    out.push(GridTransition::KeyUp(key.index));
                }
                KeyState::DownPendingConfirmedDown => key.state = KeyState::Down,
                KeyState::Up | KeyState::Down => {}
            }
        }
    }

    /// Releases every key that is currently down.
    pub fn release_all(&mut self) -> Vec<GridTransition> {
        self.keys
            .iter_mut()
            .filter(|key| key.state.is_down())
            .map(|key| {
                key.state = KeyState::Up;
                GridTransition::KeyUp(key.index)
            })
            .collect()
    }
}

fn hits(bounds: &Rect, x: f32, y: f32) -> bool {
    bounds.contains_inset(
        x,
        y,
        bounds.width / INSET_DIVISOR,
        bounds.height / INSET_DIVISOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::events::{Pointer, TouchAction};
    use std::time::Duration;

    fn grid_2x2() -> KeyGrid {
        KeyGrid::new(2, 2, Rect::new(0, 0, 200, 100).unwrap())
    }

    fn pointer(id: u32, x: f32, y: f32) -> Pointer {
        Pointer {
            id,
            x,
            y,
            pressure: 1.0,
            down_time: Duration::ZERO,
            event_time: Duration::ZERO,
        }
    }

    fn batch(action: TouchAction, pointers: Vec<Pointer>) -> TouchBatch {
        TouchBatch::new(action, pointers)
    }

    #[test]
    fn cells_are_row_major_and_one_based() {
        let grid = grid_2x2();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.key(1).unwrap().bounds, Rect::new(0, 0, 100, 50).unwrap());
        assert_eq!(grid.key(2).unwrap().bounds, Rect::new(100, 0, 100, 50).unwrap());
        assert_eq!(grid.key(3).unwrap().bounds, Rect::new(0, 50, 100, 50).unwrap());
    }

    #[test]
    fn center_hits_and_border_does_not() {
        let mut grid = grid_2x2();
        let out = grid.process_batch(&batch(TouchAction::Down { id: 1 }, vec![pointer(1, 100.0, 25.0)]));
        assert!(out.is_empty(), "shared border must not hit: {out:?}");

        let out = grid.process_batch(&batch(TouchAction::Move, vec![pointer(1, 5.0, 25.0)]));
        assert!(out.is_empty(), "inset margin must not hit: {out:?}");

        let (cx, cy) = grid.key(4).unwrap().bounds.center();
        let out = grid.process_batch(&batch(TouchAction::Move, vec![pointer(1, cx, cy)]));
        assert_eq!(out, vec![GridTransition::KeyDown(4)]);
        assert_eq!(grid.state(4), KeyState::Down);
    }

    #[test]
    fn second_pointer_keeps_key_down() {
        let mut grid = grid_2x2();
        let a = pointer(1, 50.0, 25.0);
        let b = pointer(2, 150.0, 25.0);

        grid.process_batch(&batch(TouchAction::Down { id: 1 }, vec![a]));
        let out = grid.process_batch(&batch(TouchAction::Down { id: 2 }, vec![a, b]));
        assert_eq!(out, vec![GridTransition::KeyDown(2)]);

        // Finger b slides onto key 1 while finger a still holds it.
        let b_moved = pointer(2, 55.0, 30.0);
        let out = grid.process_batch(&batch(TouchAction::Move, vec![a, b_moved]));
        assert_eq!(out, vec![GridTransition::KeyUp(2)]);
        assert_eq!(grid.state(1), KeyState::Down);
    }

    #[test]
    fn lifted_pointer_cannot_hit() {
        let mut grid = grid_2x2();
        let a = pointer(1, 50.0, 25.0);
        grid.process_batch(&batch(TouchAction::Down { id: 1 }, vec![a]));
        let out = grid.process_batch(&batch(TouchAction::Up { id: 1 }, vec![a]));
        assert_eq!(out, vec![GridTransition::KeyUp(1)]);
    }

    #[test]
    fn lifting_one_finger_keeps_the_other_key() {
        let mut grid = grid_2x2();
        let a = pointer(1, 50.0, 25.0);
        let b = pointer(2, 150.0, 75.0);
        grid.process_batch(&batch(TouchAction::Down { id: 1 }, vec![a]));
        grid.process_batch(&batch(TouchAction::Down { id: 2 }, vec![a, b]));
        let out = grid.process_batch(&batch(TouchAction::Up { id: 2 }, vec![a, b]));
        assert_eq!(out, vec![GridTransition::KeyUp(4)]);
        assert_eq!(grid.state(1), KeyState::Down);
    }

    #[test]
    fn empty_batch_releases_everything() {
        let mut grid = grid_2x2();
        grid.process_batch(&batch(
            TouchAction::Down { id: 2 },
            vec![pointer(1, 50.0, 25.0), pointer(2, 150.0, 75.0)],
        ));
        let out = grid.process_batch(&batch(TouchAction::Move, Vec::new()));
        assert_eq!(out, vec![GridTransition::KeyUp(1), GridTransition::KeyUp(4)]);
    }

    #[test]
    fn cancel_releases_held_keys() {
        let mut grid = grid_2x2();
        let a = pointer(1, 50.0, 25.0);
        grid.process_batch(&batch(TouchAction::Down { id: 1 }, vec![a]));
        let out = grid.process_batch(&batch(TouchAction::Cancel, vec![a]));
        assert_eq!(out, vec![GridTransition::KeyUp(1)]);
    }

    #[test]
    fn transitions_are_symmetric_per_key() {
        let mut grid = grid_2x2();
        let path = [
            (50.0, 25.0),
            (150.0, 25.0),
            (150.0, 75.0),
            (100.0, 50.0),
            (50.0, 75.0),
            (50.0, 70.0),
        ];
        let mut downs = [0usize; 5];
        let mut ups = [0usize; 5];
        let mut record = |out: Vec<GridTransition>| {
            for t in out {
                match t {
                    GridTransition::KeyDown(i) => downs[i] += 1,
                    GridTransition::KeyUp(i) => ups[i] += 1,
                }
            }
        };
        record(grid.process_batch(&batch(TouchAction::Down { id: 1 }, vec![pointer(1, path[0].0, path[0].1)])));
        for &(x, y) in &path[1..] {
            record(grid.process_batch(&batch(TouchAction::Move, vec![pointer(1, x, y)])));
        }
        let last = path[path.len() - 1];
        record(grid.process_batch(&batch(TouchAction::Up { id: 1 }, vec![pointer(1, last.0, last.1)])));

        assert_eq!(downs, ups);
        assert!(downs.iter().sum::<usize>() >= 3);
    }

    #[test]
    fn release_all_clears_state() {
        let mut grid = grid_2x2();
        grid.process_batch(&batch(TouchAction::Down { id: 1 }, vec![pointer(1, 50.0, 25.0)]));
        assert_eq!(grid.release_all(), vec![GridTransition::KeyUp(1)]);
        assert!(grid.keys().iter().all(|k| k.state == KeyState::Up));
        assert!(grid.release_all().is_empty());
    }
}
