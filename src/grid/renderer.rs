// Grid renderer - target LED states for the session and song-select views
// and reconciliation against what the device currently shows

use crate::grid::addressing::{GRID_SIZE, PadId, Viewport, grid_pads, pad_for};
use crate::grid::palette::{LedState, Role};
use crate::sequencer::clock::Clock;
use std::collections::HashMap;

/// Inputs needed to draw one track's column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnView {
    /// Rows holding a pattern on the visible page (0..=8)
    pub patterns_available: usize,
    pub current: usize,
    pub next: Option<usize>,
    /// First pattern ordinal of the visible page
    pub pattern_offset: usize,
}

impl ColumnView {
    pub fn for_clock(clock: &Clock, viewport: &Viewport) -> Self {
        Self {
            patterns_available: viewport.patterns_available(clock.pattern_count()),
            current: clock.pattern(),
            next: Some(clock.next_pattern()),
            pattern_offset: viewport.pattern_offset(),
        }
    }
}

/// Full target state of one column
pub fn render_column(column: usize, view: &ColumnView) -> Vec<(PadId, LedState)> {
    let current_pad = pad_for(column, Some(view.current));
    let next_pad = pad_for(column, view.next);
    let current_visible =
        view.current >= view.pattern_offset && view.current < view.pattern_offset + GRID_SIZE;

    (0..GRID_SIZE)
        .filter_map(|row| {
            let pad = pad_for(column, Some(row + view.pattern_offset))?;

            let state = if row >= view.patterns_available {
                LedState::OFF
            } else if Some(pad) == next_pad && next_pad != current_pad {
                LedState::pulse(Role::Queued.color())
            } else if Some(pad) == current_pad {
                if current_visible {
                    LedState::pulse(Role::Active.color())
                } else {
                    // Playing on another page
                    LedState::on(Role::Available.color())
                }
            } else {
                LedState::on(Role::Available.color())
            };

            Some((pad, state))
        })
        .collect()
}

/// A column with no track behind it
pub fn render_empty_column(column: usize) -> Vec<(PadId, LedState)> {
    (0..GRID_SIZE)
        .filter_map(|row| pad_for(column, Some(row)).map(|pad| (pad, LedState::OFF)))
        .collect()
}

/// Song-select view: one pad per song, left to right from the top row
pub fn render_collection(count: usize, selected: Option<usize>) -> Vec<(PadId, LedState)> {
    grid_pads()
        .enumerate()
        .map(|(index, pad)| {
            let state = if index >= count {
                LedState::OFF
            } else if Some(index) == selected {
                LedState::on(Role::SongSelected.color())
            } else {
                LedState::on(Role::Song.color())
            };
            (pad, state)
        })
        .collect()
}

/// Last known state of every LED on the device
#[derive(Debug, Default)]
pub struct LedFrame {
    leds: HashMap<PadId, LedState>,
}

impl LedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a target state and return only the LEDs that must change
    pub fn reconcile<I>(&mut self, target: I) -> Vec<(PadId, LedState)>
    where
        I: IntoIterator<Item = (PadId, LedState)>,
    {
        target
            .into_iter()
            .filter(|(pad, state)| self.leds.insert(*pad, *state) != Some(*state))
            .collect()
    }

    pub fn get(&self, pad: PadId) -> Option<LedState> {
        self.leds.get(&pad).copied()
    }

    /// The device was cleared; every grid pad is now off
    pub fn mark_grid_cleared(&mut self) {
        for pad in grid_pads() {
            self.leds.insert(pad, LedState::OFF);
        }
    }

    /// Forget everything, so the next reconcile resends all LEDs
    pub fn invalidate(&mut self) {
        self.leds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::palette::{Color, LedMode};

    fn view(available: usize, current: usize, next: Option<usize>, offset: usize) -> ColumnView {
        ColumnView {
            patterns_available: available,
            current,
            next,
            pattern_offset: offset,
        }
    }

    fn states(column: usize, v: &ColumnView) -> Vec<LedState> {
        render_column(column, v).into_iter().map(|(_, s)| s).collect()
    }

    #[test]
    fn test_three_patterns_current_visible() {
        let states = states(0, &view(3, 1, Some(1), 0));
        assert_eq!(states.len(), 8);
        assert_eq!(states[0], LedState::on(Color::Purple));
        assert_eq!(states[1], LedState::pulse(Color::Green));
        assert_eq!(states[2], LedState::on(Color::Purple));
        for state in &states[3..] {
            assert_eq!(*state, LedState::OFF);
        }
    }

    #[test]
    fn test_queued_pattern_pulses() {
        let states = states(2, &view(4, 0, Some(3), 0));
        assert_eq!(states[0], LedState::pulse(Color::Green));
        assert_eq!(states[3], LedState::pulse(Color::Purple));
        assert_eq!(states[1], LedState::on(Color::Purple));
    }

    #[test]
    fn test_current_off_page_is_static() {
        // Current pattern 1 is on page 0 but page 1 is shown
        let states = states(0, &view(8, 1, Some(1), 8));
        assert_eq!(states[1].mode, LedMode::Static);
        assert_eq!(states[1].color, Color::Purple);
        assert!(states.iter().all(|s| s.mode == LedMode::Static));
    }

    #[test]
    fn test_pads_belong_to_column() {
        let pads: Vec<u8> = render_column(4, &view(8, 0, None, 0))
            .into_iter()
            .map(|(p, _)| p.raw())
            .collect();
        assert_eq!(pads, vec![85, 75, 65, 55, 45, 35, 25, 15]);
    }

    #[test]
    fn test_column_off_grid() {
        assert!(render_column(8, &view(8, 0, None, 0)).is_empty());
    }

    #[test]
    fn test_empty_column() {
        let column = render_empty_column(3);
        assert_eq!(column.len(), 8);
        assert!(column.iter().all(|(_, s)| s.is_off()));
    }

    #[test]
    fn test_render_collection() {
        let pads = render_collection(10, Some(9));
        assert_eq!(pads.len(), 64);
        assert_eq!(pads[0], (PadId::from_raw(81), LedState::on(Color::Pink)));
        // Index 9 is the second pad of the second row
        assert_eq!(pads[9], (PadId::from_raw(72), LedState::on(Color::Red)));
        assert!(pads[10..].iter().all(|(_, s)| s.is_off()));
    }

    #[test]
    fn test_frame_reconcile_sends_only_changes() {
        let mut frame = LedFrame::new();
        let first = frame.reconcile(render_column(0, &view(3, 0, Some(0), 0)));
        assert_eq!(first.len(), 8);

        let unchanged = frame.reconcile(render_column(0, &view(3, 0, Some(0), 0)));
        assert!(unchanged.is_empty());

        let queued = frame.reconcile(render_column(0, &view(3, 0, Some(2), 0)));
        assert_eq!(queued, vec![(PadId::from_raw(61), LedState::pulse(Color::Purple))]);
    }

    #[test]
    fn test_frame_after_clear() {
        let mut frame = LedFrame::new();
        frame.mark_grid_cleared();
        let changes = frame.reconcile(render_column(0, &view(1, 0, Some(0), 0)));
        // Only the lit pad differs from a cleared grid
        assert_eq!(changes, vec![(PadId::from_raw(81), LedState::pulse(Color::Green))]);

        frame.invalidate();
        assert_eq!(frame.get(PadId::from_raw(81)), None);
    }
}
