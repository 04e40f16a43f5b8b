// Grid addressing - logical (track, pattern) <-> physical pad identifiers
//
// Pads are numbered `row * 10 + column` with rows counted from the bottom,
// both in 1..=8. Pattern 0 of a track sits on the top row of its column.

/// Rows and columns on the playable grid
pub const GRID_SIZE: usize = 8;

/// Physical pad identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PadId(u8);

impl PadId {
    /// Build a grid pad from its physical row and column (both 1..=8)
    pub fn new(row: u8, column: u8) -> Option<Self> {
        let range = 1..=GRID_SIZE as u8;
        if range.contains(&row) && range.contains(&column) {
            Some(Self(row * 10 + column))
        } else {
            None
        }
    }

    /// Wrap any identifier the device uses, control pads included
    pub const fn from_raw(id: u8) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Physical row, counted from the bottom
    pub fn row(self) -> u8 {
        self.0 / 10
    }

    pub fn column(self) -> u8 {
        self.0 % 10
    }

    /// True for pads of the 8x8 playable grid
    pub fn is_grid(self) -> bool {
        Self::new(self.row(), self.column()) == Some(self)
    }
}

impl std::fmt::Display for PadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page-relative location of a grid pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    /// Column within the visible block of tracks (0..8)
    pub track: usize,
    /// Row within the visible block of patterns, 0 at the top
    pub row: usize,
}

/// Pad showing `pattern` of the track drawn in column `track`
///
/// Returns `None` when no pattern is given or the column is off the grid.
/// Patterns beyond the first eight reuse rows; the page offset decides which
/// block is on screen.
pub fn pad_for(track: usize, pattern: Option<usize>) -> Option<PadId> {
    let pattern = pattern?;
    if track >= GRID_SIZE {
        return None;
    }
    let row = (GRID_SIZE - pattern % GRID_SIZE) as u8;
    let column = (track + 1) as u8;
    PadId::new(row, column)
}

/// Inverse of [`pad_for`]; `None` for pads outside the playable grid
pub fn parse_pad(pad: PadId) -> Option<GridPosition> {
    if !pad.is_grid() {
        return None;
    }
    Some(GridPosition {
        track: pad.column() as usize - 1,
        row: GRID_SIZE - pad.row() as usize,
    })
}

/// Every pad of the playable grid, top row first
pub fn grid_pads() -> impl Iterator<Item = PadId> {
    (1..=GRID_SIZE as u8)
        .rev()
        .flat_map(|row| (1..=GRID_SIZE as u8).filter_map(move |column| PadId::new(row, column)))
}

/// Scroll direction on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Tracks (columns)
    X,
    /// Patterns (rows)
    Y,
}

/// Which block of tracks and patterns is currently visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Page of tracks; column `c` shows track `c + 8 * x_offset`
    pub x_offset: usize,
    /// Page of patterns; row `r` shows pattern `r + 8 * y_offset`
    pub y_offset: usize,
}

impl Viewport {
    pub fn new(x_offset: usize, y_offset: usize) -> Self {
        Self { x_offset, y_offset }
    }

    /// First pattern ordinal on the visible page
    pub fn pattern_offset(&self) -> usize {
        self.y_offset * GRID_SIZE
    }

    /// First track ordinal on the visible page
    pub fn track_offset(&self) -> usize {
        self.x_offset * GRID_SIZE
    }

    /// Absolute (track, pattern) for a page-relative pad position
    pub fn to_absolute(&self, position: GridPosition) -> (usize, usize) {
        (
            position.track + self.track_offset(),
            position.row + self.pattern_offset(),
        )
    }

    /// Column showing `track`, if it is on the visible page
    pub fn column_for(&self, track: usize) -> Option<usize> {
        track
            .checked_sub(self.track_offset())
            .filter(|column| *column < GRID_SIZE)
    }

    /// Rows holding a pattern for a track with `pattern_count` patterns
    pub fn patterns_available(&self, pattern_count: usize) -> usize {
        pattern_count
            .saturating_sub(self.pattern_offset())
            .min(GRID_SIZE)
    }

    /// Move one axis by `delta` pages, staying within `0..=max_offset`
    ///
    /// Returns true if the offset changed.
    pub fn scroll(&mut self, axis: Axis, delta: isize, max_offset: usize) -> bool {
        let offset = match axis {
            Axis::X => &mut self.x_offset,
            Axis::Y => &mut self.y_offset,
        };

        let Some(target) = offset.checked_add_signed(delta) else {
            return false;
        };
        if target > max_offset || target == *offset {
            return false;
        }

        *offset = target;
        true
    }
}

/// Last page offset needed to show `count` items
pub fn max_page_offset(count: usize) -> usize {
    count.saturating_sub(1) / GRID_SIZE
}
