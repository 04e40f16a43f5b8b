// Pitch tokens - note names ("C#4", "Db3") and raw note numbers

pub const MAX_NOTE: i32 = 127;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PitchError {
    #[error("empty pitch token")]
    Empty,

    #[error("'{0}' is not a note name")]
    InvalidName(String),

    #[error("'{token}' resolves to {number}, outside 0..=127")]
    OutOfRange { token: String, number: i32 },
}

fn semitone(letter: char) -> Option<i32> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parse a token into an unbounded note number, `C4 = 60`
pub fn note_number(token: &str) -> Result<i32, PitchError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(PitchError::Empty);
    }

    if let Ok(number) = token.parse::<i32>() {
        return Ok(number);
    }

    let invalid = || PitchError::InvalidName(token.to_string());
    let mut chars = token.chars();
    let base = chars.next().and_then(semitone).ok_or_else(invalid)?;

    let rest = chars.as_str();
    let accidentals = rest
        .chars()
        .take_while(|c| *c == '#' || *c == 'b')
        .count();
    let shift: i32 = rest[..accidentals]
        .chars()
        .map(|c| if c == '#' { 1 } else { -1 })
        .sum();

    let octave: i32 = rest[accidentals..].parse().map_err(|_| invalid())?;
    octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|n| n.checked_add(base + shift))
        .ok_or_else(invalid)
}

/// Parse a token and shift it by whole octaves, keeping the result playable
pub fn resolve_note(token: &str, octave_offset: i8) -> Result<u8, PitchError> {
    let number = note_number(token)?.saturating_add(i32::from(octave_offset) * 12);
    if (0..=MAX_NOTE).contains(&number) {
        Ok(number as u8)
    } else {
        Err(PitchError::OutOfRange {
            token: token.to_string(),
            number,
        })
    }
}
