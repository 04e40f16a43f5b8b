// Text encoding for the scrolling-text SysEx message
// The device font covers digits, uppercase letters and space

const SPACE: u8 = 0x20;

/// Character code for `c`, if the device can display it
pub fn char_code(c: char) -> Option<u8> {
    match c {
        ' ' => Some(SPACE),
        '0'..='9' | 'A'..='Z' => Some(c as u8),
        'a'..='z' => Some(c.to_ascii_uppercase() as u8),
        _ => None,
    }
}

/// Encode `text`, replacing unsupported characters with spaces
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            char_code(c).unwrap_or_else(|| {
                log::warn!("cannot display {:?}, using a space", c);
                SPACE
            })
        })
        .collect()
}
