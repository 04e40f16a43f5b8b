// SysEx framing for the Launchpad Mini MK3 (programmer's reference)
//
// Every message is `F0 <manufacturer> <family> <command> <payload..> F7`.

use crate::grid::addressing::PadId;
use crate::grid::palette::{Color, LedState};
use crate::launchpad::text::encode_text;

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

pub const NOVATION_MANUFACTURER_ID: [u8; 3] = [0x00, 0x20, 0x29];
pub const DEVICE_FAMILY: [u8; 2] = [0x02, 0x0D];

pub const LAYOUT_COMMAND: u8 = 0x00;
pub const LED_COMMAND: u8 = 0x03;
pub const TEXT_SCROLL_COMMAND: u8 = 0x07;

pub const PROGRAMMER_LAYOUT: u8 = 0x7F;
pub const TEXT_SCROLL_SPEED: u8 = 0x18;

/// Most LED specs the device accepts in one message
pub const MAX_LEDS_PER_MESSAGE: usize = 81;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysEx {
    command: u8,
    payload: Vec<u8>,
}

impl SysEx {
    pub fn new(command: u8, payload: Vec<u8>) -> Self {
        Self { command, payload }
    }

    /// Set one LED: payload `[mode, pad, color]`
    pub fn led(pad: PadId, state: LedState) -> Self {
        Self::leds(&[(pad, state)])
    }

    /// Set several LEDs in one message, one `[mode, pad, color]` spec each
    pub fn leds(leds: &[(PadId, LedState)]) -> Self {
        let payload = leds
            .iter()
            .flat_map(|(pad, state)| [state.mode as u8, pad.raw(), state.color.index()])
            .collect();
        Self::new(LED_COMMAND, payload)
    }

    /// Scroll `text` once across the grid
    pub fn text_scroll(text: &str, color: Color) -> Self {
        let mut payload = vec![0x00, TEXT_SCROLL_SPEED, 0x00, color.index()];
        payload.extend(encode_text(text));
        Self::new(TEXT_SCROLL_COMMAND, payload)
    }

    /// Switch the device to the programmer layout
    pub fn programmer_mode() -> Self {
        Self::new(LAYOUT_COMMAND, vec![PROGRAMMER_LAYOUT])
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Message without the F0/F7 framing
    pub fn body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(6 + self.payload.len());
        body.extend_from_slice(&NOVATION_MANUFACTURER_ID);
        body.extend_from_slice(&DEVICE_FAMILY);
        body.push(self.command);
        body.extend_from_slice(&self.payload);
        body
    }

    /// Complete message ready for the wire
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.payload.len());
        bytes.push(SYSEX_START);
        bytes.extend(self.body());
        bytes.push(SYSEX_END);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_message() {
        let msg = SysEx::led(PadId::from_raw(85), LedState::pulse(Color::Green));
        assert_eq!(msg.body(), vec![0x00, 0x20, 0x29, 0x02, 0x0D, 0x03, 0x02, 85, 0x15]);
    }

    #[test]
    fn test_led_off_is_color_zero() {
        let msg = SysEx::led(PadId::from_raw(11), LedState::OFF);
        assert_eq!(msg.payload(), &[0x00, 11, 0x00]);
    }

    #[test]
    fn test_framing() {
        let bytes = SysEx::programmer_mode().to_bytes();
        assert_eq!(bytes, vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D, 0x00, 0x7F, 0xF7]);
    }

    #[test]
    fn test_led_batch() {
        let msg = SysEx::leds(&[
            (PadId::from_raw(81), LedState::on(Color::Purple)),
            (PadId::from_raw(71), LedState::OFF),
        ]);
        assert_eq!(msg.command(), LED_COMMAND);
        assert_eq!(msg.payload(), &[0x00, 81, 0x33, 0x00, 71, 0x00]);
    }

    #[test]
    fn test_text_scroll() {
        let msg = SysEx::text_scroll("in c", Color::Teal);
        assert_eq!(msg.command(), TEXT_SCROLL_COMMAND);
        assert_eq!(
            msg.payload(),
            &[0x00, 0x18, 0x00, 0x4D, b'I', b'N', b' ', b'C']
        );
    }

    #[test]
    fn test_body_has_no_status_bytes() {
        let msg = SysEx::text_scroll("Hello, World 42", Color::Red);
        assert!(msg.body().iter().all(|b| *b <= 0x7F));
    }
}
