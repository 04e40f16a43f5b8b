// MIDI device access - port lookup by name and output connections

use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "Grid Looper";

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("MIDI init error: {0}")]
    Init(#[from] midir::InitError),

    #[error("No MIDI port matching '{0}'")]
    PortNotFound(String),

    #[error("MIDI connection failed: {0}")]
    Connect(String),

    #[error("MIDI send failed: {0}")]
    Send(#[from] midir::SendError),
}

/// Anything raw MIDI bytes can be written to
pub trait MidiSink {
    fn send_message(&mut self, message: &[u8]) -> Result<(), MidiError>;
}

impl MidiSink for MidiOutputConnection {
    fn send_message(&mut self, message: &[u8]) -> Result<(), MidiError> {
        self.send(message)?;
        Ok(())
    }
}

/// List all MIDI output port names
pub fn list_output_ports() -> Vec<String> {
    MidiOutput::new(CLIENT_NAME)
        .map(|midi_out| {
            midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// List all MIDI input port names
pub fn list_input_ports() -> Vec<String> {
    MidiInput::new(CLIENT_NAME)
        .map(|midi_in| {
            midi_in
                .ports()
                .iter()
                .filter_map(|p| midi_in.port_name(p).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Connect to the first output whose name contains `filter`
pub fn connect_output(filter: &str) -> Result<(String, MidiOutputConnection), MidiError> {
    open_output(filter, |name| name.contains(filter))
}

fn open_output<F>(label: &str, matches: F) -> Result<(String, MidiOutputConnection), MidiError>
where
    F: Fn(&str) -> bool,
{
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let ports = midi_out.ports();

    let (port, name) = ports
        .iter()
        .find_map(|p| {
            let name = midi_out.port_name(p).ok()?;
            matches(&name).then(|| (p.clone(), name))
        })
        .ok_or_else(|| MidiError::PortNotFound(label.to_string()))?;

    let connection = midi_out
        .connect(&port, "grid-looper-output")
        .map_err(|e| MidiError::Connect(e.to_string()))?;

    Ok((name, connection))
}

/// Connect every output matching `include` (all when `None`) and not
/// matching `exclude`, de-duplicated and sorted by name
pub fn connect_outputs(
    include: Option<&str>,
    exclude: Option<&str>,
) -> Vec<(String, MidiOutputConnection)> {
    let mut names: Vec<String> = list_output_ports()
        .into_iter()
        .filter(|name| include.is_none_or(|f| name.contains(f)))
        .filter(|name| exclude.is_none_or(|f| !name.contains(f)))
        .collect();
    names.sort();
    names.dedup();

    let mut connections = Vec::with_capacity(names.len());
    for name in names {
        match open_output(&name, |candidate| candidate == name) {
            Ok(connection) => connections.push(connection),
            Err(e) => log::warn!("Skipping MIDI output '{}': {}", name, e),
        }
    }
    connections
}

/// Connect to the first input whose name contains `filter`
///
/// The callback runs on midir's input thread.
pub fn connect_input<F>(
    filter: &str,
    mut callback: F,
) -> Result<(String, MidiInputConnection<()>), MidiError>
where
    F: FnMut(&[u8]) + Send + 'static,
{
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    let ports = midi_in.ports();

    let (port, name) = ports
        .iter()
        .find_map(|p| {
            let name = midi_in.port_name(p).ok()?;
            name.contains(filter).then(|| (p.clone(), name))
        })
        .ok_or_else(|| MidiError::PortNotFound(filter.to_string()))?;

    let connection = midi_in
        .connect(
            &port,
            "grid-looper-input",
            move |_timestamp, message, _| callback(message),
            (),
        )
        .map_err(|e| MidiError::Connect(e.to_string()))?;

    Ok((name, connection))
}
