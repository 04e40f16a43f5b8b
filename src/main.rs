use anyhow::{Context, bail};
use clap::Parser;
use grid_looper::config::{Cli, Config};
use grid_looper::instrument::{Instrument, InstrumentBank};
use grid_looper::launchpad::{Launchpad, decode};
use grid_looper::messaging::{Command, CommandSender, create_clock_event_channel, create_command_channel};
use grid_looper::midi::device::{
    connect_input, connect_output, connect_outputs, list_input_ports, list_output_ports,
};
use grid_looper::sequencer::Ticker;
use grid_looper::session::Session;
use grid_looper::utils::init_logger;
use grid_looper::{console, load_library};
use midir::MidiInputConnection;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    if cli.list_ports {
        print_ports();
        return Ok(());
    }

    let config = Config::from(cli);

    let songs = load_library(&config.songs_dir)
        .with_context(|| format!("loading songs from {}", config.songs_dir.display()))?;
    if songs.is_empty() {
        bail!("no songs found in {}", config.songs_dir.display());
    }

    let (command_tx, command_rx) = create_command_channel();
    let (event_tx, event_rx) = create_clock_event_channel();

    let mut session = Session::new(songs, Ticker::new(command_tx.clone()), event_tx)
        .with_bpm_override(config.bpm_override);
    if !session.load_song(config.initial_song)? {
        bail!(
            "no song at index {} ({} songs loaded)",
            config.initial_song,
            session.songs().len()
        );
    }

    let instruments = connect_instruments(&config);
    let _launchpad_input = attach_launchpad(&mut session, &config, command_tx.clone());

    console::spawn(command_tx).context("starting console")?;
    println!("{}", console::HELP);

    let mut engine = grid_looper::Engine::new(session, instruments, command_rx, event_rx);
    engine.run()?;
    Ok(())
}

fn print_ports() {
    println!("MIDI outputs:");
    for name in list_output_ports() {
        println!("  {}", name);
    }
    println!("MIDI inputs:");
    for name in list_input_ports() {
        println!("  {}", name);
    }
}

/// Every usable output, in name order; tracks address them by `midiOutput`
fn connect_instruments(config: &Config) -> InstrumentBank {
    let exclude = match config.output_filter {
        Some(_) => None,
        None => Some(config.launchpad_port.as_str()),
    };

    let mut instruments = InstrumentBank::default();
    for (name, connection) in connect_outputs(config.output_filter.as_deref(), exclude) {
        log::info!("Instrument {}: {}", instruments.len(), name);
        instruments.push(Instrument::new(name, Box::new(connection)));
    }

    if instruments.is_empty() {
        log::warn!("No MIDI outputs found; notes will not sound");
    }
    instruments
}

/// Connect both Launchpad ports; input is forwarded to the engine
fn attach_launchpad(
    session: &mut Session,
    config: &Config,
    command_tx: CommandSender,
) -> Option<MidiInputConnection<()>> {
    let (output_name, output) = match connect_output(&config.launchpad_port) {
        Ok(connection) => connection,
        Err(e) => {
            session.surface_unavailable(e);
            return None;
        }
    };

    let input = connect_input(&config.launchpad_port, move |message| {
        if let Some(event) = decode(message) {
            // Engine gone means we are shutting down
            let _ = command_tx.send(Command::Surface(event));
        }
    });
    let (input_name, input) = match input {
        Ok(connection) => connection,
        Err(e) => {
            session.surface_unavailable(e);
            return None;
        }
    };

    log::info!("Launchpad ports: out '{}', in '{}'", output_name, input_name);
    if let Err(e) = session.attach_surface(Launchpad::new(Box::new(output))) {
        session.surface_unavailable(e);
        return None;
    }
    Some(input)
}
