// Console - line commands read from stdin on their own thread

use crate::messaging::channels::CommandSender;
use crate::messaging::command::Command;
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

pub const HELP: &str = "commands: play | bpm <n> | song <n> | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Command(Command),
    Help,
    Unknown(String),
}

/// Parse one console line
pub fn parse_line(line: &str) -> Option<ConsoleInput> {
    let mut words = line.split_whitespace();
    let verb = words.next()?.to_ascii_lowercase();
    let argument = words.next();

    let input = match (verb.as_str(), argument) {
        ("play" | "stop" | "p", None) => ConsoleInput::Command(Command::TogglePlay),
        ("quit" | "exit" | "q", None) => ConsoleInput::Command(Command::Quit),
        ("help" | "?", None) => ConsoleInput::Help,
        ("bpm", Some(value)) => match value.parse::<f64>() {
            Ok(bpm) => ConsoleInput::Command(Command::SetBpm(bpm)),
            Err(_) => ConsoleInput::Unknown(line.trim().to_string()),
        },
        ("song", Some(value)) => match value.parse::<usize>() {
            Ok(index) => ConsoleInput::Command(Command::LoadSong(index)),
            Err(_) => ConsoleInput::Unknown(line.trim().to_string()),
        },
        _ => ConsoleInput::Unknown(line.trim().to_string()),
    };
    Some(input)
}

/// Read stdin until it closes or the engine goes away
pub fn spawn(command_tx: CommandSender) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("console read failed: {}", e);
                        break;
                    }
                };

                match parse_line(&line) {
                    Some(ConsoleInput::Command(command)) => {
                        let quit = command == Command::Quit;
                        if command_tx.send(command).is_err() || quit {
                            break;
                        }
                    }
                    Some(ConsoleInput::Help) => println!("{}", HELP),
                    Some(ConsoleInput::Unknown(text)) => {
                        println!("unknown command '{}' ({})", text, HELP)
                    }
                    None => {}
                }
            }
            log::debug!("console closed");
        })
}
