// Messaging - channels into and out of the engine loop

pub mod channels;
pub mod command;

pub use channels::{
    ClockEventReceiver, ClockEventSender, CommandReceiver, CommandSender,
    create_clock_event_channel, create_command_channel,
};
pub use command::{ClockEvent, Command};
