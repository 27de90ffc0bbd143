//! Operator input.
//!
//! One command per line: `r` reloads, `q` quits. End of input only stops
//! reading; the preview keeps running until Ctrl+C or the viewer closes.

use std::io::BufRead;

use crossbeam::channel::Sender;

use super::messages::Command;
use crate::core::is_shutdown;
use crate::{debug, log};

pub const HINT: &str = "Press 'r' to reload. 'q' to quit.";

pub struct InputLoop<R> {
    reader: R,
    commands: Sender<Command>,
}

impl<R: BufRead> InputLoop<R> {
    pub fn new(reader: R, commands: Sender<Command>) -> Self {
        Self { reader, commands }
    }

    /// Read lines until the operator quits or input ends.
    pub fn run(mut self) {
        let mut line = String::new();
        loop {
            line.clear();
            let command = match self.reader.read_line(&mut line) {
                Ok(0) => {
                    debug!("input"; "end of input, Ctrl+C to quit");
                    return;
                }
                Ok(_) => match parse_line(&line) {
                    Some(command) => command,
                    None => continue,
                },
                Err(err) => {
                    log!("error"; "failed to read input: {}", err);
                    Command::Quit
                }
            };

            // Ctrl+C already queued its own Quit
            if is_shutdown() {
                return;
            }
            if self.commands.send(command).is_err() || command == Command::Quit {
                return;
            }
        }
    }
}

fn parse_line(line: &str) -> Option<Command> {
    match line.trim() {
        "" => None,
        "r" => Some(Command::Reload),
        "q" => Some(Command::Quit),
        other => {
            log!("input"; "unknown command `{}`. {}", other, HINT);
            None
        }
    }
}
