use std::io::{stdin, BufRead};
use std::sync::mpsc::Sender;
use std::thread;

/// A console command, parsed from one line of stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    /// List the available devices.
    Ports,
    /// Enable/disable logging of every relayed message.
    Log(bool),
    /// Send Local Control on/off to the output device.
    LocalControl(bool),
}

fn parse_switch(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "enable" | "1" => Some(true),
        "off" | "disable" | "0" => Some(false),
        _ => None,
    }
}

impl Command {
    /// Returns `None` for unrecognized input. An empty line means exit.
    pub fn parse(line: &str) -> Option<Command> {
        let cmd = line.trim();
        if cmd.is_empty() {
            return Some(Command::Exit);
        }
        let mut words = cmd.split_whitespace();
        let head = words.next()?.to_ascii_lowercase();
        let arg = words.next();
        if words.next().is_some() {
            return None;
        }

        match (head.as_str(), arg) {
            ("exit" | "quit" | "q", None) => Some(Command::Exit),
            ("help" | "h", None) => Some(Command::Help),
            ("ports", None) => Some(Command::Ports),
            ("log", Some(arg)) => parse_switch(arg).map(Command::Log),
            ("local", Some(arg)) => parse_switch(arg).map(Command::LocalControl),
            _ => None,
        }
    }
}

/// Read commands from `input` until exit or end of input, sending each one
/// to `commands`. Unknown lines are answered directly.
pub fn read_commands(input: impl BufRead, commands: &Sender<Command>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        match Command::parse(&line) {
            Some(command) => {
                if commands.send(command).is_err() || command == Command::Exit {
                    return;
                }
            }
            None => println!(
                "Unrecognized command: '{}'. Type 'help' for available commands.",
                line.trim()
            ),
        }
    }
    // stdin closed
    let _ = commands.send(Command::Exit);
}

/// Spawn a thread that turns stdin lines into [`Command`]s.
pub fn spawn_stdin_handler(commands: Sender<Command>) -> thread::JoinHandle<()> {
    thread::spawn(move || read_commands(stdin().lock(), &commands))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(""), Some(Command::Exit));
        assert_eq!(Command::parse("  Quit "), Some(Command::Exit));
        assert_eq!(Command::parse("h"), Some(Command::Help));
        assert_eq!(Command::parse("ports"), Some(Command::Ports));
        assert_eq!(Command::parse("log on"), Some(Command::Log(true)));
        assert_eq!(Command::parse("LOG disable"), Some(Command::Log(false)));
        assert_eq!(Command::parse("local off"), Some(Command::LocalControl(false)));
        assert_eq!(Command::parse("local 1"), Some(Command::LocalControl(true)));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(Command::parse("log"), None);
        assert_eq!(Command::parse("local maybe"), None);
        assert_eq!(Command::parse("exit now"), None);
        assert_eq!(Command::parse("12"), None);
    }

    #[test]
    fn reader_stops_at_exit() {
        let (tx, rx) = channel();
        read_commands(&b"log on\nbogus\nexit\nlocal on\n"[..], &tx);
        drop(tx);
        let received: Vec<_> = rx.iter().collect();
        assert_eq!(received, vec![Command::Log(true), Command::Exit]);
    }

    #[test]
    fn reader_exits_when_input_ends() {
        let (tx, rx) = channel();
        read_commands(&b"ports\n"[..], &tx);
        drop(tx);
        let received: Vec<_> = rx.iter().collect();
        assert_eq!(received, vec![Command::Ports, Command::Exit]);
    }
}
