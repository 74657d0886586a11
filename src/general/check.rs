use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn print_colored(color: Color, line: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_intense(true));
    let _ = writeln!(&mut stdout, "{}", line);
    let _ = stdout.reset();
}

// Print the quick help line in blue (works on Windows CMD via termcolor)
pub fn print_quick_help() {
    print_colored(Color::Blue, "Type 'help' for commands, 'exit' to quit");
}

pub fn print_help() {
    println!("Commands:");
    println!("  log on/off       - Log every relayed MIDI message");
    println!("  local on/off     - Send Local Control on/off to the output");
    println!("  ports            - List MIDI devices");
    println!("  help/h           - Show this help");
    println!("  exit/quit/q      - Exit program");
}

pub fn print_relay_active(input: &str, output: &str) {
    print_colored(
        Color::Green,
        &format!("Relay active | mirroring '{}' -> '{}'", input, output),
    );
}

pub fn print_relay_stopped() {
    print_colored(
        Color::Red,
        "Relay stopped | waiting for the devices to come back",
    );
}
