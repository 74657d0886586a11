use std::io::stdin;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use midi_mirror::config::{Config, DiagnosticsOutput, CONFIG_FILE};
use midi_mirror::general::check;
use midi_mirror::general::session::{MidirOpener, RelayChange, Session};
use midi_mirror::general::stdin_handler::{spawn_stdin_handler, Command};
use midi_mirror::io::input::choose_input_port;
use midi_mirror::io::output::choose_output_port;
use midi_mirror::io::{
    ConsoleDiagnostics, DeviceRegistry, DeviceWatcher, DiagnosticSink, MidirRegistry, TracingDiagnostics,
};
use midi_mirror::{RelayOptions, Result};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("midi_mirror=info")),
        )
        .with_target(false)
        .init();

    match run() {
        Ok(_) => (),
        Err(err) => eprintln!("Error: {}", err),
    }
}

fn print_ports(registry: &impl DeviceRegistry) {
    println!("Input ports:");
    for d in registry.inputs() {
        println!("  {}", d.name);
    }
    println!("Output ports:");
    for d in registry.outputs() {
        println!("  {}", d.name);
    }
}

fn save_config(config: &Config, path: &Path) {
    if let Err(err) = config.save(path) {
        warn!(%err, path = %path.display(), "could not save config");
    }
}

fn run() -> Result<()> {
    let config_path = Path::new(CONFIG_FILE);
    let mut config = Config::load(config_path)?;
    let registry = MidirRegistry::new()?;

    let inputs = registry.inputs();
    let in_idx = choose_input_port(&inputs, config.input_port.as_deref(), &mut stdin().lock())?;
    let in_port_name = inputs[in_idx].name.clone();

    let outputs = registry.outputs();
    let out_idx = choose_output_port(
        &outputs,
        config.output_port.as_deref(),
        &in_port_name,
        &mut stdin().lock(),
    )?;
    let out_port_name = outputs[out_idx].name.clone();

    config.input_port = Some(in_port_name.clone());
    config.output_port = Some(out_port_name.clone());
    save_config(&config, config_path);

    let options = RelayOptions {
        log_events: Arc::new(AtomicBool::new(config.log_midi_events)),
        report_drops: config.report_dropped_notes,
    };
    let diagnostics: Arc<dyn DiagnosticSink> = match config.diagnostics {
        DiagnosticsOutput::Console => Arc::new(ConsoleDiagnostics::new()),
        DiagnosticsOutput::Tracing => Arc::new(TracingDiagnostics),
    };
    let mut session = Session::new(MidirOpener, &in_port_name, &out_port_name, diagnostics, options);
    session.connect()?;
    check::print_relay_active(session.input_name(), session.output_name());
    check::print_quick_help();

    let (tx, rx) = channel();
    let _stdin_handle = spawn_stdin_handler(tx);
    let mut watcher = DeviceWatcher::new(&registry);

    loop {
        match rx.recv_timeout(config.poll_interval()) {
            Ok(Command::Exit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(Command::Help) => check::print_help(),
            Ok(Command::Ports) => print_ports(&registry),
            Ok(Command::Log(on)) => {
                session.set_logging(on);
                config.log_midi_events = on;
                save_config(&config, config_path);
                println!("MIDI event logging {}", if on { "enabled" } else { "disabled" });
            }
            Ok(Command::LocalControl(on)) => session.set_local_control(on),
            Err(RecvTimeoutError::Timeout) => {}
        }

        for event in watcher.poll(&registry) {
            match session.on_device_event(&event) {
                Some(RelayChange::Stopped) => check::print_relay_stopped(),
                Some(RelayChange::Restarted) => {
                    check::print_relay_active(session.input_name(), session.output_name())
                }
                None => {}
            }
        }
    }

    println!("Closing connections and exiting...");
    session.stop();
    // The stdin thread is blocked on read_line; it ends with the process.
    Ok(())
}
