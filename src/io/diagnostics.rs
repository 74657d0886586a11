use std::io::Write;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Receives the human readable lines produced while relaying. The relay
/// never stores them.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, severity: Severity, message: &str);
}

impl<D: DiagnosticSink + ?Sized> DiagnosticSink for Arc<D> {
    fn report(&self, severity: Severity, message: &str) {
        (**self).report(severity, message)
    }
}

/// Prints timestamped lines to stdout, warnings in yellow and errors in red.
pub struct ConsoleDiagnostics {
    color: ColorChoice,
}

impl ConsoleDiagnostics {
    pub fn new() -> Self {
        Self {
            color: ColorChoice::Auto,
        }
    }
}

impl Default for ConsoleDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for ConsoleDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        let mut stdout = StandardStream::stdout(self.color);
        let color = match severity {
            Severity::Info => None,
            Severity::Warning => Some(Color::Yellow),
            Severity::Error => Some(Color::Red),
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(color).set_intense(color.is_some()));
        let _ = writeln!(&mut stdout, "[{}] {}", timestamp(SystemTime::now()), message);
        let _ = stdout.reset();
    }
}

/// Forwards diagnostics to `tracing`, for hosts that already collect logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: "midi_mirror::relay", "{}", message),
            Severity::Warning => tracing::warn!(target: "midi_mirror::relay", "{}", message),
            Severity::Error => tracing::error!(target: "midi_mirror::relay", "{}", message),
        }
    }
}

/// UTC wall clock as `YYYY-MM-DD HH:MM:SS.mmm`.
fn timestamp(now: SystemTime) -> String {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    let days = since_epoch.as_secs() / 86_400;
    let secs = since_epoch.as_secs() % 86_400;
    let (year, month, day) = civil_date(days);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
        year,
        month,
        day,
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        since_epoch.subsec_millis()
    )
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
fn civil_date(days: u64) -> (u64, u64, u64) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of an era year.
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timestamp_format() {
        let t = UNIX_EPOCH + Duration::from_millis(86_400_000 + 3_723_045);
        assert_eq!(timestamp(t), "1970-01-02 01:02:03.045");
    }

    #[test]
    fn timestamp_dates() {
        assert_eq!(civil_date(0), (1970, 1, 1));
        // 2000-02-29, a leap day in a century year.
        assert_eq!(civil_date(11_016), (2000, 2, 29));
        assert_eq!(civil_date(11_017), (2000, 3, 1));
        // 2024-12-31 23:59:59.999
        let t = UNIX_EPOCH + Duration::from_millis(1_735_689_599_999);
        assert_eq!(timestamp(t), "2024-12-31 23:59:59.999");
    }

    #[test]
    fn shared_sinks_forward() {
        let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingDiagnostics);
        sink.report(Severity::Warning, "port Keys disconnected!");
        ConsoleDiagnostics::new().report(Severity::Info, "MIDI event: [sys] clock");
    }
}
