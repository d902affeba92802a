//! Tracing setup: local-time console output, a runtime-adjustable level,
//! and an optional log file that can be attached after startup.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, reload};

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,wattrent=debug";

struct LocalTimeFormat;

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

impl<S, N> FormatEvent<S, N> for LocalTimeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let level = *meta.level();

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{timestamp}\x1b[0m {}{level:>5}\x1b[0m \x1b[36m{}\x1b[0m ",
                level_color(level),
                meta.target()
            )?;
        } else {
            write!(writer, "{timestamp} {level:>5} {} ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type FileHandle = Arc<Mutex<Option<File>>>;

/// Writer that discards output until a file is attached.
#[derive(Clone)]
struct LateFile(FileHandle);

struct LateFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LateFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), File::flush)
    }
}

impl<'a> MakeWriter<'a> for LateFile {
    type Writer = LateFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LateFileWriter(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

type ReloadFn<T> = Box<dyn Fn(T) -> Result<()> + Send + Sync>;

/// Everything that can be changed after [`init_logging`].
struct LogControl {
    set_level: ReloadFn<String>,
    set_console: ReloadFn<bool>,
    file: FileHandle,
}

static CONTROL: OnceLock<LogControl> = OnceLock::new();

fn control() -> Result<&'static LogControl> {
    CONTROL.get().ok_or_else(|| anyhow!("logging not yet initialized"))
}

fn reload_fn<S, T>(
    handle: reload::Handle<EnvFilter, S>,
    directive: impl Fn(T) -> String + Send + Sync + 'static,
) -> ReloadFn<T>
where
    S: Subscriber + Send + Sync + 'static,
    T: 'static,
{
    Box::new(move |value: T| {
        let directive = directive(value);
        let filter = EnvFilter::try_new(&directive)
            .map_err(|e| anyhow!("invalid log filter '{directive}': {e}"))?;
        handle
            .reload(filter)
            .map_err(|e| anyhow!("filter reload failed: {e}"))
    })
}

/// Installs the global subscriber. Later calls are no-ops.
///
/// Honours `RUST_LOG`; falls back to [`DEFAULT_FILTER`]. Console output
/// is colored only on a terminal. The file layer stays silent until
/// [`enable_file_logging`] is called.
pub fn init_logging() {
    let file: FileHandle = Arc::new(Mutex::new(None));

    let (level_filter, level_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    );
    // The global level is still the ceiling; this only switches the console off.
    let (console_gate, console_handle) = reload::Layer::new(EnvFilter::new("trace"));

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalTimeFormat)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(console_gate);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalTimeFormat)
        .with_ansi(false)
        .with_writer(LateFile(Arc::clone(&file)));

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        let _ = CONTROL.set(LogControl {
            set_level: reload_fn(level_handle, |level: String| level),
            set_console: reload_fn(console_handle, |on: bool| {
                String::from(if on { "trace" } else { "off" })
            }),
            file,
        });
    }
}

/// Replaces the active filter. Accepts a bare level or any `EnvFilter`
/// directive.
pub fn set_log_level(level: &str) -> Result<()> {
    (control()?.set_level)(level.to_string())
}

/// Hides or shows console output; the file keeps receiving records.
pub fn set_console_enabled(enabled: bool) -> Result<()> {
    (control()?.set_console)(enabled)
}

/// Appends log records to `path` from now on, replacing any open file.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let control = control()?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow!("cannot open log file '{}': {e}", path.display()))?;
    *control.file.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    Ok(())
}
