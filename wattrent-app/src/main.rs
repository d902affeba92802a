use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, warn};

use wattrent_app::app::AppContext;
use wattrent_app::config::AppConfig;
use wattrent_app::error::{AppError, Field};
use wattrent_app::i18n::Text;
use wattrent_app::navigation::{NavigationOutcome, Surface};
use wattrent_app::settings_session::LeaveChoice;
use wattrent_app::utils::parse_field;
use wattrent_app::{Advisory, logging};
use wattrent_core::calculations::{calculate_bill, format_amount, period_label};
use wattrent_core::recognition::FixedDelayRecognizer;
use wattrent_core::{Bill, Language};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Rent and electricity bill helper.
///
/// Reads the meter, splits the bill, and keeps settings in sync with the
/// WattRent API.
#[derive(Debug, Parser)]
#[command(name = "wattrent", version)]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository backend (`http` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// API base URL, e.g. `http://localhost:8080/api/v1`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[arg(long, global = true)]
    user: Option<String>,

    /// SQLite file for the local cache.
    #[arg(long, global = true)]
    local_db: Option<PathBuf>,

    /// Display language for this run (`en` or `zh-TW`).
    #[arg(long, global = true, value_parser = parse_language)]
    lang: Option<Language>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Silence console logging.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Probe the API.
    Health,

    /// Show, change or clear the stored settings.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },

    /// Preview a bill without saving it.
    Calculate(CalculateArgs),

    /// Work with saved bills.
    Bills {
        #[command(subcommand)]
        action: BillsCommand,
    },

    /// Read the meter from a photo and save the resulting bill.
    Capture(CaptureArgs),
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    Show,
    Set(SettingsArgs),
    Clear,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    #[arg(long)]
    rate: Option<String>,
    #[arg(long)]
    rent: Option<String>,
    #[arg(long)]
    previous_reading: Option<String>,
    #[arg(long)]
    landlord: Option<String>,
    #[arg(long)]
    payment_method: Option<String>,
    #[arg(long, value_parser = parse_language)]
    language: Option<Language>,
    #[arg(long)]
    notifications: Option<bool>,
    #[arg(long)]
    auto_backup: Option<bool>,
    /// What to do with the edits when leaving the settings surface.
    #[arg(long, value_enum, default_value_t = OnLeave::Save)]
    on_leave: OnLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnLeave {
    Save,
    Discard,
    Stay,
}

impl From<OnLeave> for LeaveChoice {
    fn from(choice: OnLeave) -> Self {
        match choice {
            OnLeave::Save => LeaveChoice::SaveAndLeave,
            OnLeave::Discard => LeaveChoice::Discard,
            OnLeave::Stay => LeaveChoice::Stay,
        }
    }
}

#[derive(Debug, Args)]
struct CalculateArgs {
    #[arg(long)]
    reading: String,
    /// Defaults to the stored previous reading.
    #[arg(long)]
    previous: Option<String>,
    #[arg(long)]
    rate: Option<String>,
    #[arg(long)]
    rent: Option<String>,
}

#[derive(Debug, Subcommand)]
enum BillsCommand {
    List,
    /// Save a bill for `reading` using the stored settings.
    Submit {
        reading: String,
    },
    /// Mark paid, or unpaid if already paid.
    TogglePaid {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Print the transfer message for the landlord.
    Share {
        id: String,
    },
}

#[derive(Debug, Args)]
struct CaptureArgs {
    /// Photo of the meter.
    #[arg(long)]
    image: String,
    /// Typed reading; replaces the recognised one.
    #[arg(long)]
    reading: Option<String>,
    #[arg(long)]
    rate: Option<String>,
    #[arg(long)]
    rent: Option<String>,
    /// Simulated recognition time.
    #[arg(long, default_value_t = 2000)]
    ocr_delay_ms: u64,
}

fn parse_language(tag: &str) -> Result<Language, String> {
    Language::parse(tag).ok_or_else(|| format!("unsupported language '{tag}', expected 'en' or 'zh-TW'"))
}

// ─── helpers ─────────────────────────────────────────────────────────────────

/// A command either finishes or ends with the dialog to show.
type Outcome = Result<(), Advisory>;

fn fail(
    err: impl Into<AppError>,
    language: Language,
) -> Advisory {
    Advisory::from_error(&err.into(), language)
}

fn print_bill(
    bill: &Bill,
    language: Language,
) {
    let status = if bill.is_paid() { Text::Paid } else { Text::Unpaid };
    println!(
        "{}  {}  {}: {}  {}: {}  {}: {}  [{}]",
        bill.id,
        bill.period,
        Text::Usage.get(language),
        format_amount(bill.electricity_usage),
        Text::ElectricityCost.get(language),
        format_amount(bill.electricity_cost),
        Text::Total.get(language),
        format_amount(bill.total_amount),
        status.get(language),
    );
}

fn config_from_cli(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(backend) = &cli.backend {
        config.backend = backend.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(user) = &cli.user {
        config.user_id = user.clone();
    }
    if let Some(path) = &cli.local_db {
        config.local_db = Some(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = Some(level.clone());
    }
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
    Ok(config)
}

// ─── commands ────────────────────────────────────────────────────────────────

async fn run_settings(
    ctx: &AppContext,
    action: SettingsCommand,
) -> Outcome {
    let language = ctx.language.get();
    let session = ctx.settings_session();
    ctx.navigation.borrow_mut().force(Surface::Settings);
    session.mount().await;

    match action {
        SettingsCommand::Show => {
            let draft = session.draft();
            let text = &ctx.language;
            println!("{}: {}", text.text(Text::ElectricityRate), draft.electricity_rate);
            println!("{}: {}", text.text(Text::Rent), draft.rent);
            println!("{}: {}", text.text(Text::PreviousReading), draft.previous_reading);
            println!("landlord: {}", draft.landlord_name);
            println!("payment method: {}", draft.payment_method);
            println!("language: {}", draft.preferences.language.native_name());
        }
        SettingsCommand::Set(args) => {
            let on_leave = args.on_leave;
            session.edit(|draft| {
                if let Some(rate) = args.rate {
                    draft.electricity_rate = rate;
                }
                if let Some(rent) = args.rent {
                    draft.rent = rent;
                }
                if let Some(previous) = args.previous_reading {
                    draft.previous_reading = previous;
                }
                if let Some(landlord) = args.landlord {
                    draft.landlord_name = landlord;
                }
                if let Some(method) = args.payment_method {
                    draft.payment_method = method;
                }
                if let Some(language) = args.language {
                    draft.preferences.language = language;
                }
                if let Some(on) = args.notifications {
                    draft.preferences.notifications_enabled = on;
                }
                if let Some(on) = args.auto_backup {
                    draft.preferences.auto_backup = on;
                }
            });

            // Leaving settings goes through the same guard as any surface.
            let outcome = ctx.navigation.borrow_mut().navigate(Surface::Home);
            match outcome {
                NavigationOutcome::Moved => debug!("no settings changes to save"),
                NavigationOutcome::Blocked { pending } => {
                    eprintln!("{}", Advisory::unsaved_changes(language));
                    session.resolve_leave(on_leave.into(), pending).await?;
                    let done = match on_leave {
                        OnLeave::Save => Text::SettingsSaved,
                        OnLeave::Discard => Text::ChangesDiscarded,
                        OnLeave::Stay => Text::ChangesNotSaved,
                    };
                    // A saved language change applies to this message already.
                    println!("{}", Advisory::info(ctx.language.get(), done));
                }
            }
        }
        SettingsCommand::Clear => {
            session.clear().await.map_err(|e| fail(e, language))?;
            println!("{}", Advisory::info(language, Text::SettingsCleared));
        }
    }
    Ok(())
}

async fn run_calculate(
    ctx: &AppContext,
    args: CalculateArgs,
) -> Outcome {
    let language = ctx.language.get();
    let workflow = ctx.bill_workflow();
    let current = parse_field(Field::CurrentReading, &args.reading)
        .map_err(|e| fail(e, language))?;
    let mut input = workflow.seed_input(current).await;
    let override_field = |field: Field, text: Option<String>, slot: &mut f64| -> Outcome {
        if let Some(text) = text {
            *slot = parse_field(field, &text).map_err(|e| fail(e, language))?;
        }
        Ok(())
    };
    override_field(Field::PreviousReading, args.previous, &mut input.previous_reading)?;
    override_field(Field::ElectricityRate, args.rate, &mut input.electricity_rate)?;
    override_field(Field::Rent, args.rent, &mut input.rent)?;

    let draft = calculate_bill(&input, period_label(Local::now().date_naive(), language))
        .map_err(|e| fail(e, language))?;
    println!("{}", draft.period);
    println!("{}: {}", Text::Usage.get(language), format_amount(draft.electricity_usage));
    println!("{}: {}", Text::ElectricityCost.get(language), format_amount(draft.electricity_cost));
    println!("{}: {}", Text::Rent.get(language), format_amount(draft.rent));
    println!("{}: {}", Text::Total.get(language), format_amount(draft.total_amount));
    Ok(())
}

async fn run_bills(
    ctx: &AppContext,
    action: BillsCommand,
) -> Outcome {
    let language = ctx.language.get();
    let mut workflow = ctx.bill_workflow();
    ctx.navigation.borrow_mut().force(Surface::History);

    match action {
        BillsCommand::List => {
            let bills = workflow.refresh().await.map_err(|e| fail(e, language))?;
            if bills.is_empty() {
                println!("{}", Text::NoBills.get(language));
            }
            for bill in bills {
                print_bill(bill, language);
            }
        }
        BillsCommand::Submit { reading } => {
            let current = parse_field(Field::CurrentReading, &reading)
                .map_err(|e| fail(e, language))?;
            let input = workflow.seed_input(current).await;
            let bill = workflow
                .submit(&input, None, Local::now().date_naive())
                .await
                .map_err(|e| fail(e, language))?;
            print_bill(&bill, language);
        }
        BillsCommand::TogglePaid { id } => {
            let bill = workflow
                .toggle_paid(&id, Utc::now())
                .await
                .map_err(|e| fail(e, language))?;
            print_bill(&bill, language);
        }
        BillsCommand::Delete { id } => {
            workflow.delete(&id).await.map_err(|e| fail(e, language))?;
        }
        BillsCommand::Share { id } => {
            let message = workflow.share_message(&id).await.map_err(|e| fail(e, language))?;
            println!("{message}");
        }
    }
    Ok(())
}

async fn run_capture(
    ctx: &AppContext,
    args: CaptureArgs,
) -> Outcome {
    let language = ctx.language.get();
    ctx.navigation.borrow_mut().force(Surface::Capture);
    let mut workflow = ctx.bill_workflow();
    let recognizer = FixedDelayRecognizer::new(
        FixedDelayRecognizer::DEFAULT_READING,
        Duration::from_millis(args.ocr_delay_ms),
    );
    let mut flow = ctx.capture_flow(Arc::new(recognizer));
    flow.prefill(&workflow.seed_settings().await);

    if let Err(advisory) = flow.process_image(&args.image).await {
        // Manual entry is still possible.
        warn!(%advisory, "recognition failed");
        eprintln!("{advisory}");
    }
    let form = flow.form_mut();
    if let Some(reading) = args.reading {
        form.reading = reading;
    }
    if let Some(rate) = args.rate {
        form.electricity_rate = rate;
    }
    if let Some(rent) = args.rent {
        form.rent = rent;
    }

    let bill = flow
        .calculate(&mut workflow, Local::now().date_naive())
        .await
        .map_err(|e| fail(e, language))?;
    print_bill(&bill, language);
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

/// `language` follows the session once it is known, so failures read in
/// the language the user chose.
async fn run(
    cli: Cli,
    language: &mut Language,
) -> Outcome {
    let config = config_from_cli(&cli).map_err(|e| fail(e, *language))?;

    if cli.quiet {
        logging::set_console_enabled(false).map_err(|e| fail(e, *language))?;
    }
    if let Some(level) = &config.log_level {
        logging::set_log_level(level).map_err(|e| fail(e, *language))?;
    }
    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path).map_err(|e| fail(e, *language))?;
    }

    let ctx = AppContext::bootstrap(config)
        .await
        .map_err(|e| fail(e, *language))?;
    if let Some(chosen) = cli.lang {
        ctx.language.set(chosen);
    }
    *language = ctx.language.get();

    match cli.command {
        Command::Health => {
            let message = ctx.repo.health().await.map_err(|e| fail(e, *language))?;
            println!("{message}");
            Ok(())
        }
        Command::Settings { action } => run_settings(&ctx, action).await,
        Command::Calculate(args) => run_calculate(&ctx, args).await,
        Command::Bills { action } => run_bills(&ctx, action).await,
        Command::Capture(args) => run_capture(&ctx, args).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init_logging();

    let cli = Cli::parse();
    let mut language = cli
        .lang
        .or_else(|| std::env::var("LANG").ok().map(|tag| Language::from_system_locale(&tag)))
        .unwrap_or_default();

    match run(cli, &mut language).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(advisory) => {
            debug!(kind = ?advisory.kind, "command failed");
            eprintln!("{advisory}");
            ExitCode::FAILURE
        }
    }
}
