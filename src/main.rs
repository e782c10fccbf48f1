//! blinkboard - Blink-Driven Scanning Keyboard
//!
//! Reads blink codes from a serial device (or stdin) and types the selected keys.

use anyhow::{Context, Result};
use blinkboard::feedback::FeedbackReporter;
use blinkboard::inject::{self, Backend, Session};
use blinkboard::{Application, ConfirmRowPolicy, LayoutPreset, ProtocolVariant, Settings};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn command() -> Command {
    Command::new("blinkboard")
        .version(blinkboard::VERSION)
        .about("A scanning keyboard driven by blink codes")
        .long_about(
            "blinkboard reads decimal blink codes, one per line, from a serial device or stdin, \
             moves a row/key highlight over an on-screen layout, and types the selected keys \
             into the focused application. Configure the serial line (e.g. with `stty -F \
             /dev/ttyACM0 115200 raw`) before starting.",
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Serial device or file to read blink codes from (default: stdin)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("protocol")
                .long("protocol")
                .value_parser(value_parser!(ProtocolVariant))
                .help("Blink-code alphabet emitted by the sensor firmware"),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .value_parser(value_parser!(LayoutPreset))
                .help("Built-in keyboard layout"),
        )
        .arg(
            Arg::new("confirm-row")
                .long("confirm-row")
                .value_parser(value_parser!(ConfirmRowPolicy))
                .help("Effect of a row confirmation while selecting a key"),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .short('b')
                .value_parser(value_parser!(Backend))
                .help("How keystrokes are delivered"),
        )
        .arg(
            Arg::new("window")
                .long("window")
                .value_name("ID")
                .conflicts_with("capture-window")
                .help("X11 window id that receives the keystrokes"),
        )
        .arg(
            Arg::new("capture-window")
                .long("capture-window")
                .action(ArgAction::SetTrue)
                .help("Capture the focused window after --capture-delay seconds"),
        )
        .arg(
            Arg::new("capture-delay")
                .long("capture-delay")
                .value_name("SECS")
                .value_parser(value_parser!(u64))
                .default_value("3")
                .help("Seconds to wait before capturing the focused window"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Suppress console feedback"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[cfg(feature = "config")]
fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Settings::discover().context("Failed to load configuration"),
    }
}

#[cfg(not(feature = "config"))]
fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    if path.is_some() {
        anyhow::bail!("This build does not support configuration files");
    }
    Ok(Settings::default())
}

/// Command-line flags take precedence over file settings.
fn apply_overrides(settings: &mut Settings, matches: &ArgMatches) {
    if let Some(protocol) = matches.get_one::<ProtocolVariant>("protocol") {
        settings.protocol = *protocol;
    }
    if let Some(layout) = matches.get_one::<LayoutPreset>("layout") {
        settings.layout = *layout;
        settings.custom_rows.clear();
    }
    if let Some(policy) = matches.get_one::<ConfirmRowPolicy>("confirm-row") {
        settings.confirm_row_policy = *policy;
    }
    if let Some(backend) = matches.get_one::<Backend>("backend") {
        settings.backend = *backend;
    }
    if let Some(window) = matches.get_one::<String>("window") {
        settings.target_window = Some(window.clone());
    }
    if matches.get_flag("quiet") {
        settings.quiet = true;
    }
}

async fn resolve_session(settings: &Settings, matches: &ArgMatches) -> Result<Session> {
    if !matches.get_flag("capture-window") {
        return Ok(Session::new(settings.target_window.clone()));
    }

    let delay = matches.get_one::<u64>("capture-delay").copied().unwrap_or(3);
    eprintln!("Focus the target application; capturing it in {delay}s...");
    tokio::time::sleep(Duration::from_secs(delay)).await;

    let window = inject::xdotool::active_window()
        .await
        .context("Could not determine the target window")?;
    eprintln!("Target window: {window}");
    Ok(Session::new(Some(window)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = command().get_matches();
    init_logging(matches.get_count("verbose"));

    let mut settings = load_settings(matches.get_one::<PathBuf>("config"))?;
    apply_overrides(&mut settings, &matches);

    // An invalid layout is the one fatal startup error of the scanner.
    let layout = Arc::new(settings.build_layout().context("Invalid keyboard layout")?);
    let session = resolve_session(&settings, &matches).await?;

    let port = matches.get_one::<PathBuf>("port");
    let mut source = blinkboard::input::open_source(port.map(PathBuf::as_path))
        .await
        .with_context(|| match port {
            Some(path) => format!("Failed to open {}", path.display()),
            None => "Failed to open stdin".to_string(),
        })?;

    let mut app = Application::new(
        layout,
        settings.protocol,
        settings.confirm_row_policy,
        inject::create_injector(settings.backend),
        FeedbackReporter::stderr(!settings.quiet),
    );

    let summary = app.run(&mut source, &session).await?;
    log::info!(
        "Processed {} events, {} commits, {} unrecognized, {} injection failures",
        summary.events,
        summary.commits,
        summary.unrecognized,
        summary.injection_failures
    );

    Ok(())
}
