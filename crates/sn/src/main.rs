//! sn - simulator navigator CLI
//!
//! Finds iOS Simulator UI elements by accessibility data and taps or types
//! into them through idb. Prints one result line per invocation; `--json`
//! switches to a structured document.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use simnav_core::device;
use simnav_core::prelude::*;
use simnav_core::{ElementInfo, ScreenSummary};

const LIST_LIMIT: usize = 10;

#[derive(Parser)]
#[command(name = "sn")]
#[command(about = "Find and interact with iOS Simulator UI elements via accessibility data")]
#[command(version)]
struct Cli {
    /// Device UDID (defaults to the booted simulator)
    #[arg(long, global = true, env = "SIMNAV_UDID")]
    udid: Option<String>,
    /// idb executable
    #[arg(long, global = true, env = "SIMNAV_IDB", default_value = "idb")]
    idb: PathBuf,
    /// xcrun executable
    #[arg(long, global = true, env = "SIMNAV_XCRUN", default_value = "xcrun")]
    xcrun: PathBuf,
    /// Timeout for each external command, in milliseconds
    #[arg(long, global = true, env = "SIMNAV_TIMEOUT_MS", default_value = "30000")]
    timeout_ms: u64,
    /// Print JSON instead of a text line
    #[arg(long, global = true)]
    json: bool,
    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct CriteriaArgs {
    /// Selector, e.g. "type:Button AND text~:log AND index:1"
    selector: Option<String>,
    /// Text contained in label or value (case-insensitive)
    #[arg(long, conflicts_with = "exact")]
    text: Option<String>,
    /// Text equal to label or value
    #[arg(long)]
    exact: Option<String>,
    /// Element type (Button, TextField, ...)
    #[arg(long = "type")]
    kind: Option<String>,
    /// Accessibility identifier
    #[arg(long)]
    id: Option<String>,
    /// Which match to use, 0-based
    #[arg(long)]
    index: Option<usize>,
}

impl CriteriaArgs {
    fn criteria(&self) -> simnav_core::Result<MatchCriteria> {
        let mut criteria = match &self.selector {
            Some(selector) => MatchCriteria::parse(selector)?,
            None => MatchCriteria::new(),
        };
        if let Some(text) = &self.text {
            criteria = criteria.with_text(text).fuzzy(true);
        }
        if let Some(text) = &self.exact {
            criteria = criteria.with_text(text).fuzzy(false);
        }
        if let Some(kind) = &self.kind {
            criteria = criteria.with_type(kind);
        }
        if let Some(id) = &self.id {
            criteria = criteria.with_identifier(id);
        }
        if let Some(index) = self.index {
            criteria = criteria.at(index);
        }
        Ok(criteria)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Find an element without acting on it
    Find {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Find an element and tap its center
    Tap {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Tap at coordinates
    TapAt {
        x: f64,
        y: f64,
        /// Coordinates are from a screenshot of this size (e.g. 195x422)
        #[arg(long)]
        screenshot: Option<Size>,
    },
    /// Find a text field (by default) and type into it
    Type {
        /// Text to type
        #[arg(value_name = "TEXT")]
        input: String,
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// List tappable elements
    List,
    /// Summarize the current screen
    Screen {
        #[arg(long)]
        hints: bool,
    },
    /// Fetch the accessibility tree and report its size
    Tree,
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(success: bool, data: T) -> Self {
        Self { success, data: Some(data), error: None }
    }
    fn err(e: Error) -> Output<()> {
        Output { success: false, data: None, error: Some(e) }
    }
}

fn print_json<T: Serialize>(output: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json = cli.json;

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(err) if json => {
                    let _ = print_json(&Output::<()>::err(err.clone()));
                }
                Some(err) => eprintln!("Error: {}", err.message),
                None => eprintln!("Error: {}", e),
            }
            std::process::exit(1);
        }
    }
}

/// Runs one command; `Ok(false)` means the action itself did not succeed.
fn run(cli: Cli) -> Result<bool> {
    let config = NavigatorConfig::default()
        .with_idb_path(cli.idb)
        .with_xcrun_path(cli.xcrun)
        .with_timeout(Duration::from_millis(cli.timeout_ms));
    let udid = device::resolve_udid(cli.udid.as_deref(), &config)?;
    let mut nav = Navigator::with_config(Some(udid), config);

    match cli.command {
        Commands::Find { criteria } => cmd_find(&mut nav, &criteria.criteria()?, cli.json),
        Commands::Tap { criteria } => {
            report(nav.find_and_tap(&criteria.criteria()?)?, cli.json)
        }
        Commands::TapAt { x, y, screenshot } => cmd_tap_at(&mut nav, x, y, screenshot, cli.json),
        Commands::Type { input, criteria } => {
            report(nav.find_and_enter_text(&input, &criteria.criteria()?)?, cli.json)
        }
        Commands::List => cmd_list(&mut nav, cli.json),
        Commands::Screen { hints } => cmd_screen(&mut nav, hints, cli.json),
        Commands::Tree => cmd_tree(&mut nav, cli.json),
    }
}

fn report(result: ActionResult, json: bool) -> Result<bool> {
    let success = result.success;
    if json {
        print_json(&Output::ok(success, result))?;
    } else {
        println!("{}", result.message);
    }
    Ok(success)
}

fn cmd_find(nav: &mut Navigator, criteria: &MatchCriteria, json: bool) -> Result<bool> {
    let Some(element) = nav.find(criteria)? else {
        let err = Error::element_not_found(criteria);
        if json {
            print_json(&Output::<()>::err(err))?;
        } else {
            println!("{}", err.message);
        }
        return Ok(false);
    };

    if json {
        print_json(&Output::ok(true, element.info()))?;
    } else {
        println!("Found: {} at {}", element.description(), element.center());
    }
    Ok(true)
}

fn cmd_tap_at(
    nav: &mut Navigator,
    x: f64,
    y: f64,
    screenshot: Option<Size>,
    json: bool,
) -> Result<bool> {
    let result = match screenshot {
        Some(size) => nav.tap_screenshot_point(x, y, size)?,
        None => nav.tap_point(Point::new(x as i32, y as i32)),
    };
    report(result, json)
}

fn cmd_list(nav: &mut Navigator, json: bool) -> Result<bool> {
    let tappable = nav.list_tappable(false)?;
    if json {
        let infos: Vec<ElementInfo> = tappable.iter().map(Element::info).collect();
        print_json(&Output::ok(true, infos))?;
        return Ok(true);
    }

    println!("Tappable elements ({}):", tappable.len());
    for element in tappable.iter().take(LIST_LIMIT) {
        let name = [&element.label, &element.value]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or("Unnamed");
        println!("  {}: \"{}\" {}", element.kind, name, element.center());
    }
    if tappable.len() > LIST_LIMIT {
        println!("  ... and {} more", tappable.len() - LIST_LIMIT);
    }
    Ok(true)
}

fn cmd_screen(nav: &mut Navigator, hints: bool, json: bool) -> Result<bool> {
    let summary: ScreenSummary = nav.screen_summary(false)?;
    if json {
        #[derive(Serialize)]
        struct ScreenOutput {
            #[serde(flatten)]
            summary: ScreenSummary,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            hints: Vec<String>,
        }
        let hints = if hints { summary.hints() } else { Vec::new() };
        print_json(&Output::ok(true, ScreenOutput { summary, hints }))?;
        return Ok(true);
    }

    println!("{}", summary);
    if hints {
        for hint in summary.hints() {
            println!("Hint: {}", hint);
        }
    }
    Ok(true)
}

fn cmd_tree(nav: &mut Navigator, json: bool) -> Result<bool> {
    let snapshot = nav.get_tree(true)?;
    let elements = snapshot.elements().len();
    let nodes = simnav_core::tree::count_nodes(&snapshot.root);
    let fetched_at = snapshot.fetched_at.to_rfc3339();

    if json {
        print_json(&Output::ok(
            true,
            serde_json::json!({
                "elements": elements,
                "nodes": nodes,
                "fetched_at": fetched_at,
                "root": snapshot.root,
            }),
        ))?;
    } else {
        println!(
            "Tree: {} elements ({} nodes) fetched at {}",
            elements, nodes, fetched_at
        );
    }
    Ok(true)
}
