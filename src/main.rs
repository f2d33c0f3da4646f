mod app;
mod drag;
mod edit;
mod editor;
mod export;
mod layout;
mod logo;
mod model;
mod preview;
mod session;
mod settings;
mod summary;
mod theme;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::edit::Edit;
use crate::model::InvoiceState;
use crate::settings::AppSettings;

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-designer", about = "Edit, lay out and print invoices")]
struct Cli {
    /// Seed invoice to start from (defaults to invoice.toml in the config directory)
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the editor window (default)
    Edit,
    /// Render the seed invoice to PDF without opening the editor
    Export {
        /// Use the custom section layout instead of document flow
        #[arg(long)]
        custom_layout: bool,
        /// Output root (overrides settings)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Do not open the PDF afterwards
        #[arg(long)]
        no_open: bool,
        /// Position a section, e.g. `--place total=100,200` (implies --custom-layout)
        #[arg(long = "place", value_name = "SECTION=X,Y")]
        place: Vec<String>,
    },
    /// Print the seed invoice's items and total
    Summary,
    /// Update settings
    Config {
        /// Folder exported invoices are written to (opens a picker when omitted)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Currency label printed before amounts
        #[arg(long)]
        currency: Option<String>,
    },
}

// ==========================================
// Main Function
// ==========================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = settings::load_settings();

    match cli.command.unwrap_or(Commands::Edit) {
        Commands::Edit => {
            let state = load_state(cli.seed.as_deref())?;
            run_editor(state, settings)
        }
        Commands::Export {
            custom_layout,
            out,
            no_open,
            place,
        } => {
            let mut state = load_state(cli.seed.as_deref())?
                .apply(Edit::SetCustomLayout(custom_layout || !place.is_empty()))?;
            for arg in &place {
                let (name, x, y) = parse_placement(arg)?;
                state = state.update_layout_position_by_name(name, x, y)?;
            }
            let root = out.unwrap_or_else(|| settings.output_root());
            let outcome = export::export(&state, &settings, &root).context("Export failed")?;
            println!("Typst source: {}", outcome.typ_path.display());
            println!("PDF generated: {}", outcome.pdf_path.display());
            if settings.open_after_export && !no_open {
                export::open_and_reveal(&outcome.pdf_path);
            }
            Ok(())
        }
        Commands::Summary => {
            let state = load_state(cli.seed.as_deref())?;
            summary::show_summary(&state, &settings.currency);
            Ok(())
        }
        Commands::Config {
            output_dir,
            currency,
        } => configure(settings, output_dir, currency),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("invoice_designer={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Parses `SECTION=X,Y`.
fn parse_placement(arg: &str) -> Result<(&str, f64, f64)> {
    let (name, coords) = arg
        .split_once('=')
        .with_context(|| format!("Expected SECTION=X,Y, got '{arg}'"))?;
    let (x, y) = coords
        .split_once(',')
        .with_context(|| format!("Expected X,Y coordinates in '{arg}'"))?;
    let x = x.trim().parse::<f64>().with_context(|| format!("Invalid x coordinate in '{arg}'"))?;
    let y = y.trim().parse::<f64>().with_context(|| format!("Invalid y coordinate in '{arg}'"))?;
    Ok((name.trim(), x, y))
}

fn load_state(seed: Option<&std::path::Path>) -> Result<InvoiceState> {
    let seed = settings::load_seed(seed).context("Failed to load seed invoice")?;
    Ok(InvoiceState::from_seed(seed.with_default_date(Local::now().date_naive())))
}

fn run_editor(state: InvoiceState, settings: AppSettings) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Invoice Designer")
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([960.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Invoice Designer",
        options,
        Box::new(|cc| Ok(Box::new(app::InvoiceApp::new(cc, state, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Editor window failed: {e}"))
}

// ==========================================
// Config
// ==========================================

fn configure(
    mut settings: AppSettings,
    output_dir: Option<PathBuf>,
    currency: Option<String>,
) -> Result<()> {
    let picked = output_dir.or_else(|| {
        println!("Opening folder picker...");
        rfd::FileDialog::new()
            .set_title("Select Invoice Output Directory")
            .pick_folder()
    });

    match picked {
        Some(path) => settings.output_dir = path.to_string_lossy().to_string(),
        None => println!("No folder selected, keeping {}", settings.output_dir),
    }
    if let Some(currency) = currency {
        settings.currency = currency;
    }

    let path = settings::save_settings(&settings).context("Failed to save settings")?;
    println!("Settings saved to {}", path.display());
    Ok(())
}
