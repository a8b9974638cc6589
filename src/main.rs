use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use tracing::info;
use tracing_subscriber::EnvFilter;

use healthviz::catalog::{self, Catalog, ChartSource, RenderParams, CHARTS};
use healthviz::config::{load_settings, Settings};
use healthviz::console;
use healthviz::output::{write_figure, FigureWriter};
use healthviz::{init_dataset, ImageFormat};

#[derive(Parser, Debug)]
#[command(author, version, about = "Health dataset chart catalog", long_about = None)]
struct Cli {
    /// Dataset CSV; overrides the configured path
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    data: Option<PathBuf>,

    /// Config file (default: ./healthviz.toml if present)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Directory for rendered figures
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    out_dir: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    format: Option<FormatOpt>,

    /// Debug logging
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List charts by category
    List,
    /// Render one chart to a file
    Render(RenderArgs),
    /// Render every chart into the output directory
    RenderAll,
    /// Interactive numbered menu (default)
    Menu,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Chart name, as shown by `list`
    name: String,

    /// Row index for per-subject charts
    #[arg(long)]
    index: Option<usize>,

    /// Output file; the extension picks the format
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatOpt {
    Png,
    Svg,
}

impl From<FormatOpt> for ImageFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Png => ImageFormat::Png,
            FormatOpt::Svg => ImageFormat::Svg,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "info,healthviz=debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut settings = load_settings(cli.config.as_deref()).context("loading settings")?;
    if let Some(data) = cli.data {
        settings.dataset = data;
    }
    if let Some(dir) = cli.out_dir {
        settings.output_dir = dir;
    }
    if let Some(format) = cli.format {
        settings.format = format.into();
    }

    match cli.command.unwrap_or(Command::Menu) {
        Command::List => handle_list(),
        Command::Render(args) => handle_render(&settings, args),
        Command::RenderAll => handle_render_all(&settings),
        Command::Menu => handle_menu(&settings),
    }
}

fn handle_list() -> Result<()> {
    for (category, names) in catalog::list_categories() {
        println!("{}", category);
        for name in names {
            let label = catalog::find(name).map_or(name, |entry| entry.label);
            println!("  {:<28} {}", name, label);
        }
    }
    Ok(())
}

fn open_catalog(settings: &Settings) -> Result<Catalog<'static>> {
    let dataset = init_dataset(&settings.dataset)
        .with_context(|| format!("loading dataset {}", settings.dataset.display()))?;
    Ok(Catalog::new(dataset))
}

fn handle_render(settings: &Settings, args: RenderArgs) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let figure = catalog
        .render(&args.name, &RenderParams { index: args.index })
        .with_context(|| format!("rendering {}", args.name))?;
    match args.output {
        Some(path) => write_figure(&path, &figure, None)?,
        None => {
            FigureWriter::new(&settings.output_dir, settings.format).write(&args.name, &figure)?;
        }
    }
    Ok(())
}

fn handle_render_all(settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let writer = FigureWriter::new(&settings.output_dir, settings.format);
    let failed = catalog::render_all(&catalog, |name, figure| writer.write(name, figure).map(drop));
    info!(
        "Rendered {} of {} charts into {}",
        CHARTS.len() - failed.len(),
        CHARTS.len(),
        settings.output_dir.display()
    );
    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|(name, _)| *name).collect();
        bail!("{} of {} charts failed: {}", failed.len(), CHARTS.len(), names.join(", "));
    }
    Ok(())
}

fn handle_menu(settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let writer = FigureWriter::new(&settings.output_dir, settings.format);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    console::run_menu(&catalog, stdin.lock(), &mut stdout, |name, figure| {
        let path = writer.write(name, figure)?;
        println!("Saved {}", path.display());
        Ok(())
    })?;
    Ok(())
}
