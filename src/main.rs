use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use srplot::config::Config;
use srplot::runtime;
use srplot::session::Session;
use srplot::store::{JsonFileStore, MemoryStore, PlotStore};
use srplot::upload::read_upload;
use srplot::{OutputFormat, PlotKind, RenderOptions};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "srplot")]
#[command(about = "Render bioinformatics charts from delimited expression tables", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding saved plots (overrides config and SRPLOT_STORE_DIR)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available chart types
    Kinds,
    /// Render a chart as PNG or SVG
    Plot {
        #[arg(value_enum)]
        kind: PlotKind,
        #[command(flatten)]
        source: Source,
        /// Standardize each heatmap row
        #[arg(long)]
        zscore: bool,
        #[command(flatten)]
        output: OutputArgs,
        /// Also save the plot and print its id on stderr
        #[arg(long)]
        save: bool,
    },
    /// Print the chart description as JSON
    Spec {
        #[arg(value_enum)]
        kind: PlotKind,
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        zscore: bool,
    },
    /// Save a plot and print its id
    Save {
        #[arg(value_enum)]
        kind: PlotKind,
        #[command(flatten)]
        source: Source,
    },
    /// Render a previously saved plot
    Load {
        id: String,
        #[arg(long)]
        zscore: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

impl Command {
    fn needs_store(&self) -> bool {
        matches!(
            self,
            Command::Save { .. } | Command::Load { .. } | Command::Plot { save: true, .. }
        )
    }
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Source {
    /// CSV, TSV or TXT file with a header row
    #[arg(long)]
    input: Option<PathBuf>,
    /// Use the built-in sample data for the chart type
    #[arg(long)]
    sample: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Output file or directory (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    scale: Option<u32>,
}

impl OutputArgs {
    fn render_options(&self, base: &RenderOptions) -> RenderOptions {
        RenderOptions {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            scale: self.scale.unwrap_or(base.scale),
            format: self.format.unwrap_or(base.format),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    if cli.command.needs_store() {
        let dir = cli.store.clone().unwrap_or_else(|| config.store_dir.clone());
        let store = JsonFileStore::open(&dir)
            .with_context(|| format!("Failed to open plot store {}", dir.display()))?;
        execute(Session::new(store), cli.command, &config.render)
    } else {
        execute(Session::new(MemoryStore::new()), cli.command, &config.render)
    }
}

fn execute<S: PlotStore>(
    mut session: Session<S>,
    command: Command,
    render: &RenderOptions,
) -> Result<()> {
    match command {
        Command::Kinds => {
            for kind in PlotKind::ALL {
                println!("{:<8} {:<24} {}", kind.id(), kind.title(), kind.description());
            }
        }
        Command::Plot {
            kind,
            source,
            zscore,
            output,
            save,
        } => {
            load_source(&mut session, kind, &source)?;
            session.set_zscore(zscore);
            if save {
                let id = session.save()?;
                eprintln!("Saved plot {}", id);
            }
            write_chart(&session, &output, render)?;
        }
        Command::Spec {
            kind,
            source,
            zscore,
        } => {
            load_source(&mut session, kind, &source)?;
            session.set_zscore(zscore);
            let chart = session
                .chart()
                .context("Plot requires at least one data row")?;
            println!("{}", runtime::chart_json(&chart)?);
        }
        Command::Save { kind, source } => {
            load_source(&mut session, kind, &source)?;
            println!("{}", session.save()?);
        }
        Command::Load { id, zscore, output } => {
            session.load_saved(&id)?;
            session.set_zscore(zscore);
            write_chart(&session, &output, render)?;
        }
    }
    Ok(())
}

fn load_source<S: PlotStore>(session: &mut Session<S>, kind: PlotKind, source: &Source) -> Result<()> {
    session.select_plot(kind);
    match &source.input {
        Some(path) => session.upload(read_upload(path)?),
        None => session.load_sample(),
    }
    Ok(())
}

fn write_chart<S: PlotStore>(
    session: &Session<S>,
    output: &OutputArgs,
    render: &RenderOptions,
) -> Result<()> {
    let options = output.render_options(render);
    let chart = session
        .chart()
        .context("Plot requires at least one data row")?;
    let bytes = runtime::render_chart(&chart, &options)?;

    match &output.output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(session.export_file_name(options.format))
            } else {
                path.clone()
            };
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
