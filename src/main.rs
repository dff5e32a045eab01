use breakpix::breakpoints::read_breakpoints_file;
use breakpix::config::{self, ProjectPaths, SiteConfig};
use breakpix::imaging::RustBackend;
use breakpix::process::ProcessEvent;
use breakpix::watch::Watcher;
use breakpix::{markup, output, pipeline};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Ignore cached variants and re-encode every image
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "breakpix")]
#[command(about = "Responsive WebP/PNG variants from your CSS breakpoints")]
#[command(long_about = "\
Responsive WebP/PNG variants from your CSS breakpoints

Target sizes come from the stylesheet. Every declaration of the form

  --breakpoint-<name>: <int>px;

adds one size. For each source image and size, a square WebP (quality 85)
and PNG (quality 90) are kept in a persistent cache and mirrored into the
output directory:

  my-site/
  ├── breakpix.toml                # Optional config
  ├── src/
  │   ├── styles.css               # --breakpoint-sm: 480px; ...
  │   └── assets/images/logo.png   # Sources (PNG, JPEG)
  ├── .cache/images/               # logo-480.webp, logo-480.png, ...
  └── dist/assets/images/          # Published copy of the cache

Variants whose source image is gone are removed from the cache.

Run 'breakpix gen-config' to generate a documented breakpix.toml.")]
#[command(version)]
struct Cli {
    /// Project directory (holds breakpix.toml)
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate missing variants, remove orphans, publish to the output
    Build(CacheArgs),
    /// Build, then rebuild whenever the watched tree changes
    Watch,
    /// Print the breakpoints found in the stylesheet
    Sizes,
    /// Print <picture> markup for an image
    Picture {
        /// Image basename, without extension (e.g. "logo")
        name: String,
        /// Alternative text
        #[arg(long, default_value = "")]
        alt: String,
        /// CSS class for the <img>
        #[arg(long)]
        class: Option<String>,
    },
    /// Print a stock breakpix.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "breakpix=warn",
        1 => "breakpix=info",
        _ => "breakpix=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Print build events on a separate thread while the build runs.
fn spawn_printer() -> (Sender<ProcessEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

fn load_project(project: &Path) -> Result<(SiteConfig, ProjectPaths), config::ConfigError> {
    let site = config::load_config(project)?;
    let paths = site.paths.resolve(project);
    Ok((site, paths))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(cache_args) => {
            let (_, paths) = load_project(&cli.project)?;
            let (tx, printer) = spawn_printer();
            let result = pipeline::build(
                &paths,
                &RustBackend::new(),
                !cache_args.no_cache,
                Some(&tx),
            );
            drop(tx);
            let _ = printer.join();
            for line in output::format_build_summary(&result?) {
                println!("{}", line);
            }
        }
        Command::Watch => {
            let (site, paths) = load_project(&cli.project)?;
            watch(&cli.project, &site, paths)
        }
        Command::Sizes => {
            let (_, paths) = load_project(&cli.project)?;
            let breakpoints = read_breakpoints_file(&paths.stylesheet)?;
            if breakpoints.is_empty() {
                println!("No breakpoints in {}", paths.stylesheet.display());
            }
            for bp in breakpoints.entries() {
                println!("{}\t{}px", bp.token, bp.size);
            }
        }
        Command::Picture { name, alt, class } => {
            let (site, paths) = load_project(&cli.project)?;
            let sizes = read_breakpoints_file(&paths.stylesheet)?.sizes();
            let markup = markup::picture(&name, &alt, class.as_deref(), &sizes, &site.markup)
                .ok_or_else(|| format!("no breakpoints in {}", paths.stylesheet.display()))?;
            println!("{}", markup.into_string());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initial build, then poll forever.
fn watch(project: &Path, site: &SiteConfig, paths: ProjectPaths) -> ! {
    let root = project.join(&site.watch.root);
    let exclude = vec![paths.cache.clone(), paths.output.clone()];
    println!("Watching {} (Ctrl+C to stop)", root.display());

    let (tx, _printer) = spawn_printer();
    let watcher = Watcher::new(
        root,
        exclude,
        site.watch.debounce(),
        site.watch.poll_interval(),
        move || pipeline::build(&paths, &RustBackend::new(), true, Some(&tx)),
    );
    let base = project.to_path_buf();
    watcher.run(|event| {
        for line in output::format_watch_event(&event, &base) {
            println!("{}", line);
        }
    })
}
