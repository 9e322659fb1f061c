use clap::{Parser, Subcommand};
use orgpress::generate::GenerateError;
use orgpress::{config, generate, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "orgpress")]
#[command(about = "Static site generator for Org mode posts")]
#[command(long_about = "\
Static site generator for Org mode posts

Every file under the site directory whose path matches the input pattern is
converted to HTML, rendered through the content template, and written to the
path produced by the output template.

Site structure:

  site/
  ├── orgpress.toml                # Site config (optional)
  ├── templates/                   # Site templates, searched first
  │   └── post.html
  ├── posts/
  │   ├── hello.org                # #+TITLE: Hello  → output/hello.html
  │   └── Second Post.org          # no title       → output/second-post.html
  └── output/                      # Generated pages

Template variables:
  Content template:  post.title, post.date, ... (keywords, lower-cased),
                     post.slug, post.html (rendered body)
  Output template:   the same keys without the `post.` prefix

Run 'orgpress gen-config' to generate a documented orgpress.toml.")]
#[command(version)]
struct Cli {
    /// Site directory (source search root and output root)
    #[arg(long, default_value = ".", global = true)]
    base_dir: PathBuf,

    /// Regex a source path must match
    #[arg(long, global = true)]
    input_pattern: Option<String>,

    /// Regex excluding matching source paths
    #[arg(long, global = true)]
    input_exclude: Option<String>,

    /// Output path template, relative to the site directory
    #[arg(long, global = true)]
    output: Option<String>,

    /// Content template name
    #[arg(long, global = true)]
    template: Option<String>,

    /// Template directory searched after <base-dir>/templates (repeatable)
    #[arg(long = "template-dir", global = true)]
    template_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Flags given on the command line, as a config layer.
    fn overrides(&self) -> toml::Value {
        let mut table = toml::value::Table::new();
        let strings = [
            ("input-pattern", &self.input_pattern),
            ("input-exclude", &self.input_exclude),
            ("output", &self.output),
            ("template", &self.template),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                table.insert(key.to_string(), toml::Value::String(value.clone()));
            }
        }
        if !self.template_dirs.is_empty() {
            let dirs = self
                .template_dirs
                .iter()
                .map(|d| toml::Value::String(d.to_string_lossy().into_owned()))
                .collect();
            table.insert("template-dirs".to_string(), toml::Value::Array(dirs));
        }
        toml::Value::Table(table)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate the site
    Build,
    /// Extract and render every post without writing anything
    Check,
    /// Print a stock orgpress.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orgpress=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), GenerateError> {
    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.base_dir, cli.overrides())?;
            println!("==> Building {}", cli.base_dir.display());
            let report = generate::generate(&config)?;
            output::print_report(&report);
        }
        Command::Check => {
            let config = config::load_config(&cli.base_dir, cli.overrides())?;
            println!("==> Checking {}", cli.base_dir.display());
            let report = generate::plan(&config)?;
            output::print_plan(&report);
            println!("==> Site is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

fn report_error(err: &GenerateError) {
    if let Some(message) = err.user_message() {
        eprintln!("{message}");
        return;
    }
    eprintln!("error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
