mod scan;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use marker_core::{
    Config, MAX_NESTING_DEPTH, OutputBuffer, Validation, render_document, sanitize_html, validate,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::scan::{ConversionEntry, scan_markdown};

/// Convert Markdown to HTML.
#[derive(Debug, Parser)]
#[command(name = "marker-cli", author, version, about)]
struct Cli {
    /// Markdown file or directory (default: stdin)
    input: Option<PathBuf>,

    /// Write the result to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Mirror a directory INPUT into DIR as .html files
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Link a stylesheet from the document head
    #[arg(long, value_name = "PATH")]
    css: Option<String>,

    /// Emit the HTML body only, without the document wrapper
    #[arg(long)]
    raw: bool,

    /// Clean the rendered body against the renderer's tag allow-list
    #[arg(long)]
    sanitized: bool,

    /// Only check fence balance; exit 1 when a fence is left open
    #[arg(long)]
    check: bool,

    #[arg(long)]
    no_tables: bool,

    #[arg(long)]
    no_strikethrough: bool,

    #[arg(long)]
    no_task_lists: bool,

    #[arg(long)]
    no_autolinks: bool,

    /// Escape inline markup instead of passing it through
    #[arg(long)]
    no_inline_html: bool,

    /// Copy text verbatim instead of escaping HTML special characters
    #[arg(long)]
    no_escape: bool,

    /// Render newlines inside inline text as <br>
    #[arg(long)]
    hard_breaks: bool,

    /// Deepest nesting of emphasis and links rendered as markup
    #[arg(long, value_name = "N", default_value_t = MAX_NESTING_DEPTH)]
    max_depth: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            enable_tables: !self.no_tables,
            enable_strikethrough: !self.no_strikethrough,
            enable_task_lists: !self.no_task_lists,
            enable_autolinks: !self.no_autolinks,
            enable_inline_html: !self.no_inline_html,
            escape_html: !self.no_escape,
            hard_line_breaks: self.hard_breaks,
            max_nesting_depth: self.max_depth,
            ..Config::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.input {
        Some(input) if input.is_dir() => {
            if cli.output.is_some() {
                bail!("--output cannot be used with a directory input; use --out-dir");
            }
            run_directory(cli, input)
        }
        _ => {
            if cli.out_dir.is_some() {
                bail!("--out-dir requires a directory input");
            }
            run_single(cli)
        }
    }
}

fn run_single(cli: &Cli) -> Result<ExitCode> {
    let (name, markdown) = read_input(cli.input.as_deref())?;

    if cli.check {
        return Ok(exit_code(report(&name, &validate(&markdown))));
    }

    let html = render(cli, &markdown)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("failed to write {}", path.display()))?;
            info!(input = %name, output = %path.display(), "converted");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(html.as_bytes())
                .context("failed to write stdout")?;
            stdout.flush().context("failed to write stdout")?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_directory(cli: &Cli, root: &Path) -> Result<ExitCode> {
    let out_dir = match (&cli.out_dir, cli.check) {
        (Some(dir), _) => dir.as_path(),
        (None, true) => Path::new(""),
        (None, false) => bail!("{} is a directory; pass --out-dir", root.display()),
    };

    let mut entries: Vec<ConversionEntry> = Vec::new();
    scan_markdown(root, out_dir, &mut entries)
        .with_context(|| format!("failed to scan {}", root.display()))?;
    debug!(root = %root.display(), files = entries.len(), "scanned markdown tree");

    if cli.check {
        let mut all_valid = true;
        for entry in &entries {
            let (name, markdown) = read_input(Some(&entry.markdown))?;
            all_valid &= report(&name, &validate(&markdown));
        }
        return Ok(exit_code(all_valid));
    }

    for entry in &entries {
        convert_entry(cli, entry)
            .with_context(|| format!("conversion stopped at {}", entry.markdown.display()))?;
    }
    info!(files = entries.len(), "converted directory");
    Ok(ExitCode::SUCCESS)
}

fn convert_entry(cli: &Cli, entry: &ConversionEntry) -> Result<()> {
    let (_, markdown) = read_input(Some(&entry.markdown))?;
    let html = render(cli, &markdown)?;
    if let Some(parent) = entry.html.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&entry.html, html)
        .with_context(|| format!("failed to write {}", entry.html.display()))?;
    info!(
        input = %entry.markdown.display(),
        output = %entry.html.display(),
        "converted"
    );
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<(String, String)> {
    match path {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            Ok((path.display().to_string(), decode(bytes)))
        }
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            Ok(("<stdin>".to_string(), decode(bytes)))
        }
    }
}

/// Invalid UTF-8 sequences become U+FFFD instead of failing the run.
fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        debug!("input is not valid UTF-8; invalid bytes replaced");
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    })
}

fn render(cli: &Cli, markdown: &str) -> Result<String> {
    let mut parser = marker_core::Parser::new(cli.config());
    let mut body = OutputBuffer::new(parser.config().initial_buffer_size)?;
    parser.parse(markdown, &mut body)?;

    let body = if cli.sanitized {
        sanitize_html(body.as_str())
    } else {
        body.into_string()
    };
    if cli.raw {
        return Ok(body);
    }
    Ok(render_document(&body, cli.css.as_deref())?)
}

/// Prints the diagnostic, if any, and returns whether the input was valid.
fn report(name: &str, validation: &Validation) -> bool {
    if let Some(diagnostic) = &validation.diagnostic {
        eprintln!(
            "{}:{}: {}: {}",
            name, diagnostic.line, diagnostic.code, diagnostic.message
        );
    }
    validation.is_valid()
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
