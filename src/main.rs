//! Org Chart CLI
//!
//! Usage:
//!   org-chart [OPTIONS] <RECORDS>
//!
//! Options:
//!   -s, --settings <FILE>  Chart settings (levels, palette, root) in TOML
//!   -r, --root <NAME>      Display name of the top-of-chart person
//!   -x, --script <FILE>    Edit script to apply before output
//!   -f, --format <FORMAT>  svg, outline, or changes
//!   --focus <ID>           Centre the viewport on a node
//!   -g, --grammar          Show edit script reference
//!   -d, --debug            Verbose logging on stderr
//!   -h, --help             Print help

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use org_chart::{
    load_records, render_chart, ChartError, ChartOptions, ChartSettings, EditorConfig, NodeId,
    OutputFormat,
};

#[derive(Parser)]
#[command(name = "org-chart")]
#[command(about = "Build, edit, and render company reporting charts")]
struct Cli {
    /// Employee records (.json array or .toml with [[employees]])
    records: Option<PathBuf>,

    /// Chart settings file (TOML)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Display name of the top-of-chart person
    #[arg(short, long)]
    root: Option<String>,

    /// Edit script applied before output
    #[arg(short = 'x', long)]
    script: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// Centre the viewport on this node id
    #[arg(long)]
    focus: Option<String>,

    /// Show edit script reference
    #[arg(short, long)]
    grammar: bool,

    /// Log at debug level on stderr
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Svg,
    Outline,
    Changes,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Svg => OutputFormat::Svg,
            Format::Outline => OutputFormat::Outline,
            Format::Changes => OutputFormat::Changes,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.grammar {
        print_grammar();
        return;
    }

    let Some(records_path) = &cli.records else {
        eprintln!("Error: no records file given (see --help)");
        std::process::exit(1);
    };

    let settings = match &cli.settings {
        Some(path) => match ChartSettings::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading settings '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ChartSettings::default(),
    };

    let records = match load_records(records_path) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error reading records '{}': {}", records_path.display(), e);
            std::process::exit(1);
        }
    };

    let script = match &cli.script {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => Some((path.display().to_string(), content)),
            Err(e) => {
                eprintln!("Error reading script '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let mut editor = EditorConfig::new();
    if let Some(root) = &cli.root {
        editor = editor.with_root_name(root.clone());
    }
    let mut options = ChartOptions::new()
        .with_editor(editor)
        .with_format(cli.format.into());
    if let Some((_, source)) = &script {
        options = options.with_script(source.clone());
    }
    if let Some(focus) = &cli.focus {
        options = options.with_focus(NodeId::new(focus.clone()));
    }

    match render_chart(records, &settings, &options) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(ChartError::Script(err)) => {
            match &script {
                Some((filename, source)) => eprint!("{}", err.format(source, filename)),
                None => eprintln!("Error: {}", err),
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_grammar() {
    println!(
        r#"ORG CHART EDIT SCRIPTS
======================

One command per line (or any whitespace). Ids are bare
(letters, digits, '_' and '.') or "quoted". // and /* */ are comments.

STRUCTURAL EDITS (local, undoable)
----------------------------------
move A -> B                       Move A and its team under B
move A -> B [with_children: false]
                                  Move A alone; its reports go to A's old manager
bulk A, B, C -> T                 Move several people under T

SERVER OPERATIONS (refetch afterwards, clear history)
-----------------------------------------------------
swap M1 <-> M2                    Exchange two managers' teams
assign team OLD -> NEW            Give OLD's direct reports to NEW
assign person P -> M              Report P to M

SELECTION AND HISTORY
---------------------
select A      clear
undo          redo          save

VIEWPORT
--------
focus A       focus root
zoom in       zoom out      reset

A rejected command stops the script. Earlier commands stay applied."#
    );
}
