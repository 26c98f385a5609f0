//! verstak CLI - element tree to typeset markup and HTML

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use verstak::typograf::RULES_ENV_VAR;
use verstak::{
    render, BuildOptions, Document, JsonFormat, LoadMode, RenderOptions, RenderStats,
    SourceDocument, TypographyRuleSet,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "verstak")]
#[command(version)]
#[command(about = "Convert word-processing element trees to typeset markup and HTML", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Settings {
    /// Typography rule file (JSON)
    #[arg(long, value_name = "FILE", global = true, env = RULES_ENV_VAR)]
    rules: Option<PathBuf>,

    /// Disable the typography pass
    #[arg(long, global = true)]
    no_typograf: bool,

    /// Disable [nobr] joins
    #[arg(long, global = true)]
    no_nobr: bool,

    /// Keep hyperlinks inside HTML headings
    #[arg(long, global = true)]
    allow_header_links: bool,

    /// Render a stub instead of generic tables
    #[arg(long, global = true)]
    skip_tables: bool,

    /// Fail on unresolved hyperlinks instead of keeping their text
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert element trees to markup and HTML
    Convert {
        /// Input JSON element tree files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (next to each input if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert an element tree to intermediate markup
    #[command(alias = "md")]
    Markup {
        /// Input JSON element tree file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert an element tree to HTML
    Html {
        /// Input JSON element tree file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print rendering statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Dump the built tree as JSON
    Json {
        /// Input JSON element tree file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the active typography rules
    Rules {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Settings {
    fn load_rules(&self) -> CliResult<TypographyRuleSet> {
        let rules = match &self.rules {
            Some(path) => TypographyRuleSet::from_file(path, LoadMode::Lenient)?,
            None => TypographyRuleSet::builtin(),
        };
        Ok(rules)
    }

    fn build_options(&self) -> BuildOptions {
        let options = BuildOptions::new()
            .with_typography(!self.no_typograf)
            .with_nobr(!self.no_nobr);
        if self.strict {
            options
        } else {
            options.lenient()
        }
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_header_links(self.allow_header_links)
            .with_skip_tables(self.skip_tables)
    }

    fn build(&self, input: &Path, rules: &TypographyRuleSet) -> CliResult<Document> {
        let source = SourceDocument::from_file(input)?;
        let doc = verstak::build_document_with(&source, &self.build_options(), rules)?;
        Ok(doc)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let settings = &cli.settings;

    let result = match &cli.command {
        Commands::Convert { inputs, output } => cmd_convert(settings, inputs, output.as_deref()),
        Commands::Markup { input, output } => cmd_markup(settings, input, output.as_deref()),
        Commands::Html {
            input,
            output,
            stats,
        } => cmd_html(settings, input, output.as_deref(), *stats),
        Commands::Json {
            input,
            output,
            compact,
        } => cmd_json(settings, input, output.as_deref(), *compact),
        Commands::Rules { json } => cmd_rules(settings, *json),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Files written for one input, with the HTML rendering stats.
struct Converted {
    markup_path: PathBuf,
    html_path: PathBuf,
    stats: RenderStats,
    html_len: usize,
}

fn convert_one(
    settings: &Settings,
    rules: &TypographyRuleSet,
    input: &Path,
    output_dir: Option<&Path>,
) -> CliResult<Converted> {
    let doc = settings.build(input, rules)?;
    let render_options = settings.render_options();

    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    let markup_path = dir.join(format!("{}.md", stem));
    let html_path = dir.join(format!("{}.html", stem));

    let markup = render::to_markup(&doc, &render_options)?;
    fs::write(&markup_path, format!("{}\n", markup))?;
    let html = render::to_html_with_stats(&doc, &render_options)?;
    fs::write(&html_path, format!("{}\n", html.content))?;

    Ok(Converted {
        markup_path,
        html_path,
        html_len: html.content_len(),
        stats: html.stats,
    })
}

fn cmd_convert(settings: &Settings, inputs: &[PathBuf], output: Option<&Path>) -> CliResult<()> {
    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }
    let rules = settings.load_rules()?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let results: Vec<(&PathBuf, Result<Converted, String>)> = inputs
        .par_iter()
        .map(|input| {
            let result =
                convert_one(settings, &rules, input, output).map_err(|e| e.to_string());
            pb.inc(1);
            (input, result)
        })
        .collect();

    pb.finish_with_message("Done!");

    let mut failed = 0;
    let mut totals = RenderStats::new();
    let mut html_bytes = 0;
    println!("\n{}", "Output files:".green().bold());
    for (input, result) in &results {
        match result {
            Ok(converted) => {
                println!("  {} {}", "├─".dimmed(), converted.markup_path.display());
                println!("  {} {}", "└─".dimmed(), converted.html_path.display());
                totals.merge(&converted.stats);
                html_bytes += converted.html_len;
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), input.display(), e);
            }
        }
    }

    println!(
        "\n{} {} paragraphs, {} headings, {} tables, {} glue warnings, {} bytes of HTML",
        "Total:".bold(),
        totals.paragraph_count,
        totals.heading_count,
        totals.grid_count,
        totals.glue_warning_count,
        html_bytes
    );

    if failed > 0 {
        return Err(format!("{} of {} documents failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn cmd_markup(settings: &Settings, input: &Path, output: Option<&Path>) -> CliResult<()> {
    let rules = settings.load_rules()?;
    let doc = settings.build(input, &rules)?;
    let markup = render::to_markup(&doc, &settings.render_options())?;
    write_or_print(output, &markup)
}

fn cmd_html(settings: &Settings, input: &Path, output: Option<&Path>, stats: bool) -> CliResult<()> {
    let rules = settings.load_rules()?;
    let doc = settings.build(input, &rules)?;
    let result = render::to_html_with_stats(&doc, &settings.render_options())?;
    write_or_print(output, &result.content)?;

    if stats {
        let s = &result.stats;
        eprintln!("{}", "Rendering Statistics".cyan().bold());
        eprintln!("{}", "─".repeat(40).dimmed());
        if let Some(title) = &result.title {
            eprintln!("{}: {}", "Title".bold(), title);
        }
        eprintln!("{}: {}", "Paragraphs".bold(), s.paragraph_count);
        eprintln!("{}: {}", "Headings".bold(), s.heading_count);
        eprintln!("{}: {}", "List items".bold(), s.list_item_count);
        eprintln!("{}: {}", "Images".bold(), s.image_count);
        eprintln!("{}: {}", "Annotation rows".bold(), s.pole_count);
        eprintln!("{}: {}", "Callouts".bold(), s.callout_count);
        eprintln!("{}: {}", "Tables".bold(), s.grid_count);
        eprintln!("{}: {}", "Glue warnings".bold(), s.glue_warning_count);
        eprintln!("{}: {}", "Words".bold(), s.word_count);
    }
    Ok(())
}

fn cmd_json(
    settings: &Settings,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let rules = settings.load_rules()?;
    let doc = settings.build(input, &rules)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&doc, format)?;
    write_or_print(output, &json)
}

fn cmd_rules(settings: &Settings, json: bool) -> CliResult<()> {
    let rules = settings.load_rules()?;

    if json {
        let sections: Vec<serde_json::Value> = rules
            .rules()
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "name": rule.name,
                    "kind": rule.kind.as_str(),
                    "group": rule.group,
                    "pattern": rule.regex().as_str(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    let origin = match &settings.rules {
        Some(path) => path.display().to_string(),
        None => "built-in".to_string(),
    };
    println!("{} ({})", "Typography Rules".cyan().bold(), origin.dimmed());
    println!("{}", "─".repeat(40).dimmed());
    for rule in rules.rules() {
        println!(
            "{:<24} {:<5} group {}  {}",
            rule.name.bold(),
            rule.kind.as_str(),
            rule.group,
            rule.regex().as_str().dimmed()
        );
    }
    println!("\n{} rules", rules.len());
    Ok(())
}
