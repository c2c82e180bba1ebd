//! redeck CLI - recolor and re-layout PowerPoint decks
//!
//! A command-line front end for the redeck library: apply a color
//! scheme to a .pptx file and optionally rebuild its slides under a
//! different layout template.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use redeck::{extract, ColorScheme, DesignOptions, Presentation};
use std::fs;
use std::path::PathBuf;

/// Recolor and re-layout PowerPoint decks
#[derive(Parser)]
#[command(
    name = "redeck",
    version,
    about = "Recolor and re-layout PowerPoint decks",
    long_about = "redeck - content-preserving redesign for .pptx files.\n\n\
                  Applies a four-color scheme to every slide and can rebuild\n\
                  slides under a chosen layout template, appending the rebuilt\n\
                  copies after the originals for comparison."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a color scheme and optionally rebuild slides
    Design {
        /// Input .pptx file
        input: PathBuf,

        /// JSON file with a design-advisor reply (background_color,
        /// title_color, body_color, accent_color)
        #[arg(long, value_name = "FILE")]
        scheme_file: Option<PathBuf>,

        /// Background color as #RRGGBB
        #[arg(short, long, value_name = "HEX")]
        background: Option<String>,

        /// Title text color as #RRGGBB
        #[arg(long, value_name = "HEX")]
        title_color: Option<String>,

        /// Body text color as #RRGGBB
        #[arg(long, value_name = "HEX")]
        body_color: Option<String>,

        /// Accent color as #RRGGBB (displayed, not painted)
        #[arg(long, value_name = "HEX")]
        accent: Option<String>,

        /// Layout template index to rebuild slides under (see `layouts`)
        #[arg(short, long, value_name = "N")]
        layout: Option<usize>,

        /// Output file path (default: designed_<input> next to input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the deck's layout templates
    Layouts {
        /// Input .pptx file
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show deck information and extracted slide content
    Info {
        /// Input .pptx file
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Design {
            input,
            scheme_file,
            background,
            title_color,
            body_color,
            accent,
            layout,
            output,
        } => {
            let scheme = resolve_scheme(
                scheme_file.as_deref().map(fs::read_to_string).transpose()?,
                background,
                title_color,
                body_color,
                accent,
            );

            println!("{}", "Color scheme".cyan().bold());
            print_swatch("Background", &scheme.background);
            print_swatch("Title", &scheme.title);
            print_swatch("Body", &scheme.body);
            print_swatch("Accent", &scheme.accent);

            let pb = create_spinner("Redesigning deck...");

            let mut options = DesignOptions::new(scheme);
            if let Some(index) = layout {
                options = options.with_layout(index);
            }

            let data = fs::read(&input)?;
            let designed = redeck::redesign_bytes(&data, &options)?;

            let output_path = output.unwrap_or_else(|| {
                let name = input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "presentation.pptx".to_string());
                input.with_file_name(redeck::designed_filename(&name))
            });
            fs::write(&output_path, &designed.bytes)?;

            pb.finish_and_clear();

            for warning in &designed.report.warnings {
                eprintln!("{} {}", "!".yellow().bold(), warning);
            }
            if designed.report.slides_appended > 0 {
                println!(
                    "{} Appended {} redesigned slide(s)",
                    "✓".green().bold(),
                    designed.report.slides_appended
                );
            }
            println!(
                "{} Wrote {}",
                "✓".green().bold(),
                output_path.display()
            );
        }

        Commands::Layouts { input, json } => {
            let pb = create_spinner("Reading deck...");
            let prs = Presentation::open(&input)?;
            pb.finish_and_clear();

            if json {
                let layouts: Vec<_> = prs
                    .layouts()
                    .iter()
                    .enumerate()
                    .map(|(index, layout)| {
                        serde_json::json!({ "index": index, "name": layout.name })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&layouts)?);
                return Ok(());
            }

            println!("{}", "Layout templates".cyan().bold());
            println!("{}", "─".repeat(40));
            for (index, layout) in prs.layouts().iter().enumerate() {
                let name = if layout.name.is_empty() {
                    "(unnamed)"
                } else {
                    layout.name.as_str()
                };
                println!("{}: {}", index.to_string().bold(), name);
            }
            if prs.layouts().is_empty() {
                println!("{} No layout templates found", "!".yellow().bold());
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Reading deck...");
            let prs = Presentation::open(&input)?;
            pb.finish_and_clear();

            println!("{}", "Deck Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Slides".bold(), prs.slide_count());
            println!("{}: {}", "Layouts".bold(), prs.layouts().len());

            println!("\n{}", "Extracted content".cyan().bold());
            println!("{}", "─".repeat(40));
            for index in 0..prs.slide_count() {
                let content = extract(&prs.read_slide_xml(index)?)?;
                if content.is_empty() {
                    println!("{}: {}", format!("Slide {}", index + 1).bold(), "(no text)".dimmed());
                } else {
                    println!(
                        "{}: {}",
                        format!("Slide {}", index + 1).bold(),
                        preview(&content.title)
                    );
                    if !content.body.is_empty() {
                        println!("  {}", preview(&content.body).dimmed());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Build the scheme from a saved advisor reply and/or explicit colors.
///
/// With neither, the fixed fallback scheme applies; explicit colors
/// override individual entries.
fn resolve_scheme(
    reply: Option<String>,
    background: Option<String>,
    title: Option<String>,
    body: Option<String>,
    accent: Option<String>,
) -> ColorScheme {
    let mut scheme = match reply {
        Some(text) => match ColorScheme::parse_reply(&text) {
            Some(scheme) => scheme,
            None => {
                eprintln!(
                    "{} scheme file is not a usable advisor reply; using the fallback scheme",
                    "!".yellow().bold()
                );
                ColorScheme::fallback()
            }
        },
        None => {
            if background.is_none() && title.is_none() && body.is_none() && accent.is_none() {
                eprintln!(
                    "{} no colors given; using the fallback scheme",
                    "!".yellow().bold()
                );
            }
            ColorScheme::fallback()
        }
    };

    if let Some(color) = background {
        scheme.background = color;
    }
    if let Some(color) = title {
        scheme.title = color;
    }
    if let Some(color) = body {
        scheme.body = color;
    }
    if let Some(color) = accent {
        scheme.accent = color;
    }
    scheme
}

fn print_swatch(label: &str, hex: &str) {
    let rgb = redeck::resolve(hex);
    println!(
        "  {}: {} {}",
        label.bold(),
        "  ".on_truecolor(rgb.r, rgb.g, rgb.b),
        hex
    );
}

fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let mut preview: String = first_line.chars().take(60).collect();
    if preview.len() < first_line.len() || text.lines().count() > 1 {
        preview.push('…');
    }
    preview
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
