//! schema_scribe: data-model README to schema artifacts
//!
//! ```bash
//! # Everything: migration, CSV, YAML dump, ERD description
//! schema_scribe convert README.md
//!
//! # Just the migration script
//! schema_scribe migration README.md --output schema.rb
//!
//! # ERD description from an existing dump, rendered with erd
//! schema_scribe erd artifacts/gdm.yml --render
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use schema_scribe::config;
use schema_scribe::output::{self, CommandRenderer};
use schema_scribe::utils::logging::init_logging;
use schema_scribe::SchemaScribe;

#[derive(Parser)]
#[command(name = "schema_scribe")]
#[command(version)]
#[command(about = "Generate migrations, CSV, YAML and ERD artifacts from a markdown data model", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./schema_scribe.toml when present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every artifact for a document
    Convert {
        /// Markdown data-model document
        document: PathBuf,

        /// Override the output directory
        #[arg(short, long)]
        out_dir: Option<String>,

        /// Render the diagram image after writing the text artifacts
        #[arg(long)]
        render: bool,
    },

    /// Print or write the migration script
    Migration {
        document: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the CSV export and the structured dump
    Export {
        document: PathBuf,

        #[arg(short, long)]
        out_dir: Option<String>,
    },

    /// Produce the ERD description from a structured dump
    Erd {
        /// YAML or JSON dump
        dump: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render the diagram image with the configured program
        #[arg(long)]
        render: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_or_default(cli.config.as_deref())?;
    let mut logging = config.logging.clone().unwrap_or_default();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&Some(logging))?;

    match cli.command {
        Commands::Convert {
            document,
            out_dir,
            render,
        } => {
            if let Some(dir) = out_dir {
                config.output.directory = dir;
            }
            config.diagram.render |= render;

            let scribe = SchemaScribe::new(config);
            let paths = scribe
                .convert_file(&document)
                .with_context(|| format!("converting {}", document.display()))?;

            println!("migration: {}", paths.migration.display());
            println!("csv:       {}", paths.csv.display());
            println!("dump:      {}", paths.dump.display());
            println!("diagram:   {}", paths.diagram.display());
            if let Some(image) = paths.image {
                println!("image:     {}", image.display());
            }
        }
        Commands::Migration {
            document,
            output: target,
        } => {
            let text = std::fs::read_to_string(&document)
                .with_context(|| format!("reading {}", document.display()))?;
            let script = SchemaScribe::new(config).generate_migration(&text)?;

            match target {
                Some(path) => output::write_artifact(&path, &script)?,
                None => print!("{}", script),
            }
        }
        Commands::Export { document, out_dir } => {
            if let Some(dir) = out_dir {
                config.output.directory = dir;
            }
            let text = std::fs::read_to_string(&document)
                .with_context(|| format!("reading {}", document.display()))?;

            let scribe = SchemaScribe::new(config);
            let (model, export) = scribe.export(&text)?;
            let dump = output::StructuredDump::from_model(&model);
            let out = &scribe.config().output;

            output::write_artifact(&out.path_for(&out.csv_file), &export.to_csv())?;
            output::write_artifact(&out.path_for(&out.dump_file), &dump.render(out.dump_format)?)?;
        }
        Commands::Erd {
            dump,
            output: target,
            render,
        } => {
            let scribe = SchemaScribe::new(config);
            let diagram = scribe
                .diagram_from_dump_file(&dump)
                .with_context(|| format!("loading {}", dump.display()))?;

            let target = target.unwrap_or_else(|| {
                let out = &scribe.config().output;
                out.path_for(&out.diagram_file)
            });
            output::write_artifact(&target, &diagram)?;

            if render || scribe.config().diagram.render {
                let renderer = CommandRenderer::from_config(&scribe.config().diagram);
                match scribe.render_image(&diagram, &renderer) {
                    Some(image) => println!("image: {}", image.display()),
                    None => eprintln!("diagram rendering failed; see log for details"),
                }
            }
        }
    }

    Ok(())
}
