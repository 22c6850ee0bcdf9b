use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use thallium_tl_compiler::{dump_json, parse_files, Generator, Layer, ParseOptions, TlError};

#[derive(Parser)]
#[command(name = "tlgen")]
#[command(about = "Generate C++ TL objects from layered schemas", long_about = None)]
struct Cli {
    /// Log every parsed source and skipped line
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate `functions.cpp` and `types.cpp` from the given schemas
    Generate {
        /// Output directory (created if missing)
        #[arg(short, long)]
        out: PathBuf,

        /// Schema source as `LAYER=PATH`, in processing order
        #[arg(short, long = "scheme", value_parser = parse_scheme, required = true)]
        schemes: Vec<(Layer, PathBuf)>,

        /// Do not remove previously generated files first
        #[arg(long)]
        keep: bool,
    },

    /// Remove previously generated files from the output directory
    Clean {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print the parsed object model as JSON
    Dump {
        /// Schema source as `LAYER=PATH`, in processing order
        #[arg(short, long = "scheme", value_parser = parse_scheme, required = true)]
        schemes: Vec<(Layer, PathBuf)>,

        /// Keep boolFalse, boolTrue, true and vector in the output
        #[arg(long)]
        include_core: bool,
    },
}

fn parse_scheme(s: &str) -> Result<(Layer, PathBuf), String> {
    let (layer, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LAYER=PATH, got {:?}", s))?;
    let layer = layer
        .trim()
        .parse::<Layer>()
        .map_err(|e| format!("invalid layer {:?}: {}", layer, e))?;
    Ok((layer, PathBuf::from(path)))
}

fn main() -> Result<(), TlError> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Generate { out, schemes, keep } => {
            let generator = Generator::new(out);
            if !keep {
                tracing::info!("cleaning previous TL objects");
                generator.clean()?;
            }
            tracing::info!("generating TL objects");
            generator.generate(schemes)?;
            tracing::info!(out = %out.display(), "done");
            Ok(())
        }

        Commands::Clean { out } => Generator::new(out).clean(),

        Commands::Dump { schemes, include_core } => {
            let options = ParseOptions { ignore_core: !include_core };
            let objects = parse_files(schemes, options).collect::<Result<Vec<_>, _>>()?;
            println!("{}", dump_json(&objects)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheme() {
        assert_eq!(
            parse_scheme("71=schemes/api.tl").unwrap(),
            (71, PathBuf::from("schemes/api.tl"))
        );
        assert!(parse_scheme("schemes/api.tl").is_err());
        assert!(parse_scheme("x=api.tl").is_err());
    }
}
