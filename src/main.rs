use clap::{Parser, Subcommand};
use razbor_rs::Text;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Нативный поток анализатора -> CG3-поток.
    ToCg3 {
        input: Option<PathBuf>,

        #[clap(short, long, default_value_t = false)]
        /// Печатать следы правил дизамбигуации.
        traces: bool,
    },
    /// CG3-поток -> нативный поток анализатора.
    FromCg3 { input: Option<PathBuf> },
    /// JSON-выгрузка разобранного потока.
    Json {
        input: Option<PathBuf>,

        #[clap(long, default_value_t = false)]
        /// Вход в формате CG3, а не в нативном формате анализатора.
        cg3: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let Args { command } = Args::parse();

    match command {
        Commands::ToCg3 { input, traces } => {
            let text = Text::from_hfst(&read_input(input)?)?;
            debug!("Parsed {} tokens", text.len());
            print!("{}", text.cg3_str(traces));
        }
        Commands::FromCg3 { input } => {
            let text = Text::from_cg3(&read_input(input)?)?;
            debug!("Parsed {} tokens", text.len());
            print!("{}", text.hfst_str());
        }
        Commands::Json { input, cg3 } => {
            let stream = read_input(input)?;
            let text = match cg3 {
                true => Text::from_cg3(&stream)?,
                false => Text::from_hfst(&stream)?,
            };
            println!("{}", serde_json::to_string_pretty(&text)?);
        }
    };

    Ok(())
}

/// Чтение потока из файла или, без аргумента, из stdin.
fn read_input(path: Option<PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => std::io::read_to_string(std::io::stdin()),
    }
}
