use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use salary_range::data::loader;
use salary_range::report::Report;
use salary_range::{LookupError, summarize};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct CommandArgs {
    /// Survey corpus (.parquet, .json or .csv)
    #[arg(long, short, env = "SALARY_RANGE_DATA")]
    data: PathBuf,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// List countries in the corpus
    Countries,
    /// List languages, for one country or across the corpus
    Languages { country: Option<String> },
    /// Salary distribution per experience band
    Summary {
        country: String,
        language: String,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = CommandArgs::parse();
    let index = loader::load_index(&args.data)?;

    match args.mode {
        Mode::Countries => {
            for country in index.list_countries() {
                println!("{country}");
            }
        }
        Mode::Languages { country } => {
            let languages = match country.as_deref() {
                Some(c) => index.list_languages(c),
                None => index.all_languages(),
            };
            for language in languages {
                println!("{language}");
            }
        }
        Mode::Summary {
            country,
            language,
            format,
        } => match index.lookup(&country, &language) {
            Ok(observations) => {
                let summary = summarize(observations);
                if summary.skipped_count > 0 {
                    log::warn!(
                        "{} observations skipped, unrecognised experience labels: {:?}",
                        summary.skipped_count,
                        summary.skipped_labels
                    );
                }
                let report = Report::new(&country, &language, &summary);
                match format {
                    Format::Table => print!("{}", report.render_table()),
                    Format::Json => println!("{}", report.render_json()?),
                }
            }
            Err(LookupError::NotFound { .. }) => {
                println!("No data for this combination: {language} in {country}");
            }
        },
    }

    Ok(())
}
