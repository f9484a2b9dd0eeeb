use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::seed::DEFAULT_TRAINING_FIXTURE;

#[derive(Parser, Debug)]
#[command(name = "pokedex-db")]
#[command(version, about = "Pokemon reference database schema and loaders")]
pub struct Cli {
    /// SQLite database path (default: $DB_NAME in the user data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build growth-rate records from the training fixture and print them
    SeedTraining {
        /// JSON fixture containing a "growth_rate" list
        #[arg(short, long, default_value = DEFAULT_TRAINING_FIXTURE)]
        path: PathBuf,

        /// Also insert the records into the database
        #[arg(long)]
        commit: bool,

        /// Print the records as JSON instead of one per line
        #[arg(long)]
        json: bool,
    },

    /// Create tables in the database (existing tables are kept)
    Create {
        /// Only include these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// Rebuild the database from a directory of JSONL reference files
    Import {
        /// Directory containing <table>.jsonl files
        input_dir: PathBuf,

        /// Only include these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// Print the generated SQL schema
    Ddl {
        /// Only include these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// List all available table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_training_defaults() {
        let cli = Cli::try_parse_from(["pokedex-db", "seed-training"]).unwrap();
        match cli.command {
            Commands::SeedTraining { path, commit, json } => {
                assert_eq!(path, PathBuf::from(DEFAULT_TRAINING_FIXTURE));
                assert!(!commit);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.db.is_none());
    }

    #[test]
    fn test_global_db_flag_and_filters() {
        let cli = Cli::try_parse_from([
            "pokedex-db",
            "import",
            "data/reference",
            "--include",
            "pokemons,base_stats",
            "--db",
            "out.sqlite3",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("out.sqlite3")));
        match cli.command {
            Commands::Import { input_dir, include, exclude } => {
                assert_eq!(input_dir, PathBuf::from("data/reference"));
                assert_eq!(include, Some(vec!["pokemons".to_string(), "base_stats".to_string()]));
                assert!(exclude.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
