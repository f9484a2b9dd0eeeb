use anyhow::Result;
use pokedex_db::{
    cli::{Cli, Commands},
    config::DbConfig,
    db::{generate_create_table, generate_indexes, import_reference_data, Database},
    filter::resolve_tables,
    schema::table_names,
    seed::populate_training,
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::SeedTraining { path, commit, json } => {
            let rates = if commit {
                let config = DbConfig::resolve(cli.db)?;
                let mut db = Database::open(&config.path)?;
                populate_training(&path, Some(&mut db))?
            } else {
                populate_training(&path, None)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&rates)?);
            } else {
                for rate in &rates {
                    println!("{}", rate);
                }
            }
        }

        Commands::Create { include, exclude } => {
            let tables = resolve_tables(include, exclude)?;
            let config = DbConfig::resolve(cli.db)?;

            let db = Database::open(&config.path)?;
            db.create_tables(&tables)?;

            println!("Created {} tables in {:?}", tables.len(), config.path);
        }

        Commands::Import {
            input_dir,
            include,
            exclude,
        } => {
            let start = Instant::now();

            // Resolve table filters
            let tables = resolve_tables(include, exclude)?;
            let config = DbConfig::resolve(cli.db)?;

            let record_count = import_reference_data(&input_dir, &config.path, tables)?;

            let elapsed = start.elapsed();
            println!(
                "Created {:?} ({} records) in {:.1}s",
                config.path,
                record_count,
                elapsed.as_secs_f64()
            );
        }

        Commands::Ddl { include, exclude } => {
            for schema in resolve_tables(include, exclude)? {
                println!("{};", generate_create_table(schema));
                for index in generate_indexes(schema) {
                    println!("{};", index);
                }
                println!();
            }
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
