use clap::{Parser, Subcommand};
use tracing::error;

use retail_etl::common::constants;
use retail_etl::common::error::EtlError;
use retail_etl::config::Config;
use retail_etl::logging;
use retail_etl::pipeline::{Entity, Pipeline};

#[derive(Parser)]
#[command(name = "retail_etl")]
#[command(about = "Centralises multinational retail data into one Postgres store")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ETL pipeline
    Run {
        /// Specific entities to process (comma-separated).
        /// Available: users, cards, stores, products, orders, date_events
        #[arg(long)]
        entities: Option<String>,
    },
    /// List the tables visible in the source database
    ListTables,
}

fn parse_entities(arg: Option<String>) -> Result<Vec<Entity>, String> {
    let Some(list) = arg else {
        return Ok(Entity::ALL.to_vec());
    };
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            Entity::from_name(name).ok_or_else(|| {
                format!(
                    "unknown entity '{}', expected one of: {}",
                    name,
                    constants::supported_entities().join(", ")
                )
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { entities } => {
            let entities = parse_entities(entities).map_err(EtlError::Config)?;
            let pipeline = Pipeline::new(config).await?;

            println!("🚀 Running retail ETL pipeline...");
            let outcomes = pipeline.run(&entities).await;

            println!("\n📊 Pipeline results:");
            let mut failures = 0usize;
            for (entity, outcome) in &outcomes {
                match outcome {
                    Ok(report) => {
                        println!(
                            "   {}: {} rows extracted, {} loaded into {}",
                            entity.name(),
                            report.rows_extracted,
                            report.rows_loaded,
                            report.destination
                        );
                        if !report.failed_indices.is_empty() {
                            println!(
                                "      ⚠️  {} store fetches failed: {:?}",
                                report.failed_indices.len(),
                                report.failed_indices
                            );
                        }
                    }
                    Err(e) => {
                        failures += 1;
                        println!("   {}: ❌ {}", entity.name(), e);
                    }
                }
            }
            if failures > 0 {
                error!(failures, "pipeline finished with entity failures");
            } else {
                println!("\n✅ All entity pipelines completed successfully");
            }
        }
        Commands::ListTables => {
            let pipeline = Pipeline::new(config).await?;
            for table in pipeline.list_tables().await? {
                println!("{table}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_every_entity() {
        assert_eq!(parse_entities(None).unwrap(), Entity::ALL.to_vec());
    }

    #[test]
    fn entity_lists_are_parsed_and_validated() {
        let entities = parse_entities(Some("users, cards".to_string())).unwrap();
        assert_eq!(entities, vec![Entity::Users, Entity::Cards]);
        assert!(parse_entities(Some("users,bogus".to_string())).is_err());
    }
}
