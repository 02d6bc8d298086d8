//! CLI binary for the Crossref client.
//!
//! Usage: crossref query "Slow Robots for Unobtrusive Posture Correction"

#[cfg(feature = "cli")]
mod cli {
    use clap::{Parser, Subcommand};
    use crossref_client::parse::DEFAULT_SELECT_FIELDS;
    use crossref_client::{ClientBuilder, ClientConfig, CrossrefClient, Work};
    use tracing_subscriber::EnvFilter;

    #[derive(Parser)]
    #[command(name = "crossref", about = "Crossref REST API client", version)]
    struct Cli {
        /// Contact address (overrides CROSSREF_MAILTO env var)
        #[arg(long, global = true)]
        mailto: Option<String>,

        /// Application name sent to Crossref (overrides CROSSREF_APP_NAME)
        #[arg(long, global = true)]
        app_name: Option<String>,

        /// Output format
        #[arg(long, global = true, default_value = "table")]
        output: OutputFormat,

        /// Log requests and responses to stderr
        #[arg(short, long, global = true)]
        verbose: bool,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Clone, Copy, clap::ValueEnum)]
    enum OutputFormat {
        Table,
        Json,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Look up the metadata of a DOI
        Doi {
            /// DOI, e.g. 10.1145/3290605.3300843
            doi: String,
            /// Print the raw JSON, restricted to these fields (comma-separated;
            /// a compact default set when no value is given)
            #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_SELECT_FIELDS)]
            select: Option<String>,
        },
        /// Search works by free text
        Query {
            /// Search phrase
            #[arg(required = true)]
            text: Vec<String>,
        },
    }

    fn init_logging(verbose: bool) {
        let filter = if verbose {
            EnvFilter::new("crossref_client=debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    fn make_client(
        mailto: Option<String>,
        app_name: Option<String>,
    ) -> crossref_client::error::Result<CrossrefClient> {
        let mut config = ClientConfig::from_env_with_mailto(mailto)?;
        if let Some(app) = app_name {
            config.app_name = app;
        }
        ClientBuilder::from_config(config).build()
    }

    fn first_author(work: &Work) -> String {
        work.authors()
            .first()
            .map(|a| a.family.clone())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| "-".to_string())
    }

    fn print_works_table(works: &[Work]) {
        use comfy_table::{ContentArrangement, Table};

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["DOI", "Date", "First Author", "Title"]);

        for work in works {
            let title = if work.title().chars().count() > 60 {
                format!("{}...", work.title().chars().take(57).collect::<String>())
            } else {
                work.title().to_string()
            };
            table.add_row(vec![
                work.doi().to_string(),
                work.date().to_string(),
                first_author(work),
                title,
            ]);
        }

        println!("{table}");
    }

    fn print_work(work: &Work) {
        use comfy_table::{ContentArrangement, Table};

        let names = |people: &[crossref_client::Contributor]| {
            people
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        };

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        let rows = [
            ("DOI", work.doi().to_string()),
            ("Type", work.work_type().to_string()),
            ("Title", work.title().to_string()),
            ("Container", work.book_title().to_string()),
            ("Authors", names(work.authors())),
            ("Editors", names(work.editors())),
            ("Date", work.date().to_string()),
            ("Publisher", work.publisher().to_string()),
            ("Volume", work.volume().to_string()),
            ("Issue", work.issue().to_string()),
            ("Pages", work.pages().to_string()),
            ("ISSN", work.issn().to_string()),
            ("ISBN", work.isbn().to_string()),
        ];
        for (label, value) in rows {
            if !value.is_empty() {
                table.add_row(vec![label.to_string(), value]);
            }
        }

        println!("{table}");
    }

    pub async fn run() -> crossref_client::error::Result<()> {
        let cli = Cli::parse();
        init_logging(cli.verbose);
        let client = make_client(cli.mailto, cli.app_name)?;

        match cli.command {
            Commands::Doi {
                doi,
                select: Some(fields),
            } => {
                let raw = client.works_json(&doi, Some(fields.as_str())).await?;
                let value: serde_json::Value = serde_json::from_slice(&raw)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }

            Commands::Doi { doi, select: None } => {
                let work = client.works(&doi).await?;
                match cli.output {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&work)?),
                    OutputFormat::Table => print_work(&work),
                }
            }

            Commands::Query { text } => {
                let results = client.search(&text.join(" ")).await?;
                match cli.output {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&results)?);
                    }
                    OutputFormat::Table => {
                        println!(
                            "Found {} results (showing {}):",
                            results.total_results,
                            results.works.len()
                        );
                        print_works_table(&results.works);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature. Build with: cargo build --features cli");
    std::process::exit(1);
}
