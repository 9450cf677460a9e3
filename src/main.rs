use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use family_registry::client::RegistryClient;
use family_registry::config::ServerConfig;
use family_registry::models::{CreatePersonInput, Person};
use family_registry::{api, tree_render};

#[derive(Parser)]
#[command(name = "famreg")]
#[command(about = "Registry of people and their parents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve(ServerConfig),
    #[command(flatten)]
    Client(ClientCommand),
}

/// Commands sent to a running server at `FAMREG_URL`.
#[derive(Subcommand)]
enum ClientCommand {
    /// Add a person
    Add {
        first_name: String,
        last_name: String,
        /// Birthday as YYYY-MM-DD
        birthday: NaiveDate,
    },
    /// Delete a person
    Remove { id: Uuid },
    /// Record PARENT as a parent of CHILD
    AddParent { child: Uuid, parent: Uuid },
    /// List all persons
    List,
    /// Show a person with parents and children
    Show { id: Uuid },
    /// Print a person's ancestry as a tree
    Tree { id: Uuid },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "family_registry=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = config.open_database()?;
    let app = api::create_router_with_cors(db, config.cors_layer());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Family registry listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_client(client: RegistryClient, command: ClientCommand) -> anyhow::Result<()> {
    match command {
        ClientCommand::Add {
            first_name,
            last_name,
            birthday,
        } => {
            let person = client
                .create_person(&CreatePersonInput {
                    first_name,
                    last_name,
                    birthday,
                })
                .await?;
            print_json(&person)?;
        }
        ClientCommand::Remove { id } => {
            client.delete_person(id).await?;
            println!("Deleted {}", id);
        }
        ClientCommand::AddParent { child, parent } => {
            let parent: Person = client.get_person(parent).await?;
            let child = client.add_parent(child, &parent).await?;
            print_json(&child)?;
        }
        ClientCommand::List => {
            let persons = client.list_persons().await?;
            print_json(&persons)?;
        }
        ClientCommand::Show { id } => {
            let person = client.get_person(id).await?;
            let parents = client.get_parents(id).await?;
            let children = client.get_children(id).await?;
            print_json(&serde_json::json!({
                "person": person,
                "parents": parents,
                "children": children,
            }))?;
        }
        ClientCommand::Tree { id } => {
            let ancestry = client.get_ancestry(id).await?;
            print!("{}", tree_render::render_ancestry(&ancestry));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve(config)) => serve(config).await,
        None => serve(ServerConfig::from_env()).await,
        Some(Commands::Client(command)) => run_client(RegistryClient::from_env(), command).await,
    }
}
