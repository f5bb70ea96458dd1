//! Geoflow CLI - order imagery and drive processing workflows from the shell.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use geoflow_client::{Config, Geoflow, StageToS3Options, StaticToken};
use geoflow_core::{OrderId, WorkflowDefinition, WorkflowId};

/// Geoflow CLI - imagery platform client
#[derive(Parser)]
#[command(name = "geoflow")]
#[command(about = "CLI for the geoflow imagery platform", long_about = None)]
struct Cli {
    /// Platform API base URL
    #[arg(long, default_value = "https://platform.geoflow.io")]
    api_url: String,

    /// Bearer token; falls back to the GEOFLOW_TOKEN environment variable
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a task type's registry definition
    #[command(name = "describe-task")]
    DescribeTask {
        /// Task type name
        name: String,
    },

    /// Order imagery by catalog id
    Order {
        /// Catalog ids to order
        #[arg(required = true)]
        catalog_ids: Vec<String>,
    },

    /// Get order status
    #[command(name = "order-status")]
    OrderStatus {
        /// Order id
        id: String,
    },

    /// Show a catalog record
    #[command(name = "catalog-record")]
    CatalogRecord {
        /// Catalog id
        id: String,
    },

    /// Launch a workflow from a definition file
    Launch {
        /// Path to a workflow definition JSON file
        file: PathBuf,
    },

    /// Get workflow status
    #[command(name = "workflow-status")]
    WorkflowStatus {
        /// Workflow id
        id: String,
    },

    /// List workflow events
    #[command(name = "workflow-events")]
    WorkflowEvents {
        /// Workflow id
        id: String,
    },

    /// Cancel a workflow
    Cancel {
        /// Workflow id to cancel
        id: String,
    },

    /// Process delivered imagery and stage the result to object storage
    #[command(name = "stage-to-s3")]
    StageToS3 {
        /// Object-storage location of the delivered imagery
        location: String,

        /// Destination prefix for the staged output
        destination: String,

        /// Enable atmospheric compensation
        #[arg(long)]
        acomp: bool,

        /// Enable pansharpening
        #[arg(long)]
        pansharpen: bool,

        /// Wait for the workflow to reach a terminal state
        #[arg(long)]
        wait: bool,
    },

    /// Show the account's object-storage location
    #[command(name = "storage-info")]
    StorageInfo,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let token = match cli.token.or_else(|| std::env::var("GEOFLOW_TOKEN").ok()) {
        Some(token) => token,
        None => return Err("no token: pass --token or set GEOFLOW_TOKEN".into()),
    };

    let config = Config::default().with_api_url(cli.api_url);
    let gf = Geoflow::new(config, Arc::new(StaticToken::new(token)));

    match cli.command {
        Commands::DescribeTask { name } => describe_task(&gf, &name).await?,
        Commands::Order { catalog_ids } => order(&gf, catalog_ids).await?,
        Commands::OrderStatus { id } => order_status(&gf, id).await?,
        Commands::CatalogRecord { id } => catalog_record(&gf, &id).await?,
        Commands::Launch { file } => launch(&gf, file).await?,
        Commands::WorkflowStatus { id } => workflow_status(&gf, id).await?,
        Commands::WorkflowEvents { id } => workflow_events(&gf, id).await?,
        Commands::Cancel { id } => cancel(&gf, id).await?,
        Commands::StageToS3 {
            location,
            destination,
            acomp,
            pansharpen,
            wait,
        } => stage_to_s3(&gf, &location, &destination, acomp, pansharpen, wait).await?,
        Commands::StorageInfo => storage_info(&gf).await?,
    }

    Ok(())
}

async fn describe_task(gf: &Geoflow, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let definition = gf.workflows().describe_task(name).await?;
    println!("{}", serde_json::to_string_pretty(&definition)?);
    Ok(())
}

async fn order(gf: &Geoflow, catalog_ids: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let ordering = gf.ordering();
    for catalog_id in catalog_ids {
        let id = ordering.order(&catalog_id).await?;
        println!("{catalog_id} -> {id}");
    }
    Ok(())
}

async fn order_status(gf: &Geoflow, id: String) -> Result<(), Box<dyn std::error::Error>> {
    let status = gf.ordering().status(&OrderId::new(id)).await?;
    println!("state:    {:?}", status.state);
    if let Some(location) = status.location {
        println!("location: {location}");
    }
    Ok(())
}

async fn catalog_record(gf: &Geoflow, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let record = gf.catalog().record(id).await?;
    println!("identifier: {}", record.identifier);
    if let Some(record_type) = record.record_type {
        println!("type:       {record_type}");
    }
    println!("{}", serde_json::to_string_pretty(&record.properties)?);
    Ok(())
}

async fn launch(gf: &Geoflow, file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&file)?;
    let definition: WorkflowDefinition = serde_json::from_str(&text)?;
    let id = gf.workflows().launch_definition(&definition).await?;
    println!("{id}");
    Ok(())
}

async fn workflow_status(gf: &Geoflow, id: String) -> Result<(), Box<dyn std::error::Error>> {
    let status = gf.workflows().status(&WorkflowId::new(id)).await?;
    println!("state: {:?}", status.state);
    if let Some(event) = status.event {
        println!("event: {event}");
    }
    Ok(())
}

async fn workflow_events(gf: &Geoflow, id: String) -> Result<(), Box<dyn std::error::Error>> {
    let events = gf.workflows().events(&WorkflowId::new(id)).await?;
    for event in events {
        let timestamp = event
            .timestamp
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        let task = event
            .task_id
            .map(|t| t.into_inner())
            .unwrap_or_else(|| "workflow".to_string());
        println!("{timestamp}  {task}  {}", event.event);
    }
    Ok(())
}

async fn cancel(gf: &Geoflow, id: String) -> Result<(), Box<dyn std::error::Error>> {
    let id = WorkflowId::new(id);
    gf.workflows().cancel(&id).await?;
    println!("canceled {id}");
    Ok(())
}

async fn stage_to_s3(
    gf: &Geoflow,
    location: &str,
    destination: &str,
    acomp: bool,
    pansharpen: bool,
    wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = StageToS3Options {
        enable_acomp: acomp,
        enable_pansharpen: pansharpen,
        ..Default::default()
    };
    let id = gf.workflows().stage_to_s3(location, destination, &options).await?;
    println!("{id}");

    if wait {
        let status = gf.workflows().wait_until_complete(&id, gf.poll_policy()).await?;
        println!("state: {:?}", status.state);
    }
    Ok(())
}

async fn storage_info(gf: &Geoflow) -> Result<(), Box<dyn std::error::Error>> {
    let info = gf.storage().info().await?;
    println!("{}", info.location());
    Ok(())
}
