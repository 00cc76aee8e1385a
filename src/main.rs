// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use kb_console::utils::logging::{
    format_error, format_info, format_status, format_success, format_warning, init_logger,
};
use kb_console::utils::{dataset_names, format_file_size, retrieve_curl};
use kb_console::{
    ChunkQuery, Config, ConnectionClient, ConsoleError, CreateConnection, Dataset, DatasetClient,
    FileListQuery, FileRecord, FileServiceClient, FileStatus, FileTracker, ProcessMode, Spinner,
    TrackerSnapshot, UpdateConnection, UploadFile, Validator,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "kb_console")]
#[command(version = "0.1.0")]
#[command(about = "Admin console for knowledge-base connections, datasets and documents", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload, process and inspect documents
    Files {
        #[command(subcommand)]
        command: FileCommand,
    },

    /// Manage customer connections
    Connections {
        #[command(subcommand)]
        command: ConnectionCommand,
    },

    /// Browse knowledge-base datasets
    Datasets {
        #[command(subcommand)]
        command: DatasetCommand,
    },
}

#[derive(Subcommand)]
enum FileCommand {
    /// Upload a PDF, DOC/DOCX, PPT/PPTX or TXT file (max 15MB)
    Upload {
        path: PathBuf,

        #[arg(long, value_name = "ID")]
        knowledge_base: Option<String>,
    },

    List {
        #[arg(long)]
        status: Option<FileStatus>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long, value_name = "ID")]
        knowledge_base: Option<String>,
    },

    Show {
        id: String,
    },

    Status {
        id: String,
    },

    /// Submit a file for processing into its knowledge base
    Process {
        id: String,

        #[arg(long, value_name = "ID")]
        knowledge_base: Option<String>,

        /// Allow resubmitting processed or failed files
        #[arg(long)]
        reprocess: bool,
    },

    Chunks {
        id: String,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },

    Download {
        id: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    Delete {
        id: String,

        #[arg(long)]
        confirm: bool,
    },

    /// Keep the listing on screen, refreshing it periodically until Ctrl-C
    Watch {
        #[arg(long)]
        status: Option<FileStatus>,

        #[arg(long, value_name = "ID")]
        knowledge_base: Option<String>,

        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ConnectionCommand {
    List {
        #[arg(long)]
        customer: Option<String>,
    },

    Show {
        id: i64,
    },

    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        customer_id: String,

        #[arg(long = "knowledge-id", value_name = "ID")]
        knowledge_ids: Vec<String>,
    },

    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        customer_id: String,

        #[arg(long = "knowledge-id", value_name = "ID")]
        knowledge_ids: Vec<String>,

        /// Remove every knowledge base from the connection
        #[arg(long, conflicts_with = "knowledge_ids")]
        clear_knowledge: bool,
    },

    Delete {
        id: i64,

        #[arg(long)]
        confirm: bool,
    },

    /// Print a cURL command that runs a sample retrieval for the connection
    Curl {
        id: i64,
    },
}

#[derive(Subcommand)]
enum DatasetCommand {
    List {
        #[arg(long)]
        customer: Option<String>,
    },

    /// Watch the files uploaded into a dataset until Ctrl-C
    Files {
        id: String,

        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    let config = if cli.config.exists() {
        match Config::load(Some(cli.config.as_path())) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", format_error(&format!("Failed to load configuration: {}", e)));
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    let result = match cli.command {
        Commands::Files { command } => run_files(&config, command, cli.color).await,
        Commands::Connections { command } => run_connections(&config, command).await,
        Commands::Datasets { command } => run_datasets(&config, command).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}", format_error(&notification(&e)));
            ExitCode::FAILURE
        }
    }
}

/// Server message when there is one, otherwise the full error chain.
fn notification(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ConsoleError>() {
        Some(console_error) => console_error.user_message(),
        None => format!("{:#}", err),
    }
}

fn file_tracker(config: &Config) -> Result<FileTracker<FileServiceClient>> {
    let client = FileServiceClient::new(&config.file_service)
        .context("Failed to create file service client")?;
    Ok(FileTracker::new(client, config.tracker.clone()))
}

async fn run_files(config: &Config, command: FileCommand, color: bool) -> Result<()> {
    let tracker = file_tracker(config)?;

    match command {
        FileCommand::Upload {
            path,
            knowledge_base,
        } => cmd_upload(&tracker, path, knowledge_base, color).await,
        FileCommand::List {
            status,
            page,
            limit,
            knowledge_base,
        } => {
            let query = FileListQuery {
                status,
                page: Some(page.unwrap_or(1)),
                limit: Some(limit.unwrap_or(config.tracker.page_limit)),
                knowledge_base_id: Validator::non_blank(knowledge_base.as_deref()),
            };
            let snapshot = tracker.refresh(Some(query)).await?;
            print_file_table(&snapshot);
            Ok(())
        }
        FileCommand::Show { id } => {
            let record = tracker.detail(&id).await?;
            print_record(&record);
            Ok(())
        }
        FileCommand::Status { id } => {
            let report = tracker.status(&id).await?;
            println!("{} {}", report.id, format_status(report.status));
            if let Some(error) = report.processing_error {
                println!("  {}", format_warning(&error));
            }
            Ok(())
        }
        FileCommand::Process {
            id,
            knowledge_base,
            reprocess,
        } => {
            let mode = if reprocess {
                ProcessMode::Reprocess
            } else {
                ProcessMode::Initial
            };
            let ack = tracker
                .request_process(&id, knowledge_base.as_deref(), mode)
                .await?;
            let message = if ack.message.is_empty() {
                format!("Processing started for {}", ack.id)
            } else {
                ack.message
            };
            println!("{}", format_success(&message));
            Ok(())
        }
        FileCommand::Chunks { id, page, limit } => {
            let query = ChunkQuery { page, limit };
            match tracker.get_chunks(&id, query).await {
                Ok(page) => {
                    print_chunks(&page);
                    Ok(())
                }
                Err(ConsoleError::NotReady { status, .. }) => {
                    println!(
                        "{}",
                        format_info(&format!(
                            "No chunks yet: file is {} and has not been processed",
                            status
                        ))
                    );
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        FileCommand::Download { id, output } => cmd_download(&tracker, &id, output).await,
        FileCommand::Delete { id, confirm } => {
            if !confirm {
                println!(
                    "{}",
                    format_warning("This permanently deletes the file. Use --confirm to proceed")
                );
                return Ok(());
            }
            tracker.delete(&id).await?;
            println!("{}", format_success(&format!("Deleted file {}", id)));
            Ok(())
        }
        FileCommand::Watch {
            status,
            knowledge_base,
            interval,
        } => {
            let query = FileListQuery {
                status,
                page: Some(1),
                limit: Some(config.tracker.page_limit),
                knowledge_base_id: Validator::non_blank(knowledge_base.as_deref()),
            };
            watch_listing(&tracker, query, interval).await
        }
    }
}

async fn cmd_upload(
    tracker: &FileTracker<FileServiceClient>,
    path: PathBuf,
    knowledge_base: Option<String>,
    color: bool,
) -> Result<()> {
    let file = UploadFile::from_path(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    // Reject locally before showing any progress.
    file.validate(tracker.settings().max_upload_bytes)?;

    let spinner = Spinner::new(
        format!(
            "Uploading {} ({})",
            file.file_name,
            format_file_size(file.size())
        ),
        color,
    );

    match tracker.upload(&file, knowledge_base.as_deref()).await {
        Ok(record) => {
            spinner.finish("Upload complete");
            println!(
                "{}",
                format_success(&format!(
                    "File \"{}\" uploaded successfully (id {})",
                    record.original_name, record.id
                ))
            );
            Ok(())
        }
        Err(e) => {
            spinner.abandon();
            Err(e.into())
        }
    }
}

async fn cmd_download(
    tracker: &FileTracker<FileServiceClient>,
    id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let output = match output {
        Some(path) => path,
        None => {
            let record = tracker.detail(id).await?;
            PathBuf::from(Validator::local_file_name(&record.original_name)?)
        }
    };

    let bytes = tracker.download(id).await?;
    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{}",
        format_success(&format!(
            "Saved {} to {}",
            format_file_size(bytes.len() as u64),
            output.display()
        ))
    );
    Ok(())
}

async fn watch_listing(
    tracker: &FileTracker<FileServiceClient>,
    query: FileListQuery,
    interval: Option<u64>,
) -> Result<()> {
    let mut shown = tracker.refresh(Some(query)).await?;
    print_file_table(&shown);

    let period = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| tracker.settings().poll_interval());
    let handle = tracker.start_polling(period);
    info!("Watching listing, press Ctrl-C to stop");

    let stop = tokio::signal::ctrl_c();
    tokio::pin!(stop);

    let mut check = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = check.tick() => {
                let current = tracker.snapshot().await;
                if current != shown {
                    print_file_table(&current);
                    shown = current;
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}

async fn run_connections(config: &Config, command: ConnectionCommand) -> Result<()> {
    let connections = ConnectionClient::new(&config.connection_api)
        .context("Failed to create connection client")?;

    match command {
        ConnectionCommand::List { customer } => {
            let datasets = DatasetClient::new(&config.dataset_api)
                .context("Failed to create dataset client")?;

            let (list, datasets) = futures::try_join!(
                connections.list(customer.as_deref()),
                datasets.list(None)
            )?;
            let names = Dataset::name_map(&datasets);

            if list.is_empty() {
                println!("{}", format_info("No connections found"));
                return Ok(());
            }

            println!(
                "{:<6} {:<24} {:<20} {:<40} {}",
                "ID", "NAME", "CUSTOMER", "KNOWLEDGE BASES", "CREATED"
            );
            for connection in list {
                println!(
                    "{:<6} {:<24} {:<20} {:<40} {}",
                    connection.id,
                    Validator::truncate_text(&connection.name, 21),
                    Validator::truncate_text(&connection.customer_id, 17),
                    Validator::truncate_text(&dataset_names(&connection.knowledge_ids, &names), 37),
                    connection.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        ConnectionCommand::Show { id } => {
            let connection = connections.get(id).await?;
            println!("ID:              {}", connection.id);
            println!("Name:            {}", connection.name);
            println!("Customer:        {}", connection.customer_id);
            println!("Knowledge bases: {}", connection.knowledge_ids.join(", "));
            println!("Created:         {}", connection.created_at.to_rfc3339());
            println!("Updated:         {}", connection.updated_at.to_rfc3339());
            Ok(())
        }
        ConnectionCommand::Create {
            name,
            customer_id,
            knowledge_ids,
        } => {
            let input = CreateConnection {
                name,
                customer_id,
                knowledge_ids: (!knowledge_ids.is_empty()).then_some(knowledge_ids),
            };
            let connection = connections.create(&input).await?;
            println!(
                "{}",
                format_success(&format!("Connection {} created", connection.id))
            );
            Ok(())
        }
        ConnectionCommand::Update {
            id,
            name,
            customer_id,
            knowledge_ids,
            clear_knowledge,
        } => {
            let knowledge_ids = if clear_knowledge {
                Some(Vec::new())
            } else {
                (!knowledge_ids.is_empty()).then_some(knowledge_ids)
            };
            let input = UpdateConnection {
                name,
                customer_id,
                knowledge_ids,
            };
            let connection = connections.update(id, &input).await?;
            println!(
                "{}",
                format_success(&format!("Connection {} updated", connection.id))
            );
            Ok(())
        }
        ConnectionCommand::Delete { id, confirm } => {
            if !confirm {
                println!(
                    "{}",
                    format_warning("This deletes the connection. Use --confirm to proceed")
                );
                return Ok(());
            }
            connections.delete(id).await?;
            println!("{}", format_success(&format!("Connection {} deleted", id)));
            Ok(())
        }
        ConnectionCommand::Curl { id } => {
            println!("{}", retrieve_curl(connections.base_url(), id));
            Ok(())
        }
    }
}

async fn run_datasets(config: &Config, command: DatasetCommand) -> Result<()> {
    match command {
        DatasetCommand::List { customer } => {
            let datasets = DatasetClient::new(&config.dataset_api)
                .context("Failed to create dataset client")?
                .list(customer.as_deref())
                .await?;

            if datasets.is_empty() {
                println!("{}", format_info("No datasets found"));
                return Ok(());
            }

            for dataset in datasets {
                println!("{}  (ID: {})", dataset.name, dataset.id);
                if let Some(description) = dataset.description.filter(|d| !d.is_empty()) {
                    println!("    {}", Validator::truncate_text(&description, 100));
                }
                if let Some(count) = dataset.document_count {
                    println!("    {} documents", count);
                }
            }
            Ok(())
        }
        DatasetCommand::Files { id, interval } => {
            let tracker = file_tracker(config)?;
            watch_listing(&tracker, FileListQuery::for_knowledge_base(id), interval).await
        }
    }
}

fn print_file_table(snapshot: &TrackerSnapshot) {
    if snapshot.files.is_empty() {
        println!("{}", format_info("No files found"));
        return;
    }

    println!(
        "{:<8} {:<36} {:>10} {:<10} {:<20} {}",
        "ID", "NAME", "SIZE", "STATUS", "KNOWLEDGE BASE", "UPLOADED"
    );
    for file in &snapshot.files {
        println!(
            "{:<8} {:<36} {:>10} {} {:<20} {}",
            file.id,
            Validator::truncate_text(&file.original_name, 33),
            format_file_size(file.size_bytes),
            format_status(file.status),
            file.knowledge_base_id.as_deref().unwrap_or("-"),
            file.created_at.format("%Y-%m-%d %H:%M")
        );
        if let Some(error) = &file.processing_error {
            println!("    {}", format_warning(error));
        }
    }

    if let Some(pagination) = snapshot.pagination {
        println!(
            "Page {}/{} ({} files)",
            pagination.page,
            pagination.pages.max(1),
            pagination.total
        );
    }
}

fn print_record(record: &FileRecord) {
    println!("ID:             {}", record.id);
    println!("Name:           {}", record.original_name);
    println!("Stored as:      {}", record.stored_name);
    println!("Type:           {}", record.mime_type);
    println!("Size:           {}", format_file_size(record.size_bytes));
    println!("Status:         {}", format_status(record.status));
    if let Some(error) = &record.processing_error {
        println!("Error:          {}", error);
    }
    println!(
        "Knowledge base: {}",
        record.knowledge_base_id.as_deref().unwrap_or("-")
    );
    if let Some(document_id) = &record.document_id {
        println!("Document:       {}", document_id);
    }
    println!("Created:        {}", record.created_at.to_rfc3339());
    if let Some(updated_at) = record.updated_at {
        println!("Updated:        {}", updated_at.to_rfc3339());
    }
}

fn print_chunks(page: &kb_console::ChunkPage) {
    if page.chunks.is_empty() {
        println!("{}", format_info("No chunks"));
        return;
    }

    for chunk in &page.chunks {
        println!("#{} ({} words)", chunk.position, chunk.word_count);
        println!("{}", Validator::truncate_text(&chunk.content, 300));
        println!("{}", "-".repeat(80));
    }

    println!(
        "Page {}/{} ({} chunks)",
        page.pagination.page,
        page.pagination.pages.max(1),
        page.pagination.total
    );
}
