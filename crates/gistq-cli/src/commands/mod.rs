use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use gistq_core::config::AppConfig;
use gistq_core::{GistClient, GistQueue, MessageStatus, QueueRef, RetentionSweeper};

use crate::cli::{Commands, OutputFormat};

mod support;

use self::support::{content_preview, parse_content, print_json, print_message_table, render_table};

pub(crate) fn run(command: Commands) -> Result<()> {
    let config = AppConfig::from_env();

    if matches!(command, Commands::Init) {
        return run_init(&config);
    }

    let queue =
        Arc::new(GistQueue::from_env().context("failed to initialize the gist client")?);
    let mut sweeper = RetentionSweeper::new(Arc::clone(&queue));
    sweeper.start_if_configured();

    let result = execute(&queue, &mut sweeper, command);

    if sweeper.is_running() {
        let _ = sweeper.stop(Duration::from_secs(5));
    }
    result
}

fn run_init(config: &AppConfig) -> Result<()> {
    let client = GistClient::from_env(&config.api).context("environment check failed")?;
    let login = client
        .authenticated_user()
        .context("GitHub authentication failed")?;
    println!("Environment check passed. Authenticated as {login}.");
    Ok(())
}

fn execute(queue: &GistQueue, sweeper: &mut RetentionSweeper, command: Commands) -> Result<()> {
    match command {
        Commands::Init => unreachable!("init is handled before client construction"),
        Commands::CreateQueue(args) => {
            let document = queue.create_queue(args.name.as_deref(), args.public)?;
            println!("Queue is ready at {}", document.url);
        }
        Commands::ListQueues(args) => {
            let queues = queue.list_queues()?;
            if queues.is_empty() {
                println!("No queues found.");
                return Ok(());
            }
            match args.format {
                OutputFormat::Json => print_json(&queues)?,
                OutputFormat::Table => {
                    let rows = queues
                        .iter()
                        .map(|info| {
                            vec![
                                info.name.clone(),
                                info.id.clone(),
                                info.created_at.clone(),
                                info.updated_at.clone(),
                                info.url.clone(),
                            ]
                        })
                        .collect::<Vec<_>>();
                    println!(
                        "{}",
                        render_table(&["Name", "ID", "Created", "Updated", "URL"], &rows)
                    );
                }
            }
        }
        Commands::GetQueue(args) => {
            let document = match &args.id {
                Some(id) => queue.get_queue_by_id(id)?,
                None => {
                    let name = args
                        .name
                        .as_deref()
                        .unwrap_or(&queue.config().queue.default_queue);
                    queue.get_queue(name)?
                }
            };
            let Some(document) = document else {
                bail!("queue not found");
            };
            match args.format {
                OutputFormat::Json => print_json(&document)?,
                OutputFormat::Table => {
                    println!("Id: {}", document.id);
                    println!(
                        "Description: {}",
                        document.description.as_deref().unwrap_or("-")
                    );
                    println!("Url: {}", document.url);
                    println!("Created At: {}", document.created_at.to_rfc3339());
                    println!("Updated At: {}", document.updated_at.to_rfc3339());
                }
            }
        }
        Commands::CreateMessage(args) => {
            let message = queue.create_message(
                &QueueRef::name(&args.queue),
                parse_content(&args.content),
            )?;
            println!("Message created with ID: {}", message.id);
        }
        Commands::ListMessages(args) => {
            let status = args
                .status
                .as_deref()
                .map(str::parse::<MessageStatus>)
                .transpose()?;
            let messages = queue.list_messages(&QueueRef::name(&args.queue), status)?;
            if messages.is_empty() {
                println!("No messages found.");
                return Ok(());
            }
            match args.format {
                OutputFormat::Json => print_json(&messages)?,
                OutputFormat::Table => {
                    let rows = messages
                        .iter()
                        .map(|message| {
                            vec![
                                message.id.clone(),
                                message.status.to_string(),
                                message.status_datetime.clone(),
                                message.process.clone().unwrap_or_else(|| "-".to_string()),
                                content_preview(&message.content, 50),
                            ]
                        })
                        .collect::<Vec<_>>();
                    println!(
                        "{}",
                        render_table(
                            &["ID", "Status", "Status Datetime", "Process", "Content"],
                            &rows
                        )
                    );
                }
            }
        }
        Commands::GetNextMessage(args) => {
            match queue.next_message(&QueueRef::name(&args.queue))? {
                Some(message) => match args.format {
                    OutputFormat::Json => print_json(&message)?,
                    OutputFormat::Table => print_message_table(&message),
                },
                None => bail!("no pending messages found"),
            }
        }
        Commands::UpdateMessage(args) => {
            let status = args
                .status
                .as_deref()
                .map(str::parse::<MessageStatus>)
                .transpose()?;
            let content = args.content.as_deref().map(parse_content);
            let message = queue.update_message(
                &QueueRef::name(&args.queue),
                &args.message_id,
                content,
                status,
            )?;
            match args.format {
                OutputFormat::Json => print_json(&message)?,
                OutputFormat::Table => print_message_table(&message),
            }
        }
        Commands::DeleteCompletedMessages(args) => {
            let removed = queue.purge_completed(
                &QueueRef::name(&args.queue),
                queue.config().cleanup.threshold_days,
            )?;
            println!("Deleted {removed} completed messages.");
        }
        Commands::CleanupAllQueues(args) => {
            let report = queue.cleanup_all_queues()?;
            if report.queues.is_empty() {
                bail!("no queues found");
            }
            match args.format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Table => {
                    let rows = report
                        .queues
                        .iter()
                        .map(|entry| {
                            vec![
                                entry.name.clone(),
                                entry
                                    .deleted
                                    .map_or_else(|| "failed".to_string(), |count| count.to_string()),
                            ]
                        })
                        .collect::<Vec<_>>();
                    println!("{}", render_table(&["Queue", "Messages Deleted"], &rows));
                }
            }
            println!("Total messages deleted: {}", report.total_deleted());
        }
        Commands::StartCleanupThread => {
            if !sweeper.is_running() && !sweeper.start() {
                bail!("failed to start cleanup thread");
            }
            println!(
                "Cleanup thread started. Cleanup interval: {} seconds.",
                queue.config().cleanup.interval.as_secs()
            );
            println!("The sweeper runs until this process is interrupted.");
            loop {
                thread::park();
            }
        }
        Commands::StopCleanupThread(args) => {
            if sweeper.stop(Duration::from_secs_f64(args.timeout.max(0.0))) {
                println!("Cleanup thread stopped.");
            } else {
                bail!("cleanup thread is not running");
            }
        }
    }
    Ok(())
}
