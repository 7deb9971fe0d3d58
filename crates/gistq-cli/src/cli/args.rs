use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct CreateQueueArgs {
    /// Name of the queue; the configured default name when omitted.
    pub name: Option<String>,
    /// Make the backing gist public.
    #[arg(long, default_value_t = false)]
    pub public: bool,
}

#[derive(Debug, Args)]
pub struct ListQueuesArgs {
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GetQueueArgs {
    /// Queue name; ignored when `--id` is given.
    pub name: Option<String>,
    /// Address the queue by its document id instead of its name.
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CreateMessageArgs {
    pub queue: String,
    /// Message payload; parsed as JSON when possible, stored as a plain
    /// string otherwise.
    pub content: String,
}

#[derive(Debug, Args)]
pub struct ListMessagesArgs {
    pub queue: String,
    /// Only messages with this exact status.
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GetNextMessageArgs {
    pub queue: String,
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct UpdateMessageArgs {
    pub queue: String,
    pub message_id: String,
    /// Replacement payload; parsed like `create-message` content.
    #[arg(long)]
    pub content: Option<String>,
    /// New status (pending, in_progress, complete, failed).
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct DeleteCompletedMessagesArgs {
    pub queue: String,
}

#[derive(Debug, Args)]
pub struct CleanupAllQueuesArgs {
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct StopCleanupThreadArgs {
    /// Seconds to wait for the cleanup loop to exit.
    #[arg(long, default_value_t = 5.0)]
    pub timeout: f64,
}
