use clap::{Parser, Subcommand};

mod args;

#[cfg(test)]
mod tests;

pub use args::{
    CleanupAllQueuesArgs, CreateMessageArgs, CreateQueueArgs, DeleteCompletedMessagesArgs,
    GetNextMessageArgs, GetQueueArgs, ListMessagesArgs, ListQueuesArgs, OutputFormat,
    StopCleanupThreadArgs, UpdateMessageArgs,
};

#[derive(Debug, Parser)]
#[command(name = "gistq")]
#[command(about = "Message queues stored in GitHub Gists", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check credentials and environment configuration.
    Init,
    CreateQueue(CreateQueueArgs),
    ListQueues(ListQueuesArgs),
    GetQueue(GetQueueArgs),
    CreateMessage(CreateMessageArgs),
    ListMessages(ListMessagesArgs),
    GetNextMessage(GetNextMessageArgs),
    UpdateMessage(UpdateMessageArgs),
    DeleteCompletedMessages(DeleteCompletedMessagesArgs),
    CleanupAllQueues(CleanupAllQueuesArgs),
    /// Run the retention sweeper in this process until interrupted.
    StartCleanupThread,
    StopCleanupThread(StopCleanupThreadArgs),
}
