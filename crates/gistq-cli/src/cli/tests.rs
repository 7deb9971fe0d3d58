use clap::Parser;

use super::*;

#[test]
fn command_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn create_queue_parses_name_and_visibility() {
    let cli = Cli::try_parse_from(["gistq", "create-queue", "jobs", "--public"]).expect("parse");
    match cli.command {
        Commands::CreateQueue(args) => {
            assert_eq!(args.name.as_deref(), Some("jobs"));
            assert!(args.public);
        }
        _ => panic!("expected create-queue command"),
    }
}

#[test]
fn create_queue_name_is_optional() {
    let cli = Cli::try_parse_from(["gistq", "create-queue"]).expect("parse");
    match cli.command {
        Commands::CreateQueue(args) => {
            assert!(args.name.is_none());
            assert!(!args.public);
        }
        _ => panic!("expected create-queue command"),
    }
}

#[test]
fn get_queue_accepts_id_addressing() {
    let cli =
        Cli::try_parse_from(["gistq", "get-queue", "--id", "abc123", "--format", "json"])
            .expect("parse");
    match cli.command {
        Commands::GetQueue(args) => {
            assert!(args.name.is_none());
            assert_eq!(args.id.as_deref(), Some("abc123"));
            assert_eq!(args.format, OutputFormat::Json);
        }
        _ => panic!("expected get-queue command"),
    }
}

#[test]
fn list_messages_parses_status_filter() {
    let cli = Cli::try_parse_from(["gistq", "list-messages", "jobs", "--status", "pending"])
        .expect("parse");
    match cli.command {
        Commands::ListMessages(args) => {
            assert_eq!(args.queue, "jobs");
            assert_eq!(args.status.as_deref(), Some("pending"));
            assert_eq!(args.format, OutputFormat::Table);
        }
        _ => panic!("expected list-messages command"),
    }
}

#[test]
fn update_message_parses_content_and_status() {
    let cli = Cli::try_parse_from([
        "gistq",
        "update-message",
        "jobs",
        "msg-1",
        "--content",
        "{\"done\": true}",
        "--status",
        "complete",
    ])
    .expect("parse");
    match cli.command {
        Commands::UpdateMessage(args) => {
            assert_eq!(args.queue, "jobs");
            assert_eq!(args.message_id, "msg-1");
            assert_eq!(args.content.as_deref(), Some("{\"done\": true}"));
            assert_eq!(args.status.as_deref(), Some("complete"));
        }
        _ => panic!("expected update-message command"),
    }
}

#[test]
fn stop_cleanup_thread_parses_timeout() {
    let cli = Cli::try_parse_from(["gistq", "stop-cleanup-thread", "--timeout", "2.5"])
        .expect("parse");
    match cli.command {
        Commands::StopCleanupThread(args) => {
            assert_eq!(args.timeout, 2.5);
        }
        _ => panic!("expected stop-cleanup-thread command"),
    }
}

#[test]
fn unknown_commands_are_rejected() {
    assert!(Cli::try_parse_from(["gistq", "drop-queue"]).is_err());
    assert!(Cli::try_parse_from(["gistq"]).is_err());
}
