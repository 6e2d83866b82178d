//! mailroute - submit mail requests through the dispatch layer
//!
//! Reads `MAILROUTE_*` configuration from the environment (or a `.env`
//! file), registers the built-in mail types and sends one request through
//! either the synchronous or the queued sender.

mod handlers;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use handlers::Greeting;
use mailroute_core::{AsyncSender, Destination, SendRequest, Sender, SyncSender};
use mailroute_smtp::MailerConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[clap(name = "mailroute", version, about = "Send typed mail requests")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one mail of a built-in type
    Send(SendArgs),
    /// List the built-in mail types
    Types,
}

#[derive(Debug, Args)]
struct SendArgs {
    /// Mail type to send
    mail_type: String,

    #[clap(long, required = true, help = "To recipient, repeatable")]
    to: Vec<String>,

    #[clap(long, help = "CC recipient, repeatable")]
    cc: Vec<String>,

    #[clap(long, help = "BCC recipient, repeatable")]
    bcc: Vec<String>,

    #[clap(long, default_value = "there", help = "Name used in the greeting")]
    name: String,

    #[clap(long = "async", help = "Send through the background queue")]
    queued: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("mailroute=debug".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Types => {
            for mail_type in handlers::MAIL_TYPES {
                println!("{}", mail_type);
            }
            Ok(())
        }
        Command::Send(args) => send(args).await,
    }
}

async fn send(args: SendArgs) -> anyhow::Result<()> {
    let config = MailerConfig::from_env().context("loading MAILROUTE_* configuration")?;

    let destination = Destination {
        to: args.to,
        cc: args.cc,
        bcc: args.bcc,
    };
    let request = SendRequest::new(args.mail_type, destination)
        .with_model(&Greeting { name: args.name })?;

    tracing::info!(mail_type = %request.mail_type(), queued = args.queued, "Starting mailroute");

    if args.queued {
        let sender = AsyncSender::new(config);
        handlers::register_all(&sender);
        let worker = sender.start()?;

        sender.send(request).await?;

        // Closing the queue lets the worker finish and stop
        drop(sender);
        worker.join().await;
    } else {
        let sender = SyncSender::new(config);
        handlers::register_all(&sender);
        sender.send(request).await?;
    }

    Ok(())
}
