#![allow(clippy::expect_used, clippy::uninlined_format_args)]
//! Example: Probe SMTP settings and send a two-reader newsletter issue
//!
//! ## Prerequisites
//!
//! An SMTP account you can send from. For Gmail/Outlook/Yahoo/iCloud the
//! server settings are filled in automatically from the address; most
//! providers require an app password rather than the account password.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package mailout-delivery --example send_newsletter
//! ```

use mailout_core::{ConnectionSettings, EmailMessage, MessageId, validate_settings};
use mailout_delivery::{DeliveryOutcome, probe_settings, send_batch};
use std::io::{self, Write};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("mailout - newsletter send test");
    println!("==============================\n");

    print!("Your email address: ");
    io::stdout().flush()?;
    let mut from = String::new();
    io::stdin().read_line(&mut from)?;
    let from = from.trim().to_string();

    print!("App password: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    print!("Recipient address: ");
    io::stdout().flush()?;
    let mut to = String::new();
    io::stdin().read_line(&mut to)?;
    let to = to.trim().to_string();

    let mut settings = ConnectionSettings::for_address(&from);
    settings.password = password.trim().to_string();
    if let Err(errors) = validate_settings(&settings) {
        for error in errors {
            eprintln!("  ✗ {}", error);
        }
        return Err("settings incomplete (unknown provider?)".into());
    }

    println!("\nProbing {}:{}...", settings.host, settings.port);
    probe_settings(&settings, true).await?;
    println!("✓ Server reachable, credentials accepted\n");

    let messages = vec![
        EmailMessage::new(
            MessageId::new(1),
            from.clone(),
            to.clone(),
            "Newsletter test #1",
            "<h1>Hello!</h1><p>First test message.</p>",
        ),
        EmailMessage::new(
            MessageId::new(2),
            from.clone(),
            to,
            "Newsletter test #2",
            "<h1>Hello again!</h1><p>Second test message.</p>",
        )
        .reply_to(from),
    ];

    let (tx, mut rx) = mpsc::unbounded_channel::<DeliveryOutcome>();

    println!("Sending {} messages...", messages.len());
    let result = send_batch(&settings, messages, &tx).await;
    drop(tx);

    while let Some(outcome) = rx.recv().await {
        let mark = if outcome.accepted { "✓" } else { "✗" };
        println!("  {} message {}", mark, outcome.message_id);
    }

    result?;
    println!("\n✓ Batch delivered");
    Ok(())
}
