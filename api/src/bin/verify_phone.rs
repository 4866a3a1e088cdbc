//! Terminal driver for the phone verification flow
//!
//! Reads one command per line from stdin:
//!
//! ```text
//! phone <number>   set the local phone number (e.g. 771234567)
//! send             send or resend the verification code
//! otp <code>       type the code; a full code is verified right away
//! blur             leave the code field
//! submit           verify the current code
//! status           print the session state as JSON
//! quit             exit
//! ```
//!
//! The auth record is persisted in the session file from the configuration
//! (`SESSION_FILE`, default `.homebook/session.json`).

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hb_core::services::{
    Notice, NoticeLevel, PhoneVerificationFlow, SendOutcome, VerificationListener,
    VerifiedPayload, VerifyOutcome,
};
use hb_infra::{load_config, FileSessionStore, HttpOtpApi};
use hb_shared::config::{LogFormat, LoggingConfig};

/// Prints flow events to stdout
struct ConsoleListener;

impl VerificationListener for ConsoleListener {
    fn on_verified(&self, payload: &VerifiedPayload) {
        match serde_json::to_string_pretty(payload) {
            Ok(json) => println!("✓ Verified\n{}", json),
            Err(_) => println!("✓ Verified {}", payload.phone_e164),
        }
    }

    fn on_notice(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}", notice.message),
            NoticeLevel::Error => println!("✗ {}", notice.message),
        }
    }
}

type Flow = PhoneVerificationFlow<HttpOtpApi, FileSessionStore, ConsoleListener>;

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(logging.source_location)
        .with_line_number(logging.source_location);

    match logging.format {
        LogFormat::Json => registry.with(layer.json()).init(),
        LogFormat::Pretty => registry.with(layer.pretty()).init(),
        LogFormat::Compact => registry.with(layer.compact()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("HOMEBOOK_CONFIG"))
        .map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;
    init_logging(&config.logging);

    let store = FileSessionStore::open(&config.client.session_file).with_context(|| {
        format!("failed to open session file {}", config.client.session_file.display())
    })?;
    let api = HttpOtpApi::new(config.client.clone())?;

    let flow: Flow = PhoneVerificationFlow::new(
        Arc::new(api),
        Arc::new(store),
        Arc::new(ConsoleListener),
        config.otp.clone(),
    );

    println!("=== HomeBook Phone Verification ===");
    println!("Commands: phone <number>, send, otp <code>, blur, submit, status, quit\n");

    if flow.mount().is_some() {
        println!("Session already verified.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        match command {
            "" => continue,
            "phone" => {
                flow.set_phone(argument);
                print_field_errors(&flow);
            }
            "send" => report_send(&flow, flow.send_otp().await),
            "otp" => {
                if let Some(outcome) = flow.set_otp(argument).await {
                    report_verify(&flow, outcome);
                }
            }
            "blur" => {
                flow.blur_otp();
                print_field_errors(&flow);
            }
            "submit" => {
                let outcome = flow.submit_otp().await;
                report_verify(&flow, outcome);
            }
            "status" => print_status(&flow),
            "quit" | "exit" => break,
            other => println!("Unknown command: {}", other),
        }
    }

    flow.unmount();
    Ok(())
}

fn report_send(flow: &Flow, outcome: SendOutcome) {
    match outcome {
        SendOutcome::Sent => println!(
            "Resend available in {}s",
            flow.session().cooldown_remaining()
        ),
        SendOutcome::Rejected(rejection) => {
            println!("Not sent: {:?}", rejection);
            print_field_errors(flow);
        }
        SendOutcome::Failed { .. } | SendOutcome::Cancelled => {}
    }
}

fn report_verify(flow: &Flow, outcome: VerifyOutcome) {
    match outcome {
        VerifyOutcome::Rejected(rejection) => {
            println!("Not verified: {:?}", rejection);
            print_field_errors(flow);
        }
        VerifyOutcome::Failed { .. } => print_field_errors(flow),
        VerifyOutcome::Verified(_) | VerifyOutcome::Cancelled => {}
    }
}

fn print_field_errors(flow: &Flow) {
    let session = flow.session();
    if let Some(error) = session.phone_error() {
        println!("  phone: {}", error);
    }
    if let Some(error) = session.otp_error() {
        println!("  code: {}", error);
    }
}

fn print_status(flow: &Flow) {
    match serde_json::to_string_pretty(&flow.session()) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("Failed to render session: {}", e),
    }
}
