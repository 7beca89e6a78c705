//! Basic presence gate example.
//!
//! Shows a one-time code on this terminal, then reads it back the way a
//! remote actor would send it, and finally runs a protected command.
//!
//! # Running
//!
//! ```bash
//! export PRESENCE_GATE_DATA_DIR=/tmp/presence-gate-demo
//! cargo run --example basic_gate -- 123456789
//! ```
//!
//! # Note
//!
//! In a real deployment the code is shown on the physical console and the
//! reply arrives over the remote channel (chat, RPC). Here both ends share
//! one terminal.

use presence_gate::{
    AuthorizationGate, ConsoleDisplay, DenyReason, FileStore, GateConfig, Presentation,
    Rejection, SubjectId, Verdict, VerifyOutcome,
};
use std::io::BufRead;
use std::sync::Arc;

fn main() {
    // Subject id from the transport (here: first CLI argument)
    let subject = SubjectId::new(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "123456789".to_string()),
    );

    let store = match FileStore::new("presence-gate-demo") {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Storage error: {}", e);
            std::process::exit(1);
        }
    };
    println!("Registry file: {}", store.path().display());

    let gate = match AuthorizationGate::new(GateConfig::default(), store) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Dispatch layer: ask the guard before running anything protected
    match gate.guard(&subject) {
        Verdict::Allowed => {
            println!("✓ {} is already authorized", subject);
            run_protected_command(&subject);
            return;
        }
        Verdict::Denied(DenyReason::LockedOut {
            retry_after_seconds,
        }) => {
            eprintln!("Locked out, try again in {}s", retry_after_seconds);
            std::process::exit(1);
        }
        Verdict::Denied(DenyReason::NotAuthorized) => {}
    }

    let console = ConsoleDisplay::stdout();
    match gate.issue_to(&subject, &console) {
        Ok(Presentation::Displayed) => {}
        Ok(Presentation::LockedOut {
            retry_after_seconds,
        }) => {
            eprintln!("Locked out, try again in {}s", retry_after_seconds);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Could not show code: {}", e);
            std::process::exit(1);
        }
    }

    println!("Type the code shown above:");
    let mut reply = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut reply) {
        eprintln!("Failed to read reply: {}", e);
        std::process::exit(1);
    }

    match gate.verify(&subject, &reply) {
        VerifyOutcome::Authorized(durability) => {
            println!("✓ Authorized ({:?})", durability);
            run_protected_command(&subject);
        }
        VerifyOutcome::Rejected(Rejection::WrongCode { attempts_remaining }) => {
            eprintln!("✗ Wrong code, {} attempts left", attempts_remaining);
        }
        VerifyOutcome::Rejected(Rejection::NoActiveChallenge) => {
            eprintln!("✗ Code expired, request a new one");
        }
        VerifyOutcome::Rejected(Rejection::LockedOut {
            retry_after_seconds,
        }) => {
            eprintln!("✗ Locked out for {}s", retry_after_seconds);
        }
    }
}

fn run_protected_command(subject: &SubjectId) {
    println!("Running protected command for {}", subject);
}
