//! portkv CLI Client
//!
//! Controlling client for a portkv worker: spawns the worker with piped
//! stdio, sends one command, prints the reply, then closes the session and
//! checks the worker's exit status.

use std::io::{BufReader, BufWriter};
use std::process::{Command as ProcessCommand, Stdio};

use clap::{Parser, Subcommand};

use portkv::protocol::{read_reply, write_command, Command, Status};
use portkv::{PortError, Result};

/// portkv CLI
#[derive(Parser, Debug)]
#[command(name = "portkv-cli")]
#[command(about = "Controlling client for a portkv worker")]
struct Args {
    /// Path to the worker binary
    #[arg(short, long, default_value = "portkv-worker")]
    worker: String,

    /// Data directory handed to the worker
    #[arg(short, long, default_value = "./portkv_data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Force a WAL flush
    Flush,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut child = ProcessCommand::new(&args.worker)
        .arg("--data-dir")
        .arg(&args.data_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| PortError::Protocol("worker stdin not captured".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PortError::Protocol("worker stdout not captured".to_string()))?;

    let mut writer = BufWriter::new(stdin);
    let mut reader = BufReader::new(stdout);

    let command = match &args.command {
        Commands::Get { key } => Command::Get {
            key: key.as_bytes(),
        },
        Commands::Set { key, value } => Command::Put {
            key: key.as_bytes(),
            value: value.as_bytes(),
        },
        Commands::Del { key } => Command::Delete {
            key: key.as_bytes(),
        },
        Commands::Flush => Command::Flush,
    };

    write_command(&mut writer, &command)?;
    let reply = read_reply(&mut reader)?;

    match (&args.command, reply.status) {
        (Commands::Get { .. }, Status::Ok) => {
            let payload = reply.payload.unwrap_or_default();
            println!("{}", String::from_utf8_lossy(&payload));
        }
        (_, Status::Ok) => println!("OK"),
        (_, Status::Error) => println!("(not found)"),
    }

    // End the session cleanly so the worker flushes and exits
    write_command(&mut writer, &Command::Close)?;
    let close_reply = read_reply(&mut reader)?;
    if close_reply.status != Status::Ok {
        eprintln!("warning: close returned an error reply");
    }

    let status = child.wait()?;
    if !status.success() {
        eprintln!("warning: worker exited with {}", status);
    }

    Ok(())
}
