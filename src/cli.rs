use anyhow::{Context, Result, anyhow};
use log::info;
use pico_args::Arguments;
use std::{env, path::PathBuf};

use touchview::Profile;
use touchview::replay::{self, Trace};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("replay") => {
            let profile_path: Option<PathBuf> = pargs.opt_value_from_str("--profile")?;
            let pretty = pargs.contains("--pretty");
            let trace_path: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: touchview replay <trace.toml> [--profile <file>] [--pretty]"))?;

            let profile = Profile::resolve(profile_path.as_deref())?;
            let trace = Trace::load(&trace_path)
                .with_context(|| format!("loading trace {}", trace_path.display()))?;
            info!(
                "replaying {} events from {}",
                trace.events.len(),
                trace_path.display()
            );

            for step in replay::replay(&trace, &profile)? {
                let line = if pretty {
                    serde_json::to_string_pretty(&step)?
                } else {
                    serde_json::to_string(&step)?
                };
                println!("{line}");
            }
            Ok(())
        }

        Some("profile") => {
            let profile_path: Option<PathBuf> = pargs.opt_value_from_str("--profile")?;
            let profile = Profile::resolve(profile_path.as_deref())?;
            print!("{}", profile.to_toml_string());
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"touchview: pan/zoom gesture recognizer and trace replay tool

USAGE:
  touchview help [command]                          Show general or command-specific help
  touchview replay <trace.toml> [--profile <file>]  Replay recorded input, one JSON line per event
  touchview profile [--profile <file>]              Print the effective gesture profile

TIPS:
  - User profile: <config dir>/touchview/profile.toml
  - RUST_LOG=debug shows recognized gestures, RUST_LOG=trace every primitive
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "replay" => println!(
            "usage: touchview replay <trace.toml> [--profile <file>] [--pretty]\nFeeds each recorded event through a fresh interpreter and prints the\ncanonical kind, recognized gesture and view state after it."
        ),
        "profile" => println!(
            "usage: touchview profile [--profile <file>]\nPrints the profile that replay would use, as TOML."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
