// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PIM Control CLI
//!
//! CLI tool for interacting with the product instance management API.
//!
//! Usage:
//!   pim-ctl <command> [options]
//!
//! Commands:
//!   definitions [--product <name>] [--version <v>]
//!   instances
//!   get <name>
//!   create --product <name> [--version <v>] [--wait] [--poll <ms>]
//!   wait <name> [--poll <ms>]
//!   delete <name>

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use pim_client::{
    CONFIGURATION_PATH_ENVIRONMENT_VARIABLE, Client, Configuration, DEFAULT_POLLING_INTERVAL,
};

fn print_usage() {
    eprintln!(
        r#"Usage: pim-ctl <command> [options]

Interact with the product instance management (PIM) API.

COMMANDS:
    definitions                     List the products that can be started
    instances                       List the existing instances
    get <name>                      Get an instance
    create                          Start an instance of a product
    wait <name>                     Wait for an instance to be ready
    delete <name>                   Delete an instance

DEFINITIONS OPTIONS:
    --product <name>                Filter by product name
    --version <v>                   Filter by product version

CREATE OPTIONS:
    --product <name>                Product name (required)
    --version <v>                   Product version
    --wait                          Wait for the instance to be ready
    --poll <ms>                     Poll interval in ms (default: 500)

WAIT OPTIONS:
    --poll <ms>                     Poll interval in ms (default: 500)

GLOBAL OPTIONS:
    --config <path>                 Configuration file (default: ${})
    --timeout <ms>                  Timeout of each request

ENVIRONMENT:
    {}   Path of the configuration file
    RUST_LOG                        Log filter (default: warn)

EXAMPLES:
    # List the available MAPDL versions
    pim-ctl definitions --product mapdl

    # Start MAPDL 2022 R2 and wait until it can be used
    pim-ctl create --product mapdl --version 222 --wait

    # Stop it
    pim-ctl delete instances/mapdl-222-yAVne0ve
"#,
        CONFIGURATION_PATH_ENVIRONMENT_VARIABLE, CONFIGURATION_PATH_ENVIRONMENT_VARIABLE
    );
}

#[derive(Debug)]
enum Command {
    Help,
    Definitions {
        product_name: Option<String>,
        product_version: Option<String>,
    },
    Instances,
    Get {
        name: String,
    },
    Create {
        product_name: String,
        product_version: Option<String>,
        wait: bool,
        poll_ms: u64,
    },
    Wait {
        name: String,
        poll_ms: u64,
    },
    Delete {
        name: String,
    },
}

#[derive(Debug, Default)]
struct GlobalOptions {
    config_path: Option<String>,
    timeout: Option<Duration>,
}

#[derive(Debug)]
struct Invocation {
    command: Command,
    options: GlobalOptions,
}

fn parse_args() -> Result<Invocation, String> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from_vec(&args)
}

/// Consume a global option at `args[*i]`. Returns false when `args[*i]` is not one.
fn parse_global_option(
    args: &[String],
    i: &mut usize,
    options: &mut GlobalOptions,
) -> Result<bool, String> {
    match args[*i].as_str() {
        "--config" => {
            *i += 1;
            options.config_path = Some(args.get(*i).ok_or("--config requires a path")?.clone());
            Ok(true)
        }
        "--timeout" => {
            *i += 1;
            let ms: u64 = args
                .get(*i)
                .ok_or("--timeout requires milliseconds")?
                .parse()
                .map_err(|_| "Invalid timeout")?;
            options.timeout = Some(Duration::from_millis(ms));
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn parse_poll(args: &[String], i: usize) -> Result<u64, String> {
    args.get(i)
        .ok_or("--poll requires milliseconds")?
        .parse()
        .map_err(|_| "Invalid poll interval".to_string())
}

fn parse_args_from_vec(args: &[String]) -> Result<Invocation, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let mut options = GlobalOptions::default();
    let mut positional: Vec<String> = Vec::new();
    let mut product_name: Option<String> = None;
    let mut product_version: Option<String> = None;
    let mut wait = false;
    let mut poll_ms = DEFAULT_POLLING_INTERVAL.as_millis() as u64;

    let command = args[1].as_str();
    if matches!(command, "help" | "--help" | "-h") {
        return Ok(Invocation {
            command: Command::Help,
            options,
        });
    }
    if !matches!(
        command,
        "definitions" | "instances" | "get" | "create" | "wait" | "delete"
    ) {
        return Err(format!("Unknown command: {}", command));
    }

    let mut i = 2;
    while i < args.len() {
        if parse_global_option(args, &mut i, &mut options)? {
            i += 1;
            continue;
        }
        match (command, args[i].as_str()) {
            ("definitions" | "create", "--product") => {
                i += 1;
                product_name = Some(args.get(i).ok_or("--product requires a name")?.clone());
            }
            ("definitions" | "create", "--version") => {
                i += 1;
                product_version = Some(args.get(i).ok_or("--version requires a value")?.clone());
            }
            ("create", "--wait") => wait = true,
            ("create" | "wait", "--poll") => {
                i += 1;
                poll_ms = parse_poll(args, i)?;
            }
            (_, arg) if arg.starts_with("--") => {
                return Err(format!("Unknown argument: {}", arg));
            }
            (_, arg) => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let name = |what: &str| -> Result<String, String> {
        match positional.as_slice() {
            [name] => Ok(name.clone()),
            [] => Err(format!("{} requires an instance name", what)),
            _ => Err(format!("{} takes a single instance name", what)),
        }
    };
    let no_positional = || -> Result<(), String> {
        match positional.first() {
            Some(arg) => Err(format!("Unexpected argument: {}", arg)),
            None => Ok(()),
        }
    };

    let command = match command {
        "definitions" => {
            no_positional()?;
            Command::Definitions {
                product_name,
                product_version,
            }
        }
        "instances" => {
            no_positional()?;
            Command::Instances
        }
        "get" => Command::Get { name: name("get")? },
        "create" => {
            no_positional()?;
            Command::Create {
                product_name: product_name.ok_or("--product is required")?,
                product_version,
                wait,
                poll_ms,
            }
        }
        "wait" => Command::Wait {
            name: name("wait")?,
            poll_ms,
        },
        _ => Command::Delete {
            name: name("delete")?,
        },
    };

    Ok(Invocation { command, options })
}

fn load_client(options: &GlobalOptions) -> Result<Client, String> {
    let configuration = match &options.config_path {
        Some(path) => Configuration::from_file(path),
        None => Configuration::from_environment(),
    }
    .map_err(|e| e.to_string())?;

    Client::from_configuration(configuration).map_err(|e| e.to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|e| e.to_string())?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize minimal logging (default to warn if RUST_LOG not set)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let invocation = match parse_args() {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if matches!(invocation.command, Command::Help) {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let client = match load_client(&invocation.options) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = execute_command(&client, invocation.command, invocation.options.timeout).await;
    client.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute_command(
    client: &Client,
    cmd: Command,
    timeout: Option<Duration>,
) -> Result<(), String> {
    match cmd {
        Command::Help => print_usage(),

        Command::Definitions {
            product_name,
            product_version,
        } => {
            let definitions = client
                .list_definitions(product_name.as_deref(), product_version.as_deref(), timeout)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&definitions)?;
        }

        Command::Instances => {
            let instances = client
                .list_instances(timeout)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&instances)?;
        }

        Command::Get { name } => {
            let instance = client
                .get_instance(&name, timeout)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&instance)?;
        }

        Command::Create {
            product_name,
            product_version,
            wait,
            poll_ms,
        } => {
            let mut instance = client
                .create_instance(&product_name, product_version.as_deref(), timeout)
                .await
                .map_err(|e| e.to_string())?;
            if wait {
                instance
                    .wait_for_ready(Duration::from_millis(poll_ms), timeout)
                    .await
                    .map_err(|e| e.to_string())?;
                print_json(&instance)?;
            } else {
                println!("{}", instance.name());
            }
        }

        Command::Wait { name, poll_ms } => {
            let mut instance = client
                .get_instance(&name, timeout)
                .await
                .map_err(|e| e.to_string())?;
            instance
                .wait_for_ready(Duration::from_millis(poll_ms), timeout)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&instance)?;
        }

        Command::Delete { name } => {
            let mut instance = client
                .get_instance(&name, timeout)
                .await
                .map_err(|e| e.to_string())?;
            instance.delete(timeout).await.map_err(|e| e.to_string())?;
            println!("Deleted: {}", name);
        }
    }

    Ok(())
}
