//! shellstack - interactive demo console
//!
//! Runs the main shell with a handful of commands, a nested debug shell and
//! Ctrl-C wired to the cancellation controller.

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use shellstack::ansi::ColorRole;
use shellstack::config::loader::ConfigLoader;
use shellstack::error::Result;
use shellstack::{
    CancellationController, CommandArgumentInfo, CommandFlags, CommandInfo, Config, ShellRuntime,
    ShellType,
};

/// Command line options
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> Result<Self> {
        let args: Vec<String> = env::args().collect();
        let mut app_args = AppArgs::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        app_args.config_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    } else {
                        return Err("Missing config file path".into());
                    }
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("shellstack v{}", env!("CARGO_PKG_VERSION"));
                    process::exit(0);
                }
                arg if arg.starts_with('-') => {
                    return Err(format!("Unknown option: {}", arg).into());
                }
                _ => {
                    warn!("Ignoring positional argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("shellstack - nested multi-shell console");
    println!();
    println!("USAGE:");
    println!("    shellstack [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    -d, --debug            Enable debug logging");
    println!("    -h, --help             Print this help message");
    println!("    -v, --version          Print version information");
    println!();
    println!("CONFIGURATION:");
    println!("    shellstack looks for config.toml or config.json in:");
    println!("    1. Path specified with --config");
    println!("    2. ./.shellstack/");
    println!("    3. $XDG_CONFIG_HOME/shellstack/");
    println!("    4. ~/.config/shellstack/");
    println!("    5. ~/.shellstack/");
    println!("    6. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

fn load_configuration(args: &AppArgs) -> Config {
    let loaded = match &args.config_path {
        Some(path) => ConfigLoader::load_from_path(path),
        None => ConfigLoader::load(),
    };
    loaded.unwrap_or_else(|e| {
        warn!("Failed to load configuration: {}. Using defaults", e);
        Config::default()
    })
}

fn register_commands(runtime: &ShellRuntime) -> Result<()> {
    let registry = runtime.registry();

    registry.add_unified_command(
        CommandInfo::from_fn("help", "Lists available commands or shows command usage", |ctx| {
            let command = ctx.arguments().first().map(String::as_str);
            ctx.show_help(command);
            Ok(0)
        })
        .with_arguments(CommandArgumentInfo::optional(&["[command]"])),
    )?;
    registry.add_unified_command(CommandInfo::from_fn(
        "exit",
        "Leaves the current shell",
        |ctx| {
            ctx.request_exit();
            Ok(0)
        },
    ))?;

    registry.add_command(
        ShellType::Shell,
        CommandInfo::from_fn("echo", "Prints the given text", |ctx| {
            ctx.console()
                .write_raw(ctx.arguments_text(), true, ColorRole::Neutral);
            Ok(0)
        })
        .with_arguments(CommandArgumentInfo::required(1, &["<text>"])),
    )?;
    registry.add_command(
        ShellType::Shell,
        CommandInfo::from_fn("sleep", "Waits for the given number of seconds", |ctx| {
            let seconds = match ctx.arguments().first() {
                Some(text) => text.parse::<u64>()?,
                None => 3,
            };
            ctx.sleep(Duration::from_secs(seconds))?;
            Ok(0)
        })
        .with_arguments(CommandArgumentInfo::optional(&["[seconds]"])),
    )?;
    registry.add_command(
        ShellType::Shell,
        CommandInfo::from_fn("version", "Shows the version", |ctx| {
            ctx.console().write_line(
                "shellstack v{0}",
                ColorRole::Success,
                &[&shellstack::VERSION],
            );
            Ok(0)
        }),
    )?;
    registry.add_command(
        ShellType::Shell,
        CommandInfo::from_fn("debug", "Opens the debug shell", |ctx| {
            ctx.enter_shell(ShellType::Debug)?;
            Ok(0)
        })
        .with_flags(CommandFlags::STRICT),
    )?;
    registry.add_alias(ShellType::Shell, "say", "echo")?;

    registry.add_command(
        ShellType::Debug,
        CommandInfo::from_fn("stack", "Shows the shell stack", |ctx| {
            let types = ctx.dispatcher().stack().shell_types();
            for (depth, shell_type) in types.iter().enumerate() {
                ctx.console().write_raw(
                    &format!("{:>3} {}", depth, shell_type),
                    true,
                    ColorRole::ListEntry,
                );
            }
            Ok(0)
        }),
    )?;

    Ok(())
}

/// Forward Ctrl-C to the cancellation controller
fn spawn_interrupt_listener(controller: Arc<CancellationController>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                loop {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Interrupt listener failed: {}", e);
                        break;
                    }
                    let report = controller.cancel_current();
                    debug!("Interrupt handled: {:?}", report);
                }
            });
        })?;
    Ok(())
}

fn main() -> Result<()> {
    let args = AppArgs::parse().unwrap_or_else(|e| {
        eprintln!("Failed to parse arguments: {}", e);
        print_help();
        process::exit(1);
    });

    let config = load_configuration(&args);
    let log_level = if args.debug {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };

    let env_filter = env::var("RUST_LOG").unwrap_or(log_level);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("Starting shellstack v{}", env!("CARGO_PKG_VERSION"));

    let runtime = ShellRuntime::new(config)?;
    register_commands(&runtime)?;
    spawn_interrupt_listener(runtime.cancellation().clone())?;

    let dispatched = runtime.run()?;
    info!("Main shell exited after {} command(s)", dispatched);
    Ok(())
}
