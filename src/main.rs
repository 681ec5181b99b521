mod args;
mod colors;
mod config;
mod version;

use crate::args::{Action, Args, InstallArgs, RunClassArgs, RunJarArgs, RuntimeArgs};
use crate::colors::*;
use crate::config::*;
use crate::version::Version;
use clap::Parser;
use java_provisioner::options::{INSTALL_ROOT_DIR, InstallOptions};
use java_provisioner::{Installer, Launcher, Plan};
use std::path::{self, PathBuf};
use std::process::Child;
use std::time::{Duration, Instant};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{level_filters::*, *};
use tracing_subscriber::EnvFilter;

// Exit code used in case there were no errors.
#[doc(hidden)]
const EXIT_OK: i32 = 0;

// Exit code used in case of errors.
#[doc(hidden)]
const EXIT_NOK: i32 = 1;

/// Main entry point for the application.
fn main() {
    // enable ansi support to use colorised/styled output
    #[cfg(windows)]
    let _ = nu_ansi_term::enable_ansi_support();

    // delegate
    match internal_main() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} err = {err:#?}", ATTENTION_COLOR.paint("Failed!"));
            std::process::exit(EXIT_NOK);
        }
    }
}

// Internal main entry point for the application, returns the exit code.
#[doc(hidden)]
fn internal_main() -> anyhow::Result<i32> {
    // parse arguments
    let args = Args::parse();

    // print some information
    if !args.quiet || args.version {
        print_info();
    }

    // stop here in case only the version was requested
    if args.version {
        return Ok(EXIT_OK);
    }

    // init tracing
    init_tracing(&args);

    // print parsed arguments
    trace!("arguments: {args:#?}");

    // load config (the default one is optional)
    let config = load_config(&args)?;
    debug!(?config);

    match args.action {
        Some(Action::Install(ref install_args)) => install(&args, config, install_args),
        Some(Action::RunJar(ref run_args)) => run_jar(config, run_args),
        Some(Action::RunClass(ref run_args)) => run_class(config, run_args),
        None => {
            let message = "Nothing to do, see --help for the available actions.";
            println!("{}", INFO_COLOR.paint(message));
            Ok(EXIT_OK)
        }
    }
}

// Loads the configuration from the given file or, if present, from the default file.
#[doc(hidden)]
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config_path = match args.config {
        Some(ref config) => PathBuf::from(config),
        None => {
            let config_path = default_config_path();
            if !config_path.exists() {
                debug!(config_path = %config_path.display(), "no configuration");
                return Ok(Config::default());
            }
            config_path
        }
    };
    let config_path = path::absolute(&config_path).unwrap_or(config_path);
    if !args.quiet {
        println!("Using configuration from {}.", PATH_COLOR.paint(config_path.to_string_lossy()));
    }

    Config::load_from_file(&config_path)
}

// Installs a java runtime.
#[doc(hidden)]
fn install(args: &Args, config: Config, install_args: &InstallArgs) -> anyhow::Result<i32> {
    // remember start date/time
    let start = Instant::now();

    // command line wins over config file
    let options = install_args.options.to_options().overlay(config.install);
    trace!(?options);

    let installer = Installer::http()?;

    // dry-run: show what the installation would do
    if install_args.dry_run {
        let not = ATTENTION_COLOR.paint("NOT");
        match installer.plan(&options)? {
            Plan::SystemJava(home) => {
                let home = PATH_COLOR.paint(home.to_string_lossy().to_string());
                println!("{not} downloading -> system java at {home}");
            }
            Plan::Installed(install_root) => {
                let install_root = PATH_COLOR.paint(install_root.to_string_lossy().to_string());
                println!("{not} downloading -> already installed at {install_root}");
            }
            Plan::Download { request, url } => {
                let install_root = PATH_COLOR.paint(request.install_root().to_string_lossy().to_string());
                println!("{not} downloading {url} into {install_root} -> dry-run");
            }
        }
        return Ok(EXIT_OK);
    }

    match installer.install(&options)? {
        Some(install_root) => {
            let install_root = PATH_COLOR.paint(install_root.to_string_lossy().to_string());
            println!("{} java runtime at {install_root}", SUCCESS_COLOR.paint("Installed"));
        }
        None => println!("{} system java", SUCCESS_COLOR.paint("Using")),
    }

    // print some statistics
    if !args.quiet {
        let elapsed = start.elapsed();
        println!("Total time: {}", format_elapsed(elapsed));
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        println!("Finished at: {}", format_now(now));
    }

    Ok(EXIT_OK)
}

// Runs an executable jar.
#[doc(hidden)]
fn run_jar(config: Config, run_args: &RunJarArgs) -> anyhow::Result<i32> {
    let launcher = launcher(config, &run_args.runtime)?;
    let child = launcher.execute_jar(&run_args.jar, &run_args.args, run_args.runtime.jre.as_deref())?;

    wait(child)
}

// Runs a main class.
#[doc(hidden)]
fn run_class(config: Config, run_args: &RunClassArgs) -> anyhow::Result<i32> {
    let launcher = launcher(config, &run_args.runtime)?;
    let child = launcher.execute_class_with_cp(
        &run_args.class_name,
        &run_args.class_paths,
        &run_args.args,
        run_args.runtime.jre.as_deref(),
    )?;

    wait(child)
}

// Creates a launcher for the install root derived from command line and config file.
#[doc(hidden)]
fn launcher(config: Config, runtime_args: &RuntimeArgs) -> anyhow::Result<Launcher> {
    let options = InstallOptions {
        install_path: runtime_args.install_path.clone(),
        ..InstallOptions::default()
    }
    .overlay(config.install);
    let install_root = options.expand_install_path()?.join(INSTALL_ROOT_DIR);
    debug!(install_root = %install_root.display());

    Ok(Launcher::new(install_root))
}

// Waits for the given child process and returns its exit code.
#[doc(hidden)]
fn wait(mut child: Child) -> anyhow::Result<i32> {
    let status = child.wait()?;
    debug!(?status);

    // terminated by signal
    Ok(status.code().unwrap_or(EXIT_NOK))
}

// Formats the elapsed time with a precision of seconds.
#[doc(hidden)]
fn format_elapsed(elapsed: Duration) -> String {
    // null out everything below seconds
    let elapsed = Duration::from_secs(elapsed.as_secs());

    // format the remaining duration
    humantime::format_duration(elapsed).to_string()
}

// Formats the given date/time in the local offset.
#[doc(hidden)]
fn format_now(now: OffsetDateTime) -> String {
    // define format
    const FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]");

    // local offset or UTC
    let offset = UtcOffset::current_local_offset();
    let offset = offset.unwrap_or(UtcOffset::UTC);
    trace!(?offset);

    // format
    let now = now.to_offset(offset);
    now.format(&FORMAT).unwrap_or(now.to_string())
}

// Prints some information (version, path of executable, etc.).
#[doc(hidden)]
fn print_info() {
    let version = Version::default();
    if let Ok(exe) = std::env::current_exe() {
        let exe = PATH_COLOR.paint(exe.to_string_lossy());
        println!("{version} [{exe}]");
    } else {
        println!("{version}");
    }
}

// Initialises the tracing framework based on given command line arguments.
#[doc(hidden)]
fn init_tracing(args: &Args) {
    let level_filter = match args.verbose {
        0 => LevelFilter::ERROR.into(),
        1 => LevelFilter::WARN.into(),
        2 => LevelFilter::INFO.into(),
        3 => LevelFilter::DEBUG.into(),
        _ => LevelFilter::TRACE.into(),
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level_filter);
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(env_filter).init();
}
