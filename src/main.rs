use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::{error, Level};

use hipskit::utils::logger::Logger;
use hipskit::commands::{CommandFactory, HipskitCommandFactory};

fn build_cli() -> ClapCommand {
    ClapCommand::new("hipskit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Analyze, extract and convert HIPS hyperspectral image files")
        .arg(
            Arg::new("input")
                .help("Input HIPS file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log messages to this file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("extract")
                .short('e')
                .long("extract")
                .help("Extract bands as CSV or PNG")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("convert")
                .short('c')
                .long("convert")
                .help("Convert to a different payload compression")
                .action(ArgAction::SetTrue)
                .conflicts_with("extract"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("band")
                .long("band")
                .help("Single band to extract (default: every band)")
                .value_name("INDEX")
                .required(false),
        )
        .arg(
            Arg::new("bands")
                .long("bands")
                .help("Keep only these bands, e.g. '0,2,5'")
                .value_name("LIST")
                .required(false),
        )
        .arg(
            Arg::new("array-format")
                .long("array-format")
                .help("Format for extracted bands (csv, png)")
                .value_name("FORMAT")
                .default_value("csv")
                .required(false),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .help("Target compression (raw, deflate, png, jpeg)")
                .value_name("MODE")
                .required(false),
        )
        .arg(
            Arg::new("bits")
                .long("bits")
                .help("Quantification bit depth for deflate, png and jpeg output")
                .value_name("Q")
                .required(false),
        )
        .arg(
            Arg::new("preset")
                .long("preset")
                .help("Compression preset (Uncompressed, VeryHighQuality, HighQuality, HighCompression, VeryHighCompression)")
                .value_name("NAME")
                .conflicts_with("mode")
                .required(false),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    let verbose = matches.get_flag("verbose");
    let level = if verbose { Level::Debug } else { Level::Info };

    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            if let Err(e) = Logger::init_global_logger(log_file, level) {
                eprintln!("Error setting up global logger: {}", e);
                process::exit(1);
            }
        }
        None => Logger::init_console_logger(level.to_level_filter()),
    }
    let logger = Logger::console();

    let factory = HipskitCommandFactory::new();

    match factory.create_command(&matches, &logger) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
