use clap::{Arg, ArgAction, Command as ClapCommand};
use env_logger::Env;
use log::error;
use std::process;

use stacktiff::commands::{CommandFactory, StacktiffCommandFactory};

fn main() {
    let matches = ClapCommand::new("stacktiff")
        .version("0.1")
        .author("Maurice Schilpp")
        .about("Inspect and extract frames from multi-page TIFF stacks")
        .arg(
            Arg::new("input")
                .help("Input TIFF stack file or acquisition folder")
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
            Arg::new("frame")
                .short('f')
                .long("frame")
                .help("Frame index to inspect or extract")
                .value_name("INDEX")
                .required(false),
        )
        .arg(
            Arg::new("extract")
                .short('e')
                .long("extract")
                .help("Extract the selected frame to its own file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output TIFF file for extraction")
                .value_name("FILE")
                .required(false),
        )
        .get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let factory = StacktiffCommandFactory::new();

    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
