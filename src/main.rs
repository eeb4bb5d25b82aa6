use arrowlang::cli::{generate_completions, Args, Commands, EVAL_FILENAME};
use arrowlang::config::AppConfig;
use arrowlang::diagnostic::{render_diagnostic, REPL_FILENAME};
use arrowlang::Interpreter;
use clap::Parser;
use log::debug;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::path::Path;
use std::process;

const PROMPT: &str = "arrowlang> ";

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    config.init_logging();

    let status = if let Some(source) = &args.eval {
        debug!("Evaluating source from the command line");
        run_once(EVAL_FILENAME, source, &config)
    } else if let Some(path) = &args.file {
        debug!("Reading program from file: {}", path.display());
        match read_file(path) {
            Ok(source) => run_once(&path.display().to_string(), &source, &config),
            Err(e) => {
                error_message(&config, &e);
                1
            }
        }
    } else {
        run_interactive_mode(&config);
        0
    };

    process::exit(status);
}

fn run_once(filename: &str, source: &str, config: &AppConfig) -> i32 {
    let interpreter = Interpreter::new();
    match interpreter.run(filename, source) {
        Ok(Some(value)) => {
            println!("{}", value);
            0
        }
        Ok(None) => 0,
        Err(diagnostic) => {
            eprintln!("{}", render_diagnostic(&diagnostic, config.color_enabled));
            1
        }
    }
}

fn run_interactive_mode(config: &AppConfig) {
    debug!("Entering interactive mode");
    let interpreter = Interpreter::new();

    loop {
        print!("{}", PROMPT);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                match interpreter.run(REPL_FILENAME, trimmed) {
                    Ok(Some(value)) => println!("{}", value),
                    Ok(None) => {}
                    Err(diagnostic) => {
                        eprintln!("{}", render_diagnostic(&diagnostic, config.color_enabled))
                    }
                }
            }
            Err(e) => {
                error_message(config, &format!("Error reading input: {}", e));
                break;
            }
        }
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Error reading file {}: {}", path.display(), e))
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
