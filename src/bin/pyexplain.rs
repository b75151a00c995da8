//! Explains an exception snapshot read from a JSON file or stdin.

use pyexplain::infrastructure::logging::{init_logging, parse_level};
use pyexplain::{Config, ExceptionSnapshot, Handled, Include, Output, Session};
use std::io::Read;
use std::path::PathBuf;

const USAGE: &str = "Usage: pyexplain [OPTIONS] [SNAPSHOT]

Reads a JSON exception snapshot from SNAPSHOT, or from stdin when absent.

Options:
  -i, --include NAME   Sections to show: a name (message, hint, what, why,
                       where, more, explain, friendly_tb, python_tb,
                       debug_tb, no_tb) or a level from 0 to 5
  --lang LANG          Language of the explanation (default: en)
  --format NAME        repl or json (default: repl)
  --config PATH        Configuration file (default: nearest .pyexplain.toml)
  --log-level LEVEL    trace, debug, info, warn or error
  --print-config       Print the default configuration and exit
  -h, --help           Show this help";

#[derive(Debug, Default)]
struct CliOptions {
    snapshot: Option<PathBuf>,
    include: Option<Include>,
    lang: Option<String>,
    format: Option<String>,
    config: Option<PathBuf>,
    log_level: Option<String>,
    print_config: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut i = 0;

    let value = |i: usize, flag: &str| -> Result<String, String> {
        args.get(i).cloned().ok_or_else(|| format!("{} requires an argument", flag))
    };

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => options.help = true,
            "--print-config" => options.print_config = true,
            "-i" | "--include" => {
                i += 1;
                options.include = Some(value(i, "--include")?.parse()?);
            }
            "--lang" => {
                i += 1;
                options.lang = Some(value(i, "--lang")?);
            }
            "--format" => {
                i += 1;
                options.format = Some(value(i, "--format")?);
            }
            "--config" => {
                i += 1;
                options.config = Some(PathBuf::from(value(i, "--config")?));
            }
            "--log-level" => {
                i += 1;
                let level = value(i, "--log-level")?;
                if parse_level(&level).is_none() {
                    return Err(format!("Invalid value for --log-level: {}", level));
                }
                options.log_level = Some(level);
            }
            arg if arg.starts_with('-') && arg != "-" => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if options.snapshot.is_some() {
                    return Err("Only one snapshot can be explained".to_string());
                }
                if path != "-" {
                    options.snapshot = Some(PathBuf::from(path));
                }
            }
        }
        i += 1;
    }

    Ok(options)
}

fn read_snapshot(path: Option<&PathBuf>) -> Result<ExceptionSnapshot, String> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json).map_err(|e| format!("Failed to read stdin: {}", e))?;
            json
        }
    };
    ExceptionSnapshot::from_json(&json).map_err(|e| e.to_string())
}

fn run(options: CliOptions) -> Result<i32, String> {
    if options.help {
        println!("{}", USAGE);
        return Ok(0);
    }
    if options.print_config {
        print!("{}", Config::generate_default());
        return Ok(0);
    }

    let mut config = match &options.config {
        Some(path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::discover(),
    };
    if let Some(level) = options.log_level {
        config.logging.level = level;
    }
    if let Some(lang) = options.lang {
        config.session.lang = lang;
    }
    if let Some(format) = options.format {
        config.session.formatter = format;
    }
    if let Some(include) = options.include {
        config.session.include = include;
    }

    let _guard = init_logging(config.logging.to_log_config());

    let snapshot = read_snapshot(options.snapshot.as_ref())?;
    let session = Session::from_config(&config).map_err(|e| e.to_string())?;
    session.set_output(Output::Stdout);

    match session.explain(&snapshot) {
        Handled::Explained(_) => Ok(0),
        Handled::Propagate(snapshot) => {
            tracing::info!(type_name = %snapshot.type_name, "exception not explained");
            Ok(0)
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(run);
    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["-i", "3", "--lang", "fr", "--format", "json", "snap.json"])).unwrap();
        assert_eq!(options.include, Some(Include::FriendlyTb));
        assert_eq!(options.lang.as_deref(), Some("fr"));
        assert_eq!(options.format.as_deref(), Some("json"));
        assert_eq!(options.snapshot, Some(PathBuf::from("snap.json")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--include"])).is_err());
        assert!(parse_args(&args(&["--include", "everything"])).is_err());
        assert!(parse_args(&args(&["--log-level", "loud"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn test_stdin_dash() {
        let options = parse_args(&args(&["-"])).unwrap();
        assert!(options.snapshot.is_none());
    }
}
