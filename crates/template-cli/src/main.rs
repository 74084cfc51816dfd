use std::io::Read as _;
use std::{env, fs, io, process::ExitCode};

use template_engine::{Diagnostics, Engine, EnvironmentBuilder, RawEnvContext, StderrDiagnostics};

struct Args {
    path: Option<String>,
    user: String,
    char_name: String,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut path = None;
    let mut user = "User".to_string();
    let mut char_name = "Character".to_string();

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--user" => {
                user = iter.next().ok_or("--user requires a value")?.clone();
            }
            "--char" => {
                char_name = iter.next().ok_or("--char requires a value")?.clone();
            }
            other if path.is_none() => path = Some(other.to_string()),
            other => return Err(format!("unexpected argument: {other}")),
        }
    }

    Ok(Args { path, user, char_name })
}

/// Reads the document from `path`, or from stdin when no path was given.
fn read_input(path: Option<&str>) -> Result<String, String> {
    let Some(file_path) = path else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(|err| format!("error reading stdin: {err}"))?;
        return Ok(buf);
    };

    match fs::metadata(file_path) {
        Ok(metadata) => {
            if !metadata.is_file() {
                return Err(format!("{file_path} is not a file"));
            }
        }
        Err(err) => return Err(format!("error reading {file_path}: {err}")),
    }
    fs::read_to_string(file_path).map_err(|err| format!("error reading {file_path}: {err}"))
}

fn main() -> ExitCode {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let content = match read_input(args.path.as_deref()) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = RawEnvContext { content: content.clone(), name1: args.user, name2: args.char_name, ..Default::default() };

    let diagnostics = StderrDiagnostics;
    let mut registry = template_engine::Registry::new();
    if let Err(err) = template_stdlib::register_all(&mut registry) {
        diagnostics.registration_error("register_all", &err.to_string());
        return ExitCode::FAILURE;
    }
    let registry = std::sync::RwLock::new(registry);

    let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diagnostics);
    let engine = Engine::new(&diagnostics);
    let output = engine.evaluate(&content, &env, &registry);

    print!("{output}");
    ExitCode::SUCCESS
}
