mod script;

use anyhow::{Context, Result};
use livemark_config::Config;
use livemark_engine::{Editor, EditorState, EngineOptions, io};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, process};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Describe,
    Json,
    Markdown,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [--json | --markdown] [script-file]");
    eprintln!("Reads the keystroke script from stdin when no file is given.");
    process::exit(1);
}

fn engine_options(config: &Config) -> EngineOptions {
    EngineOptions {
        auto_pair: config.auto_pair,
        max_list_depth: config.max_list_depth,
        atomic_placeholder: config.atomic_placeholder,
    }
}

fn load_seed(path: &Path) -> Result<EditorState> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed document '{}'", path.display()))?;
    let document = io::from_json(&json)
        .with_context(|| format!("Invalid seed document '{}'", path.display()))?;
    Ok(EditorState::from_document(document))
}

fn read_script(path: Option<&Path>) -> Result<String> {
    let mut script = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    // A file's final newline ends the script rather than pressing Return.
    if script.ends_with('\n') {
        script.pop();
    }
    Ok(script)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("livemark-cli", String::as_str);

    let mut output = Output::Describe;
    let mut script_path: Option<PathBuf> = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--json" if output == Output::Describe => output = Output::Json,
            "--markdown" if output == Output::Describe => output = Output::Markdown,
            "-h" | "--help" => usage(program),
            flag if flag.starts_with("--") => {
                eprintln!("Error: Unexpected option '{flag}'");
                usage(program);
            }
            path if script_path.is_none() => script_path = Some(PathBuf::from(path)),
            _ => usage(program),
        }
    }

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let state = match &config.seed_path {
        Some(seed) => load_seed(seed)?,
        None => EditorState::default(),
    };
    let mut editor = Editor::from_state(state, engine_options(&config));

    let keys = script::parse(&read_script(script_path.as_deref())?)?;
    let rejected = keys
        .into_iter()
        .filter(|key| !key.press(&mut editor))
        .count();
    if rejected > 0 {
        log::warn!("{rejected} keystrokes were rejected");
    }

    let document = &editor.state().document;
    match output {
        Output::Describe => println!("{}", document.describe()),
        Output::Json => println!("{}", io::to_json(document)?),
        Output::Markdown => println!("{}", io::to_markdown(document)),
    }
    Ok(())
}
