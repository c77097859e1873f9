use std::collections::HashMap;
use std::process::ExitCode;

use batch_core::repo::{ExecutionRepository, InMemoryExecutionRepository};
use batch_core::{EventStore, InMemoryEventStore};
use batch_persistence::{JsonLinesEventStore, StoreConfig};
use batchflow::config::{env_lookup, CHUNK_SIZE, INPUT_FILE, OUTPUT_FILE, RUN_LOG, SKIP_TITLE};
use batchflow::{build_job, run_once, AppConfig};

const USAGE: &str = "Uso:\n  batch-cli run [--input <P>] [--output <BASE>] [--chunk-size <N>] [--skip-title <S>] [--run-log <P>]\n  batch-cli history [--log <P>]";

const RUN_FLAGS: &[(&str, &str)] = &[("--input", INPUT_FILE),
                                     ("--output", OUTPUT_FILE),
                                     ("--chunk-size", CHUNK_SIZE),
                                     ("--skip-title", SKIP_TITLE),
                                     ("--run-log", RUN_LOG)];
const HISTORY_FLAGS: &[(&str, &str)] = &[("--log", RUN_LOG)];

fn main() -> ExitCode {
    // Cargar .env si existe
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (cmd, rest) = match args.split_first() {
        Some((cmd, rest)) => (cmd.as_str(), rest),
        None => return usage_error("falta el comando"),
    };
    match cmd {
        "run" => match parse_flags(rest, RUN_FLAGS) {
            Ok(overrides) => cmd_run(&overrides),
            Err(msg) => usage_error(&msg),
        },
        "history" => match parse_flags(rest, HISTORY_FLAGS) {
            Ok(flags) => {
                let log = flags.get(RUN_LOG)
                               .cloned()
                               .or_else(|| StoreConfig::from_env().run_log.map(|p| p.display().to_string()));
                match log {
                    Some(log) => cmd_history(&log),
                    None => usage_error("history requiere --log (o BATCH_RUN_LOG)"),
                }
            }
            Err(msg) => usage_error(&msg),
        },
        other => usage_error(&format!("comando desconocido: {other}")),
    }
}

fn usage_error(msg: &str) -> ExitCode {
    eprintln!("[batch-cli] {msg}\n{USAGE}");
    ExitCode::from(2)
}

/// `--flag valor` → clave de configuración. Flags desconocidos o sin valor
/// son error de uso.
fn parse_flags(args: &[String], known: &[(&str, &'static str)]) -> Result<HashMap<&'static str, String>, String> {
    let mut out = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let key = known.iter()
                       .find(|(f, _)| *f == flag)
                       .map(|(_, k)| *k)
                       .ok_or_else(|| format!("opción desconocida: {flag}"))?;
        let value = args.get(i + 1).ok_or_else(|| format!("{flag} requiere un valor"))?;
        out.insert(key, value.clone());
        i += 2;
    }
    Ok(out)
}

fn cmd_run(overrides: &HashMap<&'static str, String>) -> ExitCode {
    let cfg = match AppConfig::from_lookup(|k: &str| overrides.get(k).cloned().or_else(|| env_lookup(k))) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[batch-cli run] {e}");
            return ExitCode::from(e.exit_code());
        }
    };
    match &cfg.run_log {
        Some(path) => match JsonLinesEventStore::open(path) {
            Ok(store) => execute(&cfg, store),
            Err(e) => {
                eprintln!("[batch-cli run] run log {}: {e}", path.display());
                ExitCode::from(2)
            }
        },
        None => execute(&cfg, InMemoryEventStore::default()),
    }
}

fn execute<E: EventStore>(cfg: &AppConfig, store: E) -> ExitCode {
    let mut job = build_job(cfg, store);
    match run_once(&mut job) {
        Ok(rec) => {
            match serde_json::to_string(&rec) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("[batch-cli run] cannot render record: {e}"),
            }
            if let Some(f) = &rec.failure {
                eprintln!("[batch-cli run] run {} {}: {}", rec.run_id, rec.status, f.error);
            }
            ExitCode::from(rec.status.exit_code() as u8)
        }
        Err(e) => {
            eprintln!("[batch-cli run] {e}");
            ExitCode::from(1)
        }
    }
}

fn cmd_history(log: &str) -> ExitCode {
    let store = match JsonLinesEventStore::open(log) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("[batch-cli history] {log}: {e}");
            return ExitCode::from(2);
        }
    };
    let repo = InMemoryExecutionRepository::new();
    for id in store.run_ids() {
        if let Some(rec) = repo.load(id, &store.list(id)) {
            match serde_json::to_string(&rec) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("[batch-cli history] run {id}: {e}"),
            }
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn run_flags_map_to_config_keys() {
        let parsed = parse_flags(&args(&["--input", "in.csv", "--chunk-size", "5"]), RUN_FLAGS).unwrap();
        assert_eq!(parsed.get(INPUT_FILE).map(String::as_str), Some("in.csv"));
        assert_eq!(parsed.get(CHUNK_SIZE).map(String::as_str), Some("5"));
        assert!(!parsed.contains_key(OUTPUT_FILE));
    }

    #[test]
    fn unknown_or_dangling_flags_are_usage_errors() {
        assert!(parse_flags(&args(&["--bogus", "x"]), RUN_FLAGS).is_err());
        assert!(parse_flags(&args(&["--input"]), RUN_FLAGS).is_err());
        assert!(parse_flags(&args(&["--input", "x"]), HISTORY_FLAGS).is_err());
    }
}
