/// Run cetd over HTML files and emit JSONL.
///
/// Usage:
///   cetd [--variant] [--pass-through-wrappers] [--threshold <factor>] <html-file-or-dir>
///
/// Output (stdout): one JSON object per file: {"file": "...", "text": "..."}
/// Errors (stderr): {"file": "...", "error": "..."}
/// Summary (stderr): "Done: N ok, M errors"
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use cetd::{Config, ScorerKind};

/// One JSONL record: `{"file": <file>, "<key>": <value>}`.
fn record(file: &str, key: &str, value: &str) -> String {
    let mut line = String::from("{");
    push_json_str(&mut line, "file");
    line.push_str(": ");
    push_json_str(&mut line, file);
    line.push_str(", ");
    push_json_str(&mut line, key);
    line.push_str(": ");
    push_json_str(&mut line, value);
    line.push('}');
    line
}

fn push_json_str(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        let escaped = match ch {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
                continue;
            }
            c => {
                out.push(c);
                continue;
            }
        };
        out.push_str(escaped);
    }
    out.push('"');
}

fn usage() -> ! {
    eprintln!(
        "Usage: cetd [--variant] [--pass-through-wrappers] [--threshold <factor>] <html-file-or-dir>"
    );
    process::exit(1);
}

fn parse_args() -> (Config, PathBuf) {
    let mut config = Config::default();
    let mut target = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--variant" => config = config.with_scorer(ScorerKind::Variant),
            "--pass-through-wrappers" => config = config.with_pass_through_wrappers(true),
            "--threshold" => {
                let Some(factor) = args.next().and_then(|v| v.parse::<f64>().ok()) else {
                    usage()
                };
                config = config.with_expansion_threshold_factor(factor);
            }
            _ if target.is_none() => target = Some(PathBuf::from(&arg)),
            _ => usage(),
        }
    }
    match target {
        Some(path) => (config, path),
        None => usage(),
    }
}

fn html_files(target: &Path) -> std::io::Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    let mut entries: Vec<_> = fs::read_dir(target)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .is_some_and(|x| x == "html" || x == "htm")
        })
        .collect();
    entries.sort();
    Ok(entries)
}

fn main() {
    let (config, target) = parse_args();
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        process::exit(1);
    }

    let entries = match html_files(&target) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("cannot read {}: {e}", target.display());
            process::exit(1);
        }
    };

    let mut ok = 0usize;
    let mut errors = 0usize;

    for path in &entries {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let raw = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{}", record(&filename, "error", &e.to_string()));
                errors += 1;
                continue;
            }
        };

        // UTF-8 with a latin-1 fallback.
        let html = match String::from_utf8(raw) {
            Ok(s) => s,
            Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
        };

        match cetd::extract_text(&html, &config) {
            Ok(text) => {
                println!("{}", record(&filename, "text", &text));
                ok += 1;
            }
            Err(e) => {
                eprintln!("{}", record(&filename, "error", &e.to_string()));
                errors += 1;
            }
        }
    }

    eprintln!("Done: {ok} ok, {errors} errors  (total {})", ok + errors);
}
