//! Flag prefix-abbreviation expansion
//!
//! Any long flag may be supplied as an unambiguous prefix of its full name,
//! e.g. `--s` or `--server` for `--server_url`. This pre-pass rewrites argv
//! before clap sees it: it resolves the command path far enough to know
//! which long flags are in play, expands unambiguous prefixes, and rejects
//! ambiguous ones. Unknown flags pass through untouched for clap to report.

use crate::errors::CliError;

/// Long flags valid for every command
const GLOBAL_FLAGS: &[&str] = &["help", "verbose", "quiet"];

/// Long flags a given command path accepts, beyond the globals
///
/// The path is the first one or two non-flag tokens; deeper levels carry
/// no flags of their own.
fn command_flags(path: &[&str]) -> &'static [&'static str] {
    match path {
        ["login", ..] => &["server_url"],
        ["invite", ..] => &["admin"],
        ["edit", "user", ..] => &["email", "admin"],
        ["download", "feature_tile", ..] => &["dest_folder"],
        ["download", "distribution", ..] => &["format", "version", "dest_folder"],
        ["download", "tile", ..] => &["before", "after", "dest_folder"],
        ["list", "tiles_diff", ..] => &["before", "after"],
        ["search", "tiles", ..] => &["before", "after"],
        _ => &[],
    }
}

/// Rewrites argv with every long-flag prefix expanded to its full name
///
/// # Errors
///
/// Returns `CliError::AmbiguousFlag` when a prefix matches more than one
/// flag valid for the command.
pub fn expand_flag_prefixes(argv: &[String]) -> Result<Vec<String>, CliError> {
    let Some((program, rest)) = argv.split_first() else {
        return Ok(Vec::new());
    };

    let mut path: Vec<&str> = Vec::new();
    for token in rest {
        if token == "--" {
            break;
        }
        if !token.starts_with('-') && path.len() < 2 {
            path.push(token.as_str());
        }
    }

    let mut candidates: Vec<&str> = GLOBAL_FLAGS.to_vec();
    candidates.extend_from_slice(command_flags(&path));

    let mut expanded = Vec::with_capacity(argv.len());
    expanded.push(program.clone());
    let mut literal = false;
    for token in rest {
        if literal || token == "--" || !token.starts_with("--") {
            literal = literal || token == "--";
            expanded.push(token.clone());
            continue;
        }

        let body = &token[2..];
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let full = resolve_prefix(name, &candidates)?;
        expanded.push(match value {
            Some(value) => format!("--{full}={value}"),
            None => format!("--{full}"),
        });
    }

    Ok(expanded)
}

/// Resolves one flag name against the candidate set
///
/// Exact matches always win; otherwise a unique prefix binds its flag and
/// a shared prefix is ambiguous. Names matching nothing are left as-is.
fn resolve_prefix(name: &str, candidates: &[&str]) -> Result<String, CliError> {
    if name.is_empty() || candidates.contains(&name) {
        return Ok(name.to_string());
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|c| c.starts_with(name))
        .copied()
        .collect();

    match matches.as_slice() {
        [] => Ok(name.to_string()),
        [single] => Ok((*single).to_string()),
        many => Err(CliError::AmbiguousFlag {
            prefix: name.to_string(),
            candidates: many.join(", "),
        }),
    }
}
