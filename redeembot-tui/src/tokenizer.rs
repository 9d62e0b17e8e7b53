// File: redeembot-tui/src/tokenizer.rs

use chrono::{DateTime, Utc};

use redeembot_common::models::cdk::parse_expiry;
use redeembot_common::Error;

/// Splits a console line on whitespace, keeping `"double quoted"` runs together.
///
/// An unterminated quote runs to the end of the line.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                quoted_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted_token {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted_token = false;
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || quoted_token {
        tokens.push(current);
    }
    tokens
}

/// Splits the trailing arguments of `create` into a command template and an optional expiry.
///
/// The expiry may be given as two bare tokens (`2025-01-01 10:00`) or one quoted token.
/// Trailing tokens shaped like a date that do not parse are rejected rather than
/// folded into the template.
pub fn split_template_and_expiry(args: &[String]) -> Result<(String, Option<DateTime<Utc>>), Error> {
    let n = args.len();
    if n >= 3 && looks_like_date(&args[n - 2]) && looks_like_time(&args[n - 1]) {
        let joined = format!("{} {}", args[n - 2], args[n - 1]);
        let at = parse_checked(&joined)?;
        return Ok((args[..n - 2].join(" "), Some(at)));
    }
    if n >= 2 && looks_like_expiry(&args[n - 1]) {
        let at = parse_checked(&args[n - 1])?;
        return Ok((args[..n - 1].join(" "), Some(at)));
    }
    Ok((args.join(" "), None))
}

fn parse_checked(raw: &str) -> Result<DateTime<Utc>, Error> {
    parse_expiry(raw).map_err(|_| {
        Error::UserInput(format!("'{raw}' is not a valid expiration; expected yyyy-mm-dd HH:MM"))
    })
}

/// Matches `raw` against a shape where `#` stands for one ASCII digit.
fn matches_shape(raw: &str, shape: &str) -> bool {
    raw.len() == shape.len()
        && raw.bytes().zip(shape.bytes()).all(|(c, s)| match s {
            b'#' => c.is_ascii_digit(),
            other => c == other,
        })
}

fn looks_like_date(raw: &str) -> bool {
    matches_shape(raw, "####-##-##")
}

fn looks_like_time(raw: &str) -> bool {
    matches_shape(raw, "##:##")
}

/// A single token holding a date, optionally followed by a time.
fn looks_like_expiry(raw: &str) -> bool {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((date, time)) => looks_like_date(date) && looks_like_time(time.trim()),
        None => looks_like_date(raw),
    }
}
