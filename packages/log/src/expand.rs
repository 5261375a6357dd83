//! Shell-style expansion of user-supplied log paths.
//!
//! Supported forms:
//! - a leading `~` or `~/` expands to the home directory
//! - `$NAME` and `${NAME}` expand to environment variables
//!
//! An undefined variable is an error rather than an empty string, so a typo
//! in a path fails loudly instead of opening the wrong file.

use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Chars;

use crate::LogError;

/// Expand `input` against the current home directory and environment.
pub fn expand_path(input: &str) -> Result<PathBuf, LogError> {
    expand_with(input, dirs::home_dir(), |name| std::env::var(name).ok())
}

/// Expand `input` with an explicit home directory and variable lookup.
pub fn expand_with<F>(input: &str, home: Option<PathBuf>, var: F) -> Result<PathBuf, LogError>
where
    F: Fn(&str) -> Option<String>,
{
    let invalid = |message: String| LogError::InvalidPath {
        path: input.to_string(),
        message,
    };

    let (in_home, body) = if input == "~" {
        (true, "")
    } else if let Some(rest) = input.strip_prefix("~/") {
        (true, rest)
    } else {
        (false, input)
    };

    let body = expand_vars(body, &var).map_err(invalid)?;
    if !in_home {
        return Ok(PathBuf::from(body));
    }

    let home = home.ok_or_else(|| invalid("no home directory to expand '~'".to_string()))?;
    if body.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(body))
    }
}

fn expand_vars<F>(body: &str, var: &F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| var(name).ok_or_else(|| format!("undefined variable '{}'", name));

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some('{') => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(format!("unterminated '${{{}'", name)),
                    }
                }
                out.push_str(&lookup(&name)?);
            }
            Some(&ch) if ch == '_' || ch.is_ascii_alphabetic() => {
                let name = take_name(&mut chars);
                out.push_str(&lookup(&name)?);
            }
            _ => out.push('$'),
        }
    }
    Ok(out)
}

fn take_name(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&ch) = chars.peek() {
        if ch == '_' || ch.is_ascii_alphanumeric() {
            name.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> Option<String> {
        match name {
            "DATA" => Some("/srv/data".to_string()),
            "RUN" => Some("run_7".to_string()),
            _ => None,
        }
    }

    fn expand(input: &str) -> Result<PathBuf, LogError> {
        expand_with(input, Some(PathBuf::from("/home/ada")), env)
    }

    #[test]
    fn plain_path_unchanged() {
        assert_eq!(expand("/tmp/a.log").unwrap(), PathBuf::from("/tmp/a.log"));
        assert_eq!(expand("rel/a.log").unwrap(), PathBuf::from("rel/a.log"));
    }

    #[test]
    fn tilde() {
        assert_eq!(expand("~").unwrap(), PathBuf::from("/home/ada"));
        assert_eq!(
            expand("~/logs/a.log").unwrap(),
            PathBuf::from("/home/ada/logs/a.log")
        );
        // Only a leading tilde is special.
        assert_eq!(expand("a/~/b").unwrap(), PathBuf::from("a/~/b"));
    }

    #[test]
    fn variables() {
        assert_eq!(
            expand("$DATA/${RUN}.log").unwrap(),
            PathBuf::from("/srv/data/run_7.log")
        );
        assert_eq!(
            expand("~/$RUN/x").unwrap(),
            PathBuf::from("/home/ada/run_7/x")
        );
        assert_eq!(expand("cost$5").unwrap(), PathBuf::from("cost$5"));
        assert_eq!(expand("end$").unwrap(), PathBuf::from("end$"));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let err = expand("$NOPE/a.log").unwrap_err();
        assert!(
            matches!(err, LogError::InvalidPath { ref path, ref message }
                if path == "$NOPE/a.log" && message.contains("NOPE"))
        );
    }

    #[test]
    fn unterminated_brace() {
        assert!(matches!(
            expand("${DATA"),
            Err(LogError::InvalidPath { .. })
        ));
    }

    #[test]
    fn missing_home() {
        let err = expand_with("~/a", None, env).unwrap_err();
        assert!(err.to_string().contains("home"));
    }
}
