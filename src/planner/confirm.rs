//! Interactive confirmation before mutating the remote store.

use std::io::{BufRead, Write};

use crate::error::{Result, SyncError};

/// Asks a yes/no question and reads one line of input.
///
/// `y` or `yes` (any case) confirms; any other answer declines.
///
/// # Errors
///
/// Returns [`SyncError::Input`] if the input ends before an answer is read or
/// cannot be read at all.
pub fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{question} (y/N): ")?;
    out.flush()?;

    let mut answer = String::new();
    let read = input
        .read_line(&mut answer)
        .map_err(|e| SyncError::input(e.to_string()))?;
    if read == 0 {
        return Err(SyncError::input("unexpected end of input").into());
    }

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfcvarsError;

    fn ask(input: &str) -> Result<bool> {
        let mut out = Vec::new();
        confirm("Apply?", &mut input.as_bytes(), &mut out)
    }

    #[test]
    fn test_accepts_yes() {
        assert!(ask("y\n").expect("answer read"));
        assert!(ask("YES\n").expect("answer read"));
        assert!(ask("  Yes  \n").expect("answer read"));
        assert!(ask("y").expect("answer read"));
    }

    #[test]
    fn test_declines_everything_else() {
        assert!(!ask("\n").expect("answer read"));
        assert!(!ask("n\n").expect("answer read"));
        assert!(!ask("yep\n").expect("answer read"));
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        assert!(matches!(
            ask(""),
            Err(TfcvarsError::Sync(SyncError::Input { .. }))
        ));
    }

    #[test]
    fn test_prompt_written() {
        let mut out = Vec::new();
        confirm("Apply?", &mut "n\n".as_bytes(), &mut out).expect("answer read");
        assert_eq!(String::from_utf8(out).expect("utf8"), "Apply? (y/N): ");
    }
}
