//! Normalization of raw engine output before any rule sees it.

/// Clean one OCR line: strip control characters, collapse runs of
/// whitespace, and repair the pipe-for-I confusion the engine produces on
/// form text. Kept deliberately conservative: rules must tolerate noise,
/// not depend on cleanup hiding it.
pub fn clean_line(line: &str) -> String {
    let repaired: String = line
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '|' { 'I' } else { c })
        .collect();
    repaired.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(clean_line("  Business   Name:   Plena  "), "Business Name: Plena");
    }

    #[test]
    fn repairs_pipe_confusion() {
        assert_eq!(clean_line("C|ient Name: Ana"), "CIient Name: Ana");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(clean_line("City:\u{0007} Chicago"), "City: Chicago");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = clean_line("  a\t b  c ");
        assert_eq!(clean_line(&once), once);
    }
}
