//! ANSI terminal color styling for rendered diagnostics.
//!
//! Only the three colors `diagnostics.rs` actually reaches for: red for
//! the underline under the offending span, bold red for the message
//! header, blue for the gutter (line numbers and the `|` rail).

pub struct Style;

impl Style {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const RED: &'static str = "\x1b[31m";
    pub const BLUE: &'static str = "\x1b[34m";

    pub fn red(s: &str) -> String {
        format!("{}{}{}", Self::RED, s, Self::RESET)
    }

    pub fn bold_red(s: &str) -> String {
        format!("{}{}{}{}", Self::BOLD, Self::RED, s, Self::RESET)
    }

    pub fn blue(s: &str) -> String {
        format!("{}{}{}", Self::BLUE, s, Self::RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_wraps_and_resets() {
        let s = Style::red("^");
        assert!(s.starts_with(Style::RED));
        assert!(s.ends_with(Style::RESET));
        assert!(s.contains('^'));
    }

    #[test]
    fn bold_red_combines_both_codes() {
        let s = Style::bold_red("Type mismatch");
        assert!(s.starts_with(Style::BOLD));
        assert!(s.contains(Style::RED));
        assert!(s.contains("Type mismatch"));
    }

    #[test]
    fn blue_wraps_the_gutter() {
        let s = Style::blue("|");
        assert!(s.starts_with(Style::BLUE));
        assert!(s.ends_with(Style::RESET));
    }
}
