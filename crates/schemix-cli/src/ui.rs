use colored::Colorize;

/// Status line helpers shared by every subcommand.
pub trait StyledText {
    fn success(self) -> String;
    fn error(self) -> String;
    fn warning(self) -> String;
}

impl<T: AsRef<str>> StyledText for T {
    fn success(self) -> String {
        format!("{} {}", "✓".green(), self.as_ref())
    }

    fn error(self) -> String {
        format!("{} {}", "✗".red(), self.as_ref().red())
    }

    fn warning(self) -> String {
        format!("{} {}", "!".yellow(), self.as_ref().yellow())
    }
}
