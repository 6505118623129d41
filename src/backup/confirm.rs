use std::io::{self, BufRead, Write};

/// Asks the operator a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

/// Always answers yes, for `--yes`.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _message: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Prompts on a terminal (or anything readable/writable). The default
/// answer is no, and so is closing the input.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        loop {
            write!(self.output, "{message} [y/N]: ")?;
            self.output.flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                writeln!(self.output)?;
                return Ok(false);
            }

            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Error: invalid input")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(input: &str) -> (bool, String) {
        let mut output = Vec::new();
        let answer = Prompt::new(input.as_bytes(), &mut output)
            .confirm("are you sure?")
            .unwrap();
        (answer, String::from_utf8(output).unwrap())
    }

    #[test]
    fn accepts_yes() {
        assert_eq!(ask("y\n"), (true, "are you sure? [y/N]: ".to_string()));
        assert!(ask("YES\n").0);
    }

    #[test]
    fn defaults_to_no() {
        assert!(!ask("\n").0);
        assert!(!ask("n\n").0);
        assert!(!ask("").0);
    }

    #[test]
    fn asks_again_on_garbage() {
        let (answer, output) = ask("maybe\nyes\n");

        assert!(answer);
        assert_eq!(
            output,
            "are you sure? [y/N]: Error: invalid input\nare you sure? [y/N]: "
        );
    }
}
