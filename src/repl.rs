use std::io::{self, BufRead, Write};
use tracing::debug;
use crate::config::Config;
use crate::prompt::ShellPrompt;
use crate::shell::Shell;

pub struct Repl {
    shell: Shell,
    prompt: ShellPrompt,
}

impl Repl {
    pub fn new(config: Config) -> Self {
        let prompt = ShellPrompt::new(config.prompt.clone());
        Repl {
            shell: Shell::new(config),
            prompt,
        }
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Read and run lines until end of input or a read error.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<()> {
        loop {
            // report background jobs that finished while we were busy
            self.shell.jobs().collect();

            self.prompt.show_prompt(out)?;
            let line = match self.prompt.read_line(input) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    writeln!(out)?;
                    debug!("end of input");
                    return Ok(());
                }
                Err(e) => {
                    eprintln!("minish: error reading input: {}", e);
                    return Err(e);
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            if let Err(e) = self.shell.run_line(&line) {
                eprintln!("minish: {}", e);
            }
        }
    }
}

pub fn start() -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    Repl::new(Config::default()).run(&mut input, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_terminates_on_end_of_input() {
        let mut repl = Repl::new(Config::default().with_prompt("% "));
        let mut input = Cursor::new("\n   \n");
        let mut out = Vec::new();
        repl.run(&mut input, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "% % % \n");
    }

    #[test]
    fn test_parse_errors_do_not_stop_the_loop() {
        let mut repl = Repl::new(Config::default().with_prompt("% "));
        let mut input = Cursor::new("cat >\ncat <\n");
        let mut out = Vec::new();
        repl.run(&mut input, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "% % % \n");
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_the_loop() {
        let dir = std::env::temp_dir().join(format!("minish-repl-{}-utf8", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let after = dir.join("after");

        let mut script = b"echo caf\xe9\n".to_vec();
        script.extend_from_slice(format!("echo second > {}\n", after.display()).as_bytes());

        let mut repl = Repl::new(Config::default().with_prompt("% "));
        let mut out = Vec::new();
        repl.run(&mut Cursor::new(script), &mut out).unwrap();

        assert_eq!(std::fs::read_to_string(&after).unwrap(), "second\n");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
