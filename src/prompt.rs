use std::io::{self, BufRead, Write};

pub struct ShellPrompt {
    text: String,
}

impl ShellPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        ShellPrompt { text: text.into() }
    }

    pub fn show_prompt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.text)?;
        out.flush()
    }

    /// `Ok(None)` on end of input. Bytes that are not UTF-8 become U+FFFD,
    /// which the lexer reports as an unclassified token.
    pub fn read_line<R: BufRead>(&self, input: &mut R) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let bytes_read = input.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}
