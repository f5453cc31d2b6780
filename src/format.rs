use std::fmt::Display;
use std::io::{self, Write};

use inksac::prelude::*;

pub fn prompt(dir: &str, pid: u32) -> String {
    format!("(pid={}){}$ ", pid, dir)
}

const ANNOUNCEMENT_PREFIX: &[u8] = b"Command executed by pid=";

/// Room for the prefix, the widest `u32`, and the newline.
pub const ANNOUNCEMENT_LEN: usize = ANNOUNCEMENT_PREFIX.len() + 10 + 1;

/// Writes `Command executed by pid=N\n` into `buf` without allocating,
/// so it is safe to call in a freshly forked child.
pub fn command_executed(pid: u32, buf: &mut [u8; ANNOUNCEMENT_LEN]) -> &[u8] {
    let mut digits = [0u8; 10];
    let mut n = pid;
    let mut count = 0;
    loop {
        digits[count] = b'0' + (n % 10) as u8;
        count += 1;
        n /= 10;
        if n == 0 {
            break;
        }
    }

    let mut len = ANNOUNCEMENT_PREFIX.len();
    buf[..len].copy_from_slice(ANNOUNCEMENT_PREFIX);
    for &digit in digits[..count].iter().rev() {
        buf[len] = digit;
        len += 1;
    }
    buf[len] = b'\n';
    &buf[..=len]
}

/// Renders everything the interpreter itself says to the user.
pub struct Printer {
    out: Box<dyn Write>,
    color_support: ColorSupport,
}

impl Printer {
    /// Colour is only used when stdout is a terminal that advertises it.
    pub fn stdout(quiet: bool) -> Self {
        // SAFETY: isatty only inspects the descriptor.
        let is_tty = unsafe { libc::isatty(libc::STDOUT_FILENO) } == 1;
        let color_support = if quiet || !is_tty {
            ColorSupport::NoColor
        } else {
            check_color_support().unwrap_or(ColorSupport::NoColor)
        };
        Self {
            out: Box::new(io::stdout()),
            color_support,
        }
    }

    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out,
            color_support: ColorSupport::NoColor,
        }
    }

    pub fn prompt(&mut self, dir: &str, pid: u32) {
        self.emit(&prompt(dir, pid));
        self.flush();
    }

    /// Echoes a line of text, e.g. a script line or a replayed command.
    pub fn line(&mut self, text: &str) {
        self.emit(&format!("{}\n", text));
    }

    pub fn history_entry(&mut self, index: usize, command: &str) {
        self.emit(&format!("{}\t{}\n", index, command));
    }

    pub fn error(&mut self, error: &dyn Display) {
        let message = self.highlight_error(&error.to_string());
        self.emit(&format!("{}\n", message));
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!("failed to flush output: {}", e);
        }
    }

    fn highlight_error(&self, error: &str) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return error.to_string();
        }

        let error_style = Style::builder().foreground(Color::Red).bold().build();
        error.style(error_style).to_string()
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            tracing::warn!("failed to write output: {}", e);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::SharedBuf;
    use super::*;

    #[test]
    fn test_prompt_format() {
        assert_eq!(prompt("/home/me", 42), "(pid=42)/home/me$ ");
    }

    #[test]
    fn test_printer_output() {
        let buf = SharedBuf::default();
        let mut printer = Printer::new(Box::new(buf.clone()));
        printer.prompt("/tmp", 7);
        printer.line("echo hi");
        printer.history_entry(3, "ls -l");
        printer.error(&"Invalid Index");

        assert_eq!(
            buf.contents(),
            "(pid=7)/tmp$ echo hi\n3\tls -l\nInvalid Index\n"
        );
    }

    #[test]
    fn test_command_executed() {
        let mut buf = [0u8; ANNOUNCEMENT_LEN];
        assert_eq!(command_executed(99, &mut buf), b"Command executed by pid=99\n");
        assert_eq!(command_executed(0, &mut buf), b"Command executed by pid=0\n");
        assert_eq!(
            command_executed(u32::MAX, &mut buf),
            b"Command executed by pid=4294967295\n"
        );
    }
}
