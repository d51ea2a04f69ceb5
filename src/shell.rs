use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::os::fd::AsFd;

use crate::builtins::{BuiltinFlow, Builtins};
use crate::error::ShellError;
use crate::launcher::launch;
use crate::parser::tokenize;
use crate::utils::write_line;

const PROMPT: &str = "$ ";

pub struct Shell {
    builtins: Builtins,
}

impl Shell {
    pub fn new() -> Self {
        Shell::with_builtins(Builtins::new())
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Shell { builtins }
    }

    /// Runs the loop on the process's standard streams.
    ///
    /// Input is read straight from descriptor 0, bypassing the buffer behind
    /// `io::stdin()`, so a launched program sees every byte after the line
    /// that started it.
    pub fn run(&self) -> Result<(), ShellError> {
        let stdin = io::stdin()
            .as_fd()
            .try_clone_to_owned()
            .map_err(ShellError::Read)?;
        let mut input = unbuffered_input(File::from(stdin));
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run_with(&mut input, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Prompts, reads and executes lines until `exit` or end of input.
    pub fn run_with(
        &self,
        input: &mut dyn BufRead,
        stdout_writer: &mut dyn Write,
        stderr_writer: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let mut line = Vec::new();
        loop {
            stdout_writer.write_all(PROMPT.as_bytes())?;
            stdout_writer.flush()?;

            line.clear();
            if input.read_until(b'\n', &mut line).map_err(ShellError::Read)? == 0 {
                log::debug!("end of input");
                return Ok(());
            }

            let parts = tokenize(&String::from_utf8_lossy(&line));
            log::trace!("tokens: {:?}", parts);

            if self.execute(&parts, stdout_writer, stderr_writer)? == BuiltinFlow::Exit {
                return Ok(());
            }
        }
    }

    /// Runs one argument vector: a builtin if the name is registered,
    /// otherwise an external program. Only `exit` stops the loop.
    pub fn execute(
        &self,
        parts: &[String],
        stdout_writer: &mut dyn Write,
        stderr_writer: &mut dyn Write,
    ) -> io::Result<BuiltinFlow> {
        let Some(command_name) = parts.first() else {
            return Ok(BuiltinFlow::Continue);
        };

        if let Some(builtin) = self.builtins.get(command_name) {
            log::debug!("builtin: {}", command_name);
            return builtin(&self.builtins, parts, stdout_writer, stderr_writer);
        }

        // the child writes straight to the inherited descriptors
        stdout_writer.flush()?;
        match launch(parts) {
            Ok(status) if !status.success() => {
                log::debug!("{} did not succeed: {:?}", command_name, status)
            }
            Ok(_) => {}
            Err(err) => write_line(stderr_writer, &err.to_string())?,
        }
        Ok(BuiltinFlow::Continue)
    }
}

/// Never pulls more than one byte from `source` ahead of the reader.
fn unbuffered_input<R: Read>(source: R) -> io::BufReader<R> {
    io::BufReader::with_capacity(1, source)
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new()
    }
}
