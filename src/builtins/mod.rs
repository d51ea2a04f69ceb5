mod ls;

use std::env;
use std::io::{self, Write};

use crate::utils::write_line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFlow {
    Continue,
    Exit,
}

pub type BuiltinFn =
    fn(&Builtins, &[String], &mut dyn Write, &mut dyn Write) -> io::Result<BuiltinFlow>;

/// Ordered table of in-process commands. Lookups scan in registration order.
pub struct Builtins {
    registry: Vec<(&'static str, BuiltinFn)>,
}

impl Builtins {
    pub fn new() -> Self {
        Builtins::from_entries(vec![
            ("cd", Builtins::builtin_cd as BuiltinFn),
            ("help", Builtins::builtin_help as BuiltinFn),
            ("exit", Builtins::builtin_exit as BuiltinFn),
            ("ls", ls::builtin_ls as BuiltinFn),
        ])
    }

    pub fn from_entries(registry: Vec<(&'static str, BuiltinFn)>) -> Self {
        Builtins { registry }
    }

    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        self.registry
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, builtin)| *builtin)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registry.iter().map(|(name, _)| *name)
    }

    fn builtin_exit(
        &self,
        _parts: &[String],
        _stdout_writer: &mut dyn Write,
        _stderr_writer: &mut dyn Write,
    ) -> io::Result<BuiltinFlow> {
        Ok(BuiltinFlow::Exit)
    }

    fn builtin_help(
        &self,
        _parts: &[String],
        stdout_writer: &mut dyn Write,
        _stderr_writer: &mut dyn Write,
    ) -> io::Result<BuiltinFlow> {
        write_line(stdout_writer, "meowsh: a tiny command interpreter")?;
        write_line(
            stdout_writer,
            "Type a program name and its arguments, then press enter.",
        )?;
        write_line(stdout_writer, "The following commands are built in:")?;
        for name in self.names() {
            write_line(stdout_writer, &format!("  {name}"))?;
        }
        write_line(stdout_writer, "Use `man` for information on other programs.")?;
        Ok(BuiltinFlow::Continue)
    }

    fn builtin_cd(
        &self,
        parts: &[String],
        _stdout_writer: &mut dyn Write,
        stderr_writer: &mut dyn Write,
    ) -> io::Result<BuiltinFlow> {
        if parts.len() != 2 {
            write_line(stderr_writer, "cd: expected exactly one argument")?;
            return Ok(BuiltinFlow::Continue);
        }

        let mut new_dir = parts[1].clone();
        if parts[1].starts_with('~') {
            if let Ok(home_dir) = env::var("HOME") {
                let remainder = parts[1].trim_start_matches('~');
                if remainder.is_empty() {
                    new_dir = home_dir;
                } else if remainder.starts_with('/') {
                    new_dir = format!("{}/{}", home_dir, remainder.trim_start_matches('/'));
                }
            }
        }

        if let Err(err) = env::set_current_dir(&new_dir) {
            write_line(stderr_writer, &format!("cd: {}: {}", parts[1], err))?;
        } else {
            log::debug!("working directory is now {}", new_dir);
        }

        Ok(BuiltinFlow::Continue)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Builtins::new()
    }
}
