use std::env;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// Searches `PATH` for a regular file named `program` with an execute bit set.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    find_in_paths(&path_var, program)
}

pub fn find_in_paths(search_paths: &OsStr, program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    for dir in env::split_paths(search_paths) {
        let file_path = dir.join(program);
        if let Ok(metadata) = file_path.metadata() {
            let is_executable = metadata.permissions().mode() & 0o111 != 0;
            if metadata.is_file() && is_executable {
                return Some(file_path);
            }
        }
    }
    None
}

pub fn write_line(writer: &mut dyn Write, content: &str) -> io::Result<()> {
    writer.write_all(content.as_bytes())?;
    writer.write_all(b"\n")
}

/// Serializes tests that read or change the process working directory.
#[cfg(test)]
pub static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn finds_shell_in_bin() {
        let found = find_in_paths(OsStr::new("/nonexistent:/bin"), "sh").expect("sh in /bin");
        assert_eq!(found, PathBuf::from("/bin/sh"));
    }

    #[test]
    fn skips_files_without_execute_bit() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("plain");
        File::create(&script).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(find_in_paths(dir.path().as_os_str(), "plain").is_none());

        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_in_paths(dir.path().as_os_str(), "plain"), Some(script));
    }

    #[test]
    fn skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(find_in_paths(dir.path().as_os_str(), "sub").is_none());
    }

    #[test]
    fn empty_name_is_never_found() {
        assert!(find_in_paths(OsStr::new("/bin"), "").is_none());
    }

    #[test]
    fn write_line_appends_newline() {
        let mut out = Vec::new();
        write_line(&mut out, "hello").unwrap();
        assert_eq!(b"hello\n".to_vec(), out);
    }
}
