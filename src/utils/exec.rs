//! External process utilities.
//!
//! Builder API for launching long-running programs such as the preview
//! viewer.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let child = Cmd::from_slice(&["libreoffice", "--view"])
//!     .arg(&preview_path)
//!     .quiet(true)
//!     .spawn()?;
//! ```

use anyhow::{Context, Result};
use std::{
    ffi::{OsStr, OsString},
    io,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    quiet: bool,
    group: bool,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["soffice"]` or `["libreoffice", "--view"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let Some(program) = iter.next() else {
            return Self::default();
        };
        let mut this = Self::new(program);
        this.args = iter.map(|s| s.as_ref().to_owned()).collect();
        this
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Discard the child's stdout/stderr so it does not scribble over the prompt.
    pub fn quiet(mut self, enable: bool) -> Self {
        self.quiet = enable;
        self
    }

    /// Start the process as leader of a new process group (unix only), so
    /// [`kill_group`] also reaches whatever it forks.
    pub fn own_group(mut self, enable: bool) -> Self {
        self.group = enable;
        self
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Start the process without waiting for it.
    pub fn spawn(self) -> Result<Child> {
        let name = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());

        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        if self.group {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd.spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))
    }
}

/// Kill `child` and every process in its group.
///
/// Launchers such as `libreoffice` fork the real application; killing only
/// the direct child would leave that window open. Requires the child to have
/// been started with [`Cmd::own_group`].
#[cfg(unix)]
pub fn kill_group(child: &mut Child) -> io::Result<()> {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return child.kill();
    };
    // SAFETY: plain syscall on a process group id we created
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        child.kill()
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
pub fn kill_group(child: &mut Child) -> io::Result<()> {
    child.kill()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let cmd = Cmd::from_slice(&["libreoffice", "--norestore", "--view"]);
        assert_eq!(cmd.program_name(), "libreoffice");
        assert_eq!(cmd.args, vec![OsString::from("--norestore"), OsString::from("--view")]);
    }

    #[test]
    fn test_empty_args_skipped() {
        let cmd = Cmd::new("viewer").arg("").arg("doc.docx");
        assert_eq!(cmd.args, vec![OsString::from("doc.docx")]);
    }

    #[test]
    fn test_spawn_missing_program() {
        let err = Cmd::new("definitely-not-a-viewer-4b1d").spawn().unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-viewer-4b1d"));
    }

    #[cfg(target_os = "linux")]
    fn is_running(pid: u32) -> bool {
        // Zombies count as gone
        std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .is_ok_and(|stat| !stat.rsplit(')').next().unwrap_or("").trim_start().starts_with('Z'))
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_kill_group_reaches_forked_processes() {
        use std::time::{Duration, Instant};

        let dir = tempfile::TempDir::new().unwrap();
        let pid_file = dir.path().join("grandchild.pid");
        let mut child = Cmd::from_slice(&["sh", "-c", "sleep 30 & echo $! > \"$1\"; wait", "viewer"])
            .arg(&pid_file)
            .own_group(true)
            .spawn()
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let grandchild = loop {
            if let Some(pid) = std::fs::read_to_string(&pid_file)
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok())
            {
                break pid;
            }
            assert!(Instant::now() < deadline, "grandchild never started");
            std::thread::sleep(Duration::from_millis(10));
        };
        assert!(is_running(grandchild));

        kill_group(&mut child).unwrap();
        child.wait().unwrap();

        while is_running(grandchild) {
            assert!(Instant::now() < deadline, "grandchild survived");
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}
