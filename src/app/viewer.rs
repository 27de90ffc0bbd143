//! Viewer process backend.
//!
//! Each opened document is one viewer process started from the configured
//! command with the preview path appended. The viewer leads its own process
//! group and closing the document kills that group, taking down whatever a
//! launcher script forked. The operator closing the window ends the process
//! too, which the liveness check reports as [`AppError::Gone`].

use std::path::{Path, PathBuf};
use std::process::Child;

use super::{AppError, Application, DocumentId};
use crate::debug;
use crate::utils::exec::{Cmd, kill_group};

pub struct ViewerApp {
    command: Vec<String>,
    quiet: bool,
    current: Option<Viewer>,
    next_id: u64,
}

struct Viewer {
    id: DocumentId,
    path: PathBuf,
    child: Child,
}

impl ViewerApp {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            quiet: !crate::logger::is_verbose(),
            current: None,
            next_id: 1,
        }
    }

    fn terminate(viewer: &mut Viewer) -> Result<(), AppError> {
        debug!("preview"; "closing {} ({})", viewer.id, viewer.path.display());
        if let Some(status) = viewer.child.try_wait()? {
            return Err(AppError::Gone(status.to_string()));
        }
        kill_group(&mut viewer.child)?;
        viewer.child.wait()?;
        Ok(())
    }
}

impl Application for ViewerApp {
    type Document = DocumentId;

    fn open(&mut self, path: &Path) -> Result<DocumentId, AppError> {
        if let Some(mut stale) = self.current.take() {
            let _ = Self::terminate(&mut stale);
        }

        let mut cmd = Cmd::from_slice(&self.command)
            .arg(path)
            .quiet(self.quiet)
            .own_group(true);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd = cmd.cwd(dir);
        }
        let child = cmd.spawn().map_err(|e| AppError::Launch(format!("{e:#}")))?;

        let id = DocumentId(self.next_id);
        self.next_id += 1;
        debug!("preview"; "opened {} as {} (pid {})", path.display(), id, child.id());
        self.current = Some(Viewer {
            id,
            path: path.to_path_buf(),
            child,
        });
        Ok(id)
    }

    fn is_open(&mut self, document: &DocumentId) -> bool {
        self.current
            .as_mut()
            .is_some_and(|v| v.id == *document && matches!(v.child.try_wait(), Ok(None)))
    }

    fn close(&mut self, document: DocumentId) -> Result<(), AppError> {
        match self.current.take() {
            Some(mut viewer) if viewer.id == document => Self::terminate(&mut viewer),
            other => {
                self.current = other;
                Err(AppError::NotOpen(document))
            }
        }
    }

    fn quit(&mut self) -> Result<(), AppError> {
        match self.current.take() {
            Some(mut viewer) => Self::terminate(&mut viewer),
            None => Ok(()),
        }
    }

    fn check_alive(&mut self) -> Result<(), AppError> {
        let Some(viewer) = self.current.as_mut() else {
            return Ok(());
        };
        match viewer.child.try_wait()? {
            Some(status) => Err(AppError::Gone(status.to_string())),
            None => Ok(()),
        }
    }
}
