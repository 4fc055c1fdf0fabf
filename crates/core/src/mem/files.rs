//! Open-file table.
//!
//! Maps the small integer descriptors used by file syscalls to host file
//! handles. Descriptors 0, 1, and 2 are reserved for the standard streams and
//! can be neither reopened nor closed.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};

use crate::common::error::SimError;

/// Lowest descriptor handed out for program-opened files.
const FIRST_FREE_FD: u32 = 3;

/// One entry in the open-file table.
#[derive(Debug)]
pub enum FileHandle {
    /// Standard input (descriptor 0).
    Stdin,
    /// Standard output (descriptor 1).
    Stdout,
    /// Standard error (descriptor 2).
    Stderr,
    /// A host file opened by the program.
    File(File),
}

/// Access mode requested by an `open` syscall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    /// Open an existing file for reading.
    Read,
    /// Create or truncate a file for writing.
    Write,
    /// Create or append to a file.
    Append,
}

impl FileMode {
    /// Decodes the conventional open-flag word (0 read, 1 write, 9 append).
    pub fn from_flags(flags: u32) -> Option<Self> {
        match flags {
            0 => Some(Self::Read),
            1 => Some(Self::Write),
            9 => Some(Self::Append),
            _ => None,
        }
    }
}

/// The descriptor table consumed by the syscall collaborator.
#[derive(Debug)]
pub struct FileTable {
    handles: HashMap<u32, FileHandle>,
    next_fd: u32,
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTable {
    /// Creates a table with the three standard streams pre-bound.
    pub fn new() -> Self {
        let mut handles = HashMap::new();
        let _ = handles.insert(0, FileHandle::Stdin);
        let _ = handles.insert(1, FileHandle::Stdout);
        let _ = handles.insert(2, FileHandle::Stderr);
        Self {
            handles,
            next_fd: FIRST_FREE_FD,
        }
    }

    /// Opens a host file and returns its new descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the host rejects the open.
    pub fn open(&mut self, path: &str, mode: FileMode) -> Result<u32, SimError> {
        let file = match mode {
            FileMode::Read => OpenOptions::new().read(true).open(path),
            FileMode::Write => OpenOptions::new().write(true).create(true).truncate(true).open(path),
            FileMode::Append => OpenOptions::new().append(true).create(true).open(path),
        }
        .map_err(|e| SimError::Io(format!("open {path}: {e}")))?;

        let fd = self.next_fd;
        self.next_fd += 1;
        let _ = self.handles.insert(fd, FileHandle::File(file));
        Ok(fd)
    }

    /// Looks up the handle behind a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::BadDescriptor`] if the descriptor is not open.
    pub fn handle(&mut self, fd: u32) -> Result<&mut FileHandle, SimError> {
        self.handles.get_mut(&fd).ok_or(SimError::BadDescriptor(fd))
    }

    /// Closes a program-opened descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::BadDescriptor`] for the reserved standard streams
    /// and for descriptors that are not open.
    pub fn close(&mut self, fd: u32) -> Result<(), SimError> {
        if fd < FIRST_FREE_FD {
            return Err(SimError::BadDescriptor(fd));
        }
        match self.handles.remove(&fd) {
            Some(_) => Ok(()),
            None => Err(SimError::BadDescriptor(fd)),
        }
    }

    /// Returns true if the descriptor is currently open.
    pub fn is_open(&self, fd: u32) -> bool {
        self.handles.contains_key(&fd)
    }
}
