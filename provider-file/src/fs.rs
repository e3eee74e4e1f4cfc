//! Default `FileSystem` implementation over `std::fs`.

use source_traits::fs::{FileHandle, FileSystem};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Opens local files through the standard library.
#[derive(Debug, Clone, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn open_for_reading(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        // File::open succeeds on directories on some platforms; reject them
        // here so the failure surfaces at open rather than first read.
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }
        Ok(Box::new(StdFileHandle {
            file,
            length: metadata.len(),
        }))
    }
}

struct StdFileHandle {
    file: File,
    length: u64,
}

impl FileHandle for StdFileHandle {
    fn len(&self) -> u64 {
        self.length
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
