//! Stream handed back by a successful open.
//! I/O is delegated to `tokio::fs::File`; this type only adds the bookkeeping
//! the access mode asks for (delete-on-close for temporary files).

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite, AsyncWriteExt, ReadBuf};
use tracing::{debug, trace};

use crate::collision::AccessMode;
use crate::path::FsPath;

#[derive(Debug)]
pub struct FileStream {
    // None only after `close`/drop has released the handle.
    file: Option<File>,
    path: FsPath,
    mode: AccessMode,
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "stream already closed")
}

impl FileStream {
    pub(crate) fn new(file: std::fs::File, path: FsPath, mode: AccessMode) -> Self {
        Self {
            file: Some(File::from_std(file)),
            path,
            mode,
        }
    }

    /// Where the stream was actually opened. Differs from the requested path
    /// when RenameIfExists picked a suffixed sibling.
    pub fn path(&self) -> &FsPath {
        &self.path
    }

    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_writable(&self) -> bool {
        self.mode.is_writable()
    }

    fn inner(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed)
    }

    pub async fn len(&mut self) -> io::Result<u64> {
        Ok(self.inner()?.metadata().await?.len())
    }

    pub async fn sync_all(&mut self) -> io::Result<()> {
        self.inner()?.sync_all().await
    }

    /// Flush and release the handle. Temporary files are removed here.
    pub async fn close(mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            if self.mode.is_writable() {
                file.flush().await?;
            }
            drop(file);
        }
        self.remove_if_temporary();
        Ok(())
    }

    fn remove_if_temporary(&self) {
        if self.mode != AccessMode::ReadWriteTemporary {
            return;
        }
        match std::fs::remove_file(self.path.as_path()) {
            Ok(()) => trace!(path = %self.path, "temporary file removed on close"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!(path = %self.path, error = %e, "temporary file could not be removed"),
        }
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        // Close the handle first; Windows will not delete an open file.
        if self.file.take().is_some() {
            self.remove_if_temporary();
        }
    }
}

impl AsyncRead for FileStream {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().file.as_mut() {
            Some(f) => Pin::new(f).poll_read(cx, buf),
            None => Poll::Ready(Err(closed())),
        }
    }
}

impl AsyncWrite for FileStream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        match self.get_mut().file.as_mut() {
            Some(f) => Pin::new(f).poll_write(cx, buf),
            None => Poll::Ready(Err(closed())),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().file.as_mut() {
            Some(f) => Pin::new(f).poll_flush(cx),
            None => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().file.as_mut() {
            Some(f) => Pin::new(f).poll_shutdown(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}

impl AsyncSeek for FileStream {
    fn start_seek(self: Pin<&mut Self>, position: io::SeekFrom) -> io::Result<()> {
        match self.get_mut().file.as_mut() {
            Some(f) => Pin::new(f).start_seek(position),
            None => Err(closed()),
        }
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        match self.get_mut().file.as_mut() {
            Some(f) => Pin::new(f).poll_complete(cx),
            None => Poll::Ready(Err(closed())),
        }
    }
}
