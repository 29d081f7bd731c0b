//! Reading and writing nameserver lists in public-dns.info's CSV format.
//!
//! `ip,name,country_id,city,reliability[,checked_at,created_at]`

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::pin::Pin;

use futures::stream::{self, Stream};
use futures::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio::task;
use tracing::{debug, trace};

use crate::error::Error;
use crate::nameserver::NameServer;
use crate::Result;

pub static HEADER: &[&str] = &[
    "ip",
    "name",
    "country_id",
    "city",
    "reliability",
    "checked_at",
    "created_at",
];

static REQUIRED_COLUMNS: &[&str] = &["ip", "name", "country_id", "city", "reliability"];

/// Lazy, one pass sequence of nameserver records.
///
/// Records are decoded on a blocking thread and handed over through a bounded channel, so at most
/// `capacity` records are held in memory. The first record that fails to decode is yielded as `Err` and
/// terminates the stream. Dropping the stream stops the decoding thread.
#[derive(Debug)]
pub struct NameServerStream {
    receiver: mpsc::Receiver<Result<NameServer>>,
}

impl NameServerStream {
    /// Opens a nameserver list.
    ///
    /// Fails if the file cannot be opened or its header lacks one of the required columns; in both cases
    /// no record has been decoded yet.
    pub async fn from_path<P: AsRef<Path>>(path: P, capacity: usize) -> Result<NameServerStream> {
        let path = path.as_ref().to_path_buf();
        let display_path = path.display().to_string();
        let file = task::spawn_blocking(move || File::open(path))
            .await?
            .map_err(|e| Error::LoadError {
                why: format!("cannot open '{}': {}", display_path, e),
            })?;
        debug!("Opened nameserver list '{}'.", display_path);

        NameServerStream::from_reader(file, capacity).await
    }

    pub async fn from_reader<R: Read + Send + 'static>(reader: R, capacity: usize) -> Result<NameServerStream> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (ready_sender, ready_receiver) = oneshot::channel();

        task::spawn_blocking(move || {
            let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
            let header = check_header(&mut reader);
            let header_ok = header.is_ok();
            if ready_sender.send(header).is_err() || !header_ok {
                return;
            }

            for (index, record) in reader.deserialize::<NameServer>().enumerate() {
                // Record numbers count data rows starting at 1; the header is not counted.
                let record = record.map_err(|e| Error::decode(index as u64 + 1, e));
                let failed = record.is_err();
                if let Ok(ref ns) = record {
                    trace!("Decoded nameserver {}.", ns);
                }
                if sender.blocking_send(record).is_err() {
                    debug!("Nameserver stream has been dropped; stop decoding.");
                    return;
                }
                if failed {
                    return;
                }
            }
            debug!("Finished decoding nameserver list.");
        });

        ready_receiver.await.map_err(|_| Error::InternalError {
            msg: "nameserver decoder terminated unexpectedly",
        })??;

        Ok(NameServerStream { receiver })
    }
}

impl Stream for NameServerStream {
    type Item = Result<NameServer>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

fn check_header<R: Read>(reader: &mut csv::Reader<R>) -> Result<()> {
    let header = reader.headers().map_err(|e| Error::LoadError {
        why: format!("cannot read header: {}", e),
    })?;
    let missing: Vec<_> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !header.iter().any(|x| x == **column))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::LoadError {
            why: format!("header lacks required columns: {}", missing.join(", ")),
        })
    }
}

/// A nameserver list loaded into memory at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameServerList {
    servers: Vec<NameServer>,
}

impl NameServerList {
    pub fn new(servers: Vec<NameServer>) -> NameServerList {
        NameServerList { servers }
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<NameServerList> {
        use futures::TryStreamExt;

        let servers = NameServerStream::from_path(path, 1024).await?.try_collect().await?;
        Ok(NameServerList { servers })
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<NameServer> {
        self.servers.iter()
    }

    /// Turns this list into a stream of the same shape as `NameServerStream`.
    pub fn into_stream(self) -> impl Stream<Item = Result<NameServer>> + Send + Unpin + 'static {
        stream::iter(self.servers.into_iter().map(Ok))
    }
}

impl IntoIterator for NameServerList {
    type Item = NameServer;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.servers.into_iter()
    }
}

impl From<Vec<NameServer>> for NameServerList {
    fn from(servers: Vec<NameServer>) -> Self {
        NameServerList::new(servers)
    }
}

/// Writes nameserver records one by one; the header is written on creation.
pub struct NameServerWriter<W: Write> {
    inner: csv::Writer<W>,
    written: usize,
}

impl NameServerWriter<File> {
    /// Creates the output file; fails with `Error::OutputExists` if there already is one.
    pub fn create_new<P: AsRef<Path>>(path: P) -> Result<NameServerWriter<File>> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => Error::OutputExists {
                    path: path.display().to_string(),
                },
                _ => Error::from(e),
            })?;

        NameServerWriter::new(file)
    }
}

impl<W: Write> NameServerWriter<W> {
    pub fn new(writer: W) -> Result<NameServerWriter<W>> {
        let mut inner = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        inner.write_record(HEADER)?;

        Ok(NameServerWriter { inner, written: 0 })
    }

    pub fn write(&mut self, server: &NameServer) -> Result<()> {
        self.inner.serialize(server)?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes all buffered records and returns the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.inner.into_inner().map_err(|e| Error::from(e.into_error()))
    }
}
