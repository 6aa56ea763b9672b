//! The external-process laz back-end.
//!
//! An uncompressed las stream is piped into a `laszip`-compatible
//! executable's stdin; the laz file it writes on stdout is relayed into the
//! destination by a dedicated thread that owns the destination until
//! `done`. After the child exits, the chunk table offset it left at the
//! tail of the stream is spliced back into its slot at
//! `offset_to_point_data` and the eight tail bytes are truncated, matching
//! the laz layout bit for bit.

use crate::feature::LargeFiles;
use crate::header::legacy_point_counts;
use crate::writer::{write_header_and_vlrs_to, PointWriter};
use crate::{raw, Error, Header, Result, Truncate, VlrList};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::env;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

/// Searches PATH for a laszip executable.
pub(crate) fn find_laszip_executable() -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path).find_map(|dir| {
        ["laszip", "laszip64", "laszip.exe"]
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

fn spawn(args: &[&str]) -> Result<Child> {
    let binary = find_laszip_executable()
        .ok_or_else(|| Error::Laz("no laszip executable found on PATH".to_string()))?;
    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    Ok(child)
}

pub(crate) fn spawn_compressor() -> Result<Child> {
    spawn(&["-stdin", "-olaz", "-stdout"])
}

fn stderr_output(child: &mut Child) -> String {
    child
        .stderr
        .take()
        .map(|mut stderr| {
            let mut output = String::new();
            let _ = stderr.read_to_string(&mut output);
            output
        })
        .unwrap_or_default()
}

fn check_exit(child: &mut Child, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(Error::Laz(format!(
            "laszip exited with {}: {}",
            status,
            stderr_output(child).trim()
        )))
    }
}

/// Decompresses a whole laz stream by piping it through `laszip -stdin
/// -olas -stdout` and slicing the point data out of the las stream the
/// child produces.
pub(crate) fn decompress<R: Read + Seek>(
    source: &mut R,
    count: u64,
    point_size: u16,
) -> Result<Vec<u8>> {
    let mut child = spawn(&["-stdin", "-olas", "-stdout"])?;
    let mut stdin = child.stdin.take().expect("stdin was piped");
    let mut stdout = child.stdout.take().expect("stdout was piped");
    let _ = source.seek(SeekFrom::Start(0))?;
    let output = std::thread::scope(|scope| -> Result<Vec<u8>> {
        let collector = scope.spawn(move || -> io::Result<Vec<u8>> {
            let mut output = Vec::new();
            stdout.read_to_end(&mut output)?;
            Ok(output)
        });
        // A failing child closes the pipe early; its exit status is
        // checked below, where stderr is available.
        let _ = io::copy(source, &mut stdin);
        drop(stdin);
        let output = collector
            .join()
            .map_err(|_| Error::Laz("the output relay thread panicked".to_string()))??;
        Ok(output)
    })?;
    let status = child.wait()?;
    check_exit(&mut child, status)?;

    let header = raw::Header::read_from(io::Cursor::new(&output))?;
    let start = header.offset_to_point_data as usize;
    let expected = count * u64::from(point_size);
    let got = output.len().saturating_sub(start) as u64;
    if got < expected {
        return Err(Error::TruncatedPointData { expected, got });
    }
    Ok(output[start..start + expected as usize].to_vec())
}

/// A point writer that pipes uncompressed points through a laszip child
/// process.
pub(crate) struct LaszipProcessPointWriter<W> {
    child: Child,
    stdin: Option<ChildStdin>,
    relay: Option<JoinHandle<(W, io::Result<u64>)>>,
    dest: Option<W>,
}

impl<W: 'static + Read + Write + Seek + Send + Truncate> LaszipProcessPointWriter<W> {
    pub(crate) fn new(dest: W, mut child: Child) -> LaszipProcessPointWriter<W> {
        let stdin = child.stdin.take();
        let mut stdout = child.stdout.take().expect("stdout was piped");
        let relay = std::thread::spawn(move || {
            let mut dest = dest;
            let result = io::copy(&mut stdout, &mut dest);
            (dest, result)
        });
        LaszipProcessPointWriter {
            child,
            stdin,
            relay: Some(relay),
            dest: None,
        }
    }
}

impl<W: 'static + Read + Write + Seek + Send + Truncate> PointWriter<W>
    for LaszipProcessPointWriter<W>
{
    fn write_initial_header_and_vlrs(
        &mut self,
        header: &mut Header,
        vlrs: &mut VlrList,
    ) -> Result<()> {
        // The child consumes an uncompressed las stream and writes the laz
        // file, laszip vlr and all, itself. The placeholder point count is
        // maxed so the child keeps reading points until the pipe closes.
        let mut placeholder = header.clone();
        placeholder.set_compressed(false);
        placeholder.point_count = if placeholder.version.supports::<LargeFiles>() {
            u64::MAX
        } else {
            u64::from(u32::MAX)
        };
        let stdin = self
            .stdin
            .as_mut()
            .expect("the initial header is written before done");
        write_header_and_vlrs_to(stdin, &mut placeholder, vlrs)?;
        header.number_of_vlrs = placeholder.number_of_vlrs;
        header.offset_to_point_data = placeholder.offset_to_point_data;
        Ok(())
    }

    fn write_points(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(status) = self.child.try_wait()? {
            return Err(Error::Laz(format!(
                "laszip exited early with {}: {}",
                status,
                stderr_output(&mut self.child).trim()
            )));
        }
        let stdin = self.stdin.as_mut().expect("write_points after done");
        if let Err(error) = stdin.write_all(bytes) {
            if error.kind() == io::ErrorKind::BrokenPipe {
                let status = self.child.wait()?;
                return Err(Error::Laz(format!(
                    "laszip failed with {}: {}",
                    status,
                    stderr_output(&mut self.child).trim()
                )));
            }
            return Err(error.into());
        }
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let status = self.child.wait()?;
        let (dest, copy_result) = self
            .relay
            .take()
            .expect("done runs once")
            .join()
            .map_err(|_| Error::Laz("the output relay thread panicked".to_string()))?;
        // Reclaim the destination before the error checks so into_inner
        // still works after a failure.
        self.dest = Some(dest);
        check_exit(&mut self.child, status)?;
        let _ = copy_result?;
        let dest = self.dest.as_mut().expect("reclaimed above");
        splice_chunk_table_offset(dest)?;
        // Evlrs, if any, go after the laz stream.
        let _ = dest.seek(SeekFrom::End(0))?;
        Ok(())
    }

    fn write_updated_header(&mut self, header: &Header) -> Result<()> {
        let dest = self.dest.as_mut().expect("the header rewrite follows done");
        // Patch the header the child wrote rather than replacing it: the
        // child owns the vlr layout (and so the offsets) of its output.
        let _ = dest.seek(SeekFrom::Start(0))?;
        let mut written = raw::Header::read_from(&mut *dest)?;
        let stats = header.into_raw()?;
        let (count, by_return) = legacy_point_counts(
            header.version,
            header.point_format_id,
            header.point_count,
            &header.number_of_points_by_return,
        );
        written.number_of_point_records = count;
        written.number_of_points_by_return = by_return;
        written.max_x = stats.max_x;
        written.min_x = stats.min_x;
        written.max_y = stats.max_y;
        written.min_y = stats.min_y;
        written.max_z = stats.max_z;
        written.min_z = stats.min_z;
        if written.large_file.is_some() {
            written.large_file = stats.large_file;
        }
        if written.evlr.is_some() {
            written.evlr = stats.evlr;
        }
        let _ = dest.seek(SeekFrom::Start(0))?;
        written.write_to(&mut *dest)
    }

    fn get_mut(&mut self) -> &mut W {
        self.dest
            .as_mut()
            .expect("the relay thread holds the destination until done")
    }

    fn into_inner(self: Box<Self>) -> W {
        self.dest
            .expect("the relay thread holds the destination until done")
    }
}

/// Replaces the `-1` chunk table offset sentinel with the real offset the
/// child appended at the tail, then drops the eight tail bytes.
fn splice_chunk_table_offset<W: Read + Write + Seek + Truncate>(dest: &mut W) -> Result<()> {
    let end = dest.seek(SeekFrom::End(0))?;
    let _ = dest.seek(SeekFrom::Start(0))?;
    let header = raw::Header::read_from(&mut *dest)?;
    let slot = u64::from(header.offset_to_point_data);
    if end < slot + 8 {
        return Err(Error::Laz("laszip produced a truncated stream".to_string()));
    }
    let _ = dest.seek(SeekFrom::Start(slot))?;
    let offset = dest.read_i64::<LittleEndian>()?;
    if offset == -1 {
        let _ = dest.seek(SeekFrom::Start(end - 8))?;
        let actual = dest.read_i64::<LittleEndian>()?;
        let _ = dest.seek(SeekFrom::Start(slot))?;
        dest.write_i64::<LittleEndian>(actual)?;
        dest.truncate(end - 8)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;

    #[test]
    fn splice() {
        // A minimal las 1.2 header followed by a sentinel chunk table
        // offset, some "compressed" bytes, and the real offset at the tail.
        let header = raw::Header::default();
        let mut cursor = io::Cursor::new(Vec::new());
        header.write_to(&mut cursor).unwrap();
        cursor.write_i64::<LittleEndian>(-1).unwrap();
        cursor.write_all(&[0xab; 16]).unwrap();
        let chunk_table_offset = i64::from(header.offset_to_point_data) + 8 + 16;
        cursor.write_i64::<LittleEndian>(chunk_table_offset).unwrap();

        splice_chunk_table_offset(&mut cursor).unwrap();

        let data = cursor.into_inner();
        assert_eq!(
            u64::from(Version::default().header_size()) + 8 + 16,
            data.len() as u64
        );
        let slot = usize::from(Version::default().header_size());
        assert_eq!(
            chunk_table_offset,
            i64::from_le_bytes(data[slot..slot + 8].try_into().unwrap())
        );
    }

    #[test]
    fn splice_is_a_noop_without_the_sentinel() {
        let header = raw::Header::default();
        let mut cursor = io::Cursor::new(Vec::new());
        header.write_to(&mut cursor).unwrap();
        cursor.write_i64::<LittleEndian>(42).unwrap();
        cursor.write_all(&[0xab; 8]).unwrap();
        let before = cursor.get_ref().clone();

        splice_chunk_table_offset(&mut cursor).unwrap();

        assert_eq!(&before, cursor.get_ref());
    }
}
