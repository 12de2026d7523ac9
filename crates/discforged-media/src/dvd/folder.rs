//! Native [`DvdDisc`] backend over an unpacked `VIDEO_TS` directory.

use super::{ifo, DvdDisc, TitleSet, VideoManager};
use crate::sector::{ByteStoreSource, SectorSource};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const VIDEO_TS_DIR: &str = "VIDEO_TS";
const VMG_IFO: &str = "VIDEO_TS.IFO";

/// Maximum VOB parts per title set (`VTS_nn_1.VOB` .. `VTS_nn_9.VOB`).
const MAX_VOB_PARTS: u8 = 9;

/// A DVD disc laid out as files in a `VIDEO_TS` directory.
#[derive(Debug)]
pub struct VideoTsFolder {
    root: PathBuf,
    /// Upper-cased file name → actual path.
    files: HashMap<String, PathBuf>,
}

impl VideoTsFolder {
    /// Open a disc root containing `VIDEO_TS/`, or the `VIDEO_TS` directory
    /// itself. File names are matched case-insensitively.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::not_found(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        let is_video_ts = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(VIDEO_TS_DIR));

        let (root, video_ts) = if is_video_ts {
            let root = path.parent().unwrap_or(path).to_path_buf();
            (root, path.to_path_buf())
        } else {
            let dir = find_entry(path, VIDEO_TS_DIR)?.ok_or_else(|| {
                Error::not_found(format!("no {VIDEO_TS_DIR} directory in {}", path.display()))
            })?;
            (path.to_path_buf(), dir)
        };

        let mut files = HashMap::new();
        for entry in fs::read_dir(&video_ts)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                files.insert(name.to_ascii_uppercase(), entry.path());
            }
        }

        if !files.contains_key(VMG_IFO) {
            return Err(Error::not_found(format!(
                "{VMG_IFO} missing in {}",
                video_ts.display()
            )));
        }

        tracing::debug!(path = %video_ts.display(), files = files.len(), "opened VIDEO_TS folder");
        Ok(Self { root, files })
    }

    fn open_file(&self, name: &str) -> Result<File> {
        let path = self
            .files
            .get(name)
            .ok_or_else(|| Error::not_found(format!("{name} missing")))?;
        Ok(File::open(path)?)
    }

    fn read_ifo(&self, name: &str) -> Result<Vec<u8>> {
        ifo::read_ifo(self.open_file(name)?)
    }
}

impl DvdDisc for VideoTsFolder {
    fn volume_id(&self) -> Option<String> {
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
    }

    fn open_vmg(&mut self) -> Result<VideoManager> {
        ifo::parse_vmg(&self.read_ifo(VMG_IFO)?)
    }

    fn open_title_set(&mut self, title_set: u8) -> Result<TitleSet> {
        ifo::parse_vts(&self.read_ifo(&format!("VTS_{title_set:02}_0.IFO"))?)
    }

    fn open_title_vobs(&mut self, title_set: u8) -> Result<Box<dyn SectorSource>> {
        let mut parts = Vec::new();
        for part in 1..=MAX_VOB_PARTS {
            let name = format!("VTS_{title_set:02}_{part}.VOB");
            if !self.files.contains_key(&name) {
                break;
            }
            parts.push(self.open_file(&name)?);
        }

        if parts.is_empty() {
            return Err(Error::not_found(format!(
                "no VOB files for title set {title_set}"
            )));
        }

        let vobs = VobSet::new(parts)?;
        tracing::debug!(title_set, parts = vobs.part_count(), size = vobs.len(), "opened title VOBs");
        Ok(Box::new(ByteStoreSource::new(vobs)))
    }
}

/// Find a directory entry by case-insensitive name.
fn find_entry(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
        {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Several byte stores joined end to end into one seekable store.
pub struct VobSet<R = File> {
    parts: Vec<(R, u64)>,
    len: u64,
    pos: u64,
}

impl<R: Read + Seek> VobSet<R> {
    /// Join `parts` in order. Each part's length is measured once.
    pub fn new(parts: Vec<R>) -> io::Result<Self> {
        let mut measured = Vec::with_capacity(parts.len());
        let mut len = 0u64;
        for mut part in parts {
            let part_len = part.seek(SeekFrom::End(0))?;
            len += part_len;
            measured.push((part, part_len));
        }
        Ok(Self {
            parts: measured,
            len,
            pos: 0,
        })
    }

    /// Total length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Part holding byte `pos` and the offset within it.
    fn locate(&self, pos: u64) -> Option<(usize, u64)> {
        let mut start = 0u64;
        for (i, (_, part_len)) in self.parts.iter().enumerate() {
            if pos < start + part_len {
                return Some((i, pos - start));
            }
            start += part_len;
        }
        None
    }
}

impl<R: Read + Seek> Read for VobSet<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some((idx, offset)) = self.locate(self.pos) else {
            return Ok(0);
        };
        let (part, part_len) = &mut self.parts[idx];
        let max = buf.len().min((*part_len - offset) as usize);
        part.seek(SeekFrom::Start(offset))?;
        let n = part.read(&mut buf[..max])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for VobSet<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
            SeekFrom::End(d) => self.len.checked_add_signed(d),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of VOB set")
        })?;
        self.pos = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn part(byte: u8, len: usize) -> Cursor<Vec<u8>> {
        Cursor::new(vec![byte; len])
    }

    #[test]
    fn test_vob_set_reads_across_parts() {
        let mut set = VobSet::new(vec![part(1, 10), part(2, 5), part(3, 7)]).unwrap();
        assert_eq!(set.len(), 22);

        let mut all = Vec::new();
        set.read_to_end(&mut all).unwrap();
        assert_eq!(all.len(), 22);
        assert_eq!(&all[8..12], &[1, 1, 2, 2]);
        assert_eq!(all[21], 3);
    }

    #[test]
    fn test_vob_set_read_stops_at_part_boundary() {
        let mut set = VobSet::new(vec![part(1, 10), part(2, 10)]).unwrap();
        set.seek(SeekFrom::Start(6)).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(set.read(&mut buf).unwrap(), 4);
        assert_eq!(set.read(&mut buf).unwrap(), 8);
        assert_eq!(buf, [2; 8]);
    }

    #[test]
    fn test_vob_set_seek_whence() {
        let mut set = VobSet::new(vec![part(1, 10), part(2, 10)]).unwrap();
        assert_eq!(set.seek(SeekFrom::End(-3)).unwrap(), 17);
        assert_eq!(set.seek(SeekFrom::Current(-7)).unwrap(), 10);
        assert!(set.seek(SeekFrom::Current(-11)).is_err());

        set.seek(SeekFrom::Start(100)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(set.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = VideoTsFolder::open(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_open_without_vmg_ifo() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("video_ts")).unwrap();
        let err = VideoTsFolder::open(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_open_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let video_ts = dir.path().join("Video_Ts");
        fs::create_dir(&video_ts).unwrap();
        fs::write(video_ts.join("video_ts.ifo"), b"").unwrap();
        fs::write(video_ts.join("vts_01_1.vob"), vec![0u8; 4096]).unwrap();

        let mut folder = VideoTsFolder::open(dir.path()).unwrap();
        assert!(folder.volume_id().is_some());
        let mut vobs = folder.open_title_vobs(1).unwrap();
        assert_eq!(vobs.size(), Some(4096));
        assert!(matches!(folder.open_title_vobs(2), Err(Error::NotFound(_))));

        // Opening the VIDEO_TS directory directly works too
        let folder = VideoTsFolder::open(&video_ts).unwrap();
        assert_eq!(folder.root, dir.path());
    }
}
