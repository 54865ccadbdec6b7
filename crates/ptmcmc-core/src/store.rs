//! Chain store: thinned in-memory slab, periodic flush to an
//! append-only per-rank text file, and checkpoint/resume.

use crate::error::{Result, SamplerError};
use crate::linalg::Mat;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// One thinned row: `logpi, logl, local_accept_rate, swap_accept_rate, x`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSample {
    pub logpi: f64,
    pub logl: f64,
    pub local_accept_rate: f64,
    pub swap_accept_rate: f64,
    pub x: Vec<f64>,
}

impl StoredSample {
    fn to_line(&self) -> String {
        let mut parts = vec![
            format!("{:.6}", self.logpi),
            format!("{:.6}", self.logl),
            format!("{:.6}", self.local_accept_rate),
            format!("{:.6}", self.swap_accept_rate),
        ];
        parts.extend(self.x.iter().map(|v| format!("{v:.6}")));
        parts.join("\t")
    }

    fn parse_line(line: &str, ndim: usize) -> Option<Self> {
        let cols: Vec<&str> = line.trim().split('\t').collect();
        if cols.len() != 4 + ndim {
            return None;
        }
        let mut nums = Vec::with_capacity(cols.len());
        for c in &cols {
            nums.push(c.trim().parse::<f64>().ok()?);
        }
        Some(StoredSample {
            logpi: nums[0],
            logl: nums[1],
            local_accept_rate: nums[2],
            swap_accept_rate: nums[3],
            x: nums[4..].to_vec(),
        })
    }
}

/// Append-only per-rank chain file, plus the buffered-but-not-yet-flushed
/// slab of thinned samples.
pub struct ChainStore {
    path: PathBuf,
    ndim: usize,
    thin: u64,
    pending: Vec<StoredSample>,
    /// Number of resumed rows already on disk; new flushes never touch
    /// them.
    pub resume_length: usize,
}

impl ChainStore {
    /// Open (or create) `<out_dir>/chain_<temp>.txt`. If `resume` is set
    /// and the file exists, load every row already on disk, tolerating a
    /// truncated final line by dropping it and retrying once.
    pub fn open(out_dir: &str, temp: f64, ndim: usize, thin: u64, resume: bool) -> Result<(Self, Vec<StoredSample>)> {
        fs::create_dir_all(out_dir)?;
        let path = Path::new(out_dir).join(format!("chain_{temp}.txt"));

        let mut resumed = Vec::new();
        if resume && path.exists() {
            resumed = load_chain_file(&path, ndim)?;
            OpenOptions::new().append(true).open(&path)?;
        } else {
            File::create(&path)?;
        }

        Ok((
            Self {
                path,
                ndim,
                thin,
                pending: Vec::new(),
                resume_length: resumed.len(),
            },
            resumed,
        ))
    }

    /// Record one post-step sample if `iter` falls on a thinning boundary.
    pub fn record(&mut self, iter: u64, sample: StoredSample) {
        debug_assert_eq!(sample.x.len(), self.ndim);
        if self.thin == 0 || iter % self.thin == 0 {
            self.pending.push(sample);
        }
    }

    /// Flush the buffered slab to disk if `iter` falls on a save boundary
    /// and we are past the resumed prefix.
    pub fn maybe_flush(&mut self, iter: u64, isave: u64) -> Result<bool> {
        if isave == 0 || iter == 0 || iter % isave != 0 || iter <= self.resume_length as u64 {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        for sample in self.pending.drain(..) {
            writeln!(file, "{}", sample.to_line())?;
        }
        Ok(())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn load_chain_file(path: &Path, ndim: usize) -> Result<Vec<StoredSample>> {
    match parse_chain_file(path, ndim) {
        Ok(rows) => Ok(rows),
        Err(_first_err) => {
            drop_last_line(path)?;
            parse_chain_file(path, ndim).map_err(|_| SamplerError::TruncatedCheckpoint {
                path: path.display().to_string(),
            })
        }
    }
}

fn parse_chain_file(path: &Path, ndim: usize) -> io::Result<Vec<StoredSample>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match StoredSample::parse_line(&line, ndim) {
            Some(row) => rows.push(row),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unparseable chain row: {line:?}"),
                ));
            }
        }
    }
    Ok(rows)
}

/// Drop the final line of a file in place (the truncated-write-tolerance
/// retry path).
fn drop_last_line(path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    let mut lines: Vec<&str> = contents.lines().collect();
    if lines.is_empty() {
        return Ok(());
    }
    lines.pop();
    let mut rewritten = lines.join("\n");
    if !rewritten.is_empty() {
        rewritten.push('\n');
    }
    fs::write(path, rewritten)?;
    Ok(())
}

/// Write the current `Sigma` to `<out_dir>/cov.json`, overwriting any
/// previous snapshot. A JSON sidecar stands in for the original's
/// `cov.npy`: there is no NumPy array container in this ecosystem, and
/// the row-major `Vec<Vec<f64>>` shape is preserved exactly.
pub fn write_cov_snapshot(out_dir: &str, cov: &Mat) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    let path = Path::new(out_dir).join("cov.json");
    let rows = cov.to_rows();
    let mut s = String::from("[\n");
    for (i, row) in rows.iter().enumerate() {
        let row_str: Vec<String> = row.iter().map(|v| format!("{v}")).collect();
        s.push_str("  [");
        s.push_str(&row_str.join(", "));
        s.push(']');
        if i + 1 != rows.len() {
            s.push(',');
        }
        s.push('\n');
    }
    s.push_str("]\n");
    fs::write(path, s)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(i: f64) -> StoredSample {
        StoredSample {
            logpi: -i,
            logl: -i,
            local_accept_rate: 0.5,
            swap_accept_rate: 0.1,
            x: vec![i, 2.0 * i],
        }
    }

    #[test]
    fn round_trips_through_flush_and_resume() {
        let dir = tempdir().unwrap();
        let out = dir.path().to_str().unwrap();

        let (mut store, resumed) = ChainStore::open(out, 1.0, 2, 1, false).unwrap();
        assert!(resumed.is_empty());
        for i in 1..=5u64 {
            store.record(i, sample(i as f64));
        }
        store.flush().unwrap();
        drop(store);

        let (_store2, resumed2) = ChainStore::open(out, 1.0, 2, 1, true).unwrap();
        assert_eq!(resumed2.len(), 5);
        assert_eq!(resumed2[0].x, vec![1.0, 2.0]);
    }

    #[test]
    fn tolerates_truncated_final_line() {
        let dir = tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let path = Path::new(out).join("chain_1.txt");
        fs::create_dir_all(out).unwrap();
        fs::write(
            &path,
            "1.000000\t1.000000\t0.500000\t0.100000\t1.000000\t2.000000\n2.00000\tgarbage-t",
        )
        .unwrap();

        let (_store, resumed) = ChainStore::open(out, 1.0, 2, 1, true).unwrap();
        assert_eq!(resumed.len(), 1);
    }

    #[test]
    fn fails_when_second_read_also_truncated() {
        let dir = tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let path = Path::new(out).join("chain_1.txt");
        fs::create_dir_all(out).unwrap();
        fs::write(&path, "garbage\nmore-garbage\n").unwrap();

        let result = ChainStore::open(out, 1.0, 2, 1, true);
        assert!(result.is_err());
    }

    #[test]
    fn cov_snapshot_round_trips_shape() {
        let dir = tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let cov = Mat::identity(2);
        write_cov_snapshot(out, &cov).unwrap();
        let contents = fs::read_to_string(Path::new(out).join("cov.json")).unwrap();
        assert!(contents.contains('1'));
    }
}
