use anyhow::{Context, Result};
use log::{debug, error};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use swarm_common::Snapshot;

/// Receives snapshots from the tick loops.
pub trait SnapshotSink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// On-disk encoding of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// One `x\ty\tz\tlabel` line per point, attractors first.
    Tsv,
    Json,
    Bincode,
    MessagePack,
}

impl FrameFormat {
    /// Parses the configured format name, falling back to TSV for unknown names.
    pub fn from_config(name: Option<&str>) -> Self {
        match name.unwrap_or("tsv") {
            "tsv" => FrameFormat::Tsv,
            "json" => FrameFormat::Json,
            "bincode" => FrameFormat::Bincode,
            "messagepack" => FrameFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using tsv instead.", other);
                FrameFormat::Tsv
            }
        }
    }
}

/// Overwrites a single frame file on every emit. Only the latest snapshot survives.
#[derive(Debug)]
pub struct FrameFileSink {
    path: PathBuf,
    format: FrameFormat,
}

impl FrameFileSink {
    pub fn new<P: AsRef<Path>>(path: P, format: FrameFormat) -> Self {
        FrameFileSink { path: path.as_ref().to_path_buf(), format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_frame(&self, snapshot: &Snapshot) -> Result<()> {
        let mut file = BufWriter::new(File::create(&self.path)?);
        match self.format {
            FrameFormat::Tsv => write_tsv(&mut file, snapshot)?,
            FrameFormat::Json => serde_json::to_writer(&mut file, snapshot)?,
            FrameFormat::Bincode => bincode::serialize_into(&mut file, snapshot)?,
            FrameFormat::MessagePack => rmp_serde::encode::write(&mut file, snapshot)?,
        }
        file.flush()?;
        Ok(())
    }
}

fn write_tsv<W: Write>(out: W, snapshot: &Snapshot) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(out);
    for p in snapshot.points() {
        writer.write_record([p.x.to_string(), p.y.to_string(), p.z.to_string(), p.label.clone()])?;
    }
    writer.flush()?;
    Ok(())
}

impl SnapshotSink for FrameFileSink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.write_frame(snapshot)
            .with_context(|| format!("Failed to write frame '{}'", self.path.display()))?;

        debug!(
            "Frame for tick {} written to {} ({} points).",
            snapshot.tick,
            self.path.display(),
            snapshot.attractors.len() + snapshot.flyers.len()
        );
        Ok(())
    }
}

/// Keeps the most recent snapshot in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    latest: Option<Snapshot>,
    emitted: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    /// Number of snapshots received so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl SnapshotSink for MemorySink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.latest = Some(snapshot.clone());
        self.emitted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_common::SnapshotPoint;

    fn sample(tick: u64) -> Snapshot {
        Snapshot {
            tick,
            attractors: vec![SnapshotPoint::new(0.0, 0.0, 0.0, "💰")],
            flyers: vec![
                SnapshotPoint::new(1.5, -2.0, 3.0, "*"),
                SnapshotPoint::new(4.0, 5.0, 6.25, "*"),
            ],
        }
    }

    #[test]
    fn tsv_frame_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.txt");
        let mut sink = FrameFileSink::new(&path, FrameFormat::Tsv);

        sink.emit(&sample(0)).unwrap();
        let mut second = sample(1);
        second.flyers.pop();
        sink.emit(&second).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["0\t0\t0\t💰", "1.5\t-2\t3\t*"]);
    }

    #[test]
    fn json_frame_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.json");
        let mut sink = FrameFileSink::new(&path, FrameFormat::Json);
        sink.emit(&sample(9)).unwrap();

        let back: Snapshot = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.tick, 9);
        assert_eq!(back.flyers.len(), 2);
        assert_eq!(back.flyers[1].z, 6.25);
    }

    #[test]
    fn unknown_format_falls_back_to_tsv() {
        assert_eq!(FrameFormat::from_config(Some("yaml")), FrameFormat::Tsv);
        assert_eq!(FrameFormat::from_config(None), FrameFormat::Tsv);
        assert_eq!(FrameFormat::from_config(Some("messagepack")), FrameFormat::MessagePack);
    }

    #[test]
    fn memory_sink_keeps_latest() {
        let mut sink = MemorySink::new();
        sink.emit(&sample(1)).unwrap();
        sink.emit(&sample(2)).unwrap();
        assert_eq!(sink.emitted(), 2);
        assert_eq!(sink.latest().unwrap().tick, 2);
    }
}
