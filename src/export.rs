/*
 * Export Module
 *
 * Append-only recording of boid states for offline analysis. Each recorded
 * frame adds one row per boid; the log is written out as CSV with the columns
 * frame, boid_id, flock_id, x, y, vx, vy.
 */

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::boid::{BoidId, BoidSnapshot};
use crate::flock::FlockId;

pub const CSV_HEADER: &str = "frame,boid_id,flock_id,x,y,vx,vy";
pub const DEFAULT_EXPORT_PATH: &str = "data/boid_simulation_data.csv";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordRow {
    pub frame: u64,
    pub boid_id: BoidId,
    pub flock_id: FlockId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Debug, Default)]
pub struct Recorder {
    rows: Vec<RecordRow>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: u64, snapshot: &[BoidSnapshot]) {
        self.rows.extend(snapshot.iter().map(|s| RecordRow {
            frame,
            boid_id: s.boid_id,
            flock_id: s.flock_id,
            x: s.position.x,
            y: s.position.y,
            vx: s.velocity.x,
            vy: s.velocity.y,
        }));
    }

    pub fn rows(&self) -> &[RecordRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut out = BufWriter::new(writer);
        writeln!(out, "{CSV_HEADER}")?;
        for r in &self.rows {
            writeln!(out, "{},{},{},{},{},{},{}", r.frame, r.boid_id, r.flock_id, r.x, r.y, r.vx, r.vy)?;
        }
        out.flush()
    }

    /// Write the log to `path`, creating missing parent directories.
    pub fn export_to_path(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        self.write_csv(File::create(path)?)?;
        info!(path = %path.display(), rows = self.rows.len(), "exported simulation data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn snap(id: u32, flock: u32, x: f32, vx: f32) -> BoidSnapshot {
        BoidSnapshot {
            boid_id: BoidId(id),
            flock_id: FlockId(flock),
            position: Vec2::new(x, 2.5),
            velocity: Vec2::new(vx, -1.0),
        }
    }

    #[test]
    fn writes_header_and_one_row_per_boid_per_frame() {
        let mut recorder = Recorder::new();
        recorder.record(1, &[snap(0, 1, 10.0, 0.5), snap(1, 2, 20.0, 1.5)]);
        recorder.record(2, &[snap(0, 1, 10.5, 0.5), snap(1, 2, 21.5, 1.5)]);

        let mut buf = Vec::new();
        recorder.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "1,0,1,10,2.5,0.5,-1");
        assert_eq!(lines[4], "2,1,2,21.5,2.5,1.5,-1");
    }

    #[test]
    fn export_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("flocking-export-{}", std::process::id()));
        let path = dir.join("nested").join("run.csv");

        let mut recorder = Recorder::new();
        recorder.record(1, &[snap(3, 1, 1.0, 1.0)]);
        recorder.export_to_path(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(CSV_HEADER));
        fs::remove_dir_all(dir).unwrap();
    }
}
