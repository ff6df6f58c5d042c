//! Training artifacts on disk.
//!
//! A run directory holds:
//!
//! - `generations.log` - one text block per generation, appended as the run
//!   progresses
//! - `populations/population_<N>.txt` - the population that generation `N`
//!   produced, one genome bit string per line
//!
//! Writes happen on a dedicated thread fed through a channel, so the trainer
//! never blocks on disk I/O.

use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{self, BufWriter},
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use tracing::{debug, warn};

use crate::{
    genetic::Population,
    orchestrator::{GenerationObserver, GenerationSummary},
};

pub const GENERATION_LOG: &str = "generations.log";
pub const POPULATIONS_DIR: &str = "populations";

/// Formats the log block of one generation.
///
/// ```
/// # use gensnake_training::{artifact::format_log_entry, orchestrator::GenerationSummary};
/// # let summary = GenerationSummary {
/// #     generation: 3, best_index: 0, best_genome: "0110".parse().unwrap(),
/// #     best_fitness: 64.0, mean_fitness: 12.5, mean_score: 0.25, max_score: 2,
/// # };
/// let entry = format_log_entry(&summary);
/// assert!(entry.starts_with("Generation 3\nBest Individual: 0110\n"));
/// ```
#[must_use]
pub fn format_log_entry(summary: &GenerationSummary) -> String {
    let mut entry = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(entry, "Generation {}", summary.generation);
    let _ = writeln!(entry, "Best Individual: {}", summary.best_genome);
    let _ = writeln!(entry, "Best Fitness: {}", summary.best_fitness);
    let _ = writeln!(entry, "Average Fitness: {}", summary.mean_fitness);
    let _ = writeln!(entry, "Average Game Score: {}", summary.mean_score);
    let _ = writeln!(entry, "Best Game Score: {}", summary.max_score);
    entry.push('\n');
    entry
}

#[must_use]
pub fn format_population(population: &Population) -> String {
    population
        .genomes()
        .iter()
        .map(|genome| format!("{genome}\n"))
        .collect()
}

/// Parses a population snapshot. Blank lines are ignored.
pub fn parse_population(text: &str) -> io::Result<Population> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(line, bits)| {
            bits.parse().map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("genome {line} of snapshot: {err}"),
                )
            })
        })
        .collect::<io::Result<_>>()
        .map(Population::from_genomes)
}

pub fn read_population(path: &Path) -> io::Result<Population> {
    parse_population(&fs::read_to_string(path)?)
}

#[must_use]
pub fn snapshot_file_name(generation: usize) -> String {
    format!("population_{generation}.txt")
}

/// Generation number encoded in a snapshot file name, if it follows the
/// `population_<N>.txt` pattern.
#[must_use]
pub fn snapshot_generation(path: &Path) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .strip_prefix("population_")?
        .strip_suffix(".txt")?
        .parse()
        .ok()
}

enum Artifact {
    LogEntry(String),
    Snapshot { path: PathBuf, contents: String },
}

/// Generation observer that writes artifacts on a background thread.
pub struct ArtifactWriter {
    sender: Option<mpsc::Sender<Artifact>>,
    handle: Option<thread::JoinHandle<io::Result<()>>>,
    populations_dir: PathBuf,
    snapshot_interval: usize,
}

impl ArtifactWriter {
    /// Opens `dir` for a run, creating it if needed. The log is appended to.
    ///
    /// A `snapshot_interval` of 0 disables population snapshots.
    pub fn create(dir: &Path, snapshot_interval: usize) -> io::Result<Self> {
        let populations_dir = dir.join(POPULATIONS_DIR);
        fs::create_dir_all(&populations_dir)?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(GENERATION_LOG))?;
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("artifact-writer".into())
            .spawn(move || write_artifacts(&receiver, BufWriter::new(log)))?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            populations_dir,
            snapshot_interval,
        })
    }

    /// Waits for every queued write and reports the first I/O error, if any.
    pub fn finish(mut self) -> io::Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> io::Result<()> {
        drop(self.sender.take());
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| io::Error::other("artifact writer panicked"))?,
            None => Ok(()),
        }
    }

    fn send(&self, artifact: Artifact) -> io::Result<()> {
        self.sender
            .as_ref()
            .and_then(|sender| sender.send(artifact).ok())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::BrokenPipe, "artifact writer has stopped")
            })
    }
}

impl GenerationObserver for ArtifactWriter {
    fn on_generation(
        &mut self,
        summary: &GenerationSummary,
        next_population: &Population,
    ) -> io::Result<()> {
        self.send(Artifact::LogEntry(format_log_entry(summary)))?;
        if self.snapshot_interval > 0 && summary.generation % self.snapshot_interval == 0 {
            self.send(Artifact::Snapshot {
                path: self
                    .populations_dir
                    .join(snapshot_file_name(summary.generation)),
                contents: format_population(next_population),
            })?;
        }
        Ok(())
    }
}

impl Drop for ArtifactWriter {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(%err, "training artifacts may be incomplete");
        }
    }
}

fn write_artifacts<W: io::Write>(
    receiver: &mpsc::Receiver<Artifact>,
    mut log: W,
) -> io::Result<()> {
    for artifact in receiver {
        match artifact {
            Artifact::LogEntry(entry) => {
                log.write_all(entry.as_bytes())?;
                log.flush()?;
            }
            Artifact::Snapshot { path, contents } => {
                fs::write(&path, contents)?;
                debug!(path = %path.display(), "population snapshot written");
            }
        }
    }
    log.flush()
}

#[cfg(test)]
mod tests {
    use gensnake_evaluator::genome::Genome;

    use super::*;

    fn summary(generation: usize) -> GenerationSummary {
        GenerationSummary {
            generation,
            best_index: 1,
            best_genome: "1010".parse().unwrap(),
            best_fitness: 36.0,
            mean_fitness: 10.5,
            mean_score: 0.5,
            max_score: 3,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gensnake-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_log_entry_layout() {
        assert_eq!(
            format_log_entry(&summary(7)),
            "Generation 7\n\
             Best Individual: 1010\n\
             Best Fitness: 36\n\
             Average Fitness: 10.5\n\
             Average Game Score: 0.5\n\
             Best Game Score: 3\n\n"
        );
    }

    #[test]
    fn test_population_text_round_trip() {
        let population = Population::from_genomes(vec![
            "0011".parse().unwrap(),
            "1111".parse().unwrap(),
        ]);
        let text = format_population(&population);
        assert_eq!(text, "0011\n1111\n");
        assert_eq!(parse_population(&text).unwrap(), population);
        assert_eq!(
            parse_population("\n0011\n\n1111\n").unwrap(),
            population
        );
    }

    #[test]
    fn test_parse_population_reports_bad_line() {
        let err = parse_population("0101\n01a1\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("genome 1"), "{err}");
    }

    #[test]
    fn test_snapshot_generation() {
        assert_eq!(
            snapshot_generation(Path::new("out/populations/population_40.txt")),
            Some(40)
        );
        assert_eq!(snapshot_generation(Path::new("population_x.txt")), None);
        assert_eq!(snapshot_generation(Path::new("pop.txt")), None);
    }

    #[test]
    fn test_writer_appends_log_and_snapshots_on_interval() {
        let dir = scratch_dir("writer");
        let population = Population::from_genomes(vec![Genome::zeros(3); 2]);
        let mut writer = ArtifactWriter::create(&dir, 2).unwrap();
        for generation in 1..=4 {
            writer
                .on_generation(&summary(generation), &population)
                .unwrap();
        }
        writer.finish().unwrap();

        let log = fs::read_to_string(dir.join(GENERATION_LOG)).unwrap();
        assert_eq!(log.matches("Generation ").count(), 4);
        let populations = dir.join(POPULATIONS_DIR);
        assert!(!populations.join("population_1.txt").exists());
        assert!(populations.join("population_2.txt").exists());
        assert_eq!(
            read_population(&populations.join("population_4.txt")).unwrap(),
            population
        );

        // Reopening appends.
        let mut writer = ArtifactWriter::create(&dir, 0).unwrap();
        writer.on_generation(&summary(5), &population).unwrap();
        writer.finish().unwrap();
        let log = fs::read_to_string(dir.join(GENERATION_LOG)).unwrap();
        assert_eq!(log.matches("Generation ").count(), 5);
        assert!(!populations.join("population_5.txt").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
