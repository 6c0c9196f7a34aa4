use chrono::Utc;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::events::{Event, EventType};
use crate::analysis::{components, NetworkSummary};
use crate::graph::RelationshipGraph;
use crate::observer::{GraphSnapshot, Observer};
use crate::person::PersonId;

/// Generates a human-readable chronicle and machine-readable logs from a run
pub struct Chronicle {
    output_dir: PathBuf,
    events_file: BufWriter<File>,
    chronicle_file: BufWriter<File>,
    names: HashMap<PersonId, String>,
    last_snapshot: Option<usize>,
}

impl Chronicle {
    pub fn new(output_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let output_path = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_path)?;

        let events_file = BufWriter::new(File::create(output_path.join("events.jsonl"))?);
        let chronicle_file = BufWriter::new(File::create(output_path.join("chronicle.md"))?);

        Ok(Self {
            output_dir: output_path,
            events_file,
            chronicle_file,
            names: HashMap::new(),
            last_snapshot: None,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn name(&self, id: Option<PersonId>) -> Option<&str> {
        id.and_then(|id| self.names.get(&id)).map(String::as_str)
    }

    /// Write the chronicle header with the cast list
    pub fn write_header(&mut self, title: &str, graph: &RelationshipGraph) -> anyhow::Result<()> {
        for person in graph.people() {
            self.names.insert(person.id, person.name.clone());
        }

        writeln!(self.chronicle_file, "# {}", title)?;
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "> An Affinity Network Chronicle")?;
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "## The People")?;
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "{} people, all of them single.", graph.len())?;
        writeln!(self.chronicle_file)?;

        for person in graph.people() {
            writeln!(self.chronicle_file, "- {}", person.describe())?;
        }

        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "---")?;
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "## Chronicle")?;
        writeln!(self.chronicle_file)?;

        self.chronicle_file.flush()?;
        Ok(())
    }

    /// Log an event to events.jsonl and, if notable, to the chronicle
    pub fn log_event(&mut self, event: &Event) -> anyhow::Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.events_file, "{}", json)?;

        if let Some(narrative) = self.event_to_narrative(event) {
            writeln!(self.chronicle_file, "{}", narrative)?;
        }

        if event.event_type == EventType::GenerationEnd {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.events_file.flush()?;
        self.chronicle_file.flush()?;
        Ok(())
    }

    fn event_to_narrative(&self, event: &Event) -> Option<String> {
        let person = self.name(event.person);
        let other = self.name(event.other);

        match event.event_type {
            EventType::GenerationStart => Some(format!("\n### Generation {}\n", event.generation)),
            EventType::RomanceFormed => Some(format!("**{}** and **{}** are now together.", person?, other?)),
            EventType::BrokeUp => Some(format!("**{}** and **{}** broke up.", person?, other?)),
            EventType::FriendshipEnded => Some(format!(
                "**{}** and **{}** are no longer friends.",
                person?, other?
            )),
            EventType::FriendshipFormed => Some(format!("**{}** befriended **{}**.", person?, other?)),
            EventType::Checkpoint => Some(format!("*Snapshot taken at generation {}.*", event.generation)),
            EventType::GenerationEnd => None,
        }
    }

    /// Save a snapshot as states/generation_NNNN.json
    pub fn save_snapshot(&mut self, snapshot: &GraphSnapshot) -> anyhow::Result<PathBuf> {
        let states_dir = self.output_dir.join("states");
        fs::create_dir_all(&states_dir)?;

        let path = states_dir.join(format!("generation_{:04}.json", snapshot.generation));
        let mut file = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut file, snapshot)?;
        file.flush()?;

        self.last_snapshot = Some(snapshot.generation);
        Ok(path)
    }

    /// Write the closing summary
    pub fn write_footer(&mut self, snapshot: &GraphSnapshot) -> anyhow::Result<()> {
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "---")?;
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "## Aftermath")?;
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "After {} generations:", snapshot.generation)?;
        writeln!(self.chronicle_file)?;

        let summary = NetworkSummary::from_snapshot(snapshot);
        writeln!(self.chronicle_file, "{}", summary)?;
        writeln!(self.chronicle_file)?;

        let couples: Vec<_> = snapshot
            .people
            .iter()
            .filter_map(|p| p.partner.filter(|partner| p.id < *partner).map(|partner| (p.id, partner)))
            .collect();
        writeln!(self.chronicle_file, "**Couples ({}):**", couples.len())?;
        for (a, b) in couples {
            let line = format!(
                "- **{}** & **{}**",
                self.name(Some(a)).unwrap_or("?"),
                self.name(Some(b)).unwrap_or("?")
            );
            writeln!(self.chronicle_file, "{}", line)?;
        }

        let groups = components(snapshot);
        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "**Connected groups:** {}", groups.len())?;
        if let Some(largest) = groups.first() {
            writeln!(self.chronicle_file, "The largest holds {} people.", largest.len())?;
        }

        writeln!(self.chronicle_file)?;
        writeln!(self.chronicle_file, "---")?;
        writeln!(self.chronicle_file)?;
        writeln!(
            self.chronicle_file,
            "*Chronicle generated by affinity-net v{} on {}*",
            env!("CARGO_PKG_VERSION"),
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        )?;

        self.flush()?;
        Ok(())
    }
}

impl Observer for Chronicle {
    fn on_start(&mut self, title: &str, graph: &RelationshipGraph) -> anyhow::Result<()> {
        self.write_header(title, graph)
    }

    fn on_event(&mut self, event: &Event) -> anyhow::Result<()> {
        self.log_event(event)
    }

    fn on_checkpoint(&mut self, snapshot: &GraphSnapshot) -> anyhow::Result<()> {
        self.save_snapshot(snapshot)?;
        Ok(())
    }

    fn on_finish(&mut self, snapshot: &GraphSnapshot) -> anyhow::Result<()> {
        if self.last_snapshot != Some(snapshot.generation) {
            self.save_snapshot(snapshot)?;
        }
        self.write_footer(snapshot)
    }
}
