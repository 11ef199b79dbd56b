//! Transcript input files.

use crate::error::{GanjError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Identifier of a transcript message; numeric in exports, occasionally a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for TranscriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptId::Number(n) => write!(f, "{}", n),
            TranscriptId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One transcript as exported from the channel archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default, alias = "messageId")]
    pub message_id: Option<TranscriptId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "programNumber", deserialize_with = "lenient_count")]
    pub program_number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub views: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub forwards: Option<u64>,
}

/// Read a non-negative integer from a number, an integral float or a numeric
/// string. Anything else (`"1,2k"`, `12.5`, `null`) becomes `None`.
fn lenient_count<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let count = value.and_then(|value| match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    Ok(count.and_then(|n| T::try_from(n).ok()))
}

impl Transcript {
    /// Stable id, falling back to the position in the input file.
    pub fn id_or_index(&self, index: usize) -> String {
        match &self.message_id {
            Some(id) => id.to_string(),
            None => format!("msg_{}", index),
        }
    }

    /// Program number, treating 0 as "no program".
    pub fn program(&self) -> Option<u32> {
        self.program_number.filter(|n| *n > 0)
    }

    /// Raw text, empty when missing.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Accepted layouts of the ingestion input file. Entries stay raw until the
/// layout is known so a bad entry is reported by position.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Wrapped {
        #[serde(default)]
        total_transcripts: Option<Value>,
        transcripts: Vec<Value>,
    },
    Bare(Vec<Value>),
}

/// Transcripts read from an input file.
#[derive(Debug, Clone, Default)]
pub struct TranscriptSet {
    pub transcripts: Vec<Transcript>,
    /// Count declared by the file, or the number of transcripts read.
    pub total_transcripts: usize,
}

impl TranscriptSet {
    /// Parse either a bare array or an object with a `transcripts` array.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: TranscriptFile = serde_json::from_str(content).map_err(|e| {
            GanjError::Ingest(format!("Unrecognized transcript file layout: {}", e))
        })?;

        let (declared, entries) = match file {
            TranscriptFile::Wrapped {
                total_transcripts,
                transcripts,
            } => (total_transcripts.and_then(|v| v.as_u64()), transcripts),
            TranscriptFile::Bare(transcripts) => (None, transcripts),
        };

        let transcripts = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value::<Transcript>(entry).map_err(|e| {
                    GanjError::Ingest(format!("Invalid transcript at index {}: {}", index, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            total_transcripts: declared
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(transcripts.len()),
            transcripts,
        })
    }

    /// Read a transcript file. A missing file is an input error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GanjError::InvalidInput(format!(
                "Transcript file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Deserialize)]
struct MappedFile {
    data: MappedData,
}

#[derive(Debug, Deserialize)]
struct MappedData {
    #[serde(default)]
    mapped: Vec<MappedEntry>,
}

#[derive(Debug, Deserialize)]
struct MappedEntry {
    program_number: u32,
    #[serde(default)]
    video: Option<MappedVideo>,
}

#[derive(Debug, Deserialize)]
struct MappedVideo {
    #[serde(default)]
    title: Option<String>,
}

/// Video titles keyed by program number.
#[derive(Debug, Clone, Default)]
pub struct ProgramTitles {
    titles: HashMap<u32, String>,
}

impl ProgramTitles {
    /// Parse a video-to-transcript mapping export (`{"data": {"mapped": [...]}}`).
    pub fn from_json(content: &str) -> Result<Self> {
        let file: MappedFile = serde_json::from_str(content)?;
        let titles = file
            .data
            .mapped
            .into_iter()
            .filter_map(|entry| {
                let title = entry.video?.title?;
                let title = title.trim();
                (!title.is_empty()).then(|| (entry.program_number, title.to_string()))
            })
            .collect();
        Ok(Self { titles })
    }

    /// Read a mapping export from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Title of a program, if known.
    pub fn get(&self, program_number: u32) -> Option<&str> {
        self.titles.get(&program_number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl FromIterator<(u32, String)> for ProgramTitles {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            titles: iter.into_iter().collect(),
        }
    }
}
