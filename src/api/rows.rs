//! Table row shapes.
//!
//! The command service tags table rows only by which keys they carry. Rows are
//! classified here, once, into the closed [`RowKind`] set and decoded into typed
//! structs, so nothing downstream ever inspects raw JSON keys.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{scalar_string, truthy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Container,
    Image,
    Stats,
    Log,
    Volume,
    Network,
}

/// Shape predicates in match order. The first entry whose keys are all present
/// wins, so `driver`+`created_at` must stay ahead of `driver`+`scope`.
const SHAPE_PREDICATES: &[(RowKind, &[&str])] = &[
    (RowKind::Container, &["status"]),
    (RowKind::Image, &["repository"]),
    (RowKind::Stats, &["cpu_usage"]),
    (RowKind::Log, &["log_entry"]),
    (RowKind::Volume, &["driver", "created_at"]),
    (RowKind::Network, &["driver", "scope"]),
];

/// Keywords used to guess the table kind of an empty listing, in match order.
const EMPTY_TABLE_KEYWORDS: &[(&str, RowKind)] = &[
    ("image", RowKind::Image),
    ("log", RowKind::Log),
    ("stats", RowKind::Stats),
    ("volume", RowKind::Volume),
    ("network", RowKind::Network),
];

impl RowKind {
    pub const ALL: [RowKind; 6] = [
        RowKind::Container,
        RowKind::Image,
        RowKind::Stats,
        RowKind::Log,
        RowKind::Volume,
        RowKind::Network,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RowKind::Container => "container",
            RowKind::Image => "image",
            RowKind::Stats => "stats",
            RowKind::Log => "log",
            RowKind::Volume => "volume",
            RowKind::Network => "network",
        }
    }

    /// Classify a record by its key set.
    pub fn classify(record: &Map<String, Value>) -> Option<RowKind> {
        SHAPE_PREDICATES
            .iter()
            .find(|(_, keys)| keys.iter().all(|k| record.contains_key(*k)))
            .map(|(kind, _)| *kind)
    }

    /// An empty listing carries no shape, so fall back to the command text.
    pub fn from_command_hint(command: &str) -> RowKind {
        let command = command.to_lowercase();
        EMPTY_TABLE_KEYWORDS
            .iter()
            .find(|(keyword, _)| command.contains(keyword))
            .map(|(_, kind)| *kind)
            .unwrap_or(RowKind::Container)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContainerRow {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub image: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub status: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub ports: String,
    #[serde(default, deserialize_with = "truthy")]
    pub is_self: bool,
}

impl ContainerRow {
    pub fn is_running(&self) -> bool {
        let status = self.status.to_lowercase();
        status.starts_with("up") || status.starts_with("running")
    }

    /// Logs and stop only make sense for a running container that is not the
    /// console's own service.
    pub fn can_interact(&self) -> bool {
        self.is_running() && !self.is_self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageRow {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub repository: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub tag: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub created: String,
    /// Size in MB
    #[serde(default, deserialize_with = "scalar_string")]
    pub size: String,
}

impl ImageRow {
    /// Reference usable in follow-up commands: `repo:tag`, or the id for
    /// dangling images.
    pub fn reference(&self) -> String {
        if self.repository.is_empty() || self.repository == "<none>" {
            return self.id.clone();
        }
        if self.tag.is_empty() || self.tag == "<none>" {
            return self.repository.clone();
        }
        format!("{}:{}", self.repository, self.tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsRow {
    #[serde(default, deserialize_with = "scalar_string")]
    pub container_name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub cpu_usage: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub mem_usage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogRow {
    #[serde(default, deserialize_with = "scalar_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub log_entry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VolumeRow {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub driver: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NetworkRow {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub driver: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Container(ContainerRow),
    Image(ImageRow),
    Stats(StatsRow),
    Log(LogRow),
    Volume(VolumeRow),
    Network(NetworkRow),
}

impl Row {
    pub fn kind(&self) -> RowKind {
        match self {
            Row::Container(_) => RowKind::Container,
            Row::Image(_) => RowKind::Image,
            Row::Stats(_) => RowKind::Stats,
            Row::Log(_) => RowKind::Log,
            Row::Volume(_) => RowKind::Volume,
            Row::Network(_) => RowKind::Network,
        }
    }

    fn decode(kind: RowKind, value: Value) -> Result<Row, serde_json::Error> {
        Ok(match kind {
            RowKind::Container => Row::Container(serde_json::from_value(value)?),
            RowKind::Image => Row::Image(serde_json::from_value(value)?),
            RowKind::Stats => Row::Stats(serde_json::from_value(value)?),
            RowKind::Log => Row::Log(serde_json::from_value(value)?),
            RowKind::Volume => Row::Volume(serde_json::from_value(value)?),
            RowKind::Network => Row::Network(serde_json::from_value(value)?),
        })
    }
}

/// A non-empty table whose rows all share one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRows {
    kind: RowKind,
    rows: Vec<Row>,
}

impl ClassifiedRows {
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnrecognizedTable {
    #[error("row {index} is not an object")]
    NotAnObject { index: usize },

    #[error("no known table shape has the keys [{keys}]")]
    NoMatchingShape { keys: String },

    #[error("row {index} does not fit the {kind} shape: {message}")]
    Decode {
        index: usize,
        kind: &'static str,
        message: String,
    },
}

/// Classify a non-empty row set by its first row, then decode every row into
/// that kind.
pub fn classify_rows(values: &[Value]) -> Result<ClassifiedRows, UnrecognizedTable> {
    let first = match values.first() {
        Some(Value::Object(record)) => record,
        _ => return Err(UnrecognizedTable::NotAnObject { index: 0 }),
    };

    let kind = RowKind::classify(first).ok_or_else(|| UnrecognizedTable::NoMatchingShape {
        keys: first.keys().cloned().collect::<Vec<_>>().join(", "),
    })?;

    let rows = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            if !value.is_object() {
                return Err(UnrecognizedTable::NotAnObject { index });
            }
            Row::decode(kind, value.clone()).map_err(|e| UnrecognizedTable::Decode {
                index,
                kind: kind.name(),
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ClassifiedRows { kind, rows })
}
