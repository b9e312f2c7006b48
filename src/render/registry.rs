//! Renderer registry: one descriptor per table kind.

use std::collections::HashMap;

use crate::api::{AssistantTable, ContainerRow, ImageRow, LogRow, NetworkRow, Row, RowKind, StatsRow, VolumeRow};
use crate::util::strip_ansi;

use super::fragment::{Cell, ColumnHint, Header, Icon, RowAction, RowView, TableBody, TableView, TemplateKey, Tone};

/// How one kind of row is turned into a table.
#[derive(Debug, Clone)]
pub struct RendererDescriptor {
    pub kind: RowKind,
    pub row_template: TemplateKey,
    pub headers: Vec<Header>,
    pub empty_message: &'static str,
    pub icon: Icon,
    /// Returns `None` for rows of another kind
    pub map_row: fn(&Row) -> Option<RowView>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("renderer for {0} tables is already registered")]
    DuplicateKind(&'static str),

    #[error("row template '{0}' is already used by another renderer")]
    DuplicateTemplate(&'static str),
}

#[derive(Debug, Default)]
pub struct RendererRegistry {
    descriptors: HashMap<RowKind, RendererDescriptor>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a renderer for every [`RowKind`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_descriptors() {
            // Built-ins have distinct kinds and templates
            let _ = registry.register(descriptor);
        }
        registry
    }

    pub fn register(&mut self, descriptor: RendererDescriptor) -> Result<(), RegistryError> {
        if self.descriptors.contains_key(&descriptor.kind) {
            tracing::warn!("Refusing renderer: {} already registered", descriptor.kind.name());
            return Err(RegistryError::DuplicateKind(descriptor.kind.name()));
        }
        if self
            .descriptors
            .values()
            .any(|d| d.row_template == descriptor.row_template)
        {
            tracing::warn!(
                "Refusing renderer for {}: template {} in use",
                descriptor.kind.name(),
                descriptor.row_template.id()
            );
            return Err(RegistryError::DuplicateTemplate(descriptor.row_template.id()));
        }
        self.descriptors.insert(descriptor.kind, descriptor);
        Ok(())
    }

    pub fn get(&self, kind: RowKind) -> Option<&RendererDescriptor> {
        self.descriptors.get(&kind)
    }

    /// Build the table for `rows`, or `None` when no renderer handles `kind`.
    pub fn render(&self, kind: RowKind, rows: &[Row]) -> Option<TableView> {
        let descriptor = self.get(kind)?;

        let body = if rows.is_empty() {
            TableBody::Empty(descriptor.empty_message.to_string())
        } else {
            let mapped = rows
                .iter()
                .filter_map(|row| {
                    let view = (descriptor.map_row)(row);
                    if view.is_none() {
                        tracing::warn!("Skipping {} row in {} table", row.kind().name(), kind.name());
                    }
                    view
                })
                .collect();
            TableBody::Rows(mapped)
        };

        Some(TableView {
            headers: descriptor.headers.clone(),
            body,
        })
    }
}

fn actions_header() -> Header {
    Header::new("Actions").with_hint(ColumnHint::Right)
}

fn builtin_descriptors() -> Vec<RendererDescriptor> {
    vec![
        RendererDescriptor {
            kind: RowKind::Container,
            row_template: TemplateKey::ContainerRow,
            headers: vec![
                Header::new("Status"),
                Header::new("Name"),
                Header::new("Image").with_hint(ColumnHint::Secondary),
                Header::new("Ports").with_hint(ColumnHint::Tertiary),
                actions_header(),
            ],
            empty_message: "No containers.",
            icon: Icon::BOT,
            map_row: |row| match row {
                Row::Container(c) => Some(container_row(c)),
                _ => None,
            },
        },
        RendererDescriptor {
            kind: RowKind::Image,
            row_template: TemplateKey::ImageRow,
            headers: vec![
                Header::new("Repository"),
                Header::new("Tag"),
                Header::new("ID").with_hint(ColumnHint::Secondary),
                Header::new("Created").with_hint(ColumnHint::Tertiary),
                Header::new("Size").with_hint(ColumnHint::Right),
                actions_header(),
            ],
            empty_message: "No images.",
            icon: Icon::new("◫", Tone::Brand),
            map_row: |row| match row {
                Row::Image(i) => Some(image_row(i)),
                _ => None,
            },
        },
        RendererDescriptor {
            kind: RowKind::Stats,
            row_template: TemplateKey::StatsRow,
            headers: vec![Header::new("Container"), Header::new("CPU"), Header::new("Memory")],
            empty_message: "No stats available.",
            icon: Icon::new("▤", Tone::Info),
            map_row: |row| match row {
                Row::Stats(s) => Some(stats_row(s)),
                _ => None,
            },
        },
        RendererDescriptor {
            kind: RowKind::Log,
            row_template: TemplateKey::LogRow,
            headers: vec![
                Header::new("Timestamp").with_hint(ColumnHint::Secondary),
                Header::new("Entry"),
            ],
            empty_message: "No log entries.",
            icon: Icon::new("≣", Tone::Muted),
            map_row: |row| match row {
                Row::Log(l) => Some(log_row(l)),
                _ => None,
            },
        },
        RendererDescriptor {
            kind: RowKind::Volume,
            row_template: TemplateKey::VolumeRow,
            headers: vec![
                Header::new("Name"),
                Header::new("Driver"),
                Header::new("Created").with_hint(ColumnHint::Secondary),
                actions_header(),
            ],
            empty_message: "No volumes.",
            icon: Icon::new("⛁", Tone::Brand),
            map_row: |row| match row {
                Row::Volume(v) => Some(volume_row(v)),
                _ => None,
            },
        },
        RendererDescriptor {
            kind: RowKind::Network,
            row_template: TemplateKey::NetworkRow,
            headers: vec![
                Header::new("Name"),
                Header::new("ID").with_hint(ColumnHint::Secondary),
                Header::new("Driver"),
                Header::new("Scope"),
                actions_header(),
            ],
            empty_message: "No networks.",
            icon: Icon::new("⇄", Tone::Brand),
            map_row: |row| match row {
                Row::Network(n) => Some(network_row(n)),
                _ => None,
            },
        },
    ]
}

fn clean(text: &str) -> String {
    strip_ansi(text)
}

fn container_row(c: &ContainerRow) -> RowView {
    let name = clean(&c.name);
    let display_name = if c.is_self { format!("{name} (this)") } else { name.clone() };
    let indicator = if c.is_running() { Tone::Success } else { Tone::Muted };
    let can_interact = c.can_interact();

    RowView {
        template: TemplateKey::ContainerRow,
        cells: vec![
            Cell::toned(format!("● {}", clean(&c.status)), indicator),
            Cell::new(display_name),
            Cell::new(clean(&c.image)),
            Cell::or_dash(&clean(&c.ports)),
        ],
        actions: vec![
            RowAction::copy("Copy", "Name", name.clone()),
            RowAction::submit("Inspect", format!("inspect container {name}")),
            RowAction::submit("Logs", format!("docker logs {name}")).enabled_if(can_interact),
            RowAction::submit("Stop", format!("stop {name}")).enabled_if(can_interact),
        ],
    }
}

fn image_row(i: &ImageRow) -> RowView {
    let reference = clean(&i.reference());
    let id = clean(i.id.trim_start_matches("sha256:"));
    // The service only accepts bare names here, so no `repo:tag`
    let inspect_target = if id.is_empty() { clean(&i.repository) } else { id.clone() };
    let size = clean(&i.size);
    let size = if !size.is_empty() && size.parse::<f64>().is_ok() {
        format!("{size} MB")
    } else {
        size
    };

    RowView {
        template: TemplateKey::ImageRow,
        cells: vec![
            Cell::or_dash(&clean(&i.repository)),
            Cell::or_dash(&clean(&i.tag)),
            Cell::new(id),
            Cell::or_dash(&clean(&i.created)),
            Cell::or_dash(&size),
        ],
        actions: vec![
            RowAction::copy("Copy", "Image", reference.clone()),
            RowAction::submit("Inspect", format!("inspect image {inspect_target}")),
        ],
    }
}

fn stats_row(s: &StatsRow) -> RowView {
    RowView {
        template: TemplateKey::StatsRow,
        cells: vec![
            Cell::new(clean(&s.container_name)),
            Cell::or_dash(&clean(&s.cpu_usage)),
            Cell::or_dash(&clean(&s.mem_usage)),
        ],
        actions: Vec::new(),
    }
}

fn log_row(l: &LogRow) -> RowView {
    RowView {
        template: TemplateKey::LogRow,
        cells: vec![
            Cell::toned(clean(&l.timestamp), Tone::Muted),
            Cell::new(clean(&l.log_entry)),
        ],
        actions: Vec::new(),
    }
}

fn volume_row(v: &VolumeRow) -> RowView {
    let name = clean(&v.name);
    RowView {
        template: TemplateKey::VolumeRow,
        cells: vec![
            Cell::new(name.clone()),
            Cell::or_dash(&clean(&v.driver)),
            Cell::or_dash(&clean(&v.created_at)),
        ],
        actions: vec![
            RowAction::copy("Copy", "Volume", name.clone()),
            RowAction::submit("Inspect", format!("inspect volume {name}")),
            RowAction::submit("Remove", format!("rm volume {name}")),
        ],
    }
}

fn network_row(n: &NetworkRow) -> RowView {
    let name = clean(&n.name);
    RowView {
        template: TemplateKey::NetworkRow,
        cells: vec![
            Cell::new(name.clone()),
            Cell::new(clean(&n.id)),
            Cell::or_dash(&clean(&n.driver)),
            Cell::or_dash(&clean(&n.scope)),
        ],
        actions: vec![
            RowAction::copy("Copy", "Network", name.clone()),
            RowAction::submit("Inspect", format!("inspect network {name}")),
        ],
    }
}

/// Table the assistant built itself; columns come from its headers as-is.
pub fn generic_table(table: &AssistantTable) -> TableView {
    let headers = table.headers.iter().map(|h| Header::new(clean(h))).collect();
    let body = if table.rows.is_empty() {
        TableBody::Empty("No rows.".to_string())
    } else {
        TableBody::Rows(
            table
                .rows
                .iter()
                .map(|row| RowView {
                    template: TemplateKey::GenericRow,
                    cells: row.iter().map(|cell| Cell::new(clean(cell))).collect(),
                    actions: Vec::new(),
                })
                .collect(),
        )
    };
    TableView { headers, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fragment::RowActionKind;
    use pretty_assertions::assert_eq;

    fn container(status: &str, is_self: bool) -> Row {
        Row::Container(ContainerRow {
            id: "abc123".to_string(),
            name: "web".to_string(),
            image: "nginx".to_string(),
            status: status.to_string(),
            ports: String::new(),
            is_self,
        })
    }

    #[test]
    fn test_builtins_cover_every_kind() {
        let registry = RendererRegistry::with_builtins();
        for kind in RowKind::ALL {
            assert!(registry.get(kind).is_some(), "missing renderer for {}", kind.name());
        }
    }

    #[test]
    fn test_duplicate_template_is_refused() {
        let mut registry = RendererRegistry::new();
        let mut descriptors = builtin_descriptors();
        let container = descriptors.remove(0);
        let mut clash = descriptors.remove(0);
        clash.row_template = container.row_template;

        registry.register(container).unwrap();
        assert_eq!(
            registry.register(clash),
            Err(RegistryError::DuplicateTemplate("container-table-row"))
        );
        assert!(registry.get(RowKind::Image).is_none());
    }

    #[test]
    fn test_duplicate_kind_is_refused() {
        let mut registry = RendererRegistry::with_builtins();
        let again = builtin_descriptors().remove(0);
        assert_eq!(registry.register(again), Err(RegistryError::DuplicateKind("container")));
    }

    #[test]
    fn test_unregistered_kind_renders_nothing() {
        let registry = RendererRegistry::new();
        assert_eq!(registry.render(RowKind::Container, &[]), None);
    }

    #[test]
    fn test_empty_rows_show_empty_message() {
        let registry = RendererRegistry::with_builtins();
        let view = registry.render(RowKind::Volume, &[]).unwrap();
        assert_eq!(view.body, TableBody::Empty("No volumes.".to_string()));
        assert_eq!(view.headers.len(), 4);
    }

    #[test]
    fn test_running_container_actions_enabled() {
        let registry = RendererRegistry::with_builtins();
        let view = registry
            .render(RowKind::Container, &[container("Up 2 hours", false)])
            .unwrap();
        let row = &view.rows()[0];
        assert!(row.actions.iter().all(|a| a.enabled));
        assert_eq!(row.actions[2].kind, RowActionKind::Submit("docker logs web".to_string()));
        assert_eq!(row.actions[3].kind, RowActionKind::Submit("stop web".to_string()));
    }

    #[test]
    fn test_stopped_container_actions_disabled_not_omitted() {
        let registry = RendererRegistry::with_builtins();
        let view = registry
            .render(RowKind::Container, &[container("Exited (0) 3 days ago", false)])
            .unwrap();
        let row = &view.rows()[0];
        let enabled: Vec<_> = row.actions.iter().map(|a| (a.label, a.enabled)).collect();
        assert_eq!(
            enabled,
            vec![("Copy", true), ("Inspect", true), ("Logs", false), ("Stop", false)]
        );
        assert_eq!(row.cells[0].tone, Tone::Muted);
    }

    #[test]
    fn test_self_container_is_marked_and_locked() {
        let registry = RendererRegistry::with_builtins();
        let view = registry
            .render(RowKind::Container, &[container("Up 5 minutes", true)])
            .unwrap();
        let row = &view.rows()[0];
        assert_eq!(row.cells[1].text, "web (this)");
        assert!(!row.actions[3].enabled);
        // Copy still uses the bare name
        assert_eq!(
            row.actions[0].kind,
            RowActionKind::Copy {
                label: "Name".to_string(),
                text: "web".to_string()
            }
        );
    }

    #[test]
    fn test_image_size_in_mb() {
        let row = image_row(&ImageRow {
            id: "sha256:0123456789ab".to_string(),
            repository: "nginx".to_string(),
            tag: "latest".to_string(),
            created: "2024-05-01 10:00:00".to_string(),
            size: "187.6".to_string(),
        });
        assert_eq!(row.cells[2].text, "0123456789ab");
        assert_eq!(row.cells[4].text, "187.6 MB");
        assert_eq!(row.actions[1].kind, RowActionKind::Submit("inspect image 0123456789ab".to_string()));
        assert_eq!(
            row.actions[0].kind,
            RowActionKind::Copy {
                label: "Image".to_string(),
                text: "nginx:latest".to_string()
            }
        );
    }

    #[test]
    fn test_volume_remove_action() {
        let row = volume_row(&VolumeRow {
            name: "data_old".to_string(),
            driver: "local".to_string(),
            created_at: "2024-01-01".to_string(),
        });
        assert_eq!(row.actions[2].kind, RowActionKind::Submit("rm volume data_old".to_string()));
    }

    #[test]
    fn test_rows_of_another_kind_are_skipped() {
        let registry = RendererRegistry::with_builtins();
        let stray = Row::Log(LogRow {
            timestamp: "-".to_string(),
            log_entry: "hello".to_string(),
        });
        let view = registry
            .render(RowKind::Container, &[container("Up", false), stray])
            .unwrap();
        assert_eq!(view.rows().len(), 1);
    }

    #[test]
    fn test_generic_table() {
        let view = generic_table(&AssistantTable {
            headers: vec!["Name".to_string()],
            rows: vec![],
        });
        assert_eq!(view.body, TableBody::Empty("No rows.".to_string()));
    }
}
