//! Snapshot → table rows. Pure: no I/O, no terminal styling (see `ui`).

use super::load::{leading_number, LoadLevel};
use hoststat_core::{GpuReading, StatsReport, SystemSnapshot};
use std::str::FromStr;

pub const HEADERS: [&str; 4] = ["CPU/GPU", "Utilization", "Used (MiB)", "Total (MiB)"];
pub const PLACEHOLDER: &str = "-";
/// Stands in for a grouped GPU index the snapshot does not contain.
pub const ABSENT_GPU: &str = "x";
pub const GROUP_DELIMITER: &str = " | ";
/// Grouped utilization values are zero-padded to this many digits.
pub const UTIL_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Label,
    Muted,
    Error,
    Load(LoadLevel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tone: Tone,
}

/// A cell is a run of segments so one cell can carry several colors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub segments: Vec<Segment>,
}

impl Cell {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        let mut cell = Self::default();
        cell.push(text, tone);
        cell
    }

    fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Plain)
    }

    fn push(&mut self, text: impl Into<String>, tone: Tone) {
        self.segments.push(Segment {
            text: text.into(),
            tone,
        });
    }

    /// Visible text without styling.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Cells([Cell; 4]),
    Separator,
}

impl Row {
    pub fn cells(&self) -> Option<&[Cell; 4]> {
        match self {
            Row::Cells(cells) => Some(cells),
            Row::Separator => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// 逻辑分组：组名 + 有序的物理 GPU 下标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuGroup {
    pub name: String,
    pub indices: Vec<usize>,
}

impl FromStr for GpuGroup {
    type Err = String;

    /// `NAME=IDX,IDX,...`, e.g. `rig=0,1,2,3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, list) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=IDX,IDX,..., got {s:?}"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err("group name is empty".into());
        }
        let indices = list
            .split(',')
            .map(str::trim)
            .map(|idx| {
                idx.parse::<usize>()
                    .map_err(|_| format!("invalid GPU index {idx:?}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.to_string(),
            indices,
        })
    }
}

/// How the GPU block is drawn. Fixed for the lifetime of a poller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GpuLayout {
    /// One row per device between two separator rows.
    #[default]
    PerDevice,
    /// A single row summarizing the configured indices.
    Grouped(GpuGroup),
}

pub fn render_table(snapshot: &SystemSnapshot, layout: &GpuLayout) -> Table {
    let report = match snapshot {
        SystemSnapshot::Error { error } => {
            return Table {
                rows: vec![error_row(error)],
            }
        }
        SystemSnapshot::Stats(report) => report,
    };

    let mut rows = vec![cpu_row(report)];
    match layout {
        GpuLayout::PerDevice => {
            rows.push(Row::Separator);
            rows.extend(
                report
                    .gpu_stats
                    .iter()
                    .enumerate()
                    .map(|(i, gpu)| device_row(i, gpu)),
            );
            rows.push(Row::Separator);
        }
        GpuLayout::Grouped(group) => rows.push(group_row(group, &report.gpu_stats)),
    }
    Table { rows }
}

fn error_row(message: &str) -> Row {
    Row::Cells([
        Cell::new("Error", Tone::Error),
        Cell::new(or_placeholder(message), Tone::Error),
        Cell::new(PLACEHOLDER, Tone::Muted),
        Cell::new(PLACEHOLDER, Tone::Muted),
    ])
}

fn cpu_row(report: &StatsReport) -> Row {
    Row::Cells([
        Cell::new("CPU", Tone::Label),
        utilization_cell(&report.cpu_stats.cpu_utilization),
        Cell::plain(or_placeholder(&report.ram_stats.ram_used)),
        Cell::plain(or_placeholder(&report.ram_stats.ram_total)),
    ])
}

fn device_row(index: usize, gpu: &GpuReading) -> Row {
    Row::Cells([
        Cell::new(
            format!("GPU {} - {}", index + 1, model_token(&gpu.name)),
            Tone::Label,
        ),
        utilization_cell(&gpu.utilization),
        Cell::plain(or_placeholder(&gpu.memory_used)),
        Cell::plain(or_placeholder(&gpu.memory_total)),
    ])
}

fn group_row(group: &GpuGroup, gpus: &[GpuReading]) -> Row {
    let mut utilization = Cell::default();
    let (mut used, mut total) = (0u64, 0u64);

    for (n, &index) in group.indices.iter().enumerate() {
        if n > 0 {
            utilization.push(GROUP_DELIMITER, Tone::Muted);
        }
        let Some(gpu) = gpus.get(index) else {
            utilization.push(ABSENT_GPU, Tone::Muted);
            continue;
        };
        match leading_number(&gpu.utilization) {
            Some(pct) => utilization.push(
                format!("{:0width$}%", pct, width = UTIL_WIDTH),
                Tone::Load(LoadLevel::classify(pct)),
            ),
            None => utilization.push(or_placeholder(&gpu.utilization), Tone::Plain),
        }
        used = used.saturating_add(leading_number(&gpu.memory_used).unwrap_or(0));
        total = total.saturating_add(leading_number(&gpu.memory_total).unwrap_or(0));
    }

    Row::Cells([
        Cell::new(group.name.clone(), Tone::Label),
        utilization,
        Cell::plain(format!("{used} MiB")),
        Cell::plain(format!("{total} MiB")),
    ])
}

fn utilization_cell(value: &str) -> Cell {
    let tone = leading_number(value)
        .map(|pct| Tone::Load(LoadLevel::classify(pct)))
        .unwrap_or(Tone::Plain);
    Cell::new(or_placeholder(value), tone)
}

/// "NVIDIA GeForce RTX 3090" → "3090"
fn model_token(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or(PLACEHOLDER)
}

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}
