use clap::ValueEnum;

/// `table` redraws in place on the alternate screen; `json` prints one snapshot per line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
