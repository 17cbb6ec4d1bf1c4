//! 终端显示：启动时创建一次，交给轮询循环使用。

use super::output::OutputFormat;
use super::table::Table;
use super::ui::format_table;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use hoststat_core::SystemSnapshot;
use std::io::{self, Stdout, Write};

pub struct Display {
    out: Stdout,
    output: OutputFormat,
    /// 仅 table 模式进入备用屏幕
    screen_active: bool,
}

impl Display {
    pub fn new(output: OutputFormat) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        let screen_active = output == OutputFormat::Table;
        if screen_active {
            execute!(out, EnterAlternateScreen, Hide)?;
        }
        Ok(Self {
            out,
            output,
            screen_active,
        })
    }

    /// Replace whatever the previous poll drew.
    pub fn update(
        &mut self,
        snapshot: &SystemSnapshot,
        table: &Table,
        footer: &str,
    ) -> anyhow::Result<()> {
        match self.output {
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string(snapshot)?)?;
            }
            OutputFormat::Table => {
                queue!(self.out, MoveTo(0, 0), Clear(ClearType::FromCursorDown))?;
                for line in format_table(table) {
                    writeln!(self.out, "{line}")?;
                }
                writeln!(self.out)?;
                writeln!(self.out, "{footer}")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Leave the alternate screen and show the cursor again. Safe to call twice.
    pub fn restore(&mut self) -> anyhow::Result<()> {
        if self.screen_active {
            self.screen_active = false;
            execute!(self.out, Show, LeaveAlternateScreen)?;
        }
        Ok(())
    }
}
