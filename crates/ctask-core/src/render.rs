use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::calendar::{CalendarCell, MonthGrid};

const CELL_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            color: io::stdout().is_terminal(),
        }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn print_line(&mut self, line: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        Ok(())
    }

    #[tracing::instrument(skip(self, grid), fields(month = %grid.label))]
    pub fn print_month(&mut self, grid: &MonthGrid) -> anyhow::Result<()> {
        let text = self.month_text(grid);
        let mut out = io::stdout().lock();
        write!(out, "{text}")?;
        Ok(())
    }

    /// Month grid as text: `[d]` marks the selected day, `*` today.
    #[must_use]
    pub fn month_text(&self, grid: &MonthGrid) -> String {
        let row_width = CELL_WIDTH * 7;
        let label_width = UnicodeWidthStr::width(grid.label.as_str());
        let pad = row_width.saturating_sub(label_width) / 2;

        let mut text = String::new();
        text.push_str(&" ".repeat(pad));
        text.push_str(&grid.label);
        text.push('\n');

        for header in &grid.weekday_headers {
            text.push_str(&format!("{header:>3} "));
        }
        text.push('\n');

        for (idx, cell) in grid.cells.iter().enumerate() {
            let rendered = match cell {
                CalendarCell::Blank => " ".repeat(CELL_WIDTH),
                CalendarCell::Day(day) => {
                    let body = if day.selected {
                        format!("[{:>2}]", day.day)
                    } else if day.today {
                        format!(" {:>2}*", day.day)
                    } else {
                        format!(" {:>2} ", day.day)
                    };
                    if day.today && day.selected {
                        self.paint(&body, "1;32")
                    } else if day.selected {
                        self.paint(&body, "1")
                    } else if day.today {
                        self.paint(&body, "32")
                    } else {
                        body
                    }
                }
            };
            text.push_str(&rendered);
            if idx % 7 == 6 {
                text.push('\n');
            }
        }
        if grid.cells.len() % 7 != 0 {
            text.push('\n');
        }
        text
    }

    fn paint(&self, s: &str, code: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::calendar::{CalendarView, YearMonth};

    #[test]
    fn marks_selected_and_today() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date");
        let view = CalendarView::new(
            YearMonth {
                year: 2025,
                month: 1,
            },
            NaiveDate::from_ymd_opt(2025, 1, 9),
        );
        let text = Renderer::plain().month_text(&view.render(today));
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0].trim(), "Jan 2025");
        assert_eq!(lines[1], " Su  Mo  Tu  We  Th  Fr  Sa ");
        assert!(lines[2].ends_with("  1   2   3*  4 "));
        assert!(lines[3].contains("[ 9]"));
        assert_eq!(lines.len(), 7);
    }
}
