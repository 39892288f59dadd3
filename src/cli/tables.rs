use crate::core::services::{RegisterStats, ShareholderView, TransactionView};
use crate::utils::format_amount;

/// Describes how a column aligns its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn left(header: &str) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Left,
        }
    }

    pub fn right(header: &str) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Right,
        }
    }
}

/// A plain-text grid with header row and separator rule.
pub struct Table {
    columns: Vec<TableColumn>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mut width = column.header.chars().count();
                for row in &self.rows {
                    if let Some(cell) = row.get(idx) {
                        width = width.max(cell.chars().count());
                    }
                }
                width
            })
            .collect()
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let text = row.get(idx).map(|s| s.as_str()).unwrap_or("");
                let pad = widths[idx].saturating_sub(text.chars().count());
                match column.alignment {
                    Alignment::Left => format!("{}{}", text, " ".repeat(pad)),
                    Alignment::Right => format!("{}{}", " ".repeat(pad), text),
                }
            })
            .collect();
        cells.join("  ").trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut out = String::new();
        out.push_str(&self.render_row(&headers, &widths));
        out.push('\n');
        let rule_width: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(rule_width));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&self.render_row(row, &widths));
        }
        out
    }
}

/// The shareholder grid as the register UI lays it out.
pub fn shareholder_table(views: &[ShareholderView]) -> Table {
    let mut table = Table::new(vec![
        TableColumn::left("Namn"),
        TableColumn::left("Person-/orgnr"),
        TableColumn::right("Antal aktier"),
        TableColumn::left("Slag"),
        TableColumn::right("Aktienr"),
        TableColumn::right("Ägarandel"),
        TableColumn::right("Röster"),
        TableColumn::right("Röstandel"),
    ]);
    for view in views {
        table.push_row(vec![
            view.name.clone(),
            view.id_number.clone(),
            view.shares.to_string(),
            view.share_class.label().into(),
            format!("{}-{}", view.share_number_from, view.share_number_to),
            format!("{}%", view.ownership_percent),
            view.votes.to_string(),
            format!("{}%", view.vote_percent),
        ]);
    }
    table
}

pub fn transaction_table(views: &[TransactionView]) -> Table {
    let mut table = Table::new(vec![
        TableColumn::left("Datum"),
        TableColumn::left("Typ"),
        TableColumn::left("Från"),
        TableColumn::left("Till"),
        TableColumn::right("Antal"),
        TableColumn::right("Pris/aktie"),
        TableColumn::right("Totalt"),
    ]);
    for view in views {
        table.push_row(vec![
            view.date.to_string(),
            view.kind.label().into(),
            view.from.clone().unwrap_or_default(),
            view.to.clone().unwrap_or_default(),
            view.shares.to_string(),
            format_amount(view.price_per_share),
            format_amount(view.total_price),
        ]);
    }
    table
}

pub fn stats_line(stats: &RegisterStats) -> String {
    format!(
        "{} aktieägare, {} aktier, {} röster",
        stats.shareholder_count, stats.total_shares, stats.total_votes
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_aligns_columns_and_separates_header() {
        let mut table = Table::new(vec![TableColumn::left("Namn"), TableColumn::right("Antal")]);
        table.push_row(vec!["Anna Alm".into(), "600".into()]);
        table.push_row(vec!["Bo".into(), "1000".into()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Namn"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].contains("Anna Alm"));
        assert!(lines[3].ends_with("1000"));
    }
}
