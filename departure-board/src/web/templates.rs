//! Askama templates for the web frontend.

use askama::Template;

use crate::board::{BoardConfig, BoardRow, Headings};

/// The departure board page.
#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate {
    pub title: String,
    pub refresh_secs: u64,
    pub loaded: bool,
    pub display_icons: bool,
    /// Fixed table width in pixels.
    pub table_width: Option<u32>,
    pub headings: Headings,
    pub rows: Vec<RowView>,
}

/// One table row as the template draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub icon: Option<&'static str>,
    /// Line, destination and departure, in column order.
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub text: String,
    /// Render inside a marquee.
    pub scroll: bool,
}

impl RowView {
    pub fn new(row: BoardRow, config: &BoardConfig) -> Self {
        let cells = [row.line, row.destination, row.departure]
            .into_iter()
            .map(|text| CellView {
                scroll: config.scrolls(&text),
                text,
            })
            .collect();
        Self {
            icon: row.icon,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> BoardRow {
        BoardRow {
            icon: Some("train"),
            line: "S8".into(),
            destination: "Mönchengladbach Hbf".into(),
            departure: "12 min".into(),
        }
    }

    #[test]
    fn only_long_cells_scroll_with_fixed_width() {
        let config = BoardConfig {
            table_width: Some(400),
            scroll_after: 15,
            ..BoardConfig::default()
        };
        let view = RowView::new(row(), &config);

        assert_eq!(view.icon, Some("train"));
        let scroll: Vec<bool> = view.cells.iter().map(|c| c.scroll).collect();
        assert_eq!(scroll, vec![false, true, false]);
        assert_eq!(view.cells[1].text, "Mönchengladbach Hbf");
    }

    #[test]
    fn nothing_scrolls_without_fixed_width() {
        let view = RowView::new(row(), &BoardConfig::default());
        assert!(view.cells.iter().all(|c| !c.scroll));
    }
}
