//! Per-user browsing state, passed explicitly instead of living in globals

use crate::table::{Row, Table};

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default number of recently selected colors kept
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Interaction state of one user session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Sheet currently browsed
    pub active_sheet: Option<String>,
    /// Row filter for the active sheet
    pub search_term: String,
    /// Current page (1-based)
    pub page: usize,
    /// Color whose formulations are shown
    pub selected_color: Option<String>,
    /// Filter for the color picker
    pub color_search: String,
    recent_colors: Vec<String>,
    favorites: Vec<String>,
    recent_limit: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

impl Session {
    /// Create an empty session keeping at most `recent_limit` recent colors
    pub fn new(recent_limit: usize) -> Self {
        Self {
            active_sheet: None,
            search_term: String::new(),
            page: 1,
            selected_color: None,
            color_search: String::new(),
            recent_colors: Vec::new(),
            favorites: Vec::new(),
            recent_limit,
        }
    }

    /// Browse another sheet; resets search, page and selection
    pub fn switch_sheet<S: Into<String>>(&mut self, name: S) {
        self.active_sheet = Some(name.into());
        self.search_term.clear();
        self.page = 1;
        self.selected_color = None;
    }

    /// Change the row filter and go back to the first page
    pub fn set_search<S: Into<String>>(&mut self, term: S) {
        self.search_term = term.into();
        self.page = 1;
    }

    /// Select a color and move it to the front of the recent list
    pub fn select_color<S: Into<String>>(&mut self, code: S) {
        let code = code.into();
        self.recent_colors.retain(|c| *c != code);
        self.recent_colors.insert(0, code.clone());
        self.recent_colors.truncate(self.recent_limit);
        self.selected_color = Some(code);
    }

    /// Recently selected colors, most recent first
    pub fn recent_colors(&self) -> &[String] {
        &self.recent_colors
    }

    /// Add a color to the favorites, or remove it if already there.
    ///
    /// Returns whether the color is a favorite afterwards.
    pub fn toggle_favorite(&mut self, code: &str) -> bool {
        if let Some(pos) = self.favorites.iter().position(|c| c == code) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(code.to_string());
            true
        }
    }

    /// Check if a color is a favorite
    pub fn is_favorite(&self, code: &str) -> bool {
        self.favorites.iter().any(|c| c == code)
    }

    /// Favorite colors in the order they were added
    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    /// The active sheet's rows matching the search term, paged
    pub fn view<'a>(&self, table: &'a Table, page_size: usize) -> Page<'a> {
        paginate(filter_rows(table, &self.search_term), self.page, page_size)
    }
}

/// Rows with any cell containing `term`, ignoring case
///
/// A blank term keeps every row, including empty ones.
pub fn filter_rows<'a>(table: &'a Table, term: &str) -> Vec<&'a Row> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return table.rows().iter().collect();
    }
    table
        .rows()
        .iter()
        .filter(|row| {
            row.iter()
                .any(|cell| cell.to_string().to_lowercase().contains(&term))
        })
        .collect()
}

/// One page of rows
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub rows: Vec<&'a Row>,
    /// Page shown (1-based, clamped)
    pub page: usize,
    pub total_pages: usize,
    /// Rows across all pages
    pub total_rows: usize,
}

/// Cut `rows` into pages of `page_size` and return page `page`
///
/// `page` is clamped to the valid range, so an out-of-range request shows the
/// last page and an empty input shows an empty page 1.
pub fn paginate<'a>(rows: Vec<&'a Row>, page: usize, page_size: usize) -> Page<'a> {
    let page_size = page_size.max(1);
    let total_rows = rows.len();
    let total_pages = (total_rows + page_size - 1) / page_size;
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * page_size;

    Page {
        rows: rows.into_iter().skip(start).take(page_size).collect(),
        page,
        total_pages,
        total_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn table(n: usize) -> Table {
        let rows = (0..n)
            .map(|i| vec![Cell::text(format!("C{i}")), Cell::Number(i as f64)])
            .collect();
        Table::new(vec![Cell::text("Code"), Cell::text("N")], rows)
    }

    #[test]
    fn test_recent_colors_are_deduplicated_and_capped() {
        let mut session = Session::default();
        for code in ["A", "B", "C", "D", "E", "F", "B"] {
            session.select_color(code);
        }
        assert_eq!(session.recent_colors(), &["B", "F", "E", "D", "C"]);
        assert_eq!(session.selected_color.as_deref(), Some("B"));
    }

    #[test]
    fn test_toggle_favorite() {
        let mut session = Session::default();
        assert!(session.toggle_favorite("A"));
        assert!(session.toggle_favorite("B"));
        assert!(session.is_favorite("A"));
        assert!(!session.toggle_favorite("A"));
        assert_eq!(session.favorites(), &["B"]);
    }

    #[test]
    fn test_switch_sheet_resets_view() {
        let mut session = Session::default();
        session.set_search("x");
        session.page = 4;
        session.select_color("A");
        session.switch_sheet("BOM Item");

        assert_eq!(session.active_sheet.as_deref(), Some("BOM Item"));
        assert!(session.search_term.is_empty());
        assert_eq!(session.page, 1);
        assert!(session.selected_color.is_none());
        assert_eq!(session.recent_colors(), &["A"]);
    }

    #[test]
    fn test_filter_rows_matches_any_cell() {
        let t = table(12);
        assert_eq!(filter_rows(&t, "c1").len(), 3); // C1, C10, C11
        assert_eq!(filter_rows(&t, "7").len(), 1);
        assert_eq!(filter_rows(&t, "  ").len(), 12);
        assert!(filter_rows(&t, "zzz").is_empty());
    }

    #[test]
    fn test_paginate() {
        let t = table(23);
        let rows = filter_rows(&t, "");

        let page = paginate(rows.clone(), 3, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_rows, 23);
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.rows[0][0], Cell::text("C20"));

        let page = paginate(rows.clone(), 99, 10);
        assert_eq!(page.page, 3);

        let page = paginate(rows, 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.rows.len(), 10);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::new(), 5, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn test_session_view() {
        let t = table(15);
        let mut session = Session::default();
        session.set_search("C1");
        let page = session.view(&t, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_rows, 6); // C1, C10..C14
    }
}
