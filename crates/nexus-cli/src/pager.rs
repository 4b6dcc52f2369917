/// Paginates a fully-rendered response into screen-sized chunks.
pub const DEFAULT_LINES_PER_PAGE: usize = 24;

#[derive(Debug)]
pub struct Pager {
    lines: Vec<String>,
    offset: usize,
    lines_per_page: usize,
    active: bool,
}

/// One page of output plus whether more remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub text: String,
    pub has_more: bool,
}

impl Pager {
    pub fn new(lines_per_page: usize) -> Self {
        Self {
            lines: Vec::new(),
            offset: 0,
            lines_per_page: lines_per_page.max(1),
            active: false,
        }
    }

    /// Begin paging a rendered response. Normal editing is suspended for as
    /// long as [`Pager::is_active`] returns true.
    pub fn start(&mut self, rendered: &str) -> Page {
        self.lines = rendered.lines().map(str::to_string).collect();
        self.offset = 0;
        let page = self.take_page();
        self.active = self.offset < self.lines.len();
        page
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Space pressed while paging: emit the next page.
    pub fn advance(&mut self) -> Page {
        let page = self.take_page();
        self.active = self.offset < self.lines.len();
        page
    }

    /// `q` pressed, or any other key, discards the remainder.
    pub fn stop(&mut self) {
        self.lines.clear();
        self.offset = 0;
        self.active = false;
    }

    fn take_page(&mut self) -> Page {
        let end = (self.offset + self.lines_per_page).min(self.lines.len());
        let text = self.lines[self.offset..end].join("\n");
        self.offset = end;
        Page {
            text,
            has_more: self.offset < self.lines.len(),
        }
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_LINES_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_output_fits_on_one_page() {
        let mut pager = Pager::new(24);
        let page = pager.start("line1\nline2\nline3");
        assert_eq!(page.text, "line1\nline2\nline3");
        assert!(!page.has_more);
        assert!(!pager.is_active());
    }

    #[test]
    fn long_output_pages_across_space_presses() {
        let body: String = (0..30).map(|i| format!("line{i}\n")).collect::<String>();
        let body = body.trim_end();
        let mut pager = Pager::new(24);

        let first = pager.start(body);
        assert!(first.has_more);
        assert!(pager.is_active());
        assert_eq!(first.text.lines().count(), 24);

        let second = pager.advance();
        assert!(!second.has_more);
        assert!(!pager.is_active());
        assert_eq!(second.text.lines().count(), 6);
    }

    #[test]
    fn stop_discards_remaining_pages() {
        let body: String = (0..30).map(|i| format!("line{i}\n")).collect();
        let mut pager = Pager::new(24);
        pager.start(&body);
        pager.stop();
        assert!(!pager.is_active());
    }
}
