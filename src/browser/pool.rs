use chromiumoxide::page::Page;

/// Tracks the pages a session has handed out, so teardown can close
/// every browsing context before the transport drops.
#[derive(Default)]
pub struct PagePool {
    pages: Vec<Page>,
}

impl PagePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Forget a page that is being closed explicitly. Returns false if
    /// the page was not tracked (already removed).
    pub fn remove(&mut self, page: &Page) -> bool {
        let target: &str = page.target_id().as_ref();
        if let Some(pos) = self
            .pages
            .iter()
            .position(|p| p.target_id().as_ref() == target)
        {
            self.pages.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Hand the remaining pages over for teardown.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
