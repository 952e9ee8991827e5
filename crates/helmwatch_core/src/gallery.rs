/// Ordered, append-only list of violator crops shown for the current job.
///
/// Growth is driven by the length of the latest reported image list: items
/// already shown are never re-rendered, removed, or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gallery {
    items: Vec<String>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the tail of `images` beyond the current item count.
    ///
    /// Returns how many items were appended; zero when `images` is not
    /// longer than what is already shown.
    pub fn sync(&mut self, images: &[String]) -> usize {
        let existing = self.items.len();
        if images.len() <= existing {
            return 0;
        }
        self.items.extend_from_slice(&images[existing..]);
        images.len() - existing
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Gallery;

    fn refs(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn sync_appends_only_the_missing_tail() {
        let mut gallery = Gallery::new();
        assert_eq!(gallery.sync(&refs(&["a.jpg"])), 1);
        assert_eq!(gallery.sync(&refs(&["a.jpg", "b.jpg", "c.jpg"])), 2);
        assert_eq!(gallery.items(), refs(&["a.jpg", "b.jpg", "c.jpg"]).as_slice());
    }

    #[test]
    fn sync_is_idempotent() {
        let mut gallery = Gallery::new();
        let images = refs(&["a.jpg", "b.jpg"]);
        gallery.sync(&images);
        assert_eq!(gallery.sync(&images), 0);
        assert_eq!(gallery.len(), 2);
    }

    #[test]
    fn shorter_list_never_shrinks_gallery() {
        let mut gallery = Gallery::new();
        gallery.sync(&refs(&["a.jpg", "b.jpg"]));
        assert_eq!(gallery.sync(&refs(&["a.jpg"])), 0);
        assert_eq!(gallery.sync(&[]), 0);
        assert_eq!(gallery.items(), refs(&["a.jpg", "b.jpg"]).as_slice());
    }

    #[test]
    fn empty_list_leaves_gallery_empty() {
        let mut gallery = Gallery::new();
        assert_eq!(gallery.sync(&[]), 0);
        assert!(gallery.is_empty());
    }
}
