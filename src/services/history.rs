/// Append-only list of completed interactions, shown newest first.
#[derive(Debug, Clone)]
pub struct History<T> {
    records: Vec<T>,
}

impl<T> History<T> {
    pub fn new() -> Self {
        History {
            records: Vec::new(),
        }
    }

    pub fn append(&mut self, record: T) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Reversed view over the stored records. The underlying order is untouched, so
    /// the view can be rebuilt for every render.
    pub fn list_most_recent_first(&self) -> std::iter::Rev<std::slice::Iter<'_, T>> {
        self.records.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
impl<T> History<T> {
    pub fn latest(&self) -> Option<&T> {
        self.records.last()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}
