const PREALLOCATED: usize = 4096;

/// Fixed-capacity FIFO. Pushing into a full buffer overwrites the oldest
/// element and hands it back.
#[derive(Clone, Debug)]
pub(crate) struct RingBuffer<T> {
    buffer: Vec<T>,
    head: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// `capacity` must be non-zero. At most `PREALLOCATED` slots are
    /// reserved up front; the rest grow on demand.
    #[must_use]
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring buffer capacity must be non-zero");

        Self {
            buffer: Vec::with_capacity(capacity.min(PREALLOCATED)),
            head: 0,
            capacity,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    #[inline]
    pub(crate) fn push(&mut self, value: T) -> Option<T> {
        if self.is_full() {
            let old = std::mem::replace(&mut self.buffer[self.head], value);

            self.head += 1;
            if self.head == self.capacity {
                self.head = 0;
            }

            Some(old)
        } else {
            self.buffer.push(value);

            None
        }
    }

    /// Swaps the newest element, returning the old one.
    #[inline]
    pub(crate) fn replace_last(&mut self, value: T) -> Option<T> {
        let tail = self.physical(self.len().checked_sub(1)?);

        Some(std::mem::replace(&mut self.buffer[tail], value))
    }

    /// Element at logical position `index`, `0` being the oldest.
    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        (index < self.len()).then(|| &self.buffer[self.physical(index)])
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<&T> {
        self.get(self.len().checked_sub(1)?)
    }

    /// Element `back` positions before the newest (`0` is the newest).
    #[inline]
    pub(crate) fn nth_back(&self, back: usize) -> Option<&T> {
        self.get(self.len().checked_sub(back + 1)?)
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        let (newer, older) = self.buffer.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub(crate) fn clear(&mut self) {
        self.buffer.clear();
        self.head = 0;
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        let slot = self.head + index;
        if slot >= self.capacity {
            slot - self.capacity
        } else {
            slot
        }
    }
}
