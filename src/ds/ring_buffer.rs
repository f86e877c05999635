#![allow(clippy::len_without_is_empty)]

/// A fixed-size ringbuffer
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be positive");
        Self {
            buffer: Vec::<T>::with_capacity(capacity),
            ix: 0,
            capacity,
        }
    }

    /// Returns the buffer length
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Insert an element into the buffer, overwriting the oldest element once full
    pub fn push(&mut self, item: T) {
        if self.ix >= self.len() {
            self.buffer.push(item);
        } else {
            self.buffer[self.ix] = item;
        }
        self.ix = (self.ix + 1) % self.capacity;
    }

    /// Iterate from the oldest to the newest element
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        let split = if self.len() < self.capacity { 0 } else { self.ix };
        let (newer, older) = self.buffer.split_at(split);
        older.iter().chain(newer.iter())
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy the contents out, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ringbuffer_functional() {
        let mut buf = RingBuffer::new(4);
        assert_eq!(buf.len(), 0, "initialized empty");

        for i in 0..4 {
            buf.push(i * 2);
        }

        assert_eq!(buf.len(), 4, "length correct");
        assert_eq!(buf.to_vec(), vec![0, 2, 4, 6], "contents correct");

        buf.push(1);
        buf.push(3);
        assert_eq!(buf.len(), 4, "length unchanged");
        assert_eq!(buf.to_vec(), vec![4, 6, 1, 3], "oldest overwritten, ordered oldest first");

        for i in 10..15 {
            buf.push(i);
        }
        assert_eq!(buf.to_vec(), vec![11, 12, 13, 14], "wraps more than once");
    }

    #[test]
    fn ordered_iteration_before_wrap() {
        let mut buf = RingBuffer::new(3);
        buf.push('a');
        buf.push('b');
        assert_eq!(buf.to_vec(), vec!['a', 'b']);
        assert_eq!(buf.iter().rev().copied().collect::<String>(), "ba");

        buf.push('c');
        assert_eq!(buf.to_vec(), vec!['a', 'b', 'c'], "full but not wrapped");
    }
}
