use std::mem;

/// Ping-pong pair of per-pixel buffers.
///
/// Passes read one buffer and write the other, never both at once - that is
/// the only concurrency discipline the pipeline needs, and it must hold even
/// on a single thread, since spatial passes read pixels other than the one
/// they are writing.
#[derive(Clone, Debug)]
pub struct DoubleBuffered<T> {
    front: Vec<T>,
    back: Vec<T>,
}

impl<T> DoubleBuffered<T>
where
    T: Clone + Default,
{
    pub fn new(len: usize) -> Self {
        Self {
            front: vec![T::default(); len],
            back: vec![T::default(); len],
        }
    }

    /// The most recently published buffer.
    pub fn curr(&self) -> &[T] {
        &self.front
    }

    /// The buffer published before [`Self::curr()`]; for cross-frame buffers
    /// this is the previous frame's data.
    pub fn prev(&self) -> &[T] {
        &self.back
    }

    /// The buffer the next [`Self::swap()`] will publish.
    pub fn write(&mut self) -> &mut [T] {
        &mut self.back
    }

    pub fn swap(&mut self) {
        mem::swap(&mut self.front, &mut self.back);
    }
}
