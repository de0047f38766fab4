use super::frame::ProgressFrame;

/// Owner token returned by [`FrameStack::push`]; only its holder may pop the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKey(u64);

#[derive(Debug)]
struct Slot {
    key: FrameKey,
    frame: ProgressFrame,
}

/// Nested progress frames of one pipeline execution, one per active aware stage.
#[derive(Debug, Default)]
pub struct FrameStack {
    slots: Vec<Slot>,
    next_key: u64,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a placeholder frame with activity id `depth + 1`, parented to the top.
    pub fn push(&mut self) -> FrameKey {
        let mut activity_id = self.slots.len() as u32 + 1;
        // A frame released out of order can leave its id behind on a deeper slot.
        while self.slots.iter().any(|s| s.frame.activity_id == activity_id) {
            activity_id += 1;
        }
        let parent = self.slots.last().map(|s| s.frame.activity_id);

        self.next_key += 1;
        let key = FrameKey(self.next_key);
        self.slots.push(Slot {
            key,
            frame: ProgressFrame::new(activity_id, parent),
        });
        key
    }

    /// Remove the frame owned by `key`, wherever it sits.
    pub fn pop(&mut self, key: FrameKey) -> Option<ProgressFrame> {
        let position = self.position(key)?;
        if position + 1 != self.slots.len() {
            tracing::debug!(
                activity_id = self.slots[position].frame.activity_id,
                depth = self.slots.len(),
                "releasing progress frame out of order"
            );
        }
        Some(self.slots.remove(position).frame)
    }

    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn current(&self) -> Option<&ProgressFrame> {
        self.slots.last().map(|s| &s.frame)
    }

    /// Second frame from the top.
    pub fn parent(&self) -> Option<&ProgressFrame> {
        let n = self.slots.len();
        if n < 2 {
            return None;
        }
        Some(&self.slots[n - 2].frame)
    }

    pub fn contains(&self, key: FrameKey) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: FrameKey) -> Option<&ProgressFrame> {
        self.position(key).map(|i| &self.slots[i].frame)
    }

    pub fn get_mut(&mut self, key: FrameKey) -> Option<&mut ProgressFrame> {
        let position = self.position(key)?;
        Some(&mut self.slots[position].frame)
    }

    /// Key of the frame directly beneath the one owned by `key`.
    pub fn parent_of(&self, key: FrameKey) -> Option<FrameKey> {
        let position = self.position(key)?;
        position.checked_sub(1).map(|i| self.slots[i].key)
    }

    fn position(&self, key: FrameKey) -> Option<usize> {
        self.slots.iter().position(|s| s.key == key)
    }
}
