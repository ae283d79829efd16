//! A fixed-capacity history of smoothed channel loads.
//!
//! 固定容量的平滑信道负载历史。

/// Ring buffer holding the most recent smoothed channel loads.
///
/// Once full, every push overwrites the oldest entry.
///
/// 保存最近平滑信道负载的环形缓冲区。填满后，每次写入都会覆盖最旧的条目。
#[derive(Debug, Clone)]
pub struct ChannelLoadWindow {
    /// Backing storage, allocated once.
    /// 底层存储，只分配一次。
    slots: Box<[f64]>,
    /// Index of the oldest entry.
    /// 最旧条目的索引。
    head: usize,
    /// Number of valid entries.
    /// 有效条目的数量。
    len: usize,
}

impl ChannelLoadWindow {
    /// Creates an empty window. A capacity of zero is raised to one.
    ///
    /// 创建一个空窗口。容量为零时提升为一。
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0.0; capacity.max(1)].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a load, evicting and returning the oldest one if the window is full.
    ///
    /// 追加一个负载；若窗口已满，则淘汰并返回最旧的负载。
    pub fn push(&mut self, load: f64) -> Option<f64> {
        let capacity = self.capacity();
        if self.len < capacity {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = load;
            self.len += 1;
            None
        } else {
            let evicted = std::mem::replace(&mut self.slots[self.head], load);
            self.head = (self.head + 1) % capacity;
            Some(evicted)
        }
    }

    /// Iterates from the oldest to the newest entry.
    ///
    /// 从最旧到最新遍历条目。
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |offset| self.slots[(self.head + offset) % capacity])
    }

    /// The most recently pushed load.
    pub fn latest(&self) -> Option<f64> {
        if self.len == 0 {
            None
        } else {
            Some(self.slots[(self.head + self.len - 1) % self.capacity()])
        }
    }

    /// Smallest load in the window, `None` while empty.
    ///
    /// 窗口内的最小负载，为空时返回 `None`。
    pub fn min(&self) -> Option<f64> {
        self.iter().reduce(f64::min)
    }

    /// Largest load in the window, `None` while empty.
    ///
    /// 窗口内的最大负载，为空时返回 `None`。
    pub fn max(&self) -> Option<f64> {
        self.iter().reduce(f64::max)
    }
}
