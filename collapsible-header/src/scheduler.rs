use std::collections::VecDeque;
use std::fmt;
use std::mem;

type ReadTask<C> = Box<dyn FnOnce(&C, &mut WriteQueue<C>)>;
type WriteTask<C> = Box<dyn FnOnce(&mut C)>;

/// Writes scheduled for the current frame.
///
/// Read tasks receive this queue so that anything they measure can be applied after every
/// pending read of the frame has run.
pub struct WriteQueue<C> {
    tasks: VecDeque<WriteTask<C>>,
}

impl<C> WriteQueue<C> {
    fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    pub fn push(&mut self, task: impl FnOnce(&mut C) + 'static) {
        self.tasks.push_back(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C> fmt::Debug for WriteQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteQueue")
            .field("len", &self.tasks.len())
            .finish()
    }
}

/// Counts of tasks run by a single [`FrameScheduler::flush`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub reads: usize,
    pub writes: usize,
}

/// A two-phase frame scheduler.
///
/// Reads get shared access to the context and may only schedule writes; writes get exclusive
/// access. A flush runs every queued read, then every queued write (including the ones the reads
/// just scheduled), so measurements never interleave with mutations within a frame.
///
/// The scheduler does not drive itself. Call [`FrameScheduler::flush`] from the host's frame
/// callback (or whenever the host wants pending style work applied).
pub struct FrameScheduler<C> {
    reads: VecDeque<ReadTask<C>>,
    writes: WriteQueue<C>,
}

impl<C> Default for FrameScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FrameScheduler<C> {
    pub fn new() -> Self {
        Self {
            reads: VecDeque::new(),
            writes: WriteQueue::new(),
        }
    }

    /// Queues a measurement for the next flush.
    pub fn read(&mut self, task: impl FnOnce(&C, &mut WriteQueue<C>) + 'static) {
        self.reads.push_back(Box::new(task));
    }

    /// Queues a mutation for the next flush.
    pub fn write(&mut self, task: impl FnOnce(&mut C) + 'static) {
        self.writes.push(task);
    }

    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    pub fn is_idle(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }

    /// Drops all pending work without running it.
    pub fn clear(&mut self) {
        self.reads.clear();
        self.writes.tasks.clear();
    }

    /// Runs all pending reads, then all pending writes.
    pub fn flush(&mut self, ctx: &mut C) -> FlushStats {
        let reads = mem::take(&mut self.reads);
        let mut stats = FlushStats {
            reads: reads.len(),
            writes: 0,
        };
        for task in reads {
            task(&*ctx, &mut self.writes);
        }

        let writes = mem::take(&mut self.writes.tasks);
        stats.writes = writes.len();
        for task in writes {
            task(ctx);
        }

        if stats.reads > 0 || stats.writes > 0 {
            ctrace!(reads = stats.reads, writes = stats.writes, "FrameScheduler::flush");
        }
        stats
    }
}

impl<C> fmt::Debug for FrameScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending_reads", &self.reads.len())
            .field("pending_writes", &self.writes.len())
            .finish()
    }
}
