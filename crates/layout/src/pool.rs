//! Pooled storage for the transient nodes of a layout pass.
//!
//! Every node variant lives in one slab of generational slots. A pass checks a
//! slab out of the shared [`LayoutPool`], allocates and frees nodes in it
//! without further synchronization, and hands it back (cleared but with its
//! capacity intact) when the [`PassArena`] guard is dropped.

use crate::LayoutError;
use crate::context::BlockContext;
use crate::float::FloatSpace;
use crate::inline::{InlineBox, LineBox, TextFragment};
use crate::node_kind::NodeKind;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Handle to a node in a [`PassArena`]. Handles to released nodes are
/// detected through the generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// The closed set of node variants sharing one pass lifetime.
#[derive(Debug, Clone)]
pub enum LayoutNode {
    Block(BlockContext),
    Inline(InlineBox),
    Line(LineBox),
    Text(TextFragment),
    Floats(FloatSpace),
}

impl LayoutNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            LayoutNode::Block(_) => NodeKind::BlockContext,
            LayoutNode::Inline(_) => NodeKind::InlineBox,
            LayoutNode::Line(_) => NodeKind::LineBox,
            LayoutNode::Text(_) => NodeKind::TextFragment,
            LayoutNode::Floats(_) => NodeKind::FloatSpace,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<LayoutNode>,
    next_free: Option<u32>,
}

/// A free-listed vector of slots.
#[derive(Debug, Default)]
pub struct NodeSlab {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    live: usize,
}

impl NodeSlab {
    fn with_capacity(capacity: usize) -> Self {
        let mut slab = Self::default();
        slab.grow_to(capacity);
        slab
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Appends free slots until the slab holds `target` slots.
    fn grow_to(&mut self, target: usize) {
        let start = self.slots.len();
        for i in start..target {
            let next_free = if i + 1 < target { Some((i + 1) as u32) } else { self.free_head };
            self.slots.push(Slot {
                generation: 0,
                node: None,
                next_free,
            });
        }
        if target > start {
            self.free_head = Some(start as u32);
        }
    }

    /// Frees every slot, bumping generations so outstanding handles go stale.
    fn clear(&mut self) {
        let total = self.slots.len();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            slot.next_free = if i + 1 < total { Some((i + 1) as u32) } else { None };
        }
        self.free_head = if total > 0 { Some(0) } else { None };
        self.live = 0;
    }
}

/// A shared pool of pass slabs.
///
/// Checkout and return are serialized by a mutex; everything in between is
/// owned by the thread running the pass.
#[derive(Debug)]
pub struct LayoutPool {
    capacity: usize,
    max_nodes: Option<usize>,
    slabs: Mutex<Vec<NodeSlab>>,
    checkouts: AtomicUsize,
    grow_events: AtomicUsize,
}

impl LayoutPool {
    /// Creates a pool whose slabs start with `capacity` slots and may grow up
    /// to `max_nodes` live nodes.
    pub fn new(capacity: usize, max_nodes: Option<usize>) -> Self {
        let capacity = max_nodes.map_or(capacity, |max| capacity.min(max)).max(1);
        Self {
            capacity,
            max_nodes,
            slabs: Mutex::new(vec![NodeSlab::with_capacity(capacity)]),
            checkouts: AtomicUsize::new(0),
            grow_events: AtomicUsize::new(0),
        }
    }

    /// Takes an idle slab (or provisions a new one) for the duration of a pass.
    pub fn checkout(&self) -> PassArena<'_> {
        self.checkouts.fetch_add(1, Ordering::Relaxed);
        let slab = match self.slabs.lock() {
            Ok(mut slabs) => slabs.pop(),
            Err(_) => None,
        };
        PassArena {
            pool: self,
            slab: slab.unwrap_or_else(|| NodeSlab::with_capacity(self.capacity)),
            acquired: 0,
            peak_live: 0,
        }
    }

    fn restore(&self, mut slab: NodeSlab) {
        slab.clear();
        if let Ok(mut slabs) = self.slabs.lock() {
            slabs.push(slab);
        }
    }

    /// Slabs currently waiting in the pool.
    pub fn idle_slabs(&self) -> usize {
        self.slabs.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn checkouts(&self) -> usize {
        self.checkouts.load(Ordering::Relaxed)
    }

    /// Number of times any slab had to grow past its provisioned capacity.
    pub fn grow_events(&self) -> usize {
        self.grow_events.load(Ordering::Relaxed)
    }
}

/// A slab checked out for one layout pass. Dropping it bulk-releases every
/// node and returns the slab to the pool.
#[derive(Debug)]
pub struct PassArena<'p> {
    pool: &'p LayoutPool,
    slab: NodeSlab,
    acquired: usize,
    peak_live: usize,
}

impl<'p> PassArena<'p> {
    pub fn acquire(&mut self, node: LayoutNode) -> Result<NodeId, LayoutError> {
        if self.slab.free_head.is_none() {
            let current = self.slab.capacity();
            if let Some(max) = self.pool.max_nodes {
                if current >= max {
                    return Err(LayoutError::PoolExhausted { capacity: max });
                }
            }
            let target = match self.pool.max_nodes {
                Some(max) => (current * 2).max(1).min(max),
                None => (current * 2).max(1),
            };
            log::debug!("Growing layout slab from {} to {} nodes", current, target);
            self.slab.grow_to(target);
            self.pool.grow_events.fetch_add(1, Ordering::Relaxed);
        }

        let index = self.slab.free_head.ok_or(LayoutError::PoolExhausted {
            capacity: self.slab.capacity(),
        })?;
        let slot = &mut self.slab.slots[index as usize];
        self.slab.free_head = slot.next_free.take();
        slot.node = Some(node);
        self.slab.live += 1;
        self.acquired += 1;
        self.peak_live = self.peak_live.max(self.slab.live);
        Ok(NodeId {
            index,
            generation: slot.generation,
        })
    }

    /// Frees one node. Releasing a stale handle is an error.
    pub fn release(&mut self, id: NodeId) -> Result<LayoutNode, LayoutError> {
        let slot = self
            .slab
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .ok_or(LayoutError::StaleNode(id))?;
        let node = slot.node.take().ok_or(LayoutError::StaleNode(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.slab.free_head;
        self.slab.free_head = Some(id.index);
        self.slab.live -= 1;
        Ok(node)
    }

    /// Frees a node and everything it owns: child contexts, line boxes and
    /// their fragments, open inline boxes and the float space.
    pub fn release_subtree(&mut self, id: NodeId) -> Result<(), LayoutError> {
        match self.release(id)? {
            LayoutNode::Block(ctx) => {
                for owned in ctx.owned_nodes() {
                    self.release_subtree(owned)?;
                }
            }
            LayoutNode::Line(line) => {
                for fragment in line.fragments {
                    self.release(fragment)?;
                }
            }
            LayoutNode::Inline(_) | LayoutNode::Text(_) | LayoutNode::Floats(_) => {}
        }
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: NodeId) -> Result<&LayoutNode, LayoutError> {
        self.slab
            .slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(LayoutError::StaleNode(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut LayoutNode, LayoutError> {
        self.slab
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(LayoutError::StaleNode(id))
    }

    pub fn context(&self, id: NodeId) -> Result<&BlockContext, LayoutError> {
        match self.get(id)? {
            LayoutNode::Block(ctx) => Ok(ctx),
            other => Err(LayoutError::NodeMismatch("BlockContext", other.kind().as_str())),
        }
    }

    pub fn context_mut(&mut self, id: NodeId) -> Result<&mut BlockContext, LayoutError> {
        match self.get_mut(id)? {
            LayoutNode::Block(ctx) => Ok(ctx),
            other => Err(LayoutError::NodeMismatch("BlockContext", other.kind().as_str())),
        }
    }

    pub fn line(&self, id: NodeId) -> Result<&LineBox, LayoutError> {
        match self.get(id)? {
            LayoutNode::Line(line) => Ok(line),
            other => Err(LayoutError::NodeMismatch("LineBox", other.kind().as_str())),
        }
    }

    pub fn line_mut(&mut self, id: NodeId) -> Result<&mut LineBox, LayoutError> {
        match self.get_mut(id)? {
            LayoutNode::Line(line) => Ok(line),
            other => Err(LayoutError::NodeMismatch("LineBox", other.kind().as_str())),
        }
    }

    pub fn inline_box(&self, id: NodeId) -> Result<&InlineBox, LayoutError> {
        match self.get(id)? {
            LayoutNode::Inline(inline) => Ok(inline),
            other => Err(LayoutError::NodeMismatch("InlineBox", other.kind().as_str())),
        }
    }

    pub fn inline_box_mut(&mut self, id: NodeId) -> Result<&mut InlineBox, LayoutError> {
        match self.get_mut(id)? {
            LayoutNode::Inline(inline) => Ok(inline),
            other => Err(LayoutError::NodeMismatch("InlineBox", other.kind().as_str())),
        }
    }

    pub fn float_space(&self, id: NodeId) -> Result<&FloatSpace, LayoutError> {
        match self.get(id)? {
            LayoutNode::Floats(space) => Ok(space),
            other => Err(LayoutError::NodeMismatch("FloatSpace", other.kind().as_str())),
        }
    }

    pub fn float_space_mut(&mut self, id: NodeId) -> Result<&mut FloatSpace, LayoutError> {
        match self.get_mut(id)? {
            LayoutNode::Floats(space) => Ok(space),
            other => Err(LayoutError::NodeMismatch("FloatSpace", other.kind().as_str())),
        }
    }

    pub fn live(&self) -> usize {
        self.slab.live
    }

    pub fn acquired(&self) -> usize {
        self.acquired
    }

    pub fn peak_live(&self) -> usize {
        self.peak_live
    }

    pub fn capacity(&self) -> usize {
        self.slab.capacity()
    }
}

impl Drop for PassArena<'_> {
    fn drop(&mut self) {
        self.pool.restore(std::mem::take(&mut self.slab));
    }
}
