/// An opaque position in a [`Trail`], returned by [`Trail::mark`] and
/// consumed by [`Trail::restore_to`].
///
/// Markers only make sense against the trail that produced them; nothing
/// prevents passing one to a different trail, but doing so is a logic error
/// (the index will just land wherever it lands).
#[derive(Copy, Clone, Debug)]
pub struct Mark(usize);

/// The reversible state log described in `spec.md` §4.1.
///
/// Every mutation to solver-owned state is recorded here as a boxed undo
/// closure acting on `T` (in practice, `T = ReversibleState`, the part of
/// the `Solver` that choice points actually rewind — variables, intervals,
/// and the reversible-object arena used by `Solver::rev_alloc`). `mark()`
/// opens a new reversible segment; `restore_to(marker)` pops and runs undo
/// closures, most recent first, until the log is back to the length it had
/// at `marker`. Segments nest: restoring to an outer marker also undoes
/// every inner segment, in the right order, since the log is a single flat
/// stack.
pub struct Trail<T> {
    log: Vec<Box<dyn FnOnce(&mut T)>>,
    /// Log length at each open segment, used only to answer `depth()`.
    depth_marks: Vec<usize>,
    unwinding: bool,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail { log: Vec::new(), depth_marks: Vec::new(), unwinding: false }
    }
}

impl<T> Trail<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open nested segments (0 at the root).
    pub fn depth(&self) -> u32 {
        self.depth_marks.len() as u32
    }

    /// Remembers how to undo a mutation just applied to the target state.
    ///
    /// # Panics
    /// Panics if called while a `restore_to` is in progress: saving during
    /// unwind is a programmer error (`spec.md` §4.1 "Failure semantics").
    pub fn save(&mut self, undo: impl FnOnce(&mut T) + 'static) {
        assert!(!self.unwinding, "Trail::save called while unwinding");
        self.log.push(Box::new(undo));
    }

    /// Opens a new reversible segment and returns a marker identifying it.
    pub fn mark(&mut self) -> Mark {
        self.depth_marks.push(self.log.len());
        Mark(self.log.len())
    }

    /// Restores `target` to the state it had when `marker` was produced,
    /// running undo closures most-recent-first.
    pub fn restore_to(&mut self, marker: Mark, target: &mut T) {
        self.unwinding = true;
        while self.log.len() > marker.0 {
            let undo = self.log.pop().expect("trail log shorter than its own marker");
            undo(target);
        }
        while matches!(self.depth_marks.last(), Some(&top) if top >= self.log.len()) {
            self.depth_marks.pop();
        }
        self.unwinding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut trail: Trail<i32> = Trail::new();
        let mut state = 0i32;

        let root = trail.mark();
        let old = state;
        state = 10;
        trail.save(move |s| *s = old);

        let nested = trail.mark();
        let old = state;
        state = 20;
        trail.save(move |s| *s = old);
        assert_eq!(state, 20);

        trail.restore_to(nested, &mut state);
        assert_eq!(state, 10);

        trail.restore_to(root, &mut state);
        assert_eq!(state, 0);
        assert_eq!(trail.depth(), 0);
    }

    #[test]
    fn nested_restore_past_both_levels() {
        let mut trail: Trail<Vec<i32>> = Trail::new();
        let mut state = vec![];

        let root = trail.mark();
        state.push(1);
        trail.save(|s| {
            s.pop();
        });
        trail.mark();
        state.push(2);
        trail.save(|s| {
            s.pop();
        });
        trail.mark();
        state.push(3);
        trail.save(|s| {
            s.pop();
        });

        trail.restore_to(root, &mut state);
        assert!(state.is_empty());
        assert_eq!(trail.depth(), 0);
    }
}
