//! Scoped memory substrate: a stack of binding frames with push/pop and
//! a deferred-hoist mechanism. The checker uses `Memory` directly as its
//! symbol/type table stack; the `Environment` wrapper below adds the
//! lock-and-flag layer a hypothetical embedding host would need — the
//! checker itself never needs it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Context<V> {
    bindings: HashMap<String, V>,
    pending_hoist: VecDeque<String>,
}

impl<V> Default for Context<V> {
    fn default() -> Self {
        Context {
            bindings: HashMap::new(),
            pending_hoist: VecDeque::new(),
        }
    }
}

/// A LIFO stack of binding frames. The root frame (index 0) is never
/// popped — `pop` on a single-frame stack is a no-op.
#[derive(Debug)]
pub struct Memory<V> {
    stack: Vec<Context<V>>,
}

impl<V> Memory<V> {
    pub fn new() -> Self {
        Memory {
            stack: vec![Context::default()],
        }
    }

    pub fn push(&mut self) {
        self.stack.push(Context::default());
    }

    /// Drains `pending_hoist` in insertion order, moving each still-present
    /// key into the parent frame, then discards the frame.
    pub fn pop(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let mut top = self.stack.pop().expect("checked len above");
        while let Some(key) = top.pending_hoist.pop_front() {
            if let Some(value) = top.bindings.remove(&key) {
                if let Some(parent) = self.stack.last_mut() {
                    parent.bindings.insert(key, value);
                }
            }
        }
    }

    pub fn set(&mut self, name: &str, value: V) {
        if let Some(top) = self.stack.last_mut() {
            top.bindings.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str, use_parent: bool) -> Option<&V> {
        if !use_parent {
            return self.stack.last().and_then(|c| c.bindings.get(name));
        }
        for ctx in self.stack.iter().rev() {
            if let Some(v) = ctx.bindings.get(name) {
                return Some(v);
            }
        }
        None
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name, true).is_some()
    }

    pub fn drop_binding(&mut self, name: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.bindings.remove(name);
        }
    }

    /// Enqueues `name` for hoisting to the parent frame at the next `pop`.
    /// A name still absent at pop time is silently skipped; re-enqueuing
    /// the same name is harmless (it just hoists once).
    pub fn defer_hoist(&mut self, name: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.pending_hoist.push_back(name.to_string());
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl<V> Default for Memory<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, lock-guarded handle onto a `Memory<V>`. Once `teardown` is
/// called every operation becomes a no-op, including `is_set`: a host
/// racing a teardown against an in-flight lookup sees "not set" rather
/// than a stale read or a panic.
#[derive(Clone)]
pub struct Environment<V: Clone> {
    memory: Arc<Mutex<Memory<V>>>,
    complete: Arc<AtomicBool>,
}

impl<V: Clone> Environment<V> {
    pub fn new() -> Self {
        Environment {
            memory: Arc::new(Mutex::new(Memory::new())),
            complete: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn teardown(&self) {
        self.complete.store(true, Ordering::SeqCst);
    }

    fn alive(&self) -> bool {
        !self.complete.load(Ordering::SeqCst)
    }

    pub fn push_ctx(&self) {
        if !self.alive() {
            return;
        }
        self.memory.lock().expect("memory lock poisoned").push();
    }

    pub fn pop_ctx(&self) {
        if !self.alive() {
            return;
        }
        self.memory.lock().expect("memory lock poisoned").pop();
    }

    pub fn set(&self, name: &str, value: V) {
        if !self.alive() {
            return;
        }
        self.memory.lock().expect("memory lock poisoned").set(name, value);
    }

    pub fn is_set(&self, name: &str) -> bool {
        if !self.alive() {
            return false;
        }
        self.memory.lock().expect("memory lock poisoned").is_set(name)
    }

    pub fn get(&self, name: &str, use_parent: bool) -> Option<V> {
        if !self.alive() {
            return None;
        }
        self.memory
            .lock()
            .expect("memory lock poisoned")
            .get(name, use_parent)
            .cloned()
    }

    pub fn drop_binding(&self, name: &str) {
        if !self.alive() {
            return;
        }
        self.memory.lock().expect("memory lock poisoned").drop_binding(name);
    }

    pub fn defer_hoist(&self, name: &str) {
        if !self.alive() {
            return;
        }
        self.memory.lock().expect("memory lock poisoned").defer_hoist(name);
    }
}

impl<V: Clone> Default for Environment<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_on_root_is_noop() {
        let mut mem: Memory<i32> = Memory::new();
        mem.set("k", 1);
        mem.pop();
        assert_eq!(mem.get("k", false), Some(&1));
        assert_eq!(mem.depth(), 1);
    }

    #[test]
    fn hoisted_key_survives_pop_into_parent() {
        let mut mem: Memory<i32> = Memory::new();
        mem.push();
        mem.set("k", 42);
        mem.defer_hoist("k");
        mem.pop();
        assert_eq!(mem.get("k", false), Some(&42));
    }

    #[test]
    fn dropped_then_deferred_key_is_absent_after_pop() {
        let mut mem: Memory<i32> = Memory::new();
        mem.push();
        mem.set("k", 42);
        mem.drop_binding("k");
        mem.defer_hoist("k");
        mem.pop();
        assert_eq!(mem.get("k", false), None);
    }

    #[test]
    fn non_hoisted_bindings_do_not_leak_to_parent() {
        let mut mem: Memory<i32> = Memory::new();
        mem.push();
        mem.set("local", 1);
        mem.pop();
        assert_eq!(mem.get("local", true), None);
    }

    #[test]
    fn get_with_use_parent_walks_the_whole_chain() {
        let mut mem: Memory<i32> = Memory::new();
        mem.set("outer", 1);
        mem.push();
        mem.push();
        assert_eq!(mem.get("outer", true), Some(&1));
        assert_eq!(mem.get("outer", false), None);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut mem: Memory<i32> = Memory::new();
        mem.set("x", 1);
        mem.push();
        mem.set("x", 2);
        assert_eq!(mem.get("x", true), Some(&2));
        mem.pop();
        assert_eq!(mem.get("x", true), Some(&1));
    }

    #[test]
    fn multiple_enqueues_of_same_key_hoist_once() {
        let mut mem: Memory<i32> = Memory::new();
        mem.push();
        mem.set("k", 9);
        mem.defer_hoist("k");
        mem.defer_hoist("k");
        mem.pop();
        assert_eq!(mem.get("k", false), Some(&9));
    }

    #[test]
    fn environment_operations_become_noop_after_teardown() {
        let env: Environment<i32> = Environment::new();
        env.set("k", 1);
        assert!(env.is_set("k"));
        env.teardown();
        assert!(!env.is_set("k"));
        env.set("new", 2);
        assert_eq!(env.get("new", true), None);
    }

    #[test]
    fn environment_push_pop_round_trips() {
        let env: Environment<i32> = Environment::new();
        env.set("a", 1);
        env.push_ctx();
        env.set("b", 2);
        assert_eq!(env.get("a", true), Some(1));
        env.pop_ctx();
        assert_eq!(env.get("b", true), None);
    }
}
