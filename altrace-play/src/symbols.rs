//! Mirror of the recorder's frame-address symbol table (§3 invariant 4,
//! §4.2, §4.6, §8 "symbol economy"). The player never symbolicates
//! anything itself: it just remembers the (address, name) pairs the
//! recorder interned, each carried once in a `NewCallstackSyms` event
//! ahead of its first use.

use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct SymbolMap {
    names: FxHashMap<u64, Option<String>>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a freshly decoded (address, name) pair. `name` is `None`
    /// when the recorder failed to symbolicate the address but still
    /// emitted the frame (§4.2 edge case: "addresses that fail
    /// symbolication are still emitted with a NULL-string mapping").
    pub fn intern(&mut self, addr: u64, name: Option<String>) {
        self.names.insert(addr, name);
    }

    /// Resolves a stack address to its symbol, if this trace ever
    /// interned one for it. Returns `None` both for addresses never seen
    /// and for addresses whose recorder-side symbolication failed; the
    /// two are indistinguishable once decoded, which matches §4.2 (a
    /// failed symbolication is carried as a NULL-string mapping, the same
    /// shape as never having been introduced at all).
    pub fn resolve(&self, addr: u64) -> Option<&str> {
        self.names.get(&addr).and_then(|n| n.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_interned_symbols() {
        let mut map = SymbolMap::new();
        map.intern(0x1000, Some("main".to_string()));
        map.intern(0x2000, None);
        assert_eq!(map.resolve(0x1000), Some("main"));
        assert_eq!(map.resolve(0x2000), None);
        assert_eq!(map.resolve(0x3000), None);
    }
}
