/// Build a `HashSet` out of a literal list of items, mirroring `vec![...]` ergonomics.
/// Used only in test modules, where pulling in a crate such as `maplit` for a handful of
/// call sites is not worth the dependency.
#[cfg(test)]
#[macro_export]
macro_rules! hash_set {
    () => {
        ::std::collections::HashSet::new()
    };
    ($($item:expr),* $(,)?) => {{
        let mut set = ::std::collections::HashSet::new();
        $(let _ = set.insert($item);)*
        set
    }};
}

/// Build a `BTreeSet` out of a literal list of items. Test-only, see [`hash_set`].
#[cfg(test)]
#[macro_export]
macro_rules! btree_set {
    () => {
        ::std::collections::BTreeSet::new()
    };
    ($($item:expr),* $(,)?) => {{
        let mut set = ::std::collections::BTreeSet::new();
        $(let _ = set.insert($item);)*
        set
    }};
}
