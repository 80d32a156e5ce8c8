use std::collections::BTreeMap;

/// Generates names that are unique for the lifetime of one compilation run.
///
/// Every prefix has its own counter, so `fresh("v")` yields `v0`, `v1`, ... independently of
/// `fresh("tmp.")`. Passes derive prefixes either from a fixed tag or from a source name followed
/// by a `.`, a character the parser never accepts in identifiers, so generated names cannot
/// collide with user names or with each other.
///
/// The generator is threaded through the pipeline by `&mut` and is never reset midway.
#[derive(Clone, Debug, Default)]
pub struct FreshNames {
    counters: BTreeMap<String, usize>,
}

impl FreshNames {
    pub fn new() -> Self {
        FreshNames {
            counters: BTreeMap::new(),
        }
    }

    pub fn fresh(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_owned()).or_insert(0);
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        name
    }

    /// A fresh name derived from `name`. Names which were themselves derived keep only their
    /// original stem, so repeated renaming doesn't pile up suffixes.
    pub fn fresh_from(&mut self, name: &str) -> String {
        let stem = name.split('.').next().unwrap_or(name);
        self.fresh(&format!("{}.", stem))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counters_are_per_prefix() {
        let mut fresh = FreshNames::new();
        assert_eq!(fresh.fresh("v"), "v0");
        assert_eq!(fresh.fresh("tmp."), "tmp.0");
        assert_eq!(fresh.fresh("v"), "v1");
        assert_eq!(fresh.fresh("tmp."), "tmp.1");
    }

    #[test]
    fn test_fresh_from_strips_suffixes() {
        let mut fresh = FreshNames::new();
        assert_eq!(fresh.fresh_from("x"), "x.0");
        assert_eq!(fresh.fresh_from("x.0"), "x.1");
        assert_eq!(fresh.fresh_from("y"), "y.0");
    }
}
