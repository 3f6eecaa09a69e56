//! Key-presence decision trees for mapping lanes.
//!
//! Each clause contributes a row of structural tests: `LenEq` first when
//! the pattern has no rest capture, then one `HasKey` per entry. The tree
//! is built by walking the rows in source order while carrying the facts
//! already established on the current branch:
//!
//! 1. **Empty**: no rows left → `Exhausted`
//! 2. **Refuted**: some test of the first row is known false → drop the row
//! 3. **Proven**: every test of the first row is known true → `Candidate`,
//!    continuing with the remaining rows under the same facts
//! 4. **Split**: test the first unknown fact of the first row and recurse
//!    on both outcomes
//!
//! A fact is tested at most once per path, and rows are never reordered.

use cm_ir::{KeyTest, KeyTree, MapKey, MappingKey, Pattern};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Structural tests of one mapping clause, in the order they are tried.
pub type KeyTests = SmallVec<[KeyTest; 4]>;

/// Tests for a mapping pattern whose keys are all literals; `None` for any
/// other pattern.
pub fn key_tests(pattern: &Pattern) -> Option<KeyTests> {
    let Pattern::Mapping { entries, rest } = pattern else {
        return None;
    };
    let mut tests = KeyTests::new();
    if rest.is_none() {
        tests.push(KeyTest::LenEq(entries.len()));
    }
    for entry in entries {
        match entry.key {
            MappingKey::Literal(lit) => tests.push(KeyTest::HasKey(lit.map_key())),
            MappingKey::Value(_) => return None,
        }
    }
    Some(tests)
}

/// Build the decision tree for `rows` (clause index, tests), in source order.
pub fn build_key_tree(rows: &[(usize, KeyTests)]) -> KeyTree {
    build(rows, &Facts::default())
}

fn build(rows: &[(usize, KeyTests)], facts: &Facts) -> KeyTree {
    // 1. EMPTY
    let Some(((clause, tests), rest)) = rows.split_first() else {
        return KeyTree::Exhausted;
    };

    let mut unknown = None;
    for test in tests {
        match facts.eval(*test) {
            // 2. REFUTED
            Some(false) => return build(rest, facts),
            Some(true) => {}
            None => {
                if unknown.is_none() {
                    unknown = Some(*test);
                }
            }
        }
    }

    match unknown {
        // 3. PROVEN
        None => KeyTree::Candidate {
            clause: *clause,
            next: Box::new(build(rest, facts)),
        },
        // 4. SPLIT
        Some(test) => KeyTree::Test {
            test,
            pass: Box::new(build(rows, &facts.assume(test, true))),
            fail: Box::new(build(rows, &facts.assume(test, false))),
        },
    }
}

/// What the current branch already knows about the mapping view.
#[derive(Clone, Debug, Default)]
struct Facts {
    present: FxHashSet<MapKey>,
    absent: FxHashSet<MapKey>,
    len: Option<usize>,
    not_len: FxHashSet<usize>,
}

impl Facts {
    fn eval(&self, test: KeyTest) -> Option<bool> {
        match test {
            KeyTest::HasKey(key) => {
                if self.present.contains(&key) {
                    Some(true)
                } else if self.absent.contains(&key) {
                    Some(false)
                } else {
                    None
                }
            }
            KeyTest::LenEq(n) => {
                if let Some(len) = self.len {
                    Some(len == n)
                } else if self.not_len.contains(&n) || self.present.len() > n {
                    // Every present key occupies its own entry.
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    fn assume(&self, test: KeyTest, outcome: bool) -> Facts {
        let mut facts = self.clone();
        match (test, outcome) {
            (KeyTest::HasKey(key), true) => {
                facts.present.insert(key);
            }
            (KeyTest::HasKey(key), false) => {
                facts.absent.insert(key);
            }
            (KeyTest::LenEq(n), true) => facts.len = Some(n),
            (KeyTest::LenEq(n), false) => {
                facts.not_len.insert(n);
            }
        }
        facts
    }
}
