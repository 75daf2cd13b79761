use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

/// Checks every structural invariant of `t` and returns the number of reachable records.
fn validate_tree(t: &PathTree) -> usize {
    let root_id = t.root();
    let root = t.node(root_id).expect("root must be live");
    assert_eq!(t.tag(root_id.record()), Some(Tag::Root));
    assert_eq!(root.parent(), None, "root must not have a parent");

    let mut reachable = 0usize;
    let mut current = Some(root_id);
    let mut parent: Option<NodeId> = None;

    while let Some(id) = current {
        let node = t.node(id).expect("child link must name a live node");
        reachable += 1;

        if id != root_id {
            assert_eq!(t.tag(id.record()), Some(Tag::Node));
        }
        assert_eq!(node.parent(), parent, "child must point back to its parent");
        assert!(node.path_segment().len() <= PATH_CAPACITY);

        let mut expected_back = Back::Node(id);
        let mut tail = None;
        for leaf in t.leaves(id).expect("live node") {
            let (leaf_id, leaf) = leaf.expect("chain must be intact");
            reachable += 1;

            assert_eq!(t.tag(leaf_id.record()), Some(Tag::Leaf));
            assert_eq!(leaf.back(), Some(expected_back));
            assert!(leaf.key().len() <= KEY_CAPACITY);
            assert_eq!(leaf.size(), leaf.value().len());
            expected_back = Back::Leaf(leaf_id);
            tail = Some(leaf_id);
        }
        if let Some(tail) = tail {
            assert_eq!(t.leaf(tail).and_then(Leaf::next), None);
        }
        assert_eq!(t.find_tail(id), Ok(tail));

        parent = Some(id);
        current = node.child();
    }

    assert_eq!(reachable, t.len(), "every live record must be reachable from the root");
    reachable
}

fn truncated(input: &[u8], capacity: usize) -> Vec<u8> {
    input[..input.len().min(capacity)].to_vec()
}

fn segment_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        8 => prop::collection::vec(b'a'..=b'z', 0..=12),
        1 => prop::collection::vec(any::<u8>(), 240..=300),
    ]
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    // A small alphabet so lookups hit existing (and duplicate) keys.
    prop_oneof![
        8 => prop::collection::vec(b'a'..=b'd', 0..=3),
        1 => prop::collection::vec(any::<u8>(), 120..=160),
    ]
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=64)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    CreateNode {
        #[proptest(strategy = "0usize..8")]
        depth: usize,
        #[proptest(strategy = "segment_strategy()")]
        segment: Vec<u8>,
    },
    #[proptest(weight = 6)]
    CreateLeaf {
        #[proptest(strategy = "0usize..8")]
        depth: usize,
        #[proptest(strategy = "key_strategy()")]
        key: Vec<u8>,
        #[proptest(strategy = "value_strategy()")]
        value: Vec<u8>,
    },
    #[proptest(weight = 3)]
    FindLeaf {
        #[proptest(strategy = "0usize..8")]
        depth: usize,
        #[proptest(strategy = "key_strategy()")]
        key: Vec<u8>,
    },
    ReleaseChild {
        #[proptest(strategy = "0usize..8")]
        depth: usize,
    },
    ReleaseSubtree {
        #[proptest(strategy = "0usize..8")]
        depth: usize,
    },
    Clear,
    Shrink,
}

/// One level of the path: the node's segment and its chain, in insertion order.
#[derive(Clone, Debug, Default)]
struct Level {
    segment: Vec<u8>,
    leaves: Vec<(Vec<u8>, Vec<u8>)>,
}

impl Level {
    fn records(&self) -> usize {
        1 + self.leaves.len()
    }
}

fn released(levels: &[Level]) -> usize {
    levels.iter().map(Level::records).sum()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_model(ops in prop::collection::vec(any::<Op>(), 0..=300)) {
        let mut t = PathTree::new();
        let mut ids = vec![t.root()];
        let mut model = vec![Level::default()];

        for op in ops {
            match op {
                Op::CreateNode { depth, segment } => {
                    let depth = depth % ids.len();
                    let id = t.create_node(ids[depth], &segment)?;

                    ids.truncate(depth + 1);
                    model.truncate(depth + 1);
                    ids.push(id);
                    model.push(Level {
                        segment: truncated(&segment, PATH_CAPACITY),
                        leaves: Vec::new(),
                    });
                }
                Op::CreateLeaf { depth, key, value } => {
                    let depth = depth % ids.len();
                    let id = t.create_leaf(ids[depth], &key, &value)?;

                    prop_assert_eq!(t.find_tail(ids[depth])?, Some(id));
                    model[depth].leaves.push((truncated(&key, KEY_CAPACITY), value));
                }
                Op::FindLeaf { depth, key } => {
                    let depth = depth % ids.len();
                    let found = t
                        .find_leaf(ids[depth], &key)?
                        .and_then(|id| t.leaf(id))
                        .map(|leaf| (leaf.key().to_vec(), leaf.value().to_vec()));
                    let stored = truncated(&key, KEY_CAPACITY);
                    let expected = model[depth].leaves.iter().find(|(k, _)| *k == stored).cloned();
                    prop_assert_eq!(found, expected);
                }
                Op::ReleaseChild { depth } => {
                    let depth = depth % ids.len();
                    let freed = t.release_child(ids[depth])?;

                    prop_assert_eq!(freed, released(&model[depth + 1..]));
                    ids.truncate(depth + 1);
                    model.truncate(depth + 1);
                }
                Op::ReleaseSubtree { depth } => {
                    let depth = depth % ids.len();
                    let result = t.release_subtree(ids[depth]);
                    if depth == 0 {
                        prop_assert_eq!(result, Err(Error::InvalidParent(ids[0].record())));
                    } else {
                        prop_assert_eq!(result?, released(&model[depth..]));
                        ids.truncate(depth);
                        model.truncate(depth);
                    }
                }
                Op::Clear => {
                    t.clear();
                    prop_assert!(t.node(ids[0]).is_none());
                    ids = vec![t.root()];
                    model = vec![Level::default()];
                }
                Op::Shrink => {
                    t.shrink_to_fit();
                }
            }

            prop_assert_eq!(t.len(), released(&model));
        }

        validate_tree(&t);

        let last = *ids.last().unwrap();
        let path: Vec<Vec<u8>> = t.path_of(last)?.into_iter().map(<[u8]>::to_vec).collect();
        let expected: Vec<Vec<u8>> = model[1..].iter().map(|level| level.segment.clone()).collect();
        prop_assert_eq!(path, expected);

        for (id, level) in ids.iter().zip(&model) {
            let got: Vec<(Vec<u8>, Vec<u8>)> = t
                .leaves(*id)?
                .map(|leaf| leaf.map(|(_, leaf)| (leaf.key().to_vec(), leaf.value().to_vec())))
                .collect::<Result<_>>()?;
            prop_assert_eq!(&got, &level.leaves);
        }

        let value_bytes: usize = model
            .iter()
            .flat_map(|level| level.leaves.iter())
            .map(|(_, value)| value.len())
            .sum();
        prop_assert_eq!(t.memory_usage().value_bytes, value_bytes);
    }

    #[test]
    fn prop_key_is_stored_truncated(key in prop::collection::vec(any::<u8>(), 0..=300)) {
        let mut t = PathTree::new();
        let id = t.create_leaf(t.root(), &key, b"v")?;
        let leaf = t.leaf(id).unwrap();
        let expected = truncated(&key, KEY_CAPACITY);

        prop_assert_eq!(leaf.key(), expected.as_slice());
        prop_assert!(leaf.key_field().raw()[leaf.key().len()..].iter().all(|&b| b == 0));
        prop_assert_eq!(leaf.value(), b"v");
    }

    #[test]
    fn prop_memory_limit_never_exceeded(
        limit in (3 * RECORD_BYTES)..(12 * RECORD_BYTES),
        values in prop::collection::vec(value_strategy(), 1..=40),
    ) {
        let mut t = PathTree::with_config(Config::default().with_memory_limit(limit));
        let node = t.create_node(t.root(), b"n")?;

        for (i, value) in values.iter().enumerate() {
            let before = t.find_tail(node)?;
            let len = t.chain_len(node)?;
            match t.create_leaf(node, format!("k{}", i).as_bytes(), value) {
                Ok(id) => prop_assert_eq!(t.find_tail(node)?, Some(id)),
                Err(Error::OutOfMemory { .. }) => {
                    prop_assert_eq!(t.find_tail(node)?, before);
                    prop_assert_eq!(t.chain_len(node)?, len);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
            prop_assert!(t.memory_usage().bytes_in_use <= limit);
        }

        validate_tree(&t);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
    ];

    for_each_permutation(&keys, |perm| {
        let mut t = PathTree::new();
        let node = t.create_node(t.root(), b"perm").unwrap();

        for (i, k) in perm.iter().enumerate() {
            t.create_leaf(node, k, &[i as u8]).unwrap();
        }

        assert_eq!(validate_tree(&t), 2 + perm.len());
        let got: Vec<Vec<u8>> = t
            .leaves(node)
            .unwrap()
            .map(|leaf| leaf.unwrap().1.key().to_vec())
            .collect();
        assert_eq!(got, perm);
        for (i, k) in perm.iter().enumerate() {
            let id = t.find_leaf(node, k).unwrap().unwrap();
            assert_eq!(t.leaf(id).unwrap().value(), &[i as u8]);
        }
    });
}

#[test]
fn exhaustive_release_order_small_path() {
    // Build a path of four nodes with leaves, then release levels in every order.
    let depths: Vec<usize> = vec![1, 2, 3, 4];

    for_each_permutation(&depths, |perm| {
        let mut t = PathTree::new();
        let mut ids = vec![t.root()];
        for d in 1..=4 {
            let id = t.create_node(ids[d - 1], format!("n{}", d).as_bytes()).unwrap();
            for i in 0..d {
                t.create_leaf(id, format!("k{}", i).as_bytes(), b"v").unwrap();
            }
            ids.push(id);
        }
        assert_eq!(validate_tree(&t), 1 + 4 + (1 + 2 + 3 + 4));

        for d in perm {
            match t.release_subtree(ids[d]) {
                Ok(_) => assert!(t.node(ids[d]).is_none()),
                // Already gone with a shallower level.
                Err(err) => assert_eq!(err, Error::InvalidParent(ids[d].record())),
            }
            validate_tree(&t);
        }
        assert_eq!(t.len(), 1);
        assert_eq!(t.node(t.root()).unwrap().child(), None);
    });
}
