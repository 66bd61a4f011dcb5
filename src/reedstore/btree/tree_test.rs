// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::reedstore::btree::controller::InMemoryPageController;
    use crate::reedstore::btree::node::NO_NODE;
    use crate::reedstore::btree::tree::BTree;
    use crate::reedstore::keys::range::{EndpointKind, RangeKey};
    use crate::reedstore::keys::value::ValueKey;
    use crate::reedstore::pages::sorted::SortedPage;
    use crate::reedstore::reedstream::ReedError;
    use crate::reedstore::tuples::fresh::FreshTuple;
    use crate::reedstore::tuples::manipulator::FieldManipulator;
    use crate::reedstore::tuples::manipulator::FieldManipulator::{Double, Int};
    use crate::reedstore::tuples::tuple::Tuple;

    const LEAF_SCHEMA: [FieldManipulator; 3] = [Int, Double, Double];

    /// Tree with the standard test geometry: branch key on column 0,
    /// branch pages of 10 tuples, 128-byte leaf pages.
    fn make_tree() -> BTree {
        let controller = InMemoryPageController::new(&LEAF_SCHEMA, &[0], 10, 128).unwrap();
        BTree::new(Box::new(controller)).unwrap()
    }

    fn leaf_tuple(key: i32) -> FreshTuple {
        let mut tuple = FreshTuple::from_schema(&LEAF_SCHEMA).unwrap();
        tuple.field_mut(0).set_int(key).unwrap();
        tuple.field_mut(1).set_double(key as f64 * 0.5).unwrap();
        tuple.field_mut(2).set_double(key as f64 * 2.0).unwrap();
        tuple
    }

    fn scan_keys(tree: &BTree) -> Vec<i32> {
        tree.iter()
            .map(|tuple| tuple.field(0).get_int().unwrap())
            .collect()
    }

    fn key_on_first_column(value: i32) -> ValueKey {
        let mut key = ValueKey::new(&LEAF_SCHEMA, &[0]).unwrap();
        key.field_mut(0).set_int(value).unwrap();
        key
    }

    fn check_tree_invariants(tree: &BTree) {
        // All leaves at the same depth.
        let depths = tree.leaf_depths();
        assert!(depths.windows(2).all(|w| w[0] == w[1]));

        // The sibling chain is doubly linked left-to-right.
        let chain = tree.leaf_chain();
        assert_eq!(tree.left_sibling_of(chain[0]), NO_NODE);
        for pair in chain.windows(2) {
            assert_eq!(tree.left_sibling_of(pair[1]), pair[0]);
        }

        // Every non-root node has a parent.
        if tree.depth() > 1 {
            for &leaf in &chain {
                assert_ne!(tree.parent_of(leaf), NO_NODE);
            }
        } else {
            assert_eq!(chain, vec![tree.root_node_id()]);
        }
    }

    #[test]
    fn test_new_tree_is_empty() {
        let tree = make_tree();
        assert_eq!(tree.tuple_count(), 0);
        assert_eq!(tree.begin(), tree.end());
        assert_eq!(tree.depth(), 1);
        assert_eq!(scan_keys(&tree), Vec::<i32>::new());
    }

    #[test]
    fn test_layout_accessors() {
        let tree = make_tree();
        assert_eq!(tree.leaf_tuple_layout().arity(), 3);
        assert_eq!(tree.branch_tuple_layout().arity(), 2);
    }

    #[test]
    fn test_insert_sequential_keys() {
        let mut tree = make_tree();
        for key in 0..100 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }

        assert_eq!(tree.tuple_count(), 100);
        assert_eq!(scan_keys(&tree), (0..100).collect::<Vec<_>>());
        assert!(tree.depth() >= 2);
        check_tree_invariants(&tree);
    }

    #[test]
    fn test_insert_permuted_keys() {
        let mut tree = make_tree();
        // 37 is coprime with 100, so this visits every key once.
        for i in 0..100 {
            tree.insert_tuple(&leaf_tuple((i * 37) % 100)).unwrap();
        }

        assert_eq!(tree.tuple_count(), 100);
        assert_eq!(scan_keys(&tree), (0..100).collect::<Vec<_>>());
        assert!(tree.depth() >= 2);
        check_tree_invariants(&tree);

        // The payload must have travelled with its key through the splits.
        let cursor = tree.lower_bound(&key_on_first_column(50)).unwrap();
        let tuple = tree.cursor_tuple(cursor).unwrap();
        assert_eq!(tuple.field(0).get_int().unwrap(), 50);
        assert!((tuple.field(1).get_double().unwrap() - 25.0).abs() < 1e-12);
        assert!((tuple.field(2).get_double().unwrap() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_insert_descending_keys() {
        let mut tree = make_tree();
        for key in (0..100).rev() {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }

        assert_eq!(tree.tuple_count(), 100);
        assert_eq!(scan_keys(&tree), (0..100).collect::<Vec<_>>());
        check_tree_invariants(&tree);
    }

    #[test]
    fn test_branch_key_on_double_column() {
        let schema = [Double, Int];
        let controller = InMemoryPageController::new(&schema, &[0], 4, 64).unwrap();
        let mut tree = BTree::new(Box::new(controller)).unwrap();

        let mut tuple = FreshTuple::from_schema(&schema).unwrap();
        for i in 0..20 {
            let key = ((i * 7) % 20) as f64 + 0.25;
            tuple.field_mut(0).set_double(key).unwrap();
            tuple.field_mut(1).set_int(i * 7 % 20).unwrap();
            tree.insert_tuple(&tuple).unwrap();
        }

        assert_eq!(tree.tuple_count(), 20);
        let keys: Vec<f64> = tree
            .iter()
            .map(|t| t.field(0).get_double().unwrap())
            .collect();
        let expected: Vec<f64> = (0..20).map(|k| k as f64 + 0.25).collect();
        assert_eq!(keys, expected);

        let mut key = ValueKey::new(&schema, &[0]).unwrap();
        key.field_mut(0).set_double(13.25).unwrap();
        let cursor = tree.lower_bound(&key).unwrap();
        assert!(
            (tree.cursor_tuple(cursor).unwrap().field(0).get_double().unwrap() - 13.25).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_two_column_branch_key() {
        let schema = [Int, Int, Int];
        let controller = InMemoryPageController::new(&schema, &[0, 1], 4, 64).unwrap();
        let mut tree = BTree::new(Box::new(controller)).unwrap();
        assert_eq!(tree.branch_tuple_layout().arity(), 3);

        let mut tuple = FreshTuple::from_schema(&schema).unwrap();
        for n in 0..36 {
            let n = (n * 13) % 36;
            tuple.field_mut(0).set_int(n / 6).unwrap();
            tuple.field_mut(1).set_int(n % 6).unwrap();
            tuple.field_mut(2).set_int(n * 100).unwrap();
            tree.insert_tuple(&tuple).unwrap();
        }

        assert_eq!(tree.tuple_count(), 36);
        let pairs: Vec<(i32, i32)> = tree
            .iter()
            .map(|t| {
                (
                    t.field(0).get_int().unwrap(),
                    t.field(1).get_int().unwrap(),
                )
            })
            .collect();
        let expected: Vec<(i32, i32)> = (0..36).map(|n| (n / 6, n % 6)).collect();
        assert_eq!(pairs, expected);
        check_tree_invariants(&tree);

        // A one-column key matches the whole group it prefixes.
        let mut group = ValueKey::new(&schema, &[0]).unwrap();
        group.field_mut(0).set_int(2).unwrap();
        let (lower, upper) = tree.equal_range(&group).unwrap();
        assert_eq!(tree.range(lower, upper).count(), 6);

        // A two-column key pins down a single tuple.
        let mut exact = ValueKey::new(&schema, &[0, 1]).unwrap();
        exact.field_mut(0).set_int(2).unwrap();
        exact.field_mut(1).set_int(3).unwrap();
        let (lower, upper) = tree.equal_range(&exact).unwrap();
        let matches: Vec<i32> = tree
            .range(lower, upper)
            .map(|t| t.field(2).get_int().unwrap())
            .collect();
        assert_eq!(matches, vec![1500]);
    }

    #[test]
    fn test_lower_and_upper_bound_on_value_key() {
        let mut tree = make_tree();
        for key in (0..50).map(|k| k * 2) {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }

        // An existing key.
        let lower = tree.lower_bound(&key_on_first_column(40)).unwrap();
        assert_eq!(
            tree.cursor_tuple(lower).unwrap().field(0).get_int().unwrap(),
            40
        );

        // A missing key lands on the next greater one.
        let lower = tree.lower_bound(&key_on_first_column(41)).unwrap();
        assert_eq!(
            tree.cursor_tuple(lower).unwrap().field(0).get_int().unwrap(),
            42
        );

        // Beyond the maximum key the bound is the end.
        let lower = tree.lower_bound(&key_on_first_column(99)).unwrap();
        assert_eq!(lower, tree.end());

        let (lower, upper) = tree.equal_range(&key_on_first_column(40)).unwrap();
        assert_eq!(tree.range(lower, upper).count(), 1);
    }

    #[test]
    fn test_duplicate_keys_stay_together() {
        let mut tree = make_tree();
        for key in 0..40 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }
        for _ in 0..5 {
            tree.insert_tuple(&leaf_tuple(17)).unwrap();
        }

        assert_eq!(tree.tuple_count(), 45);

        let (lower, upper) = tree.equal_range(&key_on_first_column(17)).unwrap();
        let matches: Vec<i32> = tree
            .range(lower, upper)
            .map(|tuple| tuple.field(0).get_int().unwrap())
            .collect();
        assert_eq!(matches, vec![17; 6]);
        check_tree_invariants(&tree);
    }

    #[test]
    fn test_range_scan_with_range_key() {
        let mut tree = make_tree();
        for key in 0..60 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }

        let mut range = RangeKey::new(&LEAF_SCHEMA, &[0]).unwrap();
        range.low_value_mut().field_mut(0).set_int(20).unwrap();
        range.high_value_mut().field_mut(0).set_int(30).unwrap();

        // [20, 30] includes both endpoints.
        let (lower, upper) = tree.range_bounds(&range).unwrap();
        let keys: Vec<i32> = tree
            .range(lower, upper)
            .map(|t| t.field(0).get_int().unwrap())
            .collect();
        assert_eq!(keys, (20..=30).collect::<Vec<_>>());

        // (20, 30) excludes both.
        *range.low_kind_mut() = EndpointKind::Open;
        *range.high_kind_mut() = EndpointKind::Open;
        let (lower, upper) = tree.range_bounds(&range).unwrap();
        let keys: Vec<i32> = tree
            .range(lower, upper)
            .map(|t| t.field(0).get_int().unwrap())
            .collect();
        assert_eq!(keys, (21..30).collect::<Vec<_>>());

        // Unbounded low end.
        range.clear_low();
        let (lower, upper) = tree.range_bounds(&range).unwrap();
        assert_eq!(tree.range(lower, upper).count(), 30);

        // Fully unbounded.
        range.clear_high();
        let (lower, upper) = tree.range_bounds(&range).unwrap();
        assert_eq!(tree.range(lower, upper).count(), 60);
    }

    #[test]
    fn test_erase_tuples_by_value_key() {
        let mut tree = make_tree();
        for key in 0..20 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }
        for _ in 0..3 {
            tree.insert_tuple(&leaf_tuple(7)).unwrap();
        }

        let erased = tree.erase_tuples(&key_on_first_column(7)).unwrap();
        assert_eq!(erased, 4);
        assert_eq!(tree.tuple_count(), 19);

        let keys = scan_keys(&tree);
        assert!(!keys.contains(&7));
        assert_eq!(keys.len(), 19);

        // Erasing an absent key does nothing.
        assert_eq!(tree.erase_tuples(&key_on_first_column(7)).unwrap(), 0);
        assert_eq!(tree.tuple_count(), 19);
    }

    #[test]
    fn test_erase_tuple_by_range_key() {
        let mut tree = make_tree();
        for key in 0..20 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }

        let mut range = RangeKey::new(&LEAF_SCHEMA, &[0]).unwrap();
        range.low_value_mut().field_mut(0).set_int(5).unwrap();
        range.high_value_mut().field_mut(0).set_int(8).unwrap();

        // Each call removes the first remaining tuple of [5, 8].
        assert!(tree.erase_tuple(&range).unwrap());
        assert_eq!(tree.tuple_count(), 19);
        assert!(!scan_keys(&tree).contains(&5));

        assert!(tree.erase_tuple(&range).unwrap());
        assert!(tree.erase_tuple(&range).unwrap());
        assert!(tree.erase_tuple(&range).unwrap());
        assert!(!tree.erase_tuple(&range).unwrap());
        assert_eq!(tree.tuple_count(), 16);
        assert_eq!(
            scan_keys(&tree),
            (0..20).filter(|k| !(5..=8).contains(k)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_clear_returns_to_single_empty_leaf() {
        let mut tree = make_tree();
        for key in 0..50 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }
        assert!(tree.depth() >= 2);

        tree.clear().unwrap();
        assert_eq!(tree.tuple_count(), 0);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.begin(), tree.end());

        // The tree stays usable after a clear.
        tree.insert_tuple(&leaf_tuple(3)).unwrap();
        assert_eq!(scan_keys(&tree), vec![3]);
    }

    #[test]
    fn test_deep_tree_with_tiny_pages() {
        // Two tuples per leaf and two separators per branch force frequent
        // leaf and branch splits.
        let schema = [Int, Int];
        let controller = InMemoryPageController::new(&schema, &[0], 2, 32).unwrap();
        let mut tree = BTree::new(Box::new(controller)).unwrap();

        let mut tuple = FreshTuple::from_schema(&schema).unwrap();
        for i in 0..30 {
            let key = (i * 11) % 30;
            tuple.field_mut(0).set_int(key).unwrap();
            tuple.field_mut(1).set_int(key * 10).unwrap();
            tree.insert_tuple(&tuple).unwrap();
        }

        assert_eq!(tree.tuple_count(), 30);
        assert!(tree.depth() >= 3);

        let keys: Vec<i32> = tree
            .iter()
            .map(|t| t.field(0).get_int().unwrap())
            .collect();
        assert_eq!(keys, (0..30).collect::<Vec<_>>());

        let depths = tree.leaf_depths();
        assert!(depths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_bulk_load_builds_packed_levels() {
        let schema = [Int, Int];
        let controller = InMemoryPageController::new(&schema, &[0], 3, 64).unwrap();
        let mut tree = BTree::new(Box::new(controller)).unwrap();

        // Five leaf pages in key order, three tuples each.
        let mut pages = Vec::new();
        let mut tuple = FreshTuple::from_schema(&schema).unwrap();
        for page_index in 0..5 {
            let mut page = SortedPage::new(&schema, 64).unwrap();
            for offset in 0..3 {
                let key = page_index * 3 + offset;
                tuple.field_mut(0).set_int(key).unwrap();
                tuple.field_mut(1).set_int(key * 10).unwrap();
                page.add_tuple(&tuple).unwrap();
            }
            pages.push(page);
        }

        tree.bulk_load(pages).unwrap();

        assert_eq!(tree.tuple_count(), 15);
        assert_eq!(scan_keys(&tree), (0..15).collect::<Vec<_>>());
        check_tree_invariants(&tree);

        // Routing works over the packed levels.
        let mut key = ValueKey::new(&schema, &[0]).unwrap();
        key.field_mut(0).set_int(7).unwrap();
        let cursor = tree.lower_bound(&key).unwrap();
        assert_eq!(
            tree.cursor_tuple(cursor).unwrap().field(0).get_int().unwrap(),
            7
        );

        // The tree accepts further inserts after a bulk load.
        tuple.field_mut(0).set_int(15).unwrap();
        tuple.field_mut(1).set_int(150).unwrap();
        tree.insert_tuple(&tuple).unwrap();
        assert_eq!(tree.tuple_count(), 16);
        assert_eq!(scan_keys(&tree), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_bulk_load_rejects_empty_pages() {
        let schema = [Int, Int];
        let controller = InMemoryPageController::new(&schema, &[0], 3, 64).unwrap();
        let mut tree = BTree::new(Box::new(controller)).unwrap();

        let pages = vec![SortedPage::new(&schema, 64).unwrap()];
        assert!(matches!(
            tree.bulk_load(pages),
            Err(ReedError::EmptyPage { index: 0 })
        ));
    }

    #[test]
    fn test_bulk_load_of_nothing_is_clear() {
        let mut tree = make_tree();
        for key in 0..10 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }

        tree.bulk_load(Vec::new()).unwrap();
        assert_eq!(tree.tuple_count(), 0);
        assert_eq!(tree.begin(), tree.end());
    }

    #[test]
    fn test_erase_everything_then_regrow() {
        let mut tree = make_tree();
        for key in 0..30 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }

        for key in 0..30 {
            assert_eq!(tree.erase_tuples(&key_on_first_column(key)).unwrap(), 1);
        }
        assert_eq!(tree.tuple_count(), 0);
        assert_eq!(tree.begin(), tree.end());

        // The emptied structure still routes correctly.
        for key in 0..30 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }
        assert_eq!(tree.tuple_count(), 30);
        assert_eq!(scan_keys(&tree), (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_print_indents_every_level() {
        let schema = [Int, Int];
        let controller = InMemoryPageController::new(&schema, &[0], 2, 32).unwrap();
        let mut tree = BTree::new(Box::new(controller)).unwrap();

        let mut tuple = FreshTuple::from_schema(&schema).unwrap();
        for key in 0..12 {
            tuple.field_mut(0).set_int(key).unwrap();
            tuple.field_mut(1).set_int(key).unwrap();
            tree.insert_tuple(&tuple).unwrap();
        }
        assert!(tree.depth() >= 3);

        let mut output = Vec::new();
        tree.print(&mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        // Every level of the tree appears with its own indentation.
        for depth in 0..tree.depth() {
            let prefix: String = "\t".repeat(depth) + "node ";
            assert!(
                text.lines().any(|line| line.starts_with(&prefix)),
                "missing a line at depth {}",
                depth
            );
        }
    }

    #[test]
    fn test_print_emits_tabbed_depth_order() {
        let mut tree = make_tree();
        for key in 0..10 {
            tree.insert_tuple(&leaf_tuple(key)).unwrap();
        }
        assert!(tree.depth() >= 2);

        let mut output = Vec::new();
        tree.print(&mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        // Root line first, unindented; children indented by one tab.
        assert!(lines[0].starts_with("node "));
        assert!(lines[1].starts_with('\t'));
        assert!(lines.iter().skip(1).all(|line| line.starts_with('\t')));

        // Every tuple of the root's first leaf is rendered in order.
        assert!(text.contains("(0,0,0)"));
    }
}
