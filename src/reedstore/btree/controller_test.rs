// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::reedstore::btree::controller::{InMemoryPageController, PageController};
    use crate::reedstore::tuples::manipulator::FieldManipulator::{Double, Int};

    #[test]
    fn test_layouts_follow_configuration() {
        let controller =
            InMemoryPageController::new(&[Int, Double, Double], &[0], 10, 128).unwrap();

        let leaf = controller.leaf_tuple_layout();
        assert_eq!(leaf.arity(), 3);
        assert_eq!(leaf.manipulators(), &[Int, Double, Double]);

        // Branch tuples carry the key column plus an int child id.
        let branch = controller.branch_tuple_layout();
        assert_eq!(branch.arity(), 2);
        assert_eq!(branch.manipulators(), &[Int, Int]);

        assert_eq!(controller.branch_key_field_indices(), vec![0]);
    }

    #[test]
    fn test_branch_pages_hold_fixed_tuple_count() {
        let controller =
            InMemoryPageController::new(&[Int, Double, Double], &[0], 10, 128).unwrap();

        let branch_page = controller.make_branch_page().unwrap();
        assert_eq!(branch_page.max_tuple_count(), 10);
        assert_eq!(branch_page.tuple_count(), 0);
    }

    #[test]
    fn test_leaf_pages_use_fixed_buffer_size() {
        let controller =
            InMemoryPageController::new(&[Int, Double, Double], &[0], 10, 128).unwrap();

        let leaf_page = controller.make_leaf_page().unwrap();
        assert_eq!(leaf_page.buffer_size(), 128);
        assert!(leaf_page.max_tuple_count() >= 2);
    }

    #[test]
    fn test_degenerate_geometry_is_rejected() {
        assert!(InMemoryPageController::new(&[Int], &[0], 1, 1024).is_err());
        assert!(InMemoryPageController::new(&[Int], &[0], 10, 8).is_err());
        assert!(InMemoryPageController::new(&[], &[0], 10, 1024).is_err());
        assert!(InMemoryPageController::new(&[Int], &[5], 10, 1024).is_err());
    }
}
