// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::reedstore::tuples::backed::{TupleMut, TupleRef};
    use crate::reedstore::tuples::fresh::FreshTuple;
    use crate::reedstore::tuples::layout::TupleLayout;
    use crate::reedstore::tuples::manipulator::FieldManipulator::{Double, Int};
    use crate::reedstore::tuples::tuple::Tuple;

    #[test]
    fn test_backed_tuple_reads_buffer_contents() {
        let layout = TupleLayout::new(&[Int, Double]).unwrap();
        let mut buffer = vec![0u8; layout.size()];

        {
            let mut tuple = TupleMut::new(&mut buffer, &layout);
            tuple.field_mut(0).set_int(17).unwrap();
            tuple.field_mut(1).set_double(10.0).unwrap();
        }

        let view = TupleRef::new(&buffer, &layout);
        assert_eq!(view.arity(), 2);
        assert_eq!(view.field(0).get_int().unwrap(), 17);
        assert!((view.field(1).get_double().unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_copy_from_fills_backed_tuple() {
        let mut source = FreshTuple::from_schema(&[Int, Double]).unwrap();
        source.field_mut(0).set_int(23).unwrap();
        source.field_mut(1).set_double(9.0).unwrap();

        let layout = TupleLayout::new(&[Int, Double]).unwrap();
        let mut buffer = vec![0u8; layout.size()];
        let mut target = TupleMut::new(&mut buffer, &layout);
        target.copy_from(&source).unwrap();

        assert_eq!(target.field(0).get_int().unwrap(), 23);
        assert!((target.field(1).get_double().unwrap() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_copy_from_rejects_arity_mismatch() {
        let source = FreshTuple::from_schema(&[Int]).unwrap();

        let layout = TupleLayout::new(&[Int, Int]).unwrap();
        let mut buffer = vec![0u8; layout.size()];
        let mut target = TupleMut::new(&mut buffer, &layout);

        assert!(target.copy_from(&source).is_err());
    }

    #[test]
    fn test_tuples_at_distinct_buffer_slots() {
        let layout = TupleLayout::new(&[Int]).unwrap();
        let mut buffer = vec![0u8; layout.size() * 2];

        {
            let (first, second) = buffer.split_at_mut(layout.size());
            TupleMut::new(first, &layout).field_mut(0).set_int(7).unwrap();
            TupleMut::new(second, &layout)
                .field_mut(0)
                .set_int(8)
                .unwrap();
        }

        let first = TupleRef::new(&buffer[..layout.size()], &layout);
        let second = TupleRef::new(&buffer[layout.size()..], &layout);
        assert_eq!(first.field(0).get_int().unwrap(), 7);
        assert_eq!(second.field(0).get_int().unwrap(), 8);
    }
}
