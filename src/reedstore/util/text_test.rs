// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::reedstore::util::text::write_tabbed_text;

    #[test]
    fn test_untabbed_line() {
        let mut out = Vec::new();
        write_tabbed_text(&mut out, 0, "root").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "root\n");
    }

    #[test]
    fn test_tab_prefix_matches_count() {
        let mut out = Vec::new();
        write_tabbed_text(&mut out, 3, "leaf").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\t\t\tleaf\n");
    }

    #[test]
    fn test_lines_accumulate() {
        let mut out = Vec::new();
        write_tabbed_text(&mut out, 0, "node 0").unwrap();
        write_tabbed_text(&mut out, 1, "node 1").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "node 0\n\tnode 1\n");
    }
}
