use report_cell::services::naming::{next_available_name, sequence_number, split_file_name};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// === sequence_number ===

#[test]
fn bare_name_is_position_zero() {
    assert_eq!(sequence_number("base.ext", "base", ".ext"), 0);
}

#[test]
fn parenthesized_number_is_extracted() {
    assert_eq!(sequence_number("base(3).ext", "base", ".ext"), 3);
    assert_eq!(sequence_number("base(101).ext", "base", ".ext"), 101);
}

#[test]
fn parenthesized_zero_is_not_a_member() {
    // Position zero is only ever spelled as the bare name
    assert_eq!(sequence_number("base(0).ext", "base", ".ext"), -1);
}

#[test]
fn lookalike_names_are_excluded() {
    assert_eq!(sequence_number("baseXYZ.ext", "base", ".ext"), -1);
    assert_eq!(sequence_number("base_123.ext", "base", ".ext"), -1);
    assert_eq!(sequence_number("base(12.ext", "base", ".ext"), -1);
    assert_eq!(sequence_number("base(abc).ext", "base", ".ext"), -1);
}

#[test]
fn different_extension_is_excluded() {
    // The suffix strip leaves the name untouched, so nothing matches
    assert_eq!(sequence_number("base.jpg", "base", ".ext"), -1);
    assert_eq!(sequence_number("base(2).jpg", "base", ".ext"), -1);
}

// === next_available_name ===

#[test]
fn empty_family_gets_the_bare_name() {
    assert_eq!(next_available_name("base", ".ext", &[]), "base.ext");
}

#[test]
fn gap_in_the_sequence_is_filled_first() {
    let existing = names(&["base.ext", "base(2).ext"]);
    assert_eq!(next_available_name("base", ".ext", &existing), "base(1).ext");
}

#[test]
fn contiguous_family_extends_by_one() {
    let existing = names(&["base.ext", "base(1).ext"]);
    assert_eq!(next_available_name("base", ".ext", &existing), "base(2).ext");
}

#[test]
fn missing_bare_name_is_reassigned() {
    let existing = names(&["base(1).ext", "base(2).ext"]);
    assert_eq!(next_available_name("base", ".ext", &existing), "base.ext");
}

#[test]
fn input_order_does_not_matter() {
    let shuffled = names(&["base(2).ext", "base.ext", "base(1).ext", "base(4).ext"]);
    let sorted = names(&["base.ext", "base(1).ext", "base(2).ext", "base(4).ext"]);
    assert_eq!(
        next_available_name("base", ".ext", &shuffled),
        next_available_name("base", ".ext", &sorted),
    );
    assert_eq!(next_available_name("base", ".ext", &shuffled), "base(3).ext");
}

#[test]
fn unrelated_names_do_not_consume_slots() {
    // The storage pre-filter matches on substring, so lookalikes arrive here
    // and must not shift the numbering
    let existing = names(&["base.ext", "base_old.ext", "rebase.ext", "base(0).ext"]);
    assert_eq!(next_available_name("base", ".ext", &existing), "base(1).ext");
}

#[test]
fn single_high_number_leaves_the_bare_name_open() {
    let existing = names(&["base(7).ext"]);
    assert_eq!(next_available_name("base", ".ext", &existing), "base.ext");
}

// === split_file_name ===

#[test]
fn splits_on_the_last_dot() {
    assert_eq!(split_file_name("scan.pdf"), ("scan".to_string(), ".pdf".to_string()));
    assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar".to_string(), ".gz".to_string()));
}

#[test]
fn name_without_a_dot_has_empty_extension() {
    assert_eq!(split_file_name("scan"), ("scan".to_string(), String::new()));
}
