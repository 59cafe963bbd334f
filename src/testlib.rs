use std::fmt::Debug;

use regex::Regex;

use crate::model::Item;

pub fn assert_re(pattern: &str, haystack: &str) {
    let re = Regex::new(pattern).unwrap();
    assert!(re.is_match(haystack), "{:?} did not match {:?}", haystack, re);
}

pub fn assert_big_struct_eq<T: PartialEq + Debug>(left: T, right: T) {
    assert_eq!(left, right, "{:#?} != {:#?}", left, right);
}

pub fn assert_vec_eq<T: PartialEq + Debug>(left: Vec<T>, right: Vec<T>) {
    assert_vecr_eq(&left, &right);
}

/// Like assert_eq, but prints one element per line, and points out each
/// mismatched index.
pub fn assert_vecr_eq<T: PartialEq + Debug>(left: &Vec<T>, right: &Vec<T>) {
    if left == right {
        return;
    }

    let mut err_str = "left != right. left: [\n".to_string();
    for o in left {
        err_str += &format!("{:?},\n", o);
    }
    err_str += "] != right: [\n";
    for o in right {
        err_str += &format!("{:?},\n", o);
    }
    err_str += "]";
    eprintln!("{}", err_str);

    if left.len() != right.len() {
        panic!("size of left ({}) != size of right ({})", left.len(), right.len());
    }
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        if l != r {
            eprintln!("Mismatch at index {}:\nleft: {:#?} != right: {:#?}", i, l, r);
        }
    }
    panic!("vectors differ");
}

/// Checks the sequence of item kinds ("Security", "BuySell", "Transaction").
pub fn assert_item_kinds(items: &[Item], kinds: &[&str]) {
    assert_vec_eq(
        items.iter().map(|i| i.kind_str()).collect(),
        kinds.to_vec(),
    );
}
