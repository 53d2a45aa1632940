use std::fmt::Display;
use std::str::{FromStr, SplitWhitespace};

use anyhow::anyhow;
use num::PrimInt;

pub type Res<T> = anyhow::Result<T>;

pub fn parse_int_from_str<T: PrimInt + FromStr>(as_str: &str, name: &str) -> Res<T> {
    // parse::<T>() returns an error type we can't name generically,
    // so we just write the error message ourselves
    as_str
        .parse::<T>()
        .map_err(|_err| anyhow!("Couldn't parse {name} ('{as_str}')"))
}

pub fn parse_int<T: PrimInt + FromStr + Display>(
    words: &mut SplitWhitespace,
    name: &str,
) -> Res<T> {
    parse_int_from_str(
        words.next().ok_or_else(|| anyhow!("Missing {name}"))?,
        name,
    )
}

/// Joins the remaining words up to (excluding) `stop`, which is consumed as well.
/// Used for multi-word UCI option names such as `Move Overhead`.
pub fn words_until(words: &mut SplitWhitespace, stop: &str) -> String {
    let mut res = vec![];
    for word in words.by_ref() {
        if word == stop {
            break;
        }
        res.push(word);
    }
    res.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_test() {
        assert_eq!(parse_int_from_str::<u64>("800000", "budget").unwrap(), 800_000);
        assert_eq!(parse_int_from_str::<i32>("-3", "n").unwrap(), -3);
        assert!(parse_int_from_str::<u64>("-3", "budget").is_err());
        assert!(parse_int_from_str::<u64>("e2e4", "budget").is_err());
        let mut words = "movetime 100".split_whitespace();
        assert!(parse_int::<u64>(&mut words, "movetime").is_err());
        assert_eq!(parse_int::<u64>(&mut words, "movetime").unwrap(), 100);
        assert!(parse_int::<u64>(&mut words, "movetime").is_err());
    }

    #[test]
    fn words_until_test() {
        let mut words = "name Move Overhead value 30".split_whitespace();
        assert_eq!(words.next(), Some("name"));
        assert_eq!(words_until(&mut words, "value"), "Move Overhead");
        assert_eq!(words.next(), Some("30"));
        let mut words = "a b".split_whitespace();
        assert_eq!(words_until(&mut words, "value"), "a b");
        assert_eq!(words.next(), None);
    }
}
