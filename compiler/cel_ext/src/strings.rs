//! The `strings` library.
//!
//! All indices count Unicode code points, never bytes.
//!
//! | version | adds |
//! |---|---|
//! | 0 | `charAt`, `indexOf`, `lastIndexOf`, `lowerAscii`, `upperAscii`, `replace`, `split`, `substring`, `trim` |
//! | 1 | `join` |
//! | 2 | `reverse` |

use cel_eval::errors::invalid_argument;
use cel_eval::{EvalError, EvalResult, Value};
use cel_types::{Overload, Type};

use crate::args::{int_len, require_int, require_list, require_str};
use crate::{Feature, FunctionDef, Library};

/// `strings`, versions 0 through 2.
#[derive(Copy, Clone, Debug, Default)]
pub struct StringsLib;

impl Library for StringsLib {
    fn name(&self) -> &str {
        "strings"
    }

    fn features(&self) -> Vec<Feature> {
        vec![
            Feature::new("charAt", 0).function(char_at()),
            Feature::new("indexOf", 0).function(index_of()),
            Feature::new("lastIndexOf", 0).function(last_index_of()),
            Feature::new("lowerAscii", 0).function(string_unary(
                "lowerAscii",
                "string_lower_ascii",
                str::to_ascii_lowercase,
            )),
            Feature::new("upperAscii", 0).function(string_unary(
                "upperAscii",
                "string_upper_ascii",
                str::to_ascii_uppercase,
            )),
            Feature::new("replace", 0).function(replace()),
            Feature::new("split", 0).function(split()),
            Feature::new("substring", 0).function(substring()),
            Feature::new("trim", 0).function(string_unary("trim", "string_trim", |s| {
                s.trim().to_owned()
            })),
            Feature::new("join", 1).function(join()),
            Feature::new("reverse", 2).function(string_unary("reverse", "string_reverse", |s| {
                s.chars().rev().collect()
            })),
        ]
    }
}

fn member(id: &str, params: Vec<Type>, result: Type) -> Overload {
    Overload::member(id, params, result)
}

fn out_of_range(index: i64) -> EvalError {
    invalid_argument(format!("index out of range: {index}"))
}

/// A code point offset in `0..=len`.
fn char_offset(index: i64, len: usize) -> Result<usize, EvalError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i <= len)
        .ok_or_else(|| out_of_range(index))
}

fn string_unary(name: &'static str, id: &str, op: fn(&str) -> String) -> FunctionDef {
    FunctionDef::new(name).overload(member(id, vec![Type::String], Type::String), move |_, args| {
        Ok(Value::string(op(require_str(name, args, 0)?)))
    })
}

/// `s.charAt(i)`; `i == size(s)` yields the empty string.
fn char_at() -> FunctionDef {
    FunctionDef::new("charAt").overload(
        member("string_char_at_int", vec![Type::String, Type::Int], Type::String),
        |_, args| {
            let s = require_str("charAt", args, 0)?;
            let index = require_int("charAt", args, 1)?;
            let chars: Vec<char> = s.chars().collect();
            let i = char_offset(index, chars.len())?;
            Ok(Value::string(chars.get(i).map(char::to_string).unwrap_or_default()))
        },
    )
}

/// Code point position of `needle` in `haystack` at or after `from`.
fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from);
    }
    (from..haystack.len())
        .find(|&i| haystack[i..].starts_with(needle))
}

/// Last code point position of `needle` in `haystack` at or before `upto`.
fn rfind_upto(haystack: &[char], needle: &[char], upto: usize) -> Option<usize> {
    let last_start = haystack.len().checked_sub(needle.len())?;
    (0..=upto.min(last_start))
        .rev()
        .find(|&i| haystack[i..].starts_with(needle))
}

fn position(found: Option<usize>) -> Value {
    found.map_or(Value::Int(-1), int_len)
}

fn index_of() -> FunctionDef {
    FunctionDef::new("indexOf")
        .overload(
            member(
                "string_index_of_string",
                vec![Type::String, Type::String],
                Type::Int,
            ),
            |_, args| search(args, None, find_from),
        )
        .overload(
            member(
                "string_index_of_string_int",
                vec![Type::String, Type::String, Type::Int],
                Type::Int,
            ),
            |_, args| search(args, Some(require_int("indexOf", args, 2)?), find_from),
        )
}

fn last_index_of() -> FunctionDef {
    FunctionDef::new("lastIndexOf")
        .overload(
            member(
                "string_last_index_of_string",
                vec![Type::String, Type::String],
                Type::Int,
            ),
            |_, args| {
                let len = require_str("lastIndexOf", args, 0)?.chars().count();
                search(args, Some(i64::try_from(len).unwrap_or(i64::MAX)), rfind_upto)
            },
        )
        .overload(
            member(
                "string_last_index_of_string_int",
                vec![Type::String, Type::String, Type::Int],
                Type::Int,
            ),
            |_, args| search(args, Some(require_int("lastIndexOf", args, 2)?), rfind_upto),
        )
}

/// Shared body of `indexOf` and `lastIndexOf`; `offset` defaults to 0.
fn search(
    args: &[Value],
    offset: Option<i64>,
    find: fn(&[char], &[char], usize) -> Option<usize>,
) -> EvalResult {
    let haystack: Vec<char> = require_str("indexOf", args, 0)?.chars().collect();
    let needle: Vec<char> = require_str("indexOf", args, 1)?.chars().collect();
    let offset = char_offset(offset.unwrap_or(0), haystack.len())?;
    Ok(position(find(&haystack, &needle, offset)))
}

/// `s.replace(old, new)` and `s.replace(old, new, n)`; negative `n`
/// replaces every occurrence.
fn replace() -> FunctionDef {
    let replace_n = |args: &[Value], n: i64| -> EvalResult {
        let s = require_str("replace", args, 0)?;
        let from = require_str("replace", args, 1)?;
        let to = require_str("replace", args, 2)?;
        let replaced = match usize::try_from(n) {
            Ok(count) => s.replacen(from, to, count),
            Err(_) => s.replace(from, to),
        };
        Ok(Value::string(replaced))
    };
    FunctionDef::new("replace")
        .overload(
            member(
                "string_replace_string_string",
                vec![Type::String, Type::String, Type::String],
                Type::String,
            ),
            move |_, args| replace_n(args, -1),
        )
        .overload(
            member(
                "string_replace_string_string_int",
                vec![Type::String, Type::String, Type::String, Type::Int],
                Type::String,
            ),
            move |_, args| replace_n(args, require_int("replace", args, 3)?),
        )
}

/// At most `limit` pieces (all when `None`); an empty separator splits
/// between code points.
fn split_pieces(s: &str, sep: &str, limit: Option<usize>) -> Vec<Value> {
    let limit = limit.unwrap_or(usize::MAX);
    if limit == 0 {
        return Vec::new();
    }
    if sep.is_empty() {
        let mut pieces: Vec<Value> = Vec::new();
        let mut rest = s;
        while let Some(c) = rest.chars().next() {
            if pieces.len() + 1 == limit {
                break;
            }
            let (head, tail) = rest.split_at(c.len_utf8());
            pieces.push(Value::string(head));
            rest = tail;
        }
        if !rest.is_empty() {
            pieces.push(Value::string(rest));
        }
        return pieces;
    }
    s.splitn(limit, sep).map(Value::string).collect()
}

fn split() -> FunctionDef {
    FunctionDef::new("split")
        .overload(
            member(
                "string_split_string",
                vec![Type::String, Type::String],
                Type::list(Type::String),
            ),
            |_, args| {
                let s = require_str("split", args, 0)?;
                let sep = require_str("split", args, 1)?;
                Ok(Value::list(split_pieces(s, sep, None)))
            },
        )
        .overload(
            member(
                "string_split_string_int",
                vec![Type::String, Type::String, Type::Int],
                Type::list(Type::String),
            ),
            |_, args| {
                let s = require_str("split", args, 0)?;
                let sep = require_str("split", args, 1)?;
                let limit = usize::try_from(require_int("split", args, 2)?).ok();
                Ok(Value::list(split_pieces(s, sep, limit)))
            },
        )
}

fn substring() -> FunctionDef {
    FunctionDef::new("substring")
        .overload(
            member(
                "string_substring_int",
                vec![Type::String, Type::Int],
                Type::String,
            ),
            |_, args| {
                let chars: Vec<char> = require_str("substring", args, 0)?.chars().collect();
                let start = char_offset(require_int("substring", args, 1)?, chars.len())?;
                Ok(Value::string(chars[start..].iter().collect::<String>()))
            },
        )
        .overload(
            member(
                "string_substring_int_int",
                vec![Type::String, Type::Int, Type::Int],
                Type::String,
            ),
            |_, args| {
                let chars: Vec<char> = require_str("substring", args, 0)?.chars().collect();
                let start = require_int("substring", args, 1)?;
                let end = require_int("substring", args, 2)?;
                if start > end {
                    return Err(invalid_argument(format!(
                        "invalid substring range. start: {start}, end: {end}"
                    )));
                }
                let from = char_offset(start, chars.len())?;
                let to = char_offset(end, chars.len())?;
                Ok(Value::string(chars[from..to].iter().collect::<String>()))
            },
        )
}

fn join() -> FunctionDef {
    let join_with = |args: &[Value], sep: &str| -> EvalResult {
        let parts = require_list("join", args, 0)?
            .iter()
            .map(|part| {
                part.as_str().ok_or_else(|| {
                    invalid_argument(format!(
                        "join() expected a list of strings, found {}",
                        part.type_name()
                    ))
                })
            })
            .collect::<Result<Vec<&str>, EvalError>>()?;
        Ok(Value::string(parts.join(sep)))
    };
    FunctionDef::new("join")
        .overload(
            member(
                "list_join",
                vec![Type::list(Type::String)],
                Type::String,
            ),
            move |_, args| join_with(args, ""),
        )
        .overload(
            member(
                "list_join_string",
                vec![Type::list(Type::String), Type::String],
                Type::String,
            ),
            move |_, args| join_with(args, require_str("join", args, 1)?),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestEnv;
    use pretty_assertions::assert_eq;

    fn env() -> TestEnv {
        TestEnv::with(&StringsLib)
    }

    fn eval(source: &str) -> Value {
        env().eval(source).unwrap()
    }

    fn strings(items: &[&str]) -> Value {
        Value::list(items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn char_at_counts_code_points() {
        assert_eq!(eval("'héllo'.charAt(1)"), Value::from("é"));
        assert_eq!(eval("'abc'.charAt(3)"), Value::from(""));
        assert_eq!(
            env().eval("'abc'.charAt(4)").unwrap_err().message,
            "index out of range: 4"
        );
        assert!(env().eval("'abc'.charAt(-1)").is_err());
    }

    #[test]
    fn index_of_and_last_index_of() {
        assert_eq!(eval("'hello mellow'.indexOf('ello')"), Value::Int(1));
        assert_eq!(eval("'hello mellow'.indexOf('ello', 2)"), Value::Int(7));
        assert_eq!(eval("'hello'.indexOf('z')"), Value::Int(-1));
        assert_eq!(eval("'hello'.indexOf('')"), Value::Int(0));
        assert_eq!(eval("'héllo'.indexOf('l')"), Value::Int(2));
        assert_eq!(eval("'hello mellow'.lastIndexOf('ello')"), Value::Int(7));
        assert_eq!(eval("'hello mellow'.lastIndexOf('ello', 6)"), Value::Int(1));
        assert_eq!(eval("'hello'.lastIndexOf('')"), Value::Int(5));
        assert_eq!(eval("'ab'.lastIndexOf('abc')"), Value::Int(-1));
        assert!(env().eval("'abc'.indexOf('a', 4)").is_err());
    }

    #[test]
    fn case_and_trim() {
        assert_eq!(eval("'TacoCat'.lowerAscii()"), Value::from("tacocat"));
        assert_eq!(eval("'héllo'.upperAscii()"), Value::from("HéLLO"));
        assert_eq!(eval("'  \\t pad \\n'.trim()"), Value::from("pad"));
    }

    #[test]
    fn replace_counts() {
        assert_eq!(eval("'aaa'.replace('a', 'b')"), Value::from("bbb"));
        assert_eq!(eval("'aaa'.replace('a', 'b', 2)"), Value::from("bba"));
        assert_eq!(eval("'aaa'.replace('a', 'b', 0)"), Value::from("aaa"));
        assert_eq!(eval("'aaa'.replace('a', 'b', -1)"), Value::from("bbb"));
    }

    #[test]
    fn split_limits() {
        assert_eq!(eval("'a,b,c'.split(',')"), strings(&["a", "b", "c"]));
        assert_eq!(eval("'a,b,c'.split(',', 2)"), strings(&["a", "b,c"]));
        assert_eq!(eval("'a,b,c'.split(',', 0)"), strings(&[]));
        assert_eq!(eval("'a,b,c'.split(',', -1)"), strings(&["a", "b", "c"]));
        assert_eq!(eval("'abc'.split('')"), strings(&["a", "b", "c"]));
        assert_eq!(eval("'abc'.split('', 2)"), strings(&["a", "bc"]));
    }

    #[test]
    fn substring_ranges() {
        assert_eq!(eval("'tacocat'.substring(4)"), Value::from("cat"));
        assert_eq!(eval("'héllo'.substring(1, 3)"), Value::from("él"));
        assert_eq!(eval("'abc'.substring(3)"), Value::from(""));
        assert_eq!(
            env().eval("'abc'.substring(2, 1)").unwrap_err().message,
            "invalid substring range. start: 2, end: 1"
        );
        assert_eq!(
            env().eval("'abc'.substring(1, 4)").unwrap_err().message,
            "index out of range: 4"
        );
    }

    #[test]
    fn join_arrives_in_version_one() {
        assert_eq!(eval("['a', 'b'].join()"), Value::from("ab"));
        assert_eq!(eval("['a', 'b'].join('-')"), Value::from("a-b"));
        assert_eq!(eval("[].join(',')"), Value::from(""));
        let v0 = TestEnv::versioned(&StringsLib, Some(0));
        assert_eq!(v0.check_errors("['a'].join()"), ["undeclared reference to `join`"]);
    }

    #[test]
    fn reverse_in_version_two() {
        assert_eq!(eval("'héllo'.reverse()"), Value::from("olléh"));
        let v1 = TestEnv::versioned(&StringsLib, Some(1));
        assert_eq!(v1.check_errors("'ab'.reverse()"), ["undeclared reference to `reverse`"]);
    }
}
