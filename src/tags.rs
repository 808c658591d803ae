//! Tag patch language applied to a result element.
//!
//! A patch is a list of tokens. A plain token adds that tag; a token starting
//! with one or more `-` removes the tag left after stripping every leading
//! `-`. Tokens apply left to right against a set, so duplicates collapse.
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOp {
    Add(String),
    Remove(String),
}

impl TagOp {
    pub fn from_token(token: &str) -> Self {
        if token.starts_with('-') {
            TagOp::Remove(token.trim_start_matches('-').to_string())
        } else {
            TagOp::Add(token.to_string())
        }
    }

    fn apply(&self, tags: &mut BTreeSet<String>) {
        match self {
            TagOp::Add(tag) => {
                tags.insert(tag.clone());
            }
            TagOp::Remove(tag) => {
                tags.remove(tag);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    ops: Vec<TagOp>,
}

impl TagPatch {
    /// Split an option value on commas; tokens are trimmed and blank ones dropped.
    pub fn parse(expr: &str) -> Self {
        let ops = expr
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(TagOp::from_token)
            .collect();
        Self { ops }
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ops: tokens
                .into_iter()
                .map(|token| TagOp::from_token(token.as_ref()))
                .collect(),
        }
    }

    pub fn ops(&self) -> &[TagOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn apply(&self, tags: &mut BTreeSet<String>) {
        for op in &self.ops {
            op.apply(tags);
        }
    }
}

/// Pure form of [`TagPatch::apply`].
pub fn apply_patch(current: &BTreeSet<String>, patch: &TagPatch) -> BTreeSet<String> {
    let mut next = current.clone();
    patch.apply(&mut next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|tag| tag.to_string()).collect()
    }

    #[test]
    fn plain_token_is_a_union() {
        let current = set(&["engage"]);
        let next = apply_patch(&current, &TagPatch::from_tokens(["archive"]));
        assert_eq!(next, set(&["archive", "engage"]));

        let again = apply_patch(&next, &TagPatch::from_tokens(["archive"]));
        assert_eq!(again, next);
    }

    #[test]
    fn minus_token_removes_and_missing_tag_is_noop() {
        let current = set(&["draft", "engage"]);
        assert_eq!(
            apply_patch(&current, &TagPatch::from_tokens(["-draft"])),
            set(&["engage"])
        );
        assert_eq!(
            apply_patch(&current, &TagPatch::from_tokens(["-absent"])),
            current
        );
    }

    #[test]
    fn every_leading_minus_is_stripped() {
        assert_eq!(TagOp::from_token("---draft"), TagOp::Remove("draft".into()));
        assert_eq!(TagOp::from_token("a-b"), TagOp::Add("a-b".into()));
        assert_eq!(TagOp::from_token("--"), TagOp::Remove(String::new()));

        let current = set(&["draft"]);
        assert_eq!(
            apply_patch(&current, &TagPatch::from_tokens(["--draft"])),
            set(&[])
        );
        assert_eq!(apply_patch(&current, &TagPatch::from_tokens(["-"])), current);
    }

    #[test]
    fn application_is_a_left_fold() {
        let current = set(&["x"]);
        let both = TagPatch::from_tokens(["y", "-y"]);
        let stepwise = apply_patch(
            &apply_patch(&current, &TagPatch::from_tokens(["y"])),
            &TagPatch::from_tokens(["-y"]),
        );
        assert_eq!(apply_patch(&current, &both), stepwise);
        assert_eq!(stepwise, set(&["x"]));

        let reversed = TagPatch::from_tokens(["-y", "y"]);
        assert_eq!(apply_patch(&current, &reversed), set(&["x", "y"]));
    }

    #[test]
    fn parse_splits_on_commas_only() {
        let patch = TagPatch::parse(" archive, -draft ,needs review,,");
        assert_eq!(
            patch.ops(),
            &[
                TagOp::Add("archive".into()),
                TagOp::Remove("draft".into()),
                TagOp::Add("needs review".into()),
            ]
        );
        assert!(TagPatch::parse(" , ").is_empty());
    }
}
