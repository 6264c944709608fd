//! Branch names recovered from merge commit subjects.
//!
//! Git does not record which branch a commit was made on, but the default
//! merge messages do name both sides:
//!
//! - `Merge branch 'feature' into develop`
//! - `Merge branch 'main' of github.com:org/repo` (written by `git pull`)
//! - `Merge remote-tracking branch 'origin/develop' into feature`
//! - `Merge pull request #42 from org/feature`
//!
//! The `into` part is omitted when merging into the default branch.

/// The branch names found in a merge subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeSubject {
    /// The merged branch (the merge parent's side).
    pub from: String,
    /// The branch merged into (the merge commit's own side), when stated.
    pub into: Option<String>,
    /// Remote URL of a `git pull` merge (`... of <url>`).
    pub remote_url: Option<String>,
    /// `from` names a remote-tracking branch.
    pub is_remote_tracking: bool,
}

impl MergeSubject {
    /// Parse a merge subject. Returns `None` for anything that is not one of
    /// the recognized merge message forms.
    #[must_use]
    pub fn parse(subject: &str) -> Option<Self> {
        let subject = subject.trim();
        if let Some(rest) = subject.strip_prefix("Merge pull request #") {
            let (_, from) = rest.split_once(" from ")?;
            let from = from.split_whitespace().next()?;
            // `owner/branch`; the owner segment is not part of the branch name.
            let from = from.split_once('/').map_or(from, |(_, b)| b);
            return non_empty(from).map(|from| Self {
                from,
                into: None,
                remote_url: None,
                is_remote_tracking: false,
            });
        }

        let (rest, is_remote_tracking) =
            if let Some(rest) = subject.strip_prefix("Merge remote-tracking branch ") {
                (rest, true)
            } else if let Some(rest) = subject.strip_prefix("Merge branch ") {
                (rest, false)
            } else {
                return None;
            };

        let (from, tail) = quoted(rest)?;
        let from = non_empty(from)?;
        let tail = tail.trim();

        let (remote_url, tail) = match tail.strip_prefix("of ") {
            Some(after) => match after.split_once(" into ") {
                Some((url, into)) => (Some(url.trim().to_owned()), format!("into {into}")),
                None => (Some(after.trim().to_owned()), String::new()),
            },
            None => (None, tail.to_owned()),
        };

        let into = match tail.strip_prefix("into ") {
            Some(into) => Some(non_empty(unquote(into.trim()))?),
            None if tail.is_empty() => None,
            None => return None,
        };

        Some(Self {
            from,
            into,
            remote_url,
            is_remote_tracking,
        })
    }

    /// `from` without its remote segment when it is remote-tracking.
    #[must_use]
    pub fn from_local(&self) -> &str {
        if self.is_remote_tracking {
            self.from.split_once('/').map_or(&self.from, |(_, b)| b)
        } else {
            &self.from
        }
    }

    /// `true` for the merges `git pull` writes: the remote side of a branch
    /// merged into the same branch.
    #[must_use]
    pub fn is_pull(&self) -> bool {
        if self.remote_url.is_some() {
            return self.into.as_deref().is_none_or(|into| into == self.from);
        }
        self.is_remote_tracking && self.into.as_deref() == Some(self.from_local())
    }

    /// Name of the branch the merge commit itself was made on, when the
    /// subject reveals it.
    #[must_use]
    pub fn own_branch(&self) -> Option<&str> {
        match (&self.into, &self.remote_url) {
            (Some(into), _) => Some(into),
            (None, Some(_)) => Some(&self.from),
            (None, None) => None,
        }
    }
}

/// Split `'name' rest` into `("name", " rest")`.
fn quoted(s: &str) -> Option<(&str, &str)> {
    let s = s.strip_prefix('\'')?;
    let end = s.find('\'')?;
    Some((&s[..end], &s[end + 1..]))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(s)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}
